// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::Path;
use std::sync::Arc;

use axum::Router;
use axum::extract::State;
use axum::handler::HandlerWithoutStateExt;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use rss::Channel;
use tower_http::services::ServeDir;
use tracing::error;

use crate::catalog::{EpisodeStore, MediaLocator};
use crate::error::FeedError;
use crate::feed::{project, render_feed};
use crate::metadata::ShowDescriptor;

pub const FEED_PATH: &str = "/feed";

const INTERNAL_ERROR_BODY: &str = "Server internal error";
const NOT_FOUND_BODY: &str = "Not found";

/// Turns a projected channel into the response body
pub type FeedRenderer = fn(&Channel) -> Result<String, FeedError>;

/// Everything a feed request needs, shared across requests
#[derive(Clone)]
pub struct AppState {
    show: Arc<ShowDescriptor>,
    locator: Arc<MediaLocator>,
    store: EpisodeStore,
    renderer: FeedRenderer,
}

impl AppState {
    pub fn new(show: ShowDescriptor, locator: MediaLocator, store: EpisodeStore) -> Self {
        Self {
            show: Arc::new(show),
            locator: Arc::new(locator),
            store,
            renderer: render_feed,
        }
    }

    /// Replace the XML renderer
    pub fn with_renderer(mut self, renderer: FeedRenderer) -> Self {
        self.renderer = renderer;
        self
    }
}

/// Routes: `/feed`, then static files from `root`, then 404
pub fn router(state: AppState, root: &Path) -> Router {
    let files = ServeDir::new(root)
        .append_index_html_on_directories(false)
        .not_found_service(not_found.into_service());

    Router::new()
        .route(FEED_PATH, get(serve_feed))
        .fallback_service(files)
        .with_state(state)
}

async fn serve_feed(State(state): State<AppState>) -> Response {
    // Only reads the latest snapshot, never waits on pending validations
    let snapshot = state.store.snapshot();
    let channel = project(&state.show, &state.locator, &snapshot);

    match (state.renderer)(&channel) {
        Ok(xml) => ([(header::CONTENT_TYPE, "application/xml")], xml).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to build feed");
            (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_BODY).into_response()
        }
    }
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, NOT_FOUND_BODY)
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use tempfile::tempdir;
    use tower::ServiceExt;
    use url::Url;

    use crate::reconcile::{attempt_admission, fixtures};

    fn make_state(root: &Path) -> AppState {
        let show = ShowDescriptor::titled("Show A");
        let locator = MediaLocator::new(Url::parse("http://localhost:3000/").unwrap(), &show);
        let store = EpisodeStore::new();
        for key in ["E1", "E2"] {
            if let Ok(Some(record)) = attempt_admission(root, key, &locator) {
                store.upsert(key, record);
            }
        }
        AppState::new(show, locator, store)
    }

    async fn get_path(app: Router, path: &str, range: Option<&str>) -> Response {
        let mut request = Request::builder().uri(path);
        if let Some(range) = range {
            request = request.header(header::RANGE, range);
        }
        app.oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn body_string(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn feed_is_served_as_xml() {
        let dir = tempdir().unwrap();
        fixtures::write_episode(dir.path(), "E1", "2024-01-02");
        fixtures::write_episode(dir.path(), "E2", "2024-01-05");
        let app = router(make_state(dir.path()), dir.path());

        let response = get_path(app, "/feed", None).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/xml"
        );
        let xml = body_string(response).await;
        let e2 = xml.find("<title>E2</title>").unwrap();
        let e1 = xml.find("<title>E1</title>").unwrap();
        assert!(e2 < e1);
    }

    #[tokio::test]
    async fn feed_failure_is_a_500() {
        let dir = tempdir().unwrap();
        let state = make_state(dir.path()).with_renderer(|_| {
            Err(FeedError::SerializationFailed(rss::Error::Eof))
        });
        let app = router(state, dir.path());

        let response = get_path(app.clone(), "/feed", None).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_string(response).await, INTERNAL_ERROR_BODY);

        // Later requests are still served
        let response = get_path(app, "/feed", None).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn media_files_are_served_with_ranges() {
        let dir = tempdir().unwrap();
        fixtures::write_episode(dir.path(), "E1", "2024-01-02");
        let app = router(make_state(dir.path()), dir.path());

        let response = get_path(app.clone(), "/E1/episode.m4a", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "audio");

        let response = get_path(app, "/E1/episode.m4a", Some("bytes=1-3")).await;
        assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
        assert_eq!(body_string(response).await, "udi");
    }

    #[tokio::test]
    async fn unknown_paths_are_404() {
        let dir = tempdir().unwrap();
        let app = router(make_state(dir.path()), dir.path());

        let response = get_path(app, "/nope/missing.mp3", None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_string(response).await, NOT_FOUND_BODY);
    }
}

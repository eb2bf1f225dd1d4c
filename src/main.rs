// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use console::Emoji;
use tracing::info;
use tracing_subscriber::EnvFilter;
use url::Url;

use podwatch::{
    AppState, EpisodeStore, FolderWatcher, MediaLocator, Reconciler, RetryPolicy, StartupError,
    TracingReporter, read_show_descriptor, router, scan_root,
};

// Emoji with fallback for terminals without Unicode support
static MICROPHONE: Emoji<'_, '_> = Emoji("🎙️  ", "");
static FOLDER: Emoji<'_, '_> = Emoji("📁 ", "");
static HEADPHONES: Emoji<'_, '_> = Emoji("🎧 ", "[i] ");
static FEED: Emoji<'_, '_> = Emoji("📡 ", "[>] ");

/// Serve a watched directory of podcast episodes as an RSS feed
#[derive(Parser, Debug)]
#[command(name = "podwatch")]
#[command(about = "Serve a watched directory of podcast episodes as an RSS feed")]
#[command(version)]
struct Args {
    /// Directory containing podcast.json and one folder per episode
    #[arg(env = "PODWATCH_ROOT")]
    root: PathBuf,

    /// Address to listen on
    #[arg(short, long, env = "PODWATCH_LISTEN", default_value = "0.0.0.0:3000")]
    listen: SocketAddr,

    /// Public URL the media files are reachable under
    #[arg(short, long, env = "PODWATCH_BASE_URL")]
    base_url: Option<Url>,

    /// Delay between validation attempts for a new folder, in milliseconds
    #[arg(
        long,
        env = "PODWATCH_RETRY_INTERVAL_MS",
        default_value = "1000",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    retry_interval_ms: u64,

    /// How long a new folder may take to become complete, in seconds
    #[arg(long, env = "PODWATCH_RETRY_TIMEOUT_SECS", default_value = "30")]
    retry_timeout_secs: u64,

    /// Quiet mode - only log warnings and errors
    #[arg(short, long, env = "PODWATCH_QUIET")]
    quiet: bool,
}

fn init_tracing(quiet: bool) {
    let default_directive = if quiet { "podwatch=warn" } else { "podwatch=info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.quiet);

    if !args.quiet {
        println!(
            "\n{}{} {}\n",
            MICROPHONE,
            "podwatch".bold().magenta(),
            "- Podcast Feed Server".dimmed()
        );
    }

    if !args.root.is_dir() {
        return Err(StartupError::RootNotFound(args.root.clone()).into());
    }

    // Without a show descriptor there is nothing to serve
    let show = read_show_descriptor(&args.root).map_err(StartupError::ShowMetadata)?;

    let base_url = match args.base_url.or_else(|| show.site_url.clone()) {
        Some(url) => url,
        None => Url::parse(&format!("http://localhost:{}/", args.listen.port()))
            .context("Failed to build default base URL")?,
    };

    let locator = MediaLocator::new(base_url.clone(), &show);
    let store = EpisodeStore::new();
    let reporter = TracingReporter::shared();
    let policy = RetryPolicy {
        interval: Duration::from_millis(args.retry_interval_ms),
        timeout: Duration::from_secs(args.retry_timeout_secs),
    };

    // Watch before scanning so folders created during the scan are not missed
    let (watcher, events) =
        FolderWatcher::start(&args.root).context("Failed to watch episode directory")?;

    let summary = scan_root(&args.root, &store, &locator, &reporter)
        .context("Failed to scan episode directory")?;

    let reconciler = Reconciler::new(
        watcher.root(),
        store.clone(),
        locator.clone(),
        policy,
        reporter,
    );
    let reconcile_task = tokio::spawn(reconciler.clone().run(events));

    let app = router(AppState::new(show.clone(), locator, store), &args.root);
    let listener = tokio::net::TcpListener::bind(args.listen)
        .await
        .with_context(|| format!("Failed to bind {}", args.listen))?;

    if !args.quiet {
        println!(
            "{HEADPHONES}{} • {} episodes",
            show.title.bold().green(),
            summary.admitted.to_string().cyan()
        );
        println!(
            "{FOLDER}Watching: {}",
            args.root.display().to_string().cyan()
        );
        println!(
            "{FEED}Feed: {}\n",
            base_url.join("feed").map(|u| u.to_string()).unwrap_or_default().cyan()
        );
    }
    info!(address = %args.listen, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    reconciler.cancel_all();
    drop(watcher);
    reconcile_task.abort();

    Ok(())
}

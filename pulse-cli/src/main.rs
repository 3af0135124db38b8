mod args;
mod render;

use anyhow::{Context, Result};
use clap::Parser;
use pulse_core::{
    CancellationToken, Config, ConnectionStatus, Dashboard, FeedHandler, FeedListener,
    MetricSnapshot,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use args::Args;
use render::Renderer;

/// Dashboard plus the terminal it is drawn on; redraws after every feed event.
struct TerminalView {
    dashboard: Dashboard,
    renderer: Renderer,
}

impl TerminalView {
    fn redraw(&mut self) {
        if let Err(e) = self.renderer.draw(&self.dashboard) {
            warn!(error = %e, "Failed to draw dashboard");
        }
    }
}

impl FeedHandler for TerminalView {
    fn on_snapshot(&mut self, snapshot: MetricSnapshot) {
        self.dashboard.on_snapshot(snapshot);
        self.redraw();
    }

    fn on_status(&mut self, status: ConnectionStatus) {
        self.dashboard.on_status(status);
        self.redraw();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let config = resolve_config(&args)?;
    let listener = FeedListener::new(&config.feed).context("Failed to create HTTP client")?;

    let cancel = CancellationToken::new();
    let on_ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutting down...");
            on_ctrl_c.cancel();
        }
    });

    let mut view = TerminalView {
        dashboard: Dashboard::new(&config.dashboard),
        renderer: Renderer::new(Box::new(std::io::stdout()), !args.plain),
    };
    view.redraw();

    info!(url = %listener.url(), "Subscribing to metrics feed");
    listener.run(&mut view, cancel).await;

    Ok(())
}

fn init_tracing(verbose: u8) {
    let default_directive = match verbose {
        0 => "pulse_cli=info,pulse_core=info",
        1 => "pulse_cli=debug,pulse_core=debug",
        _ => "pulse_cli=trace,pulse_core=trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive)),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Config file (or defaults), then environment, then command-line flags.
fn resolve_config(args: &Args) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::load_or_default().context("Failed to load ./pulse.yaml")?,
    }
    .with_env_overrides();

    if let Some(url) = &args.url {
        config = config.with_feed_url(url.clone());
    }
    if let Some(window) = args.window {
        config = config.with_window_size(window);
    }
    if let Some(title) = &args.title {
        config = config.with_title(title.clone());
    }

    config.validate()?;
    Ok(config)
}

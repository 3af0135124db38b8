use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// Live system-metrics dashboard for a server-sent events feed.
///
/// Logs go to stderr; redirect them (`2>pulse.log`) to keep the dashboard clean.
#[derive(Debug, Parser)]
#[command(name = "pulse", version, about, long_about = None)]
pub struct Args {
    /// Event-stream URL (overrides config and PULSE_FEED_URL)
    #[arg(short, long)]
    pub url: Option<String>,

    /// YAML config file (defaults to ./pulse.yaml when present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Number of rate samples kept per chart
    #[arg(short, long)]
    pub window: Option<usize>,

    /// Dashboard title
    #[arg(short, long)]
    pub title: Option<String>,

    /// Disable colors
    #[arg(long)]
    pub plain: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_overrides() {
        let args = Args::parse_from([
            "pulse",
            "--url",
            "http://host:8000/api/stream",
            "-w",
            "30",
            "--plain",
            "-vv",
        ]);
        assert_eq!(args.url.as_deref(), Some("http://host:8000/api/stream"));
        assert_eq!(args.window, Some(30));
        assert!(args.plain);
        assert_eq!(args.verbose, 2);
        assert!(args.config.is_none());
    }

    #[test]
    fn test_args_definition() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }
}

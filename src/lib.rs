//! pulse - live system-metrics dashboard
//!
//! Re-exports [`pulse_core`] and adds a one-call entry point for watching a
//! metrics feed without writing a custom [`FeedHandler`].

pub use pulse_core::*;

/// Subscribe to the configured feed and keep a [`Dashboard`] up to date
/// until `cancel` fires, then hand the final dashboard back.
pub async fn watch(config: &Config, cancel: CancellationToken) -> Result<Dashboard, FeedError> {
    let listener = FeedListener::new(&config.feed)?;
    let mut dashboard = Dashboard::new(&config.dashboard);

    listener.run(&mut dashboard, cancel).await;

    Ok(dashboard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_watch_cancelled_returns_fresh_dashboard() {
        let cancel = CancellationToken::new();
        cancel.cancel();

        let config = Config::new().with_title("Bench");
        let dashboard = watch(&config, cancel).await.unwrap();

        assert_eq!(dashboard.title(), "Bench");
        assert!(!dashboard.status().status().is_connected());
        assert!(dashboard.charts().last_update().is_none());
    }
}

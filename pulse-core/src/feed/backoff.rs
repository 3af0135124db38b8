use std::time::Duration;

use crate::config::ReconnectConfig;

/// Exponential reconnect schedule for the event stream.
#[derive(Debug, Clone)]
pub struct ReconnectBackoff {
    initial: Duration,
    max: Duration,
    current: Duration,
}

impl ReconnectBackoff {
    pub fn new(config: &ReconnectConfig) -> Self {
        let initial = Duration::from_millis(config.initial_delay_ms.max(1));
        let max = Duration::from_millis(config.max_delay_ms).max(initial);
        Self {
            initial,
            max,
            current: initial,
        }
    }

    /// Delay before the next attempt; doubles the one after it.
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        self.current = (self.current * 2).min(self.max);
        delay
    }

    /// Start over after a successful handshake.
    pub fn reset(&mut self) {
        self.current = self.initial;
    }

    /// Adopt a reconnection time announced by the server (`retry:` field).
    pub fn set_initial(&mut self, delay: Duration) {
        self.initial = delay.max(Duration::from_millis(1));
        self.max = self.max.max(self.initial);
        self.current = self.initial;
    }
}

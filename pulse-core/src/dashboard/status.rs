/// Connectivity of the event stream as last reported by the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Connected,
    Disconnected,
}

impl ConnectionStatus {
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionStatus::Connected)
    }

    pub fn text(&self) -> &'static str {
        match self {
            ConnectionStatus::Connected => "Connected",
            ConnectionStatus::Disconnected => "Disconnected - Reconnecting...",
        }
    }
}

/// Status dot and text; mirrors the most recent status with no debouncing.
#[derive(Debug, Clone, Copy)]
pub struct StatusIndicator {
    status: ConnectionStatus,
}

impl StatusIndicator {
    pub fn new() -> Self {
        Self {
            status: ConnectionStatus::Disconnected,
        }
    }

    /// Record a status; returns true if it differs from the previous one.
    pub fn set(&mut self, status: ConnectionStatus) -> bool {
        let changed = self.status != status;
        self.status = status;
        changed
    }

    pub fn status(&self) -> ConnectionStatus {
        self.status
    }

    pub fn text(&self) -> &'static str {
        self.status.text()
    }
}

impl Default for StatusIndicator {
    fn default() -> Self {
        Self::new()
    }
}

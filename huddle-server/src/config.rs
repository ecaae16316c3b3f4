use std::time::Duration;

/// Relay-wide settings.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// How long an empty room is kept around before it is reaped.
    pub room_grace: Duration,
    /// Upper bound on live rooms; exceeding it is ResourceExhausted.
    pub max_rooms: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            room_grace: Duration::from_secs(30),
            max_rooms: 1024,
        }
    }
}

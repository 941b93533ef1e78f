/// WebSocket connection health monitoring
///
/// Tracks per-connection liveness: server-initiated pings after a quiet
/// period, a pong deadline, and an idle timeout that closes dead
/// clients. The Socket.IO-style transports do this implicitly; here it
/// is explicit.
use std::time::{Duration, Instant};

/// Health monitoring configuration
#[derive(Debug, Clone)]
pub struct HealthConfig {
    /// Quiet period before the server sends a ping
    pub heartbeat_interval: Duration,

    /// No client activity beyond this closes the connection
    pub idle_timeout: Duration,

    /// Deadline for a pong after a ping was sent
    pub pong_timeout: Duration,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            heartbeat_interval: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(90),
            pong_timeout: Duration::from_secs(10),
        }
    }
}

impl HealthConfig {
    /// Build from the websocket config section
    pub fn from_config(ws: &crate::config::WebsocketConfig) -> Self {
        Self {
            heartbeat_interval: Duration::from_secs(ws.heartbeat_secs),
            idle_timeout: Duration::from_secs(ws.client_idle_timeout_secs),
            pong_timeout: Duration::from_secs(10),
        }
    }
}

/// Per-connection health state
#[derive(Debug)]
pub struct ConnectionHealth {
    /// Last client activity (any message received)
    last_activity: Instant,

    /// Last ping sent, cleared by any activity
    last_ping: Option<Instant>,

    config: HealthConfig,
}

impl ConnectionHealth {
    pub fn new(config: HealthConfig) -> Self {
        Self {
            last_activity: Instant::now(),
            last_ping: None,
            config,
        }
    }

    /// Record client activity
    pub fn record_activity(&mut self) {
        self.last_activity = Instant::now();
        self.last_ping = None;
    }

    /// Record ping sent
    pub fn record_ping(&mut self) {
        self.last_ping = Some(Instant::now());
    }

    /// No activity beyond the idle timeout
    pub fn is_idle(&self) -> bool {
        self.last_activity.elapsed() > self.config.idle_timeout
    }

    /// Ping sent but no response within the pong deadline
    pub fn is_pong_overdue(&self) -> bool {
        self.last_ping
            .map(|ping_time| ping_time.elapsed() > self.config.pong_timeout)
            .unwrap_or(false)
    }

    /// Quiet long enough that a ping should go out
    pub fn needs_ping(&self) -> bool {
        self.last_activity.elapsed() > self.config.heartbeat_interval && self.last_ping.is_none()
    }

    /// Seconds since the last client activity
    pub fn idle_seconds(&self) -> u64 {
        self.last_activity.elapsed().as_secs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    #[test]
    fn test_connection_health_lifecycle() {
        let config = HealthConfig {
            heartbeat_interval: Duration::from_millis(50),
            idle_timeout: Duration::from_millis(100),
            pong_timeout: Duration::from_millis(30),
        };

        let mut health = ConnectionHealth::new(config);
        assert!(!health.is_idle());
        assert!(!health.needs_ping());

        sleep(Duration::from_millis(60));
        assert!(health.needs_ping());

        health.record_ping();
        assert!(!health.needs_ping());
        sleep(Duration::from_millis(50));
        assert!(health.is_pong_overdue());

        // Activity clears the pending ping and resets idle tracking
        health.record_activity();
        assert!(!health.is_pong_overdue());
        assert!(!health.is_idle());

        sleep(Duration::from_millis(120));
        assert!(health.is_idle());
    }
}

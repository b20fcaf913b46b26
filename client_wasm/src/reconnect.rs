//! WebSocket reconnection policy

/// Close codes for a deliberate shutdown (normal closure, going away)
pub const NORMAL_CLOSE_CODES: [u16; 2] = [1000, 1001];
pub const MAX_RECONNECT_ATTEMPTS: u32 = 3;
pub const BASE_DELAY_MS: u32 = 1000;
pub const MAX_DELAY_MS: u32 = 30_000;

/// What to do after a socket closed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseAction {
    /// Closed on purpose; stay disconnected
    Stay,
    /// Try again after this many milliseconds
    Retry(u32),
    /// Out of attempts; the server is considered offline
    Offline,
}

/// Tracks failed connection attempts for one socket
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    attempts: u32,
    max_attempts: u32,
    offline: bool,
}

impl ReconnectPolicy {
    pub fn new() -> Self {
        Self {
            attempts: 0,
            max_attempts: MAX_RECONNECT_ATTEMPTS,
            offline: false,
        }
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Once offline no further connections are attempted
    pub fn is_offline(&self) -> bool {
        self.offline
    }

    pub fn on_open(&mut self) {
        self.attempts = 0;
        self.offline = false;
    }

    pub fn on_close(&mut self, code: u16) -> CloseAction {
        if NORMAL_CLOSE_CODES.contains(&code) {
            return CloseAction::Stay;
        }
        self.attempts += 1;
        if self.attempts >= self.max_attempts {
            self.offline = true;
            return CloseAction::Offline;
        }
        CloseAction::Retry(delay_ms(self.attempts))
    }
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self::new()
    }
}

/// Exponential backoff: `min(1000 * 2^(attempt - 1), 30000)`
pub fn delay_ms(attempt: u32) -> u32 {
    let exponent = attempt.saturating_sub(1).min(31);
    BASE_DELAY_MS.saturating_mul(1u32 << exponent).min(MAX_DELAY_MS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_normal_closure_does_not_reconnect() {
        let mut policy = ReconnectPolicy::new();
        assert_eq!(policy.on_close(1000), CloseAction::Stay);
        assert_eq!(policy.on_close(1001), CloseAction::Stay);
        assert_eq!(policy.attempts(), 0);
    }

    #[test]
    fn test_backoff_then_offline() {
        let mut policy = ReconnectPolicy::new();
        assert_eq!(policy.on_close(1006), CloseAction::Retry(1000));
        assert_eq!(policy.on_close(1006), CloseAction::Retry(2000));
        assert_eq!(policy.on_close(1006), CloseAction::Offline);
        assert!(policy.is_offline());
    }

    #[test]
    fn test_open_resets_attempts() {
        let mut policy = ReconnectPolicy::new();
        policy.on_close(1011);
        policy.on_close(1011);
        policy.on_open();
        assert_eq!(policy.attempts(), 0);
        assert_eq!(policy.on_close(1011), CloseAction::Retry(1000));
    }

    #[test]
    fn test_delay_is_capped() {
        assert_eq!(delay_ms(5), 16_000);
        assert_eq!(delay_ms(6), 30_000);
        assert_eq!(delay_ms(40), 30_000);
    }

    proptest! {
        #[test]
        fn prop_delay_is_monotonic_and_bounded(attempt in 1u32..64) {
            let delay = delay_ms(attempt);
            prop_assert!(delay >= BASE_DELAY_MS);
            prop_assert!(delay <= MAX_DELAY_MS);
            prop_assert!(delay_ms(attempt + 1) >= delay);
        }
    }
}

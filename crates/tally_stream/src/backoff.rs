//! Reconnection delay policy.

use std::time::Duration;

/// Default first reconnection delay.
pub const DEFAULT_INITIAL: Duration = Duration::from_secs(5);

/// Default upper bound on the reconnection delay.
pub const DEFAULT_MAX: Duration = Duration::from_secs(320);

/// Exponential reconnection backoff.
///
/// Each failure doubles the delay, starting at `initial` and capped at `max`.
/// A successful connection resets it.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use tally_stream::Backoff;
///
/// let mut backoff = Backoff::default();
/// assert_eq!(backoff.next_delay(), Duration::from_secs(5));
/// assert_eq!(backoff.next_delay(), Duration::from_secs(10));
/// backoff.reset();
/// assert_eq!(backoff.next_delay(), Duration::from_secs(5));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Backoff {
    initial: Duration,
    max: Duration,
    current: Duration,
}

impl Backoff {
    /// Create a backoff with the given bounds.
    ///
    /// `max` is raised to `initial` if it is smaller.
    pub fn new(initial: Duration, max: Duration) -> Self {
        Self {
            initial,
            max: max.max(initial),
            current: Duration::ZERO,
        }
    }

    /// Advance and return the delay to wait before the next attempt.
    pub fn next_delay(&mut self) -> Duration {
        self.current = self
            .current
            .saturating_mul(2)
            .max(self.initial)
            .min(self.max);
        self.current
    }

    /// Forget accumulated failures.
    pub fn reset(&mut self) {
        self.current = Duration::ZERO;
    }

    /// The most recently returned delay, zero after a reset.
    pub fn current(&self) -> Duration {
        self.current
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new(DEFAULT_INITIAL, DEFAULT_MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caps_at_max() {
        let mut backoff = Backoff::new(Duration::from_secs(5), Duration::from_secs(20));
        let delays: Vec<_> = (0..5).map(|_| backoff.next_delay().as_secs()).collect();
        assert_eq!(delays, vec![5, 10, 20, 20, 20]);
    }

    #[test]
    fn max_below_initial_is_raised() {
        let mut backoff = Backoff::new(Duration::from_secs(10), Duration::from_secs(1));
        assert_eq!(backoff.next_delay(), Duration::from_secs(10));
        assert_eq!(backoff.next_delay(), Duration::from_secs(10));
    }
}

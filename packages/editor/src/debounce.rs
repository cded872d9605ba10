//! Trailing-edge debounce for remote submissions.
//!
//! Pure timing state: callers pass the current instant, so the session stays
//! synchronous and the driver owns the actual timer.

use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self { delay, deadline: None }
    }

    /// Restart the quiet period from `now`
    pub fn schedule(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// True once per quiet period: when the deadline has passed, clear it
    pub fn take_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if deadline <= now => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coalesces_rapid_triggers() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(Duration::from_millis(300));

        debouncer.schedule(start);
        debouncer.schedule(start + Duration::from_millis(200));

        assert!(!debouncer.take_due(start + Duration::from_millis(400)));
        assert!(debouncer.take_due(start + Duration::from_millis(500)));
        assert!(!debouncer.take_due(start + Duration::from_millis(900)));
        assert!(!debouncer.is_pending());
    }

    #[test]
    fn test_cancel() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(Duration::from_millis(10));

        debouncer.schedule(start);
        debouncer.cancel();

        assert_eq!(debouncer.deadline(), None);
        assert!(!debouncer.take_due(start + Duration::from_secs(1)));
    }
}

//! Bounded retry counter.
//!
//! # Responsibilities
//! - Track how many retries the current invocation has used
//! - Refuse to go past the configured maximum
//! - Reset on success and on every fresh invocation

/// Number of retries used so far, bounded by `max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryCounter {
    current: u32,
    max: u32,
}

impl RetryCounter {
    pub fn new(max: u32) -> Self {
        Self { current: 0, max }
    }

    pub fn current(&self) -> u32 {
        self.current
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    pub fn is_exhausted(&self) -> bool {
        self.current >= self.max
    }

    /// Use one retry, returning the new count, or `None` once exhausted.
    pub fn try_increment(&mut self) -> Option<u32> {
        if self.is_exhausted() {
            return None;
        }
        self.current += 1;
        Some(self.current)
    }

    pub fn reset(&mut self) {
        self.current = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_up_to_max() {
        let mut counter = RetryCounter::new(2);
        assert_eq!(counter.max(), 2);
        assert_eq!(counter.try_increment(), Some(1));
        assert_eq!(counter.try_increment(), Some(2));
        assert!(counter.is_exhausted());
        assert_eq!(counter.try_increment(), None);
        assert_eq!(counter.current(), 2);
    }

    #[test]
    fn test_zero_max_is_exhausted_immediately() {
        let mut counter = RetryCounter::new(0);
        assert!(counter.is_exhausted());
        assert_eq!(counter.try_increment(), None);
    }

    #[test]
    fn test_reset() {
        let mut counter = RetryCounter::new(1);
        counter.try_increment();
        counter.reset();
        assert_eq!(counter.current(), 0);
        assert_eq!(counter.try_increment(), Some(1));
    }
}

/// Configures attempt limits, backoff and per-attempt timeout.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RetryOptions {
    /// Total number of attempts, the first one included. Must be at least 1.
    pub max_attempts: usize,
    /// Base retry backoff in milliseconds (linear strategy).
    pub backoff_ms: u64,
    /// Per-attempt transport timeout in milliseconds.
    pub timeout_ms: u64,
}

impl RetryOptions {
    /// Returns a copy with a different attempt limit.
    pub fn attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Returns a copy with a different backoff unit.
    pub fn backoff_ms(mut self, backoff_ms: u64) -> Self {
        self.backoff_ms = backoff_ms;
        self
    }
}

impl Default for RetryOptions {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_ms: 2_000,
            timeout_ms: 30_000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::RetryOptions;

    #[test]
    fn defaults_are_three_attempts_two_second_unit() {
        let opts = RetryOptions::default();
        assert_eq!(opts.max_attempts, 3);
        assert_eq!(opts.backoff_ms, 2_000);
    }

    #[test]
    fn builders_override_single_field() {
        let opts = RetryOptions::default().attempts(5).backoff_ms(10);
        assert_eq!(opts.max_attempts, 5);
        assert_eq!(opts.backoff_ms, 10);
        assert_eq!(opts.timeout_ms, RetryOptions::default().timeout_ms);
    }
}

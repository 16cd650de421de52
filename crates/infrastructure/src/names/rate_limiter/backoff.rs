use std::time::Duration;

/// Exponential backoff with bounded random jitter:
/// `min(base * 2^retry, max) + rand(0..=jitter_ratio * that)`.
#[derive(Debug, Clone, Copy)]
pub struct BackoffPolicy {
    base: Duration,
    max: Duration,
    jitter_ratio: f64,
}

impl BackoffPolicy {
    pub fn new(base: Duration, max: Duration, jitter_ratio: f64) -> Self {
        Self {
            base,
            max: max.max(base),
            jitter_ratio: jitter_ratio.clamp(0.0, 1.0),
        }
    }

    /// Delay before retry number `retry_count + 1`, without jitter.
    pub fn delay_for(&self, retry_count: u32) -> Duration {
        let factor = 1u32.checked_shl(retry_count).unwrap_or(u32::MAX);
        self.base.saturating_mul(factor).min(self.max)
    }

    pub fn jittered_delay_for(&self, retry_count: u32) -> Duration {
        let delay = self.delay_for(retry_count);
        delay + delay.mul_f64(self.jitter_ratio * fastrand::f64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delays_double_until_capped() {
        let policy =
            BackoffPolicy::new(Duration::from_millis(100), Duration::from_millis(1000), 0.3);

        let delays: Vec<_> = (0..6).map(|r| policy.delay_for(r)).collect();
        assert_eq!(
            delays,
            vec![
                Duration::from_millis(100),
                Duration::from_millis(200),
                Duration::from_millis(400),
                Duration::from_millis(800),
                Duration::from_millis(1000),
                Duration::from_millis(1000),
            ]
        );
    }

    #[test]
    fn test_huge_retry_count_saturates_at_max() {
        let policy = BackoffPolicy::new(Duration::from_secs(1), Duration::from_secs(30), 0.0);
        assert_eq!(policy.delay_for(64), Duration::from_secs(30));
    }

    #[test]
    fn test_jitter_stays_within_ratio() {
        let policy = BackoffPolicy::new(Duration::from_millis(1000), Duration::from_secs(30), 0.3);
        for _ in 0..200 {
            let d = policy.jittered_delay_for(0);
            assert!(d >= Duration::from_millis(1000));
            assert!(d <= Duration::from_millis(1300));
        }
    }
}

use std::time::Duration;

use tokio::time::sleep;

/// Randomized exponential backoff between retry attempts.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BackoffPolicy {
    /// Lower bound of every delay.
    pub min_delay: Duration,
    /// Upper bound of every delay.
    pub max_delay: Duration,
    /// Growth factor applied per attempt.
    pub factor: f64,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            min_delay: Duration::from_secs(2),
            max_delay: Duration::from_secs(60),
            factor: 3.0,
        }
    }
}

impl BackoffPolicy {
    /// Un-jittered delay for `attempt`: `min * factor^attempt`, clamped to
    /// `[min_delay, max_delay]`.
    pub fn ceiling(&self, attempt: usize) -> Duration {
        let min = self.min_delay.as_secs_f64();
        let max = self.max_delay.as_secs_f64().max(min);
        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        let raw = min * self.factor.powi(exponent);
        let clamped = if raw.is_nan() {
            max
        } else {
            raw.clamp(min, max)
        };
        Duration::try_from_secs_f64(clamped).unwrap_or(self.max_delay.max(self.min_delay))
    }

    /// Delay for `attempt` with a caller-supplied jitter `fraction` in `[0, 1]`.
    pub fn delay_with(&self, attempt: usize, fraction: f64) -> Duration {
        let fraction = if fraction.is_nan() {
            1.0
        } else {
            fraction.clamp(0.0, 1.0)
        };
        let ceiling = self.ceiling(attempt);
        let span = ceiling.saturating_sub(self.min_delay);
        self.min_delay + span.mul_f64(fraction)
    }

    /// Jittered delay for `attempt`, drawn from the upper half of
    /// `[min_delay, ceiling(attempt)]`.
    pub fn delay(&self, attempt: usize) -> Duration {
        self.delay_with(attempt, rand::random_range(0.5..1.0))
    }

    /// Sleeps the calling task for [`BackoffPolicy::delay`].
    pub async fn wait(&self, attempt: usize) {
        let delay = self.delay(attempt);
        let delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        tracing::trace!(attempt, delay_ms, "backing off before retry");
        sleep(delay).await;
    }
}

/// Whether another attempt may follow attempt number `attempt` (0-based).
pub fn should_retry(attempt: usize, max_retries: usize) -> bool {
    attempt < max_retries
}

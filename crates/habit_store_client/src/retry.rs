use rand::{Rng, rng};
use std::time::Duration;

/// Bounded retry with exponential backoff and jitter, used on the session
/// load path before a fetch degrades to empty data.
pub struct RetryPolicy {
    /// Total tries, including the first one.
    pub attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            base_delay: Duration::from_millis(100),
        }
    }
}

impl RetryPolicy {
    pub async fn run<F, Fut, T, E>(&self, mut op: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<T, E>>,
    {
        let mut tried = 0u32;
        loop {
            let err = match op().await {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };
            tried += 1;
            if tried >= self.attempts.max(1) {
                return Err(err);
            }
            let ceiling = self.base_delay * (1u32 << tried);
            let jitter = rng().random_range(0..ceiling.as_millis().max(1) as u64);
            tokio::time::sleep(Duration::from_millis(jitter)).await;
        }
    }
}

use rand::Rng;
use std::time::Duration;
use tracing::debug;

/// Inserts a randomized delay between successive search requests to keep
/// the request rate against the portal low. Uniform sampling over the
/// closed interval, no adaptive backoff.
pub struct Pacer {
    min_ms: u64,
    max_ms: u64,
}

impl Pacer {
    pub fn new(min_ms: u64, max_ms: u64) -> Self {
        Self { min_ms, max_ms }
    }

    /// Sampling is separate from sleeping so the bounds are testable.
    pub fn sample(&self) -> Duration {
        let ms = rand::thread_rng().gen_range(self.min_ms..=self.max_ms);
        Duration::from_millis(ms)
    }

    pub async fn wait(&self) {
        let delay = self.sample();
        debug!("pacing: waiting {}ms before next search", delay.as_millis());
        tokio::time::sleep(delay).await;
    }
}

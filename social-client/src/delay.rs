use rand::Rng;
use std::time::Duration;
use tracing::debug;
use xthreads_core::ScrapingConfig;

/// Random pause between requests to the same platform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolitenessDelay {
    min_secs: f64,
    max_secs: f64,
}

impl PolitenessDelay {
    pub fn new(min_secs: f64, max_secs: f64) -> Self {
        let min_secs = min_secs.max(0.0);
        Self {
            min_secs,
            max_secs: max_secs.max(min_secs),
        }
    }

    pub fn from_config(config: &ScrapingConfig) -> Self {
        Self::new(config.min_delay_secs, config.max_delay_secs)
    }

    pub fn none() -> Self {
        Self::new(0.0, 0.0)
    }

    pub fn sample(&self, rng: &mut impl Rng) -> Duration {
        if self.max_secs <= self.min_secs {
            return Duration::from_secs_f64(self.min_secs);
        }
        Duration::from_secs_f64(rng.random_range(self.min_secs..=self.max_secs))
    }

    pub async fn wait(&self) {
        let delay = self.sample(&mut rand::rng());
        if delay.is_zero() {
            return;
        }
        debug!("Politeness delay {:?}", delay);
        tokio::time::sleep(delay).await;
    }
}

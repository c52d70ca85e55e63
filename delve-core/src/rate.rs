use crate::error::{FuzzError, Result};
use std::time::Duration;
use tokio::time::sleep;

/// Fixed-delay gate: one dispatch per `1 / rps` seconds, no burst capacity.
#[derive(Debug, Clone, Copy)]
pub struct RateGate {
    delay: Duration,
}

/// Ten requests per second.
impl Default for RateGate {
    fn default() -> Self {
        Self {
            delay: Duration::from_millis(100),
        }
    }
}

impl RateGate {
    pub fn per_second(requests_per_second: f64) -> Result<Self> {
        if !requests_per_second.is_finite() || requests_per_second <= 0.0 {
            return Err(FuzzError::InvalidConfig(format!(
                "requests per second must be a positive number, got {}",
                requests_per_second
            )));
        }
        let delay = Duration::try_from_secs_f64(1.0 / requests_per_second).map_err(|_| {
            FuzzError::InvalidConfig(format!(
                "requests per second is too small to pace, got {}",
                requests_per_second
            ))
        })?;
        Ok(Self { delay })
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Sleep for the full delay. Called before every dispatch, including ones that
    /// end up failing.
    pub async fn wait(&self) {
        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }
    }
}

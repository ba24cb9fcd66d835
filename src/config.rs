use crate::application::job::Backoff;
use crate::error::{OrderError, Result};
use crate::infrastructure::simulated::RandomDecider;
use std::time::Duration;

/// Runtime settings of the payment worker pool.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkerConfig {
    /// Number of worker tasks; jobs are sharded across them by order id.
    pub workers: usize,
    /// Probability that a simulated payment succeeds.
    pub success_rate: f64,
    pub backoff: Backoff,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            workers: 4,
            success_rate: RandomDecider::DEFAULT_SUCCESS_RATE,
            backoff: Backoff::default(),
        }
    }
}

impl WorkerConfig {
    pub fn new(workers: usize, success_rate: f64, retry_backoff: Duration) -> Result<Self> {
        if workers == 0 {
            return Err(OrderError::ConfigError(
                "at least one worker is required".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&success_rate) {
            return Err(OrderError::ConfigError(format!(
                "success rate must be within [0, 1], got {success_rate}"
            )));
        }
        Ok(Self {
            workers,
            success_rate,
            backoff: Backoff {
                initial: retry_backoff,
                ..Backoff::default()
            },
        })
    }

    pub fn decider(&self) -> Result<RandomDecider> {
        RandomDecider::new(self.success_rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = WorkerConfig::default();
        assert_eq!(config.workers, 4);
        assert_eq!(config.success_rate, 0.8);
        assert_eq!(config.backoff.initial, Duration::from_millis(100));
    }

    #[test]
    fn test_validation() {
        assert!(matches!(
            WorkerConfig::new(0, 0.5, Duration::ZERO),
            Err(OrderError::ConfigError(_))
        ));
        assert!(matches!(
            WorkerConfig::new(1, -0.1, Duration::ZERO),
            Err(OrderError::ConfigError(_))
        ));

        let config = WorkerConfig::new(2, 1.0, Duration::from_millis(10)).unwrap();
        assert_eq!(config.backoff.initial, Duration::from_millis(10));
        assert_eq!(config.backoff.max, Duration::from_secs(5));
    }
}

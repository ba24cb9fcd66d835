use crate::domain::ports::PaymentDecider;
use crate::error::{OrderError, Result};
use rand::Rng;

/// Simulates a payment gateway that approves a fixed share of attempts.
#[derive(Debug, Clone, Copy)]
pub struct RandomDecider {
    success_rate: f64,
}

impl RandomDecider {
    pub const DEFAULT_SUCCESS_RATE: f64 = 0.8;

    pub fn new(success_rate: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&success_rate) {
            return Err(OrderError::ConfigError(format!(
                "success rate must be within [0, 1], got {success_rate}"
            )));
        }
        Ok(Self { success_rate })
    }
}

impl Default for RandomDecider {
    fn default() -> Self {
        Self {
            success_rate: Self::DEFAULT_SUCCESS_RATE,
        }
    }
}

impl PaymentDecider for RandomDecider {
    fn decide(&self) -> bool {
        rand::thread_rng().gen_bool(self.success_rate)
    }
}

/// Always returns the same outcome.
#[derive(Debug, Clone, Copy)]
pub struct FixedDecider(pub bool);

impl PaymentDecider for FixedDecider {
    fn decide(&self) -> bool {
        self.0
    }
}

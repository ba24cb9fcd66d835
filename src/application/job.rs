//! Generic execution harness for asynchronous jobs.
//!
//! A job is attempted up to `RetryPolicy::max_attempts` times. Each attempt is
//! bounded by `RetryPolicy::timeout`; an attempt that errors or times out is
//! retried after an exponentially growing delay. Once the budget is exhausted
//! the job's failure callback runs exactly once.

use crate::error::{OrderError, Result};
use async_trait::async_trait;
use std::time::Duration;
use tokio::time::{sleep, timeout};

/// Attempt budget and per-attempt deadline of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub timeout: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, timeout: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            timeout,
        }
    }
}

/// Delay schedule between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    /// Delay before the first retry.
    pub initial: Duration,
    /// Upper bound for any single delay.
    pub max: Duration,
    pub multiplier: u32,
}

impl Default for Backoff {
    fn default() -> Self {
        Self {
            initial: Duration::from_millis(100),
            max: Duration::from_secs(5),
            multiplier: 2,
        }
    }
}

impl Backoff {
    pub fn none() -> Self {
        Self {
            initial: Duration::ZERO,
            max: Duration::ZERO,
            multiplier: 1,
        }
    }

    /// Delay to wait after the `failed_attempt`-th failed attempt (1-based).
    pub fn delay_for(&self, failed_attempt: u32) -> Duration {
        let factor = self
            .multiplier
            .saturating_pow(failed_attempt.saturating_sub(1));
        self.initial.saturating_mul(factor).min(self.max)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Queued,
    Running,
    Succeeded,
    FailedRetryable,
    FailedTerminal,
}

impl JobState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Succeeded | JobState::FailedTerminal)
    }
}

/// Final outcome of one job execution.
#[derive(Debug, Clone, PartialEq)]
pub struct JobReport {
    pub key: u64,
    pub state: JobState,
    pub attempts: u32,
    pub last_error: Option<String>,
}

#[async_trait]
pub trait Job: Send + Sync {
    /// Collaborators the job needs at run time.
    type Context: Send + Sync;

    /// Identifies the resource the job mutates; used for routing and logging.
    fn key(&self) -> u64;

    async fn handle(&self, ctx: &Self::Context) -> Result<()>;

    /// Called once after the last attempt failed. Must not fail.
    async fn failed(&self, ctx: &Self::Context, error: &OrderError);
}

/// Runs `job` to a terminal state under `policy`.
pub async fn execute<J: Job>(
    job: &J,
    ctx: &J::Context,
    policy: &RetryPolicy,
    backoff: &Backoff,
) -> JobReport {
    let key = job.key();
    let mut attempt = 0;

    loop {
        attempt += 1;
        tracing::debug!(
            job = key,
            attempt,
            max_attempts = policy.max_attempts,
            state = ?JobState::Running,
            "Running job attempt"
        );

        let outcome = match timeout(policy.timeout, job.handle(ctx)).await {
            Ok(result) => result,
            Err(_) => Err(OrderError::Timeout(policy.timeout)),
        };

        match outcome {
            Ok(()) => {
                if attempt > 1 {
                    tracing::info!(job = key, attempt, "Job succeeded after retry");
                }
                return JobReport {
                    key,
                    state: JobState::Succeeded,
                    attempts: attempt,
                    last_error: None,
                };
            }
            Err(error) if attempt < policy.max_attempts => {
                let delay = backoff.delay_for(attempt);
                tracing::warn!(
                    job = key,
                    attempt,
                    error = %error,
                    state = ?JobState::FailedRetryable,
                    delay_ms = delay.as_millis() as u64,
                    "Job attempt failed, retrying after delay"
                );
                sleep(delay).await;
            }
            Err(error) => {
                tracing::error!(
                    job = key,
                    attempts = attempt,
                    error = %error,
                    state = ?JobState::FailedTerminal,
                    "Job failed after all attempts"
                );
                job.failed(ctx, &error).await;
                return JobReport {
                    key,
                    state: JobState::FailedTerminal,
                    attempts: attempt,
                    last_error: Some(error.to_string()),
                };
            }
        }
    }
}

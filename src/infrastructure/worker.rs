use crate::application::job::{Backoff, JobReport, JobState, RetryPolicy, execute};
use crate::application::payment_job::PaymentJob;
use crate::application::payment_service::PaymentService;
use crate::domain::ports::JobQueue;
use crate::error::{OrderError, Result};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock, mpsc};
use tokio::task::JoinHandle;

struct Envelope {
    job: PaymentJob,
    policy: RetryPolicy,
}

/// In-process job queue backed by a fixed set of tokio worker tasks.
///
/// Each worker owns one channel and jobs are routed by `order_id % workers`,
/// so all jobs for the same order run sequentially on the same worker while
/// different orders proceed in parallel.
pub struct WorkerPool {
    senders: RwLock<Vec<mpsc::UnboundedSender<Envelope>>>,
    handles: Mutex<Vec<JoinHandle<Vec<JobReport>>>>,
}

impl WorkerPool {
    pub fn spawn(payments: Arc<PaymentService>, workers: usize, backoff: Backoff) -> Self {
        let workers = workers.max(1);
        let mut senders = Vec::with_capacity(workers);
        let mut handles = Vec::with_capacity(workers);

        for shard in 0..workers {
            let (tx, mut rx) = mpsc::unbounded_channel::<Envelope>();
            let payments = payments.clone();
            handles.push(tokio::spawn(async move {
                let mut reports = Vec::new();
                while let Some(Envelope { job, policy }) = rx.recv().await {
                    reports.push(execute(&job, &*payments, &policy, &backoff).await);
                }
                tracing::debug!(shard, processed = reports.len(), "Worker stopped");
                reports
            }));
            senders.push(tx);
        }

        Self {
            senders: RwLock::new(senders),
            handles: Mutex::new(handles),
        }
    }

    /// Stops accepting jobs, waits for every queued job to finish and returns
    /// their reports ordered by order id.
    pub async fn shutdown(&self) -> Result<Vec<JobReport>> {
        self.senders.write().await.clear();
        let handles = std::mem::take(&mut *self.handles.lock().await);

        let mut reports = Vec::new();
        for handle in handles {
            let worker_reports = handle
                .await
                .map_err(|e| OrderError::InternalError(Box::new(e)))?;
            reports.extend(worker_reports);
        }
        reports.sort_by_key(|report| report.key);
        Ok(reports)
    }
}

#[async_trait]
impl JobQueue for WorkerPool {
    async fn enqueue(&self, job: PaymentJob, policy: RetryPolicy) -> Result<()> {
        let senders = self.senders.read().await;
        if senders.is_empty() {
            return Err(OrderError::QueueClosed);
        }
        let shard = (job.order_id.0 % senders.len() as u64) as usize;
        senders[shard]
            .send(Envelope { job, policy })
            .map_err(|_| OrderError::QueueClosed)?;
        tracing::debug!(order_id = %job.order_id, shard, state = ?JobState::Queued, "Job queued");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::{Amount, OrderDraft, OrderId};
    use crate::domain::ports::OrderStore;
    use crate::domain::status::OrderStatus;
    use crate::domain::user::UserId;
    use crate::infrastructure::in_memory::InMemoryOrderStore;
    use crate::infrastructure::simulated::FixedDecider;
    use rust_decimal_macros::dec;

    fn pool(store: Arc<InMemoryOrderStore>, outcome: bool) -> WorkerPool {
        let payments = Arc::new(PaymentService::new(store, Arc::new(FixedDecider(outcome))));
        WorkerPool::spawn(payments, 3, Backoff::none())
    }

    #[tokio::test]
    async fn test_pool_drains_queued_jobs_on_shutdown() {
        let store = Arc::new(InMemoryOrderStore::new());
        let pool = pool(store.clone(), true);

        for _ in 0..10 {
            let order = store
                .create(OrderDraft::pending(UserId(1), Amount::new(dec!(5.00)).unwrap()))
                .await
                .unwrap();
            let job = PaymentJob::new(order.id);
            pool.enqueue(job, job.policy()).await.unwrap();
        }

        let reports = pool.shutdown().await.unwrap();
        assert_eq!(reports.len(), 10);
        assert!(reports.iter().all(|r| r.state == JobState::Succeeded));
        assert_eq!(reports.first().unwrap().key, 1);

        for order in store.get_all().await.unwrap() {
            assert_eq!(order.status, OrderStatus::Completed);
        }
    }

    #[tokio::test]
    async fn test_missing_order_exhausts_attempts() {
        let store = Arc::new(InMemoryOrderStore::new());
        let pool = pool(store, true);
        let job = PaymentJob::new(OrderId(77));
        pool.enqueue(job, job.policy()).await.unwrap();

        let reports = pool.shutdown().await.unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].state, JobState::FailedTerminal);
        assert_eq!(reports[0].attempts, 3);
        assert_eq!(reports[0].last_error.as_deref(), Some("order 77 not found"));
    }

    #[tokio::test]
    async fn test_enqueue_after_shutdown_is_rejected() {
        let pool = pool(Arc::new(InMemoryOrderStore::new()), true);
        pool.shutdown().await.unwrap();

        let job = PaymentJob::new(OrderId(1));
        assert!(matches!(
            pool.enqueue(job, job.policy()).await,
            Err(OrderError::QueueClosed)
        ));
    }
}

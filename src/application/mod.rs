//! Application layer containing the order and payment workflow.
//!
//! `OrderService` creates orders and hands their payment to the job queue.
//! `PaymentJob` runs under the generic `job` harness and delegates the status
//! changes to `PaymentService`.

pub mod job;
pub mod order_service;
pub mod payment_job;
pub mod payment_service;

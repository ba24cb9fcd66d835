use crate::domain::order::OrderId;
use crate::domain::status::OrderStatus;
use crate::domain::user::UserId;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OrderError {
    #[error("order {0} not found")]
    NotFound(OrderId),
    #[error("user {0} not found")]
    UserNotFound(UserId),
    #[error("invalid status transition from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },
    #[error("order {id} left in {status} after payment attempt")]
    Unsettled { id: OrderId, status: OrderStatus },
    #[error("validation error: {0}")]
    ValidationError(String),
    #[error("configuration error: {0}")]
    ConfigError(String),
    #[error("attempt timed out after {0:?}")]
    Timeout(Duration),
    #[error("job queue is closed")]
    QueueClosed,
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[cfg(feature = "storage-rocksdb")]
    #[error("RocksDB error: {0}")]
    RocksDbError(#[from] rocksdb::Error),
    #[error("internal error: {0}")]
    InternalError(Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T> = std::result::Result<T, OrderError>;

//! Adapters for the domain ports: storage backends, the in-process worker
//! pool and simulated payment decisions.

pub mod in_memory;
#[cfg(feature = "storage-rocksdb")]
pub mod rocksdb;
pub mod simulated;
pub mod worker;

//! Upload batch lifecycle: registration, processing, persistence.

mod error;
mod progress;
mod service;
mod store;
mod types;

pub use error::BatchError;
pub use progress::{CancellationToken, ProgressHandle, ProgressSnapshot, Stage};
pub use service::BatchProcessor;
pub use store::BatchStore;
pub use types::{hash_bytes, BatchStatus, LedgerLine, LineKey, UploadBatch};

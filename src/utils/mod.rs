//! Common utilities shared across the pipeline.

pub mod retry;

pub use retry::{with_retry_if, RetryConfig};

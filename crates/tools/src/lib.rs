//! `booking-tools` — `ExecutionBackend` implementations.

pub mod error;
pub mod http_backend;
pub mod in_process;

pub use error::ToolsError;
pub use http_backend::HttpExecutionBackend;
pub use in_process::InProcessExecutionBackend;

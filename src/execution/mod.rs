pub mod artifacts;
pub mod report_executor;
pub mod worker_pool;

pub use report_executor::ReportExecutor;
pub use worker_pool::{WorkerPool, WorkerResult};

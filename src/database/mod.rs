//! # Database Access
//!
//! Per-job connections on the native SQLx drivers. The URL scheme picks
//! PostgreSQL (production) or SQLite (local runs and tests).
//!
//! ## Key Components
//!
//! - [`connection`] - Scoped per-job connection and row streaming
//! - [`values`] - Rendering of result-set values as CSV text
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use report_runner::database::{ReportConnection, RowSink};
//! use report_runner::error::JobError;
//!
//! struct Count(u64);
//!
//! impl RowSink for Count {
//!     fn header(&mut self, _columns: &[String]) -> Result<(), JobError> { Ok(()) }
//!     fn row(&mut self, _values: Vec<String>) -> Result<(), JobError> { self.0 += 1; Ok(()) }
//! }
//!
//! # async fn example() -> Result<(), JobError> {
//! let mut conn = ReportConnection::open("postgres://localhost/reports", "demo").await?;
//! let mut sink = Count(0);
//! let rows = conn.export_query("SELECT 1", &mut sink).await;
//! conn.close().await;
//! println!("{} rows", rows?);
//! # Ok(())
//! # }
//! ```

pub mod connection;
pub mod values;

pub use connection::{ReportConnection, RowSink};

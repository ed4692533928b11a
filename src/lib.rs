//! Delimited, append-only job logs kept in object storage, and resuming a job from them.
//!
//! A [`CsvLogger`] appends one line per processed task to an Azure append blob, an S3 object or a
//! local file. When the job restarts, [`CsvLogger::parse_log`] reads the log back and
//! [`filter_by_log`] drops the tasks it already records as done.
//!
//! ```no_run
//! use cloudlog::{CsvLogger, Candidates, Literal, LocalFileTarget};
//!
//! # fn main() -> eyre::Result<()> {
//! let logger = CsvLogger::builder(LocalFileTarget::new("/tmp/run_log.csv"))
//!     .with_overwrite(false)
//!     .with_header("index|status")
//!     .build()?;
//!
//! let tasks: Candidates<&str> = [(Literal::from((1, 2)), "a"), (Literal::from((3, 4)), "b")]
//!     .into_iter()
//!     .collect();
//!
//! let pending = if logger.is_resuming() {
//!     logger.filter_pending(&tasks, true)?
//! } else {
//!     tasks
//! };
//!
//! for (key, _task) in pending {
//!     logger.log_fields([key, Literal::from("complete")])?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod aws;
pub mod config;
mod error;
pub mod filter;
pub mod literal;
pub mod logging;
pub mod table;
pub mod targets;
pub mod utils;

/// `log` target used by everything this crate emits.
pub const LOG_TARGET: &str = "cloudlog";

pub use config::StoreConfig;
pub use error::LogError;
pub use filter::{filter_by_log, Candidates};
pub use literal::Literal;
pub use logging::{AppendHandler, CsvFormatter, CsvLogger, LogRecord};
pub use table::{LogRow, ParsedLog};
pub use targets::{
    open_target, AppendTarget, AzureAppendBlobTarget, LocalFileTarget, MemoryTarget,
    S3ObjectTarget, TargetUri,
};

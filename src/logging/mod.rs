pub mod diagnostics;
mod formatters;
mod handler;
mod logger;
mod record;
mod sinks;

pub use formatters::{CsvFormatter, DiagnosticFormatter, DEFAULT_DATETIME_FORMAT, DEFAULT_DELIMITER};
pub use handler::AppendHandler;
pub use logger::{Builder, CsvLogger};
pub use record::LogRecord;
pub use sinks::{FileSink, NullSink, StderrSink};

pub trait LogFormatter: Sync + Send {
    fn format(&self, record: &log::Record) -> String;
}

pub trait LogSink: Sync + Send {
    fn write_log(&self, record: &log::Record) -> eyre::Result<()>;
    fn flush(&self);
}

use std::io::IsTerminal;
use std::path::PathBuf;

use eyre::Context;
use log::{LevelFilter, Log};

use super::{
    formatters::DiagnosticFormatter,
    sinks::{FileSink, NullSink, StderrSink},
    LogFormatter, LogSink,
};

#[derive(Debug, Clone)]
pub struct Config {
    pub enabled: bool,
    pub datetime_format: String,
    pub use_ansi: bool,
}

impl Config {
    pub fn new() -> Self {
        Self {
            enabled: true,
            datetime_format: super::formatters::DEFAULT_DATETIME_FORMAT.to_string(),
            use_ansi: std::io::stderr().is_terminal(),
        }
    }
}

/// Process-wide `log` backend for the command line tool. Library code only emits through the
/// `log` macros and never installs this itself.
pub struct DiagnosticLogger {
    filter: LevelFilter,
    sink: Box<dyn LogSink>,
    config: Config,
}

impl DiagnosticLogger {
    pub fn new(filter: LevelFilter, sink: Box<dyn LogSink>, config: Config) -> Self {
        Self {
            filter,
            sink,
            config,
        }
    }

    pub fn init(self) -> eyre::Result<()> {
        log::set_max_level(self.filter);
        log::set_boxed_logger(Box::new(self)).context("Failed registering diagnostic logger")?;

        Ok(())
    }
}

impl Log for DiagnosticLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        self.config.enabled && self.filter >= metadata.level()
    }

    fn log(&self, record: &log::Record) {
        if self.enabled(record.metadata()) {
            if let Err(err) = self.sink.write_log(record) {
                eprintln!("failed writing diagnostics: {}", err);
            }
        }
    }

    fn flush(&self) {
        self.sink.flush()
    }
}

enum SinkKind {
    Null,
    Stderr,
    File(PathBuf),
}

pub struct Builder {
    filter: LevelFilter,
    sink: SinkKind,
    config: Config,
}

impl Builder {
    pub fn new() -> Self {
        Self {
            filter: LevelFilter::Off,
            sink: SinkKind::Null,
            config: Config::new(),
        }
    }

    pub fn with_level(self, filter: LevelFilter) -> Self {
        Self { filter, ..self }
    }

    pub fn with_file_sink(self, path: impl Into<PathBuf>) -> Self {
        Self {
            sink: SinkKind::File(path.into()),
            config: Config {
                use_ansi: false,
                ..self.config
            },
            ..self
        }
    }

    pub fn with_stderr_sink(self) -> Self {
        Self {
            sink: SinkKind::Stderr,
            ..self
        }
    }

    pub fn build(self) -> eyre::Result<DiagnosticLogger> {
        let formatter: Box<dyn LogFormatter> =
            Box::new(DiagnosticFormatter::new(self.config.clone()));

        let sink: Box<dyn LogSink> = match &self.sink {
            SinkKind::Null => Box::new(NullSink::new()),
            SinkKind::Stderr => Box::new(StderrSink::new(formatter)),
            SinkKind::File(path) => Box::new(FileSink::new(path, formatter)?),
        };

        Ok(DiagnosticLogger::new(self.filter, sink, self.config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_filter_gates_records() {
        let logger = Builder::new()
            .with_level(LevelFilter::Info)
            .build()
            .unwrap();

        let info = log::Metadata::builder().level(log::Level::Info).build();
        let debug = log::Metadata::builder().level(log::Level::Debug).build();

        assert!(logger.enabled(&info));
        assert!(!logger.enabled(&debug));
    }

    #[test]
    fn installs_as_global_logger_once() {
        let logger = Builder::new().with_level(LevelFilter::Warn).build().unwrap();
        assert!(logger.init().is_ok());
        assert_eq!(log::max_level(), LevelFilter::Warn);

        let second = Builder::new().build().unwrap();
        assert!(second.init().is_err());
    }

    #[test]
    fn file_sink_disables_ansi() {
        let dir = tempfile::tempdir().unwrap();
        let builder = Builder::new().with_file_sink(dir.path().join("diag.log"));

        assert!(!builder.config.use_ansi);
        assert!(builder.build().is_ok());
    }
}

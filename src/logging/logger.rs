use eyre::Context;

use super::{
    formatters::{CsvFormatter, DEFAULT_DATETIME_FORMAT, DEFAULT_DELIMITER},
    handler::AppendHandler,
    record::LogRecord,
};
use crate::{
    filter::{filter_by_log, Candidates},
    literal::Literal,
    table::ParsedLog,
    targets::AppendTarget,
    LOG_TARGET,
};

/// A delimited log in object storage, owned by the job that writes it.
///
/// The header is written once, when the log is created or overwritten. A logger opened on an
/// existing log without `overwrite` resumes it: the contents stay and new rows are appended.
pub struct CsvLogger {
    handler: AppendHandler,
    delimiter: char,
    resuming: bool,
}

impl CsvLogger {
    pub fn builder(target: impl AppendTarget + 'static) -> Builder {
        Builder::new(target)
    }

    pub fn log(&self, record: impl Into<LogRecord>) -> eyre::Result<()> {
        self.handler.emit(&record.into())
    }

    pub fn log_fields<I, T>(&self, fields: I) -> eyre::Result<()>
    where
        I: IntoIterator<Item = T>,
        T: Into<Literal>,
    {
        self.handler.emit(&LogRecord::fields(fields))
    }

    /// True when construction found an existing log and kept it.
    pub fn is_resuming(&self) -> bool {
        self.resuming
    }

    pub fn log_exists(&self) -> eyre::Result<bool> {
        self.handler.log_exists()
    }

    pub fn uri(&self) -> String {
        self.handler.target().uri()
    }

    pub fn delimiter(&self) -> char {
        self.delimiter
    }

    /// Reads the whole log back. Fails on an empty or missing log.
    pub fn parse_log(&self) -> eyre::Result<ParsedLog> {
        let data = self.handler.target().read()?;
        ParsedLog::parse(&data, self.delimiter)
            .wrap_err_with(|| format!("Failed parsing log {}", self.uri()))
    }

    /// The candidates this log does not record as done, see [`filter_by_log`].
    pub fn filter_pending<T: Clone>(
        &self,
        candidates: &Candidates<T>,
        retry_errors: bool,
    ) -> eyre::Result<Candidates<T>> {
        filter_by_log(candidates, &self.parse_log()?, retry_errors)
    }
}

pub struct Builder {
    target: Box<dyn AppendTarget>,
    overwrite: bool,
    header: Option<String>,
    template: Option<String>,
    datetime_format: String,
    delimiter: char,
}

impl Builder {
    pub fn new(target: impl AppendTarget + 'static) -> Self {
        Self {
            target: Box::new(target),
            overwrite: true,
            header: None,
            template: None,
            datetime_format: DEFAULT_DATETIME_FORMAT.to_string(),
            delimiter: DEFAULT_DELIMITER,
        }
    }

    /// Whether an existing log is replaced. Defaults to true; pass false to resume.
    pub fn with_overwrite(self, overwrite: bool) -> Self {
        Self { overwrite, ..self }
    }

    pub fn with_header(self, header: impl Into<String>) -> Self {
        Self {
            header: Some(header.into()),
            ..self
        }
    }

    /// Line template with `{timestamp}` and `{message}` placeholders.
    pub fn with_template(self, template: impl Into<String>) -> Self {
        Self {
            template: Some(template.into()),
            ..self
        }
    }

    pub fn with_datetime_format(self, datetime_format: impl Into<String>) -> Self {
        Self {
            datetime_format: datetime_format.into(),
            ..self
        }
    }

    pub fn with_delimiter(self, delimiter: char) -> Self {
        Self { delimiter, ..self }
    }

    pub fn build(self) -> eyre::Result<CsvLogger> {
        let template = self
            .template
            .unwrap_or_else(|| CsvFormatter::default_template(self.delimiter));
        let formatter = CsvFormatter::new(template, self.datetime_format, self.delimiter)?;

        let uri = self.target.uri();
        let resuming = self.target.exists()? && !self.overwrite;
        let handler = AppendHandler::new(formatter, self.target, self.overwrite)?;

        if let Some(mut header) = self.header.filter(|header| !header.is_empty()) {
            if !resuming {
                if !header.ends_with('\n') {
                    header.push('\n');
                }
                handler
                    .write(&header)
                    .wrap_err_with(|| format!("Failed writing header to {}", uri))?;
            }
        }

        if resuming {
            log::info!(target: LOG_TARGET, "resuming log {}", uri);
        } else {
            log::info!(target: LOG_TARGET, "started log {}", uri);
        }

        Ok(CsvLogger {
            handler,
            delimiter: self.delimiter,
            resuming,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::targets::MemoryTarget;

    #[test]
    fn header_gets_a_newline() {
        let target = MemoryTarget::new("run");
        CsvLogger::builder(target.clone())
            .with_header("index|status")
            .build()
            .unwrap();

        assert_eq!(target.contents().as_deref(), Some("index|status\n"));
    }

    #[test]
    fn resume_skips_header() {
        let target = MemoryTarget::with_contents("run", "index|status\nts|1|complete\n");
        let logger = CsvLogger::builder(target.clone())
            .with_overwrite(false)
            .with_header("index|status")
            .build()
            .unwrap();

        assert!(logger.is_resuming());
        assert_eq!(
            target.contents().as_deref(),
            Some("index|status\nts|1|complete\n")
        );
    }

    #[test]
    fn missing_log_is_created_even_without_overwrite() {
        let target = MemoryTarget::new("run");
        let logger = CsvLogger::builder(target.clone())
            .with_overwrite(false)
            .with_header("index|status")
            .build()
            .unwrap();

        assert!(!logger.is_resuming());
        assert_eq!(target.contents().as_deref(), Some("index|status\n"));
    }

    #[test]
    fn custom_template_and_delimiter() {
        let target = MemoryTarget::new("run");
        let logger = CsvLogger::builder(target.clone())
            .with_delimiter(',')
            .with_template("{message},{timestamp}\n")
            .with_datetime_format("fixed")
            .build()
            .unwrap();

        logger.log_fields(["a", "b"]).unwrap();
        assert_eq!(target.contents().as_deref(), Some("a,b,fixed\n"));
    }

    #[test]
    fn invalid_datetime_format_leaves_target_alone() {
        let target = MemoryTarget::new("run");
        let result = CsvLogger::builder(target.clone())
            .with_datetime_format("%Q")
            .build();

        assert!(result.is_err());
        assert_eq!(target.contents(), None);
    }
}

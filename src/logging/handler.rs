use eyre::Context;

use super::{formatters::CsvFormatter, record::LogRecord};
use crate::targets::AppendTarget;

/// Binds a formatter to one target. Every emitted record is one append call, nothing is buffered.
pub struct AppendHandler {
    formatter: CsvFormatter,
    target: Box<dyn AppendTarget>,
}

impl AppendHandler {
    /// Prepares the target before returning, creating or resetting it per `overwrite`.
    pub fn new(
        formatter: CsvFormatter,
        target: Box<dyn AppendTarget>,
        overwrite: bool,
    ) -> eyre::Result<Self> {
        target
            .create_or_reset(overwrite)
            .wrap_err_with(|| format!("Failed preparing log target {}", target.uri()))?;

        Ok(Self { formatter, target })
    }

    pub fn emit(&self, record: &LogRecord) -> eyre::Result<()> {
        self.write(&self.formatter.format(record))
    }

    /// Appends `text` verbatim, bypassing the formatter.
    pub fn write(&self, text: &str) -> eyre::Result<()> {
        self.target.append(text)
    }

    pub fn log_exists(&self) -> eyre::Result<bool> {
        self.target.exists()
    }

    pub fn formatter(&self) -> &CsvFormatter {
        &self.formatter
    }

    pub fn target(&self) -> &dyn AppendTarget {
        self.target.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::targets::MemoryTarget;

    #[test]
    fn construction_prepares_target() {
        let target = MemoryTarget::new("run");
        assert!(!target.exists().unwrap());

        let handler =
            AppendHandler::new(CsvFormatter::default(), Box::new(target.clone()), false).unwrap();

        assert!(handler.log_exists().unwrap());
        assert_eq!(target.contents().as_deref(), Some(""));
    }

    #[test]
    fn each_emit_appends_one_line() {
        let target = MemoryTarget::with_contents("run", "old\n");
        let formatter = CsvFormatter::new("{message}\n", "%Y", '|').unwrap();
        let handler = AppendHandler::new(formatter, Box::new(target.clone()), false).unwrap();

        handler.emit(&LogRecord::fields([1, 2])).unwrap();
        handler.write("raw").unwrap();

        assert_eq!(target.contents().as_deref(), Some("old\n1|2\nraw"));
    }

    #[test]
    fn overwrite_resets_existing_object() {
        let target = MemoryTarget::with_contents("run", "old\n");
        AppendHandler::new(CsvFormatter::default(), Box::new(target.clone()), true).unwrap();

        assert_eq!(target.contents().as_deref(), Some(""));
    }
}

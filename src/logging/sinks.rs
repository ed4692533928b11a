use std::{
    fs::File,
    io::{LineWriter, Write},
    path::Path,
    sync::Mutex,
};

use eyre::Context;

use super::{LogFormatter, LogSink};
use crate::LOG_TARGET;

/// Only records emitted by this crate reach the sinks, SDK chatter is dropped.
fn is_own_record(record: &log::Record) -> bool {
    record.target().starts_with(LOG_TARGET)
}

pub struct FileSink {
    file: Mutex<LineWriter<File>>,
    formatter: Box<dyn LogFormatter>,
}

impl FileSink {
    pub fn new(path: impl AsRef<Path>, formatter: Box<dyn LogFormatter>) -> eyre::Result<Self> {
        let path = path.as_ref();
        if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed creating log directory {}", dir.display()))?;
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed opening or creating log file {}", path.display()))?;

        Ok(Self {
            file: Mutex::new(LineWriter::new(file)),
            formatter,
        })
    }
}

impl LogSink for FileSink {
    fn write_log(&self, record: &log::Record) -> eyre::Result<()> {
        if !is_own_record(record) {
            return Ok(());
        }

        let mut file = self.file.lock().map_err(|e| eyre::eyre!(e.to_string()))?;
        writeln!(file, "{}", self.formatter.format(record))?;
        file.flush().context("Can't flush file")
    }

    fn flush(&self) {
        if let Ok(mut file) = self.file.lock() {
            let _ = file.flush();
        }
    }
}

pub struct StderrSink {
    handle: std::io::Stderr,
    formatter: Box<dyn LogFormatter>,
}

impl StderrSink {
    pub fn new(formatter: Box<dyn LogFormatter>) -> Self {
        Self {
            handle: std::io::stderr(),
            formatter,
        }
    }
}

impl LogSink for StderrSink {
    fn write_log(&self, record: &log::Record) -> eyre::Result<()> {
        if !is_own_record(record) {
            return Ok(());
        }

        let mut writer = self.handle.lock();
        writeln!(writer, "{}", self.formatter.format(record))?;
        writer.flush().context("Can't flush stderr")
    }

    fn flush(&self) {
        let _ = self.handle.lock().flush();
    }
}

pub struct NullSink {}

impl NullSink {
    pub fn new() -> Self {
        Self {}
    }
}

impl LogSink for NullSink {
    fn write_log(&self, _record: &log::Record) -> eyre::Result<()> {
        Ok(())
    }

    fn flush(&self) {}
}

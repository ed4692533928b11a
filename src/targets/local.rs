use std::{
    fs::{File, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};

use eyre::Context;

use super::AppendTarget;
use crate::{error::LogError, LOG_TARGET};

/// A log kept in a file on the local filesystem.
#[derive(Debug, Clone)]
pub struct LocalFileTarget {
    path: PathBuf,
}

impl LocalFileTarget {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AppendTarget for LocalFileTarget {
    fn uri(&self) -> String {
        format!("file://{}", self.path.display())
    }

    fn exists(&self) -> eyre::Result<bool> {
        self.path
            .try_exists()
            .with_context(|| format!("Failed checking whether {} exists", self.path.display()))
    }

    fn create_or_reset(&self, overwrite: bool) -> eyre::Result<()> {
        if self.exists()? && !overwrite {
            log::debug!(
                target: LOG_TARGET,
                "appending to existing log file {}",
                self.path.display()
            );
            return Ok(());
        }

        if let Some(dir) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed creating log directory {}", dir.display()))?;
        }

        File::create(&self.path)
            .with_context(|| format!("Failed creating log file {}", self.path.display()))?;
        log::debug!(target: LOG_TARGET, "created empty log file {}", self.path.display());
        Ok(())
    }

    fn append(&self, text: &str) -> eyre::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| {
                format!("Failed opening or creating log file {}", self.path.display())
            })?;

        file.write_all(text.as_bytes())
            .with_context(|| format!("Failed appending to {}", self.path.display()))?;
        file.flush().context("Can't flush file")
    }

    fn read(&self) -> eyre::Result<Vec<u8>> {
        if !self.exists()? {
            return Err(LogError::TargetMissing(self.uri()).into());
        }

        std::fs::read(&self.path)
            .with_context(|| format!("Failed reading log file {}", self.path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_keeps_existing_contents_unless_overwriting() {
        let dir = tempfile::tempdir().unwrap();
        let target = LocalFileTarget::new(dir.path().join("logs").join("run.csv"));

        assert!(!target.exists().unwrap());
        target.create_or_reset(false).unwrap();
        assert!(target.exists().unwrap());
        assert!(target.read().unwrap().is_empty());

        target.append("a\n").unwrap();
        target.append("b\n").unwrap();
        target.create_or_reset(false).unwrap();
        assert_eq!(target.read().unwrap(), b"a\nb\n");

        target.create_or_reset(true).unwrap();
        assert!(target.read().unwrap().is_empty());
    }

    #[test]
    fn reading_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let target = LocalFileTarget::new(dir.path().join("absent.csv"));
        let err = target.read().unwrap_err();

        assert_eq!(
            err.downcast_ref::<LogError>(),
            Some(&LogError::TargetMissing(target.uri()))
        );
    }
}

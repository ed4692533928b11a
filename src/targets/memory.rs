use std::sync::{Arc, Mutex, MutexGuard};

use super::AppendTarget;
use crate::error::LogError;

/// A log held in process memory. Clones share the same object, which makes it handy for
/// inspecting what a logger wrote.
#[derive(Debug, Clone, Default)]
pub struct MemoryTarget {
    name: String,
    object: Arc<Mutex<Option<Vec<u8>>>>,
}

impl MemoryTarget {
    /// A target whose object does not exist yet.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            object: Arc::default(),
        }
    }

    /// A target whose object already holds `contents`.
    pub fn with_contents(name: impl Into<String>, contents: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            object: Arc::new(Mutex::new(Some(contents.into().into_bytes()))),
        }
    }

    /// Current contents, `None` while the object does not exist.
    pub fn contents(&self) -> Option<String> {
        self.lock()
            .ok()
            .and_then(|object| object.as_ref().map(|b| String::from_utf8_lossy(b).into_owned()))
    }

    fn lock(&self) -> eyre::Result<MutexGuard<'_, Option<Vec<u8>>>> {
        self.object.lock().map_err(|e| eyre::eyre!(e.to_string()))
    }
}

impl AppendTarget for MemoryTarget {
    fn uri(&self) -> String {
        format!("memory://{}", self.name)
    }

    fn exists(&self) -> eyre::Result<bool> {
        Ok(self.lock()?.is_some())
    }

    fn create_or_reset(&self, overwrite: bool) -> eyre::Result<()> {
        let mut object = self.lock()?;
        if object.is_none() || overwrite {
            *object = Some(Vec::new());
        }
        Ok(())
    }

    // Like an append blob, appending to an object that was never created fails.
    fn append(&self, text: &str) -> eyre::Result<()> {
        match self.lock()?.as_mut() {
            Some(object) => {
                object.extend_from_slice(text.as_bytes());
                Ok(())
            }
            None => Err(LogError::TargetMissing(self.uri()).into()),
        }
    }

    fn read(&self) -> eyre::Result<Vec<u8>> {
        self.lock()?
            .clone()
            .ok_or_else(|| LogError::TargetMissing(self.uri()).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_requires_creation() {
        let target = MemoryTarget::new("run");

        assert!(target.append("x").is_err());
        target.create_or_reset(false).unwrap();
        target.append("x").unwrap();
        assert_eq!(target.contents().as_deref(), Some("x"));
    }

    #[test]
    fn clones_share_the_object() {
        let target = MemoryTarget::with_contents("run", "head\n");
        let view = target.clone();

        target.create_or_reset(false).unwrap();
        target.append("row\n").unwrap();
        assert_eq!(view.contents().as_deref(), Some("head\nrow\n"));

        target.create_or_reset(true).unwrap();
        assert_eq!(view.contents().as_deref(), Some(""));
    }
}

//! Append-only text objects a [`crate::CsvLogger`] writes to.
//!
//! Every backend offers the same small capability set: a live existence check, a creation step
//! that either leaves an existing object alone or resets it, and a single-call append. `read`
//! returns the whole object and backs `parse_log`.

mod azure;
mod local;
mod memory;
mod s3;

use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;

use crate::{config::StoreConfig, error::LogError, LOG_TARGET};

pub use azure::AzureAppendBlobTarget;
pub use local::LocalFileTarget;
pub use memory::MemoryTarget;
pub use s3::S3ObjectTarget;

pub trait AppendTarget: Send + Sync {
    /// Address of the object, for messages.
    fn uri(&self) -> String;

    /// Whether the object is present right now. Never cached.
    fn exists(&self) -> eyre::Result<bool>;

    /// Creates the object when absent. An existing object is recreated empty when `overwrite` is
    /// set and left untouched otherwise.
    fn create_or_reset(&self, overwrite: bool) -> eyre::Result<()>;

    /// Appends `text` to the end of the object with one write.
    fn append(&self, text: &str) -> eyre::Result<()>;

    /// The full contents of the object. Fails when it does not exist.
    fn read(&self) -> eyre::Result<Vec<u8>>;
}

impl<T: AppendTarget + ?Sized> AppendTarget for Box<T> {
    fn uri(&self) -> String {
        (**self).uri()
    }

    fn exists(&self) -> eyre::Result<bool> {
        (**self).exists()
    }

    fn create_or_reset(&self, overwrite: bool) -> eyre::Result<()> {
        (**self).create_or_reset(overwrite)
    }

    fn append(&self, text: &str) -> eyre::Result<()> {
        (**self).append(text)
    }

    fn read(&self) -> eyre::Result<Vec<u8>> {
        (**self).read()
    }
}

/// A parsed `azure://container/blob`, `s3://bucket/key` or `file:///path` address.
#[derive(Debug, Clone, PartialEq)]
pub enum TargetUri {
    Azure { container: String, blob: String },
    S3 { bucket: String, key: String },
    File(PathBuf),
}

fn split_resource(uri: &str, rest: &str) -> Result<(String, String), LogError> {
    match rest.split_once('/') {
        Some((resource, path)) if !resource.is_empty() && !path.is_empty() => {
            Ok((resource.to_string(), path.to_string()))
        }
        _ => Err(LogError::InvalidUri(uri.to_string())),
    }
}

impl FromStr for TargetUri {
    type Err = LogError;

    fn from_str(uri: &str) -> Result<Self, Self::Err> {
        if let Some(rest) = uri.strip_prefix("azure://") {
            let (container, blob) = split_resource(uri, rest)?;
            Ok(TargetUri::Azure { container, blob })
        } else if let Some(rest) = uri.strip_prefix("s3://") {
            let (bucket, key) = split_resource(uri, rest)?;
            Ok(TargetUri::S3 { bucket, key })
        } else if let Some(path) = uri.strip_prefix("file://") {
            if path.is_empty() {
                return Err(LogError::InvalidUri(uri.to_string()));
            }
            Ok(TargetUri::File(PathBuf::from(path)))
        } else {
            Err(LogError::InvalidUri(uri.to_string()))
        }
    }
}

impl Display for TargetUri {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TargetUri::Azure { container, blob } => write!(f, "azure://{}/{}", container, blob),
            TargetUri::S3 { bucket, key } => write!(f, "s3://{}/{}", bucket, key),
            TargetUri::File(path) => write!(f, "file://{}", path.display()),
        }
    }
}

/// Resolves `uri` to a backend, building cloud clients from `config`.
pub fn open_target(uri: &str, config: &StoreConfig) -> eyre::Result<Box<dyn AppendTarget>> {
    let target: Box<dyn AppendTarget> = match uri.parse::<TargetUri>()? {
        TargetUri::Azure { container, blob } => Box::new(AzureAppendBlobTarget::new(
            &container,
            &blob,
            &config.azure,
        )?),
        TargetUri::S3 { bucket, key } => Box::new(S3ObjectTarget::new(bucket, key, &config.s3)?),
        TargetUri::File(path) => Box::new(LocalFileTarget::new(path)),
    };

    log::debug!(target: LOG_TARGET, "resolved log target {}", target.uri());
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_backend_uris() {
        assert_eq!(
            "azure://logs/jobs/run.csv".parse::<TargetUri>().unwrap(),
            TargetUri::Azure {
                container: "logs".to_string(),
                blob: "jobs/run.csv".to_string()
            }
        );
        assert_eq!(
            "s3://bucket/a/b.csv".parse::<TargetUri>().unwrap(),
            TargetUri::S3 {
                bucket: "bucket".to_string(),
                key: "a/b.csv".to_string()
            }
        );
        assert_eq!(
            "file:///tmp/run.csv".parse::<TargetUri>().unwrap(),
            TargetUri::File(PathBuf::from("/tmp/run.csv"))
        );
    }

    #[test]
    fn display_round_trips() {
        for uri in ["azure://c/b.csv", "s3://bucket/key", "file:///var/log/x"] {
            assert_eq!(uri.parse::<TargetUri>().unwrap().to_string(), uri);
        }
    }

    #[test]
    fn rejects_incomplete_uris() {
        for uri in ["s3://bucket", "azure:///blob", "file://", "gs://bucket/key", "run.csv"] {
            assert_eq!(
                uri.parse::<TargetUri>().unwrap_err(),
                LogError::InvalidUri(uri.to_string())
            );
        }
    }

    #[test]
    fn opens_local_files_without_cloud_config() {
        let dir = tempfile::tempdir().unwrap();
        let uri = format!("file://{}", dir.path().join("run.csv").display());
        let target = open_target(&uri, &StoreConfig::default()).unwrap();

        assert_eq!(target.uri(), uri);
        assert!(!target.exists().unwrap());
    }
}

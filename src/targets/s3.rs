use aws_sdk_s3::{primitives::ByteStream, Client};
use eyre::Context;
use tokio::runtime::Runtime;

use super::AppendTarget;
use crate::{aws::S3ClientBuilder, config::S3Config, error::LogError, LOG_TARGET};

/// A log kept as a single S3 object.
///
/// S3 has no append operation, so every append downloads the current body and uploads it again
/// with the new text at the end. Each call is still exactly one write from the logger's side.
pub struct S3ObjectTarget {
    client: Client,
    bucket: String,
    key: String,
    runtime: Runtime,
}

impl S3ObjectTarget {
    pub fn new(
        bucket: impl Into<String>,
        key: impl Into<String>,
        config: &S3Config,
    ) -> eyre::Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        let client = runtime.block_on(S3ClientBuilder::from_config(config).build());

        Ok(Self::with_client(client, bucket, key, runtime))
    }

    /// Uses an already configured client; `runtime` drives its requests.
    pub fn with_client(
        client: Client,
        bucket: impl Into<String>,
        key: impl Into<String>,
        runtime: Runtime,
    ) -> Self {
        Self {
            client,
            bucket: bucket.into(),
            key: key.into(),
            runtime,
        }
    }

    async fn head(&self) -> eyre::Result<bool> {
        let response = self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(&self.key)
            .send()
            .await;

        match response {
            Ok(_) => Ok(true),
            Err(err) if err.as_service_error().is_some_and(|e| e.is_not_found()) => Ok(false),
            Err(err) => {
                Err(err).wrap_err_with(|| format!("Failed checking whether {} exists", self.uri()))
            }
        }
    }

    async fn fetch(&self) -> eyre::Result<Option<Vec<u8>>> {
        let response = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(&self.key)
            .send()
            .await;

        let output = match response {
            Ok(output) => output,
            Err(err) if err.as_service_error().is_some_and(|e| e.is_no_such_key()) => {
                return Ok(None)
            }
            Err(err) => {
                return Err(err).wrap_err_with(|| format!("Failed downloading {}", self.uri()))
            }
        };

        let body = output
            .body
            .collect()
            .await
            .wrap_err_with(|| format!("Failed reading body of {}", self.uri()))?;
        Ok(Some(body.into_bytes().to_vec()))
    }

    async fn put(&self, contents: Vec<u8>) -> eyre::Result<()> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&self.key)
            .content_type("text/plain; charset=utf-8")
            .body(ByteStream::from(contents))
            .send()
            .await
            .wrap_err_with(|| format!("Failed uploading {}", self.uri()))?;
        Ok(())
    }
}

impl AppendTarget for S3ObjectTarget {
    fn uri(&self) -> String {
        format!("s3://{}/{}", self.bucket, self.key)
    }

    fn exists(&self) -> eyre::Result<bool> {
        self.runtime.block_on(self.head())
    }

    fn create_or_reset(&self, overwrite: bool) -> eyre::Result<()> {
        self.runtime.block_on(async {
            if self.head().await? && !overwrite {
                log::debug!(target: LOG_TARGET, "appending to existing object {}", self.uri());
                return Ok(());
            }

            self.put(Vec::new()).await?;
            log::debug!(target: LOG_TARGET, "created empty object {}", self.uri());
            Ok(())
        })
    }

    fn append(&self, text: &str) -> eyre::Result<()> {
        self.runtime.block_on(async {
            let mut contents = self.fetch().await?.unwrap_or_default();
            contents.extend_from_slice(text.as_bytes());
            self.put(contents).await
        })
    }

    fn read(&self) -> eyre::Result<Vec<u8>> {
        self.runtime
            .block_on(self.fetch())?
            .ok_or_else(|| LogError::TargetMissing(self.uri()).into())
    }
}

use azure_storage::StorageCredentials;
use azure_storage_blobs::prelude::{BlobClient, ClientBuilder};
use bytes::Bytes;
use eyre::Context;
use tokio::runtime::Runtime;

use super::AppendTarget;
use crate::{config::AzureConfig, error::LogError, LOG_TARGET};

/// A log kept as an Azure append blob.
pub struct AzureAppendBlobTarget {
    client: BlobClient,
    container: String,
    blob: String,
    runtime: Runtime,
}

impl AzureAppendBlobTarget {
    pub fn new(container: &str, blob: &str, config: &AzureConfig) -> eyre::Result<Self> {
        let builder = if config.use_emulator {
            ClientBuilder::emulator()
        } else {
            let account = config
                .account
                .clone()
                .ok_or(LogError::MissingCredentials("azure (set AZURE_STORAGE_ACCOUNT)"))?;

            let credentials = if let Some(key) = &config.access_key {
                StorageCredentials::access_key(account.clone(), key.clone())
            } else if let Some(token) = &config.sas_token {
                StorageCredentials::sas_token(token.as_str())
                    .wrap_err("Failed parsing Azure SAS token")?
            } else {
                log::warn!(
                    target: LOG_TARGET,
                    "no Azure key or SAS token configured, using anonymous access"
                );
                StorageCredentials::anonymous()
            };

            ClientBuilder::new(account, credentials)
        };

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        Ok(Self {
            client: builder.blob_client(container, blob),
            container: container.to_string(),
            blob: blob.to_string(),
            runtime,
        })
    }

    async fn blob_exists(&self) -> eyre::Result<bool> {
        self.client
            .exists()
            .await
            .wrap_err_with(|| format!("Failed checking whether {} exists", self.uri()))
    }
}

impl AppendTarget for AzureAppendBlobTarget {
    fn uri(&self) -> String {
        format!("azure://{}/{}", self.container, self.blob)
    }

    fn exists(&self) -> eyre::Result<bool> {
        self.runtime.block_on(self.blob_exists())
    }

    fn create_or_reset(&self, overwrite: bool) -> eyre::Result<()> {
        self.runtime.block_on(async {
            if self.blob_exists().await? && !overwrite {
                log::debug!(target: LOG_TARGET, "appending to existing blob {}", self.uri());
                return Ok(());
            }

            // Putting an append blob replaces whatever was stored under the name.
            self.client
                .put_append_blob()
                .await
                .wrap_err_with(|| format!("Failed creating append blob {}", self.uri()))?;
            log::debug!(target: LOG_TARGET, "created empty append blob {}", self.uri());
            Ok(())
        })
    }

    fn append(&self, text: &str) -> eyre::Result<()> {
        self.runtime.block_on(async {
            self.client
                .append_block(Bytes::from(text.to_owned()))
                .await
                .wrap_err_with(|| format!("Failed appending block to {}", self.uri()))?;
            Ok(())
        })
    }

    fn read(&self) -> eyre::Result<Vec<u8>> {
        self.runtime.block_on(async {
            if !self.blob_exists().await? {
                return Err(LogError::TargetMissing(self.uri()).into());
            }

            self.client
                .get_content()
                .await
                .wrap_err_with(|| format!("Failed downloading {}", self.uri()))
        })
    }
}

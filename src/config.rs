use std::env;

/// Settings for the S3 backend. Anything left unset falls back to the AWS SDK's own resolution
/// (environment, shared config files, instance metadata).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct S3Config {
    pub profile: Option<String>,
    pub region: Option<String>,
    /// Endpoint of an S3-compatible store such as MinIO.
    pub endpoint_url: Option<String>,
    pub force_path_style: bool,
}

/// Settings for the Azure append-blob backend.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AzureConfig {
    pub account: Option<String>,
    pub access_key: Option<String>,
    pub sas_token: Option<String>,
    /// Talk to a local Azurite emulator with its well-known development account.
    pub use_emulator: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreConfig {
    pub s3: S3Config,
    pub azure: AzureConfig,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn is_truthy(value: Option<String>) -> bool {
    matches!(
        value.as_deref().map(str::trim),
        Some("1" | "true" | "TRUE" | "True" | "yes")
    )
}

impl StoreConfig {
    /// Reads the conventional AWS and Azure environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Like [`StoreConfig::from_env`] with a custom variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            s3: S3Config {
                profile: non_empty(lookup("AWS_PROFILE")),
                region: non_empty(lookup("AWS_REGION")),
                endpoint_url: non_empty(lookup("AWS_ENDPOINT_URL")),
                force_path_style: is_truthy(lookup("AWS_S3_FORCE_PATH_STYLE")),
            },
            azure: AzureConfig {
                account: non_empty(lookup("AZURE_STORAGE_ACCOUNT")),
                access_key: non_empty(lookup("AZURE_STORAGE_KEY")),
                sas_token: non_empty(lookup("AZURE_STORAGE_SAS_TOKEN")),
                use_emulator: is_truthy(lookup("AZURE_STORAGE_USE_EMULATOR")),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn reads_variables_from_lookup() {
        let vars: HashMap<&str, &str> = [
            ("AWS_PROFILE", "batch"),
            ("AWS_REGION", " "),
            ("AWS_ENDPOINT_URL", "http://localhost:9000"),
            ("AWS_S3_FORCE_PATH_STYLE", "true"),
            ("AZURE_STORAGE_ACCOUNT", "acct"),
            ("AZURE_STORAGE_USE_EMULATOR", "0"),
        ]
        .into_iter()
        .collect();

        let config = StoreConfig::from_lookup(|name| vars.get(name).map(|v| v.to_string()));

        assert_eq!(config.s3.profile.as_deref(), Some("batch"));
        assert_eq!(config.s3.region, None);
        assert_eq!(
            config.s3.endpoint_url.as_deref(),
            Some("http://localhost:9000")
        );
        assert!(config.s3.force_path_style);
        assert_eq!(config.azure.account.as_deref(), Some("acct"));
        assert_eq!(config.azure.access_key, None);
        assert!(!config.azure.use_emulator);
    }
}

use aws_config::{retry::RetryConfig, Region};
use aws_sdk_s3 as s3;

use crate::{config::S3Config, LOG_TARGET};

pub struct S3ClientBuilder {
    profile_name: Option<String>,
    region: Option<String>,
    endpoint_url: Option<String>,
    force_path_style: bool,
    retry_config: RetryConfig,
}

impl S3ClientBuilder {
    pub fn new() -> Self {
        S3ClientBuilder {
            profile_name: None,
            region: None,
            endpoint_url: None,
            force_path_style: false,
            retry_config: RetryConfig::standard(),
        }
    }

    pub fn from_config(config: &S3Config) -> Self {
        Self::new()
            .use_profile_name(config.profile.clone())
            .use_region(config.region.clone())
            .use_endpoint_url(config.endpoint_url.clone())
            .use_path_style(config.force_path_style)
    }

    pub fn use_profile_name(mut self, profile_name: Option<String>) -> Self {
        self.profile_name = profile_name;
        self
    }

    pub fn use_region(mut self, region: Option<String>) -> Self {
        self.region = region;
        self
    }

    pub fn use_endpoint_url(mut self, endpoint_url: Option<String>) -> Self {
        self.endpoint_url = endpoint_url;
        self
    }

    pub fn use_path_style(mut self, force_path_style: bool) -> Self {
        self.force_path_style = force_path_style;
        self
    }

    pub async fn build(&self) -> s3::Client {
        let mut builder = aws_config::from_env().retry_config(self.retry_config.clone());
        if let Some(profile_name) = &self.profile_name {
            builder = builder.profile_name(profile_name);
        }

        if let Some(region) = &self.region {
            builder = builder.region(Region::new(region.clone()));
        }

        if let Some(endpoint_url) = &self.endpoint_url {
            log::info!(target: LOG_TARGET, "using custom S3 endpoint {}", endpoint_url);
            builder = builder.endpoint_url(endpoint_url);
        }

        let config = builder.load().await;

        let s3_config = s3::config::Builder::from(&config)
            .force_path_style(self.force_path_style)
            .build();

        s3::Client::from_conf(s3_config)
    }
}

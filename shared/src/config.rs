use std::env;
use std::time::Duration;

use crate::error::ApiError;

const DEFAULT_UPLOAD_URL_TTL_SECS: u64 = 60;
// S3 presigned URLs are valid for at most seven days
const MAX_UPLOAD_URL_TTL_SECS: u64 = 7 * 24 * 60 * 60;

/// Runtime configuration, read from the Lambda environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub bucket_name: String,
    pub table_name: String,
    pub region: Option<String>,
    pub upload_url_ttl: Duration,
}

impl Config {
    pub fn new(bucket_name: impl Into<String>, table_name: impl Into<String>) -> Self {
        Self {
            bucket_name: bucket_name.into(),
            table_name: table_name.into(),
            region: None,
            upload_url_ttl: Duration::from_secs(DEFAULT_UPLOAD_URL_TTL_SECS),
        }
    }

    pub fn from_env() -> Result<Self, ApiError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup. Each setting accepts the upper-case name
    /// and the lower-case name the original stack deployed with.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ApiError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |upper: &str, lower: &str| {
            lookup(upper)
                .or_else(|| lookup(lower))
                .filter(|v| !v.trim().is_empty())
        };

        let bucket_name = read("BUCKET_NAME", "bucket_name")
            .ok_or_else(|| ApiError::Config("BUCKET_NAME must be set".to_string()))?;
        let table_name = read("TABLE_NAME", "table_name")
            .ok_or_else(|| ApiError::Config("TABLE_NAME must be set".to_string()))?;
        let region = read("REGION", "region");

        let upload_url_ttl = match read("UPLOAD_URL_TTL_SECS", "upload_url_ttl_secs") {
            Some(raw) => {
                let secs = raw.trim().parse::<u64>().map_err(|_| {
                    ApiError::Config(format!("UPLOAD_URL_TTL_SECS is not a number: {}", raw))
                })?;
                if !(1..=MAX_UPLOAD_URL_TTL_SECS).contains(&secs) {
                    return Err(ApiError::Config(format!(
                        "UPLOAD_URL_TTL_SECS must be between 1 and {}, got {}",
                        MAX_UPLOAD_URL_TTL_SECS, secs
                    )));
                }
                Duration::from_secs(secs)
            }
            None => Duration::from_secs(DEFAULT_UPLOAD_URL_TTL_SECS),
        };

        Ok(Self {
            bucket_name,
            table_name,
            region,
            upload_url_ttl,
        })
    }

    /// Load the AWS SDK configuration, pinning the region when one is set.
    pub async fn load_aws_config(&self) -> aws_config::SdkConfig {
        let mut loader = aws_config::from_env();
        if let Some(region) = &self.region {
            loader = loader.region(aws_config::Region::new(region.clone()));
        }
        loader.load().await
    }
}

//! Remote bucket writes over the cluster REST document endpoint.

use async_trait::async_trait;
use reqwest::Url;
use std::time::Duration;

use super::{DocumentFormat, DocumentStore, StoreError, UpsertOptions};

/// Default cluster management port
pub const DEFAULT_REST_PORT: u16 = 8091;

/// Where and how to reach a bucket
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub host: String,
    pub port: u16,
    pub bucket: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub timeout: Duration,
}

impl StoreConfig {
    pub fn new(host: impl Into<String>, bucket: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_REST_PORT,
            bucket: bucket.into(),
            username: None,
            password: None,
            timeout: Duration::from_secs(10),
        }
    }

    /// `http://host:port/pools/default/buckets/<bucket>/docs/`
    pub fn docs_url(&self) -> Result<Url, StoreError> {
        let mut url = Url::parse(&format!("http://{}:{}/", self.host, self.port))
            .map_err(|e| StoreError::Config(format!("bad host '{}': {}", self.host, e)))?;
        url.path_segments_mut()
            .map_err(|_| StoreError::Config(format!("host '{}' cannot carry a path", self.host)))?
            .extend(["pools", "default", "buckets", self.bucket.as_str(), "docs", ""]);
        Ok(url)
    }
}

/// Client for one remote bucket
pub struct RestStore {
    config: StoreConfig,
    docs_url: Url,
    http: reqwest::Client,
}

impl RestStore {
    pub fn new(config: StoreConfig) -> Result<Self, StoreError> {
        let docs_url = config.docs_url()?;
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, docs_url, http })
    }

    fn doc_url(&self, key: &str) -> Url {
        let mut url = self.docs_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(key);
        }
        url
    }
}

/// Body as the server expects it for the given format
fn encode_value(value: &serde_json::Value, format: DocumentFormat) -> Result<String, StoreError> {
    match (format, value) {
        (DocumentFormat::Utf8, serde_json::Value::String(s)) => Ok(s.clone()),
        _ => Ok(serde_json::to_string(value)?),
    }
}

#[async_trait]
impl DocumentStore for RestStore {
    async fn upsert(
        &self,
        key: &str,
        value: &serde_json::Value,
        options: UpsertOptions,
    ) -> Result<(), StoreError> {
        let body = encode_value(value, options.format)?;
        let mut form = vec![
            ("value", body),
            ("flags", options.format.flags().to_string()),
        ];
        if let Some(ttl) = options.ttl {
            form.push(("expiry", ttl.to_string()));
        }

        let mut req = self.http.post(self.doc_url(key)).form(&form);
        if let Some(user) = &self.config.username {
            req = req.basic_auth(user, self.config.password.as_deref());
        }

        let resp = req.send().await?;
        if resp.status().is_success() {
            tracing::debug!(key, bucket = %self.config.bucket, "upserted");
            return Ok(());
        }

        let status = resp.status().as_u16();
        let message = resp.text().await.unwrap_or_default();
        Err(StoreError::Rejected { status, message })
    }
}

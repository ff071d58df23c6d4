//! Client for the eventing debug bridge

use reqwest::Url;

use super::DebugCommand;

pub const DEFAULT_ENDPOINT: &str = "http://localhost:6061/v8debug/";
pub const DEFAULT_APP_NAME: &str = "credit_score";

#[derive(Debug, thiserror::Error)]
pub enum DebugError {
    #[error("invalid debug endpoint '{url}': {reason}")]
    InvalidEndpoint { url: String, reason: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("failed to encode request: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Debug bridge URL plus the application being debugged
#[derive(Debug, Clone)]
pub struct DebugEndpoint {
    pub url: Url,
    pub app_name: String,
}

impl DebugEndpoint {
    pub fn new(url: &str, app_name: impl Into<String>) -> Result<Self, DebugError> {
        let url = Url::parse(url).map_err(|e| DebugError::InvalidEndpoint {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            url,
            app_name: app_name.into(),
        })
    }
}

/// Raw reply from the bridge; never interpreted
#[derive(Debug, Clone)]
pub struct DebugResponse {
    pub status: u16,
    pub body: String,
}

/// Fires debugger commands at one endpoint
pub struct DebugClient {
    endpoint: DebugEndpoint,
    http: reqwest::Client,
}

impl DebugClient {
    pub fn new(endpoint: DebugEndpoint) -> Self {
        Self {
            endpoint,
            http: reqwest::Client::new(),
        }
    }

    /// POST `command` with sequence number `seq` and return the raw reply
    pub async fn send(&self, command: &DebugCommand, seq: u64) -> Result<DebugResponse, DebugError> {
        let body = serde_json::to_string(&command.to_request(seq)?)?;
        if command.echoes_request() {
            tracing::info!(command = command.name(), seq, %body, "firing debug request");
        } else {
            tracing::debug!(command = command.name(), seq, %body, "firing debug request");
        }

        let resp = self
            .http
            .post(self.endpoint.url.clone())
            .query(&[
                ("command", command.name()),
                ("appname", self.endpoint.app_name.as_str()),
            ])
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            tracing::warn!(command = command.name(), %status, "debug bridge returned an error status");
        }

        Ok(DebugResponse {
            status: status.as_u16(),
            body: resp.text().await?,
        })
    }

    /// Send and print the reply verbatim, `<label>: <body>`
    pub async fn fire(&self, command: &DebugCommand, seq: u64) -> Result<DebugResponse, DebugError> {
        let response = self.send(command, seq).await?;
        println!("{}: {}", command.label(), response.body);
        Ok(response)
    }
}

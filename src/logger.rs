//! Remote log shipping
//!
//! `LogClient` sends one structured entry per call to the evaluation
//! service's log endpoint. A send is a single POST bounded by the client
//! timeout: no retry, no batching, no buffering. Every failure (transport,
//! timeout, non-2xx status) comes back as a `LogResponse` with
//! `success: false` so callers can ignore logging problems entirely.

use std::fmt;
use std::time::Duration;

use chrono::{SecondsFormat, Utc};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};

use crate::error::LogError;

/// Default log endpoint of the evaluation service
pub const DEFAULT_LOG_ENDPOINT: &str = "http://20.244.56.144/evaluation-service/logs";

/// Default timeout for a single send
pub const DEFAULT_LOG_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Stack {
    Backend,
    Frontend,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
}

/// Package (module category) an entry originates from
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Package {
    Api,
    Component,
    Hook,
    Page,
    State,
    Style,
    Db,
    Handler,
}

impl fmt::Display for Package {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Package::Api => "api",
            Package::Component => "component",
            Package::Hook => "hook",
            Package::Page => "page",
            Package::State => "state",
            Package::Style => "style",
            Package::Db => "db",
            Package::Handler => "handler",
        };
        f.write_str(name)
    }
}

/// Body of the POST sent to the log endpoint
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub stack: Stack,
    pub level: Level,
    pub package: Package,
    pub message: String,
}

/// Outcome of a send
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct LogResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

/// Whatever the log endpoint answers with; every field is optional
#[derive(Deserialize, Default)]
struct RemoteAck {
    message: Option<String>,
    timestamp: Option<String>,
}

/// Connection settings for the remote log endpoint
#[derive(Clone)]
pub struct LogSettings {
    /// `None` disables remote shipping; entries are still traced locally
    pub endpoint: Option<String>,
    pub auth_token: String,
    pub client_id: String,
    pub client_secret: String,
    pub timeout: Duration,
    /// Stack label used by the level shortcuts (`info`, `warn`, ...)
    pub stack: Stack,
}

impl fmt::Debug for LogSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogSettings")
            .field("endpoint", &self.endpoint)
            .field("auth_token", &REDACTED)
            .field("client_id", &self.client_id)
            .field("client_secret", &REDACTED)
            .field("timeout", &self.timeout)
            .field("stack", &self.stack)
            .finish()
    }
}

const REDACTED: &str = "<redacted>";

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            endpoint: Some(DEFAULT_LOG_ENDPOINT.to_string()),
            auth_token: String::new(),
            client_id: String::new(),
            client_secret: String::new(),
            timeout: DEFAULT_LOG_TIMEOUT,
            stack: Stack::Backend,
        }
    }
}

/// Cloneable handle to the remote log endpoint
#[derive(Debug, Clone)]
pub struct LogClient {
    http: reqwest::Client,
    endpoint: Option<String>,
    stack: Stack,
}

impl LogClient {
    /// Builds a client whose requests carry the bearer token and client
    /// credentials as default headers.
    pub fn new(settings: &LogSettings) -> Result<Self, LogError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            sensitive_header_value("Authorization", &format!("Bearer {}", settings.auth_token))?,
        );
        headers.insert(
            HeaderName::from_static("x-client-id"),
            header_value("X-Client-ID", &settings.client_id)?,
        );
        headers.insert(
            HeaderName::from_static("x-client-secret"),
            sensitive_header_value("X-Client-Secret", &settings.client_secret)?,
        );

        let http = reqwest::Client::builder()
            .timeout(settings.timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http,
            endpoint: settings.endpoint.clone().filter(|e| !e.is_empty()),
            stack: settings.stack,
        })
    }

    /// A client that never touches the network
    pub fn disabled() -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: None,
            stack: Stack::Backend,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.endpoint.is_some()
    }

    /// Sends one entry and reports the outcome
    ///
    /// Never returns an error: a failed send yields `success: false` with the
    /// failure reason in `message`.
    pub async fn log(
        &self,
        stack: Stack,
        level: Level,
        package: Package,
        message: impl Into<String>,
    ) -> LogResponse {
        let entry = LogEntry {
            stack,
            level,
            package,
            message: message.into(),
        };

        let Some(endpoint) = &self.endpoint else {
            return failure("remote logging is disabled".to_string());
        };

        match self.send(endpoint, &entry).await {
            Ok(ack) => LogResponse {
                success: true,
                message: Some(
                    ack.message
                        .unwrap_or_else(|| "Log sent successfully".to_string()),
                ),
                timestamp: Some(ack.timestamp.unwrap_or_else(now_iso)),
            },
            Err(e) => {
                tracing::debug!(
                    error = %e,
                    package = %entry.package,
                    message = %entry.message,
                    "failed to send log entry"
                );
                failure(e.to_string())
            }
        }
    }

    async fn send(&self, endpoint: &str, entry: &LogEntry) -> Result<RemoteAck, reqwest::Error> {
        let resp = self
            .http
            .post(endpoint)
            .json(entry)
            .send()
            .await?
            .error_for_status()?;

        // The endpoint may answer with anything; only the status matters.
        Ok(resp.json::<RemoteAck>().await.unwrap_or_default())
    }

    pub async fn debug(&self, package: Package, message: impl Into<String>) -> LogResponse {
        self.log(self.stack, Level::Debug, package, message).await
    }

    pub async fn info(&self, package: Package, message: impl Into<String>) -> LogResponse {
        self.log(self.stack, Level::Info, package, message).await
    }

    pub async fn warn(&self, package: Package, message: impl Into<String>) -> LogResponse {
        self.log(self.stack, Level::Warn, package, message).await
    }

    pub async fn error(&self, package: Package, message: impl Into<String>) -> LogResponse {
        self.log(self.stack, Level::Error, package, message).await
    }

    pub async fn fatal(&self, package: Package, message: impl Into<String>) -> LogResponse {
        self.log(self.stack, Level::Fatal, package, message).await
    }

    /// Traces the entry locally and ships it in the background
    ///
    /// The send runs on its own task; the caller never waits on the network.
    pub fn emit(&self, level: Level, package: Package, message: impl Into<String>) {
        let message = message.into();
        match level {
            Level::Debug => tracing::debug!(%package, "{}", message),
            Level::Info => tracing::info!(%package, "{}", message),
            Level::Warn => tracing::warn!(%package, "{}", message),
            Level::Error | Level::Fatal => tracing::error!(%package, "{}", message),
        }

        if !self.is_enabled() {
            return;
        }

        let client = self.clone();
        tokio::spawn(async move {
            client.log(client.stack, level, package, message).await;
        });
    }
}

fn header_value(name: &'static str, value: &str) -> Result<HeaderValue, LogError> {
    HeaderValue::from_str(value).map_err(|_| LogError::InvalidHeader { name })
}

/// Header value kept out of `Debug` output and HTTP/2 header compression
fn sensitive_header_value(name: &'static str, value: &str) -> Result<HeaderValue, LogError> {
    let mut value = header_value(name, value)?;
    value.set_sensitive(true);
    Ok(value)
}

fn failure(message: String) -> LogResponse {
    LogResponse {
        success: false,
        message: Some(message),
        timestamp: Some(now_iso()),
    }
}

fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

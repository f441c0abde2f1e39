//! Data models for the URL shortener
//!
//! Stored records, click logs, and the request/response envelopes used by the
//! HTTP handlers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A shortened URL held by the store
///
/// `click_count` always equals `click_logs.len()`; only the store mutates
/// either field.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ShortenedUrl {
    /// Random UUID identifying this record
    pub id: String,

    /// The original long URL that was shortened
    pub original_url: String,

    /// Unique key of the record (e.g., "abc123" or a custom code)
    pub short_code: String,

    /// The complete shortened URL (e.g., "http://localhost:8080/abc123")
    pub short_url: String,

    pub created_at: DateTime<Utc>,

    /// The code stops resolving once `now > expires_at`
    pub expires_at: DateTime<Utc>,

    #[serde(default)]
    pub click_count: u64,

    #[serde(default)]
    pub click_logs: Vec<ClickLog>,
}

impl ShortenedUrl {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

/// One redirect traversal of a short code
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ClickLog {
    pub id: String,
    pub short_code: String,
    pub timestamp: DateTime<Utc>,

    /// Where the click came from: the referring host, or "direct"
    pub source: String,

    pub geo_location: GeoLocation,
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
}

/// Coarse location of a click
///
/// No geolocation lookup is performed; every field is "Unknown".
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct GeoLocation {
    pub country: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
}

impl GeoLocation {
    pub fn unknown() -> Self {
        Self {
            country: Some(UNKNOWN.to_string()),
            city: Some(UNKNOWN.to_string()),
            region: Some(UNKNOWN.to_string()),
        }
    }
}

pub const UNKNOWN: &str = "Unknown";

/// Request metadata captured when a click is recorded
#[derive(Debug, Clone, Default)]
pub struct ClickContext {
    pub source: String,
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
}

impl ClickContext {
    /// A click with no referrer, user agent, or address
    pub fn direct() -> Self {
        Self {
            source: "direct".to_string(),
            user_agent: None,
            ip_address: None,
        }
    }
}

/// Request payload for creating a new short URL
///
/// # Example
/// ```json
/// {
///   "original_url": "https://example.com/very/long/url",
///   "validity_minutes": 60,
///   "custom_short_code": "my-link"
/// }
/// ```
#[derive(Deserialize, Debug, Clone, Default)]
pub struct CreateRequest {
    /// The original URL to be shortened; a missing field is rejected as
    /// "URL is required" by the store
    #[serde(default)]
    pub original_url: String,

    /// Minutes until the code expires, 1 to 1440. Defaults to 30.
    pub validity_minutes: Option<i64>,

    /// Optional custom code; a random 6-character code is generated otherwise
    pub custom_short_code: Option<String>,
}

/// JSON envelope returned by every API endpoint
#[derive(Serialize, Deserialize, Debug)]
pub struct ApiResponse<T> {
    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Machine-readable error kind (e.g., "not_found")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            code: None,
        }
    }
}

impl ApiResponse<()> {
    pub fn failure(code: &str, error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            code: Some(code.to_string()),
        }
    }
}

//! In-memory URL store
//!
//! Holds every shortened URL and its click logs for the lifetime of the
//! process. Nothing is persisted. Expiry is enforced lazily: an expired
//! record stays in the map until a lookup touches it, or until the store is
//! full and a new record needs the room.
//!
//! Operations take the current time explicitly so callers (and tests) control
//! the clock.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use rand::{distr::Alphanumeric, Rng};
use url::Url;
use uuid::Uuid;

use crate::error::AppError;
use crate::model::{ClickContext, ClickLog, CreateRequest, GeoLocation, ShortenedUrl, UNKNOWN};

/// Maximum number of records held at once
pub const DEFAULT_CAPACITY: usize = 5;

pub const DEFAULT_VALIDITY_MINUTES: i64 = 30;
pub const MIN_VALIDITY_MINUTES: i64 = 1;
pub const MAX_VALIDITY_MINUTES: i64 = 1440;

pub const GENERATED_CODE_LEN: usize = 6;
pub const MIN_CUSTOM_CODE_LEN: usize = 3;
pub const MAX_CUSTOM_CODE_LEN: usize = 20;

/// Path segments the router claims for itself
const RESERVED_CODES: &[&str] = &["api"];

/// Result of looking up a short code
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    Found(ShortenedUrl),
    /// The record had expired and was evicted by this lookup
    Expired,
    Missing,
}

impl Lookup {
    pub fn found(self) -> Option<ShortenedUrl> {
        match self {
            Lookup::Found(record) => Some(record),
            Lookup::Expired | Lookup::Missing => None,
        }
    }
}

#[derive(Debug)]
pub struct UrlStore {
    urls: HashMap<String, ShortenedUrl>,
    base_url: String,
    capacity: usize,
}

impl UrlStore {
    /// Creates an empty store
    ///
    /// `base_url` prefixes every generated `short_url` and must not end with a
    /// slash.
    pub fn new(base_url: impl Into<String>, capacity: usize) -> Self {
        Self {
            urls: HashMap::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            capacity,
        }
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    /// Creates a short URL
    ///
    /// Validates the request, makes room by purging expired records when the
    /// store is full, then allocates the code. A failed call leaves the store
    /// untouched apart from that purge.
    pub fn shorten(
        &mut self,
        request: &CreateRequest,
        now: DateTime<Utc>,
    ) -> Result<ShortenedUrl, AppError> {
        let original_url = validate_url(&request.original_url)?;
        let validity = validate_validity(request.validity_minutes)?;
        let custom_code = request
            .custom_short_code
            .as_deref()
            .filter(|code| !code.is_empty());
        if let Some(code) = custom_code {
            validate_custom_code(code)?;
        }

        if self.urls.len() >= self.capacity {
            self.purge_expired(now);
            if self.urls.len() >= self.capacity {
                return Err(AppError::LimitReached {
                    capacity: self.capacity,
                });
            }
        }

        let short_code = match custom_code {
            Some(code) => {
                if self.urls.contains_key(code) {
                    return Err(AppError::Collision {
                        short_code: code.to_string(),
                    });
                }
                code.to_string()
            }
            None => self.generate_unique_code(),
        };

        let record = ShortenedUrl {
            id: Uuid::new_v4().to_string(),
            original_url,
            short_url: format!("{}/{}", self.base_url, short_code),
            short_code: short_code.clone(),
            created_at: now,
            expires_at: now + Duration::minutes(validity),
            click_count: 0,
            click_logs: Vec::new(),
        };

        self.urls.insert(short_code, record.clone());
        Ok(record)
    }

    /// Looks up a code, evicting it if it has expired
    pub fn get(&mut self, short_code: &str, now: DateTime<Utc>) -> Lookup {
        match self.urls.get(short_code) {
            None => Lookup::Missing,
            Some(record) if record.is_expired(now) => {
                self.urls.remove(short_code);
                Lookup::Expired
            }
            Some(record) => Lookup::Found(record.clone()),
        }
    }

    /// Appends a click log to the record, if it exists
    ///
    /// Unknown codes are ignored. Returns the new log entry when one was
    /// recorded.
    pub fn record_click(
        &mut self,
        short_code: &str,
        context: &ClickContext,
        now: DateTime<Utc>,
    ) -> Option<ClickLog> {
        let record = self.urls.get_mut(short_code)?;

        let click = ClickLog {
            id: Uuid::new_v4().to_string(),
            short_code: short_code.to_string(),
            timestamp: now,
            source: context.source.clone(),
            geo_location: GeoLocation::unknown(),
            user_agent: context.user_agent.clone(),
            ip_address: Some(
                context
                    .ip_address
                    .clone()
                    .unwrap_or_else(|| UNKNOWN.to_string()),
            ),
        };

        record.click_logs.push(click.clone());
        record.click_count = record.click_logs.len() as u64;
        Some(click)
    }

    /// Lookup and click recording as one step, used by the redirect route
    ///
    /// The returned record already includes the new click.
    pub fn resolve(
        &mut self,
        short_code: &str,
        context: &ClickContext,
        now: DateTime<Utc>,
    ) -> Lookup {
        match self.get(short_code, now) {
            Lookup::Found(_) => {
                self.record_click(short_code, context, now);
                self.urls
                    .get(short_code)
                    .cloned()
                    .map_or(Lookup::Missing, Lookup::Found)
            }
            other => other,
        }
    }

    /// Click logs of a code, oldest first; empty for unknown codes
    pub fn click_logs(&self, short_code: &str) -> Vec<ClickLog> {
        self.urls
            .get(short_code)
            .map(|record| record.click_logs.clone())
            .unwrap_or_default()
    }

    /// Removes a record and its click logs
    ///
    /// Returns `false` when the code was not present.
    pub fn delete(&mut self, short_code: &str) -> bool {
        self.urls.remove(short_code).is_some()
    }

    /// Every stored record, including expired ones not yet evicted, oldest
    /// first
    pub fn list(&self) -> Vec<ShortenedUrl> {
        let mut records: Vec<ShortenedUrl> = self.urls.values().cloned().collect();
        records.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.short_code.cmp(&b.short_code))
        });
        records
    }

    /// Removes every expired record and returns how many were removed
    pub fn purge_expired(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.urls.len();
        self.urls.retain(|_, record| !record.is_expired(now));
        before - self.urls.len()
    }

    fn generate_unique_code(&self) -> String {
        loop {
            let code = generate_code(GENERATED_CODE_LEN);
            if !self.urls.contains_key(&code) {
                return code;
            }
        }
    }
}

/// Draws a random code from `[A-Za-z0-9]`
pub fn generate_code(len: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

fn validate_url(raw: &str) -> Result<String, AppError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(AppError::validation("original_url", "URL is required"));
    }

    match Url::parse(raw) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") && parsed.has_host() => {
            Ok(raw.to_string())
        }
        _ => Err(AppError::validation("original_url", "Invalid URL format")),
    }
}

fn validate_validity(minutes: Option<i64>) -> Result<i64, AppError> {
    let minutes = minutes.unwrap_or(DEFAULT_VALIDITY_MINUTES);
    if !(MIN_VALIDITY_MINUTES..=MAX_VALIDITY_MINUTES).contains(&minutes) {
        return Err(AppError::validation(
            "validity_minutes",
            format!(
                "Validity must be between {} and {} minutes",
                MIN_VALIDITY_MINUTES, MAX_VALIDITY_MINUTES
            ),
        ));
    }
    Ok(minutes)
}

fn validate_custom_code(code: &str) -> Result<(), AppError> {
    let len = code.chars().count();
    if !(MIN_CUSTOM_CODE_LEN..=MAX_CUSTOM_CODE_LEN).contains(&len) {
        return Err(AppError::validation(
            "custom_short_code",
            format!(
                "Custom short code must be {}-{} characters",
                MIN_CUSTOM_CODE_LEN, MAX_CUSTOM_CODE_LEN
            ),
        ));
    }

    if !code
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(AppError::validation(
            "custom_short_code",
            "Custom short code may only contain letters, digits, '-' and '_'",
        ));
    }

    if RESERVED_CODES.contains(&code) {
        return Err(AppError::validation(
            "custom_short_code",
            format!("Short code '{}' is reserved", code),
        ));
    }

    Ok(())
}

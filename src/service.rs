//! URL service shared by all request handlers
//!
//! Wraps the in-memory store in an async mutex and reports each operation to
//! the remote log endpoint. Logging is a side channel: it never changes the
//! outcome of an operation, and the store lock is released before anything
//! is emitted.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;

use crate::error::AppError;
use crate::logger::{Level, LogClient, Package};
use crate::model::{ClickContext, ClickLog, CreateRequest, ShortenedUrl};
use crate::store::{Lookup, UrlStore};

/// Application state shared across all request handlers
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<UrlService>,
}

impl AppState {
    pub fn new(service: UrlService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}

pub struct UrlService {
    store: Mutex<UrlStore>,
    logger: LogClient,
}

impl UrlService {
    pub fn new(store: UrlStore, logger: LogClient) -> Self {
        Self {
            store: Mutex::new(store),
            logger,
        }
    }

    pub async fn shorten(&self, request: &CreateRequest) -> Result<ShortenedUrl, AppError> {
        self.logger
            .emit(Level::Info, Package::Api, "URL shortening request initiated");

        let result = self.store.lock().await.shorten(request, Utc::now());

        match &result {
            Ok(record) => self.logger.emit(
                Level::Info,
                Package::Api,
                format!("URL successfully shortened: {}", record.short_code),
            ),
            Err(AppError::Collision { short_code }) => self.logger.emit(
                Level::Error,
                Package::Hook,
                format!("Shortcode collision detected: {}", short_code),
            ),
            Err(AppError::LimitReached { capacity }) => self.logger.emit(
                Level::Warn,
                Package::State,
                format!("Maximum URL limit ({}) reached", capacity),
            ),
            Err(e) => self.logger.emit(
                Level::Warn,
                Package::Handler,
                format!("Rejected shorten request: {}", e),
            ),
        }

        result
    }

    pub async fn list(&self) -> Vec<ShortenedUrl> {
        let urls = self.store.lock().await.list();
        self.logger.emit(
            Level::Debug,
            Package::Api,
            format!("Retrieved {} shortened URLs", urls.len()),
        );
        urls
    }

    /// Looks up a live record; expired records are evicted on the way
    pub async fn get(&self, short_code: &str) -> Result<ShortenedUrl, AppError> {
        let lookup = self.store.lock().await.get(short_code, Utc::now());
        self.report_lookup(short_code, lookup)
    }

    /// Records a click; unknown codes are ignored
    pub async fn record_click(&self, short_code: &str, context: &ClickContext) -> Option<ClickLog> {
        let click = self
            .store
            .lock()
            .await
            .record_click(short_code, context, Utc::now());
        if click.is_some() {
            self.logger.emit(
                Level::Info,
                Package::Api,
                format!("Click recorded for short code: {}", short_code),
            );
        }
        click
    }

    /// Lookup plus click recording for the redirect route
    pub async fn resolve(
        &self,
        short_code: &str,
        context: &ClickContext,
    ) -> Result<ShortenedUrl, AppError> {
        self.logger.emit(
            Level::Info,
            Package::Page,
            format!("Redirect attempt for short code: {}", short_code),
        );

        let lookup = self
            .store
            .lock()
            .await
            .resolve(short_code, context, Utc::now());
        let record = self.report_lookup(short_code, lookup)?;

        self.logger.emit(
            Level::Info,
            Package::Page,
            format!("Redirecting {} to: {}", short_code, record.original_url),
        );
        Ok(record)
    }

    pub async fn click_logs(&self, short_code: &str) -> Vec<ClickLog> {
        let logs = self.store.lock().await.click_logs(short_code);
        self.logger.emit(
            Level::Debug,
            Package::Api,
            format!("Retrieved {} click logs for {}", logs.len(), short_code),
        );
        logs
    }

    pub async fn delete(&self, short_code: &str) -> bool {
        let deleted = self.store.lock().await.delete(short_code);
        if deleted {
            self.logger.emit(
                Level::Info,
                Package::Api,
                format!("URL deleted: {}", short_code),
            );
        }
        deleted
    }

    fn report_lookup(&self, short_code: &str, lookup: Lookup) -> Result<ShortenedUrl, AppError> {
        match lookup {
            Lookup::Found(record) => Ok(record),
            Lookup::Expired => {
                self.logger.emit(
                    Level::Warn,
                    Package::Api,
                    format!("Short code expired: {}", short_code),
                );
                Err(AppError::not_found(short_code))
            }
            Lookup::Missing => {
                self.logger.emit(
                    Level::Warn,
                    Package::Api,
                    format!("Short code not found: {}", short_code),
                );
                Err(AppError::not_found(short_code))
            }
        }
    }
}

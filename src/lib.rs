//! Library exports for the URL shortener
//!
//! Exposes the store, service, HTTP surface, and the reusable remote logging
//! client for the binary and the integration tests.

pub mod config;
pub mod error;
pub mod handler;
pub mod logger;
pub mod model;
pub mod route;
pub mod service;
pub mod store;

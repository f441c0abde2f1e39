//! Route definitions for the URL shortener API
//!
//! This module configures all HTTP routes and maps them to their respective handlers.

use axum::routing::get;
use axum::Router;

use crate::handler::{
    click_logs, create_short_url, delete_short_url, get_url, list_urls, redirect_url,
};
use crate::service::AppState;

/// Creates the application router
///
/// # Route Definitions
///
/// - `GET /{code}` - Redirects to the original URL and records the click
/// - `GET /api/urls` - Lists every stored URL
/// - `POST /api/urls` - Creates a new short URL
/// - `GET /api/urls/{code}` - Returns one live URL
/// - `DELETE /api/urls/{code}` - Deletes a short URL
/// - `GET /api/urls/{code}/clicks` - Returns the click logs of a code
///
/// # Example Usage
///
/// ```no_run
/// # use snaplink::logger::LogClient;
/// # use snaplink::route::create_app;
/// # use snaplink::service::{AppState, UrlService};
/// # use snaplink::store::UrlStore;
/// let store = UrlStore::new("http://localhost:8080", 5);
/// let state = AppState::new(UrlService::new(store, LogClient::disabled()));
/// let app = create_app(state);
/// // axum::serve(listener, app).await.unwrap();
/// ```
pub fn create_app(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/urls", get(list_urls).post(create_short_url))
        .route("/urls/{code}", get(get_url).delete(delete_short_url))
        .route("/urls/{code}/clicks", get(click_logs));

    Router::new()
        // Public redirect endpoint - converts short URL to original URL
        .route("/{code}", get(redirect_url))
        .nest("/api", api_routes)
        .with_state(state)
}

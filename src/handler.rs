//! HTTP request handlers for the URL shortener API
//!
//! Handlers translate HTTP into `UrlService` calls. Failures surface as
//! `AppError`, which renders itself as a JSON error envelope.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Redirect},
    Json,
};
use serde_json::json;
use url::Url;

use crate::error::AppError;
use crate::model::{ApiResponse, ClickContext, CreateRequest};
use crate::service::AppState;

/// Creates a new short URL
///
/// # Request Body
///
/// ```json
/// {
///   "original_url": "https://example.com/very/long/url",
///   "validity_minutes": 60,
///   "custom_short_code": "my-link"
/// }
/// ```
///
/// # Response
///
/// - **201 Created** - URL successfully created
/// - **400 Bad Request** - Malformed body, invalid URL, validity, or custom code
/// - **409 Conflict** - Custom code already exists
/// - **422 Unprocessable Entity** - Store is full
pub async fn create_short_url(
    State(state): State<AppState>,
    payload: Result<Json<CreateRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(payload) = payload?;
    let record = state.service.shorten(&payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(record))))
}

/// Redirects a short URL to its original destination
///
/// Records the click before answering with **307 Temporary Redirect**, so
/// browsers come back through the shortener on every visit. Unknown and
/// expired codes answer **404 Not Found**.
pub async fn redirect_url(
    Path(short_code): Path<String>,
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let context = click_context(&headers);
    let record = state.service.resolve(&short_code, &context).await?;
    Ok(Redirect::temporary(&record.original_url))
}

/// Lists every stored URL with its click statistics
pub async fn list_urls(State(state): State<AppState>) -> impl IntoResponse {
    Json(ApiResponse::ok(state.service.list().await))
}

/// Returns one live URL; expired codes are evicted and answer 404
pub async fn get_url(
    Path(short_code): Path<String>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let record = state.service.get(&short_code).await?;
    Ok(Json(ApiResponse::ok(record)))
}

/// Returns the click logs of a code, empty for unknown codes
pub async fn click_logs(
    Path(short_code): Path<String>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    Json(ApiResponse::ok(state.service.click_logs(&short_code).await))
}

/// Deletes a short URL and its click logs
///
/// - **200 OK** - URL deleted
/// - **404 Not Found** - Nothing stored under this code
pub async fn delete_short_url(
    Path(short_code): Path<String>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    if !state.service.delete(&short_code).await {
        return Err(AppError::not_found(short_code));
    }

    Ok(Json(ApiResponse::ok(json!({ "deleted": short_code }))))
}

/// Builds click metadata from request headers
///
/// The source is the referring host, or "direct" when there is no usable
/// `Referer`. The client address is the first `X-Forwarded-For` hop.
pub fn click_context(headers: &HeaderMap) -> ClickContext {
    let header_str = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    let source = header_str(header::REFERER)
        .and_then(|referer| Url::parse(referer).ok())
        .and_then(|url| url.host_str().map(str::to_owned))
        .unwrap_or_else(|| "direct".to_string());

    let ip_address = header_str(header::HeaderName::from_static("x-forwarded-for"))
        .and_then(|list| list.split(',').next())
        .map(|ip| ip.trim().to_string())
        .filter(|ip| !ip.is_empty());

    ClickContext {
        source,
        user_agent: header_str(header::USER_AGENT).map(str::to_owned),
        ip_address,
    }
}

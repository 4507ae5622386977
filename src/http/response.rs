//! Backend response normalization.
//!
//! The backend body is read as text first, then decoded as JSON. Anything that
//! is not JSON becomes a [`GatewayError::BackendContract`] carrying a short
//! preview and, for HTML error pages, the page's `<title>` and `<h1>`.

use axum::http::header::{CACHE_CONTROL, EXPIRES, PRAGMA};
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

use crate::error::GatewayError;
use crate::http::cookies::relay_set_cookies;
use crate::upstream::BackendResponse;

/// Characters of an offending payload kept for diagnostics.
pub const PREVIEW_CHARS: usize = 200;

/// First `max_chars` characters of `text`.
pub fn preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

/// True if the payload is an HTML document rather than data.
pub fn looks_like_html(text: &str) -> bool {
    let lower = text.to_ascii_lowercase();
    lower.contains("<!doctype") || lower.contains("<html")
}

/// Human-readable bits of an HTML error page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HtmlDiagnostics {
    pub title: Option<String>,
    pub h1: Option<String>,
}

fn title_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<title[^>]*>(.*?)</title>").expect("static regex"))
}

fn h1_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<h1[^>]*>(.*?)</h1>").expect("static regex"))
}

pub fn html_diagnostics(text: &str) -> HtmlDiagnostics {
    let capture = |re: &Regex| {
        re.captures(text)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim().to_string())
            .filter(|s| !s.is_empty())
    };
    HtmlDiagnostics {
        title: capture(title_pattern()),
        h1: capture(h1_pattern()),
    }
}

/// Decode a backend body as JSON.
pub fn decode_backend_json(response: &BackendResponse) -> Result<Value, GatewayError> {
    let text = response.text();
    serde_json::from_str(&text).map_err(|parse_error| {
        if looks_like_html(&text) {
            let html = html_diagnostics(&text);
            GatewayError::BackendContract {
                message: "Backend returned HTML error page instead of JSON",
                backend_status: response.status,
                preview: preview(&text, PREVIEW_CHARS),
                parse_error: parse_error.to_string(),
                html_title: html.title,
                html_h1: html.h1,
            }
        } else {
            GatewayError::BackendContract {
                message: "Invalid JSON response from backend",
                backend_status: response.status,
                preview: preview(&text, PREVIEW_CHARS),
                parse_error: parse_error.to_string(),
                html_title: None,
                html_h1: None,
            }
        }
    })
}

/// Map a backend response to the gateway's response.
///
/// 2xx: `success_status` (or the backend's own status when `None`), the JSON
/// body and every relayed cookie. Otherwise the backend's status and body are
/// relayed as an error.
pub fn relay_backend(
    response: BackendResponse,
    success_status: Option<StatusCode>,
) -> Result<Response, GatewayError> {
    let body = decode_backend_json(&response)?;

    if !response.status.is_success() {
        return Err(GatewayError::Backend {
            status: response.status,
            body,
        });
    }

    let status = success_status.unwrap_or(response.status);
    let mut reply = (status, Json(body)).into_response();
    relay_set_cookies(Some(&response.headers), Some(reply.headers_mut()));
    Ok(reply)
}

/// Mark a response as never cacheable.
pub fn no_store(mut response: Response) -> Response {
    let headers = response.headers_mut();
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache, no-store, must-revalidate"));
    headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
    headers.insert(EXPIRES, HeaderValue::from_static("0"));
    response
}

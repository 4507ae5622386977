//! Building forwarded requests.
//!
//! Only a fixed subset of inbound headers crosses to the backend. Cookie and
//! CSRF values are copied byte-for-byte and never logged.

use axum::http::header::{ACCEPT, CONTENT_TYPE, COOKIE, USER_AGENT};
use axum::http::{HeaderMap, HeaderName, HeaderValue};
use url::{form_urlencoded, Url};

use crate::http::request::X_REQUEST_ID;

/// Anti-forgery header forwarded verbatim.
pub const X_CSRF_TOKEN: HeaderName = HeaderName::from_static("x-csrf-token");

/// How the forwarded request declares its body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForwardBody {
    /// No body, `Content-Type: application/json` for the backend's parsers.
    Json,
    /// Reuse the inbound `Content-Type` (multipart boundary included).
    Inbound,
}

/// Headers to send to the backend for an inbound request.
pub fn forward_headers(inbound: &HeaderMap, body: ForwardBody) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

    match body {
        ForwardBody::Json => {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }
        ForwardBody::Inbound => {
            if let Some(ct) = inbound.get(CONTENT_TYPE) {
                headers.insert(CONTENT_TYPE, ct.clone());
            }
        }
    }

    for name in [COOKIE, X_CSRF_TOKEN, USER_AGENT, X_REQUEST_ID] {
        if let Some(value) = inbound.get(&name).filter(|v| !v.is_empty()) {
            let value = value.clone();
            headers.insert(name, value);
        }
    }

    headers
}

/// Join the backend origin and an absolute API path.
pub fn endpoint(base: &str, path: &str) -> String {
    format!("{}{}", base.trim_end_matches('/'), path)
}

/// `endpoint(base, prefix)` followed by `segment` as a single
/// percent-encoded path segment.
pub fn segment_endpoint(base: &str, prefix: &str, segment: &str) -> String {
    let joined = endpoint(base, prefix);
    match Url::parse(&joined) {
        Ok(mut url) => {
            if let Ok(mut segments) = url.path_segments_mut() {
                segments.pop_if_empty().push(segment);
            }
            url.into()
        }
        Err(_) => {
            let encoded: String = form_urlencoded::byte_serialize(segment.as_bytes()).collect();
            format!("{joined}/{encoded}")
        }
    }
}

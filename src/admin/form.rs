//! Buffered admin request bodies.
//!
//! Bodies are inspected locally and then forwarded byte-for-byte, so each is
//! read once under the size limit and multipart forms are parsed from the
//! buffer.

use std::collections::HashMap;

use axum::body::{Body, Bytes};
use axum::extract::{FromRequest, Multipart, Request};
use axum::http::header::CONTENT_LENGTH;
use axum::http::{Extensions, HeaderMap, StatusCode};

use crate::error::GatewayError;

/// An inbound request with its body fully read.
pub struct BufferedRequest {
    pub headers: HeaderMap,
    extensions: Extensions,
    pub body: Bytes,
}

impl BufferedRequest {
    /// Read the whole body, refusing anything over `max_bytes` with 413.
    ///
    /// A declared `Content-Length` is checked up front; a streamed body is
    /// cut off by the router's `DefaultBodyLimit` while it is read.
    pub async fn read(request: Request, max_bytes: usize) -> Result<Self, GatewayError> {
        let declared = request
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok());
        if declared.is_some_and(|len| len > max_bytes as u64) {
            return Err(GatewayError::PayloadTooLarge { limit: max_bytes });
        }

        let headers = request.headers().clone();
        let extensions = request.extensions().clone();
        let body = Bytes::from_request(request, &()).await.map_err(|rejection| {
            if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
                GatewayError::PayloadTooLarge { limit: max_bytes }
            } else {
                GatewayError::InvalidForm(rejection.body_text())
            }
        })?;

        Ok(Self {
            headers,
            extensions,
            body,
        })
    }

    /// Parse the buffered body as `multipart/form-data`.
    pub async fn form(&self) -> Result<PostForm, GatewayError> {
        let mut request = Request::new(Body::from(self.body.clone()));
        *request.headers_mut() = self.headers.clone();
        *request.extensions_mut() = self.extensions.clone();

        let mut multipart = Multipart::from_request(request, &())
            .await
            .map_err(|rejection| GatewayError::InvalidForm(rejection.body_text()))?;

        let mut form = PostForm::default();
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| GatewayError::InvalidForm(e.body_text()))?
        {
            let name = field.name().unwrap_or_default().to_string();
            match field.file_name().map(str::to_string) {
                Some(file_name) => {
                    let bytes = field
                        .bytes()
                        .await
                        .map_err(|e| GatewayError::InvalidForm(e.body_text()))?;
                    form.files.push(FileSummary {
                        field: name,
                        file_name,
                        size: bytes.len(),
                    });
                }
                None => {
                    let value = field
                        .text()
                        .await
                        .map_err(|e| GatewayError::InvalidForm(e.body_text()))?;
                    form.fields.insert(name, value);
                }
            }
        }

        Ok(form)
    }
}

/// Text fields and file metadata of a post form.
#[derive(Debug, Default)]
pub struct PostForm {
    pub fields: HashMap<String, String>,
    pub files: Vec<FileSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSummary {
    pub field: String,
    pub file_name: String,
    pub size: usize,
}

impl PostForm {
    /// A text field, treating blank values as absent.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }
}

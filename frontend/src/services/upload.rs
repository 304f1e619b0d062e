//! HTTP service for sending videos to the upscale endpoint.
//!
//! The network call sits behind [`UpscaleTransport`] so the widget can be
//! driven without a browser. [`FetchTransport`] is the real one, built on
//! `gloo-net`. Whatever comes back is captured as a [`RawResponse`] and
//! turned into an outcome by [`interpret_response`].

use gloo_net::http::Request;
use serde_json::Value;
use web_sys::{File, FormData};

use crate::config::{MSG_UPLOAD_FAILED, SNIPPET_MAX_CHARS};
use crate::types::{OutputKind, SelectedFile, UploadError, UploadResult, UpscaleResponse, UpscaleResult};

/// A multipart upload: one file under one field.
#[derive(Debug)]
pub struct UploadRequest<'a, B> {
    pub url: &'a str,
    pub field: &'a str,
    pub file: &'a SelectedFile<B>,
}

/// Everything the widget needs from an HTTP response.
#[derive(Clone, Debug, PartialEq)]
pub struct RawResponse {
    pub status: u16,
    pub status_text: String,
    /// Value of the `Content-Type` header, if any
    pub content_type: Option<String>,
    pub body: String,
}

impl RawResponse {
    /// `200..=299`, like `Response.ok` in the browser.
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_json(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|ct| ct.contains("application/json"))
    }
}

/// Sends one multipart POST. Implementations must not retry.
#[allow(async_fn_in_trait)]
pub trait UpscaleTransport {
    /// File handle type this transport knows how to send.
    type Blob;

    async fn post_file(&self, request: UploadRequest<'_, Self::Blob>) -> UploadResult<RawResponse>;
}

/// Browser `fetch` transport.
#[derive(Clone, Copy, Debug, Default)]
pub struct FetchTransport;

impl UpscaleTransport for FetchTransport {
    type Blob = File;

    async fn post_file(&self, request: UploadRequest<'_, File>) -> UploadResult<RawResponse> {
        let form_data = FormData::new()
            .map_err(|e| UploadError::Transport(format!("Failed to create FormData: {:?}", e)))?;

        form_data
            .append_with_blob_and_filename(request.field, &request.file.blob, &request.file.name)
            .map_err(|e| UploadError::Transport(format!("Failed to append file: {:?}", e)))?;

        let response = Request::post(request.url)
            .body(form_data)
            .map_err(|e| UploadError::Transport(format!("Failed to build request: {}", e)))?
            .send()
            .await
            .map_err(|e| UploadError::Transport(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        let status_text = response.status_text();
        let content_type = response.headers().get("content-type");
        let body = response
            .text()
            .await
            .map_err(|e| UploadError::Transport(format!("Failed to read response body: {}", e)))?;

        Ok(RawResponse {
            status,
            status_text,
            content_type,
            body,
        })
    }
}

// =============================================================================
// Response interpretation
// =============================================================================

/// Turn a response into a result or a user-facing error.
///
/// - JSON + 2xx: `url` wins, then `output` (an `http…` string counts as a URL).
/// - JSON + non-2xx: [`UploadError::Server`] with `detail`.
/// - anything else: [`UploadError::NonJson`] with an escaped body snippet.
pub fn interpret_response(response: &RawResponse) -> UploadResult<UpscaleResult> {
    if !response.is_json() {
        return Err(UploadError::NonJson {
            status: response.status,
            snippet: escape_html(&truncate_chars(&response.body, SNIPPET_MAX_CHARS)),
        });
    }

    let body: Value =
        serde_json::from_str(&response.body).map_err(|e| UploadError::MalformedJson(e.to_string()))?;
    let payload = UpscaleResponse::from_value(body);

    if !response.ok() {
        let detail = payload
            .detail
            .as_ref()
            .filter(|d| is_truthy(d))
            .map(value_text)
            .unwrap_or_else(|| MSG_UPLOAD_FAILED.to_string());
        return Err(UploadError::Server(detail));
    }

    let kind = payload.kind.as_deref().map(OutputKind::from);

    if let Some(url) = payload.url.as_ref().filter(|u| is_truthy(u)) {
        return Ok(UpscaleResult::Video { url: value_text(url), kind });
    }

    match payload.output {
        Some(Value::String(s)) if s.starts_with("http") => Ok(UpscaleResult::Video { url: s, kind }),
        Some(output) if is_truthy(&output) => Ok(UpscaleResult::RawOutput(output)),
        _ => Err(UploadError::InvalidResponse),
    }
}

/// JavaScript truthiness for a JSON value.
pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Strings as-is, everything else as compact JSON.
pub(crate) fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

/// Escape the characters that would let a snippet inject markup.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

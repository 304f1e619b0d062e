//! Common types used across the frontend application.
//!
//! # Categories
//!
//! - **Input Types** - the file picked by the user
//! - **State Types** - the widget's render state
//! - **Log Types** - client-side log panel
//! - **API Types** - upscale endpoint payloads
//! - **Error Types** - upload failures shown to the user

use serde_json::Value;
use thiserror::Error;

use crate::config::{
    MSG_COMPLEX_OUTPUT, MSG_INVALID_FILE, MSG_INVALID_RESPONSE, MSG_RAW_OUTPUT, MSG_SERVER_ERROR,
    VIDEO_MIME_PREFIX,
};
use crate::services::escape_html;

// =============================================================================
// Input Types
// =============================================================================

/// A file selected through the picker or dropped on the drop zone.
///
/// `blob` is the underlying handle (`web_sys::File` in the browser); the
/// widget never looks inside it.
#[derive(Clone, Debug, PartialEq)]
pub struct SelectedFile<B> {
    pub name: String,
    /// Size in bytes
    pub size: u64,
    pub mime_type: String,
    pub blob: B,
}

impl<B> SelectedFile<B> {
    pub fn new(name: impl Into<String>, size: u64, mime_type: impl Into<String>, blob: B) -> Self {
        Self {
            name: name.into(),
            size,
            mime_type: mime_type.into(),
            blob,
        }
    }

    /// Size in megabytes (1024 * 1024 bytes).
    pub fn size_mb(&self) -> f64 {
        self.size as f64 / 1024.0 / 1024.0
    }

    pub fn is_video(&self) -> bool {
        self.mime_type.starts_with(VIDEO_MIME_PREFIX)
    }
}

impl From<web_sys::File> for SelectedFile<web_sys::File> {
    fn from(file: web_sys::File) -> Self {
        SelectedFile {
            name: file.name(),
            size: file.size() as u64,
            mime_type: file.type_(),
            blob: file,
        }
    }
}

// =============================================================================
// State Types
// =============================================================================

/// Which region of the widget is visible.
///
/// Exactly one is active at a time.
#[derive(Clone, Debug, PartialEq, Default)]
pub enum UiState {
    /// Drop zone shown, waiting for a file
    #[default]
    Idle,
    /// Upload in flight
    Loading,
    /// Upscaled video ready at `url`
    Result { url: String },
    /// Something went wrong (or the server sent raw output)
    Error { message: String },
}

impl UiState {
    pub fn is_loading(&self) -> bool {
        matches!(self, UiState::Loading)
    }

    /// Short name for debug logs.
    pub fn name(&self) -> &'static str {
        match self {
            UiState::Idle => "idle",
            UiState::Loading => "loading",
            UiState::Result { .. } => "result",
            UiState::Error { .. } => "error",
        }
    }

    pub fn result_url(&self) -> Option<&str> {
        match self {
            UiState::Result { url } => Some(url),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            UiState::Error { message } => Some(message),
            _ => None,
        }
    }
}

// =============================================================================
// Log Types
// =============================================================================

/// Log severity level.
#[derive(Clone, Debug, PartialEq)]
pub enum LogLevel {
    /// Informational message
    Info,
    /// Success/completion message
    Success,
    /// Warning message
    Warning,
    /// Error message
    Error,
}

impl LogLevel {
    /// Get CSS class for styling.
    pub fn css_class(&self) -> &'static str {
        match self {
            LogLevel::Info => "log-info",
            LogLevel::Success => "log-success",
            LogLevel::Warning => "log-warning",
            LogLevel::Error => "log-error",
        }
    }
}

/// A single entry of the client-side log panel.
#[derive(Clone, Debug, PartialEq)]
pub struct LogEntry {
    /// Severity level
    pub level: LogLevel,
    /// Log message
    pub message: String,
    /// Timestamp string (HH:MM:SS)
    pub timestamp: String,
}

impl LogEntry {
    /// Entry stamped with the current local time.
    pub fn now(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            timestamp: chrono::Local::now().format("%H:%M:%S").to_string(),
        }
    }

    /// Line as shown in the panel: `[HH:MM:SS] message`.
    pub fn display_line(&self) -> String {
        format!("[{}] {}", self.timestamp, self.message)
    }
}

// =============================================================================
// API Response Types
// =============================================================================

/// Fields of the JSON body returned by `/api/upscale`.
///
/// Fields are kept as raw values: the server is loose about their types and
/// the widget decides by truthiness, not by shape. A body that is not a JSON
/// object has none of the fields.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UpscaleResponse {
    /// Playable video URL (absolute, relative or `data:` URI)
    pub url: Option<Value>,
    /// Fallback payload when the server could not produce a URL
    pub output: Option<Value>,
    /// Error detail on non-2xx responses
    pub detail: Option<Value>,
    /// `type`: "r2_url", "data_uri", "local", "url", "raw". Non-strings are dropped.
    pub kind: Option<String>,
}

impl UpscaleResponse {
    pub fn from_value(value: Value) -> Self {
        let Value::Object(mut fields) = value else {
            return Self::default();
        };
        Self {
            url: fields.remove("url"),
            output: fields.remove("output"),
            detail: fields.remove("detail"),
            kind: fields
                .remove("type")
                .and_then(|t| t.as_str().map(str::to_string)),
        }
    }
}

/// Origin of the returned video, as reported by the server.
#[derive(Clone, Debug, PartialEq)]
pub enum OutputKind {
    /// Presigned object-storage URL
    ObjectStorage,
    /// Inline base64 `data:` URI
    DataUri,
    /// File served by the API host itself
    Local,
    /// URL passed through from the worker
    Url,
    /// No URL, raw worker output
    Raw,
    /// Anything else the server might send
    Other(String),
}

impl From<&str> for OutputKind {
    fn from(s: &str) -> Self {
        match s {
            "r2_url" => OutputKind::ObjectStorage,
            "data_uri" => OutputKind::DataUri,
            "local" => OutputKind::Local,
            "url" => OutputKind::Url,
            "raw" => OutputKind::Raw,
            other => OutputKind::Other(other.to_string()),
        }
    }
}

/// What a successful response resolved to.
#[derive(Clone, Debug, PartialEq)]
pub enum UpscaleResult {
    /// A playable video
    Video { url: String, kind: Option<OutputKind> },
    /// Server output that is not a URL
    RawOutput(Value),
}

impl UpscaleResult {
    /// Text shown in the error region for raw output.
    ///
    /// Objects and arrays are serialized as JSON, scalars as plain text.
    pub fn raw_output_message(output: &Value) -> String {
        match output {
            Value::Object(_) | Value::Array(_) => format!("{}{}", MSG_COMPLEX_OUTPUT, output),
            Value::String(s) => format!("{}{}", MSG_RAW_OUTPUT, s),
            other => format!("{}{}", MSG_RAW_OUTPUT, other),
        }
    }
}

// =============================================================================
// Error Types
// =============================================================================

/// Upload failures.
///
/// `Display` is the exact message shown in the error region.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum UploadError {
    /// Selected file is not a video; no request was made.
    #[error("{}", MSG_INVALID_FILE)]
    InvalidFile,

    /// Non-2xx JSON response, message passed through from the server.
    #[error("{0}")]
    Server(String),

    /// Body was not JSON.
    #[error("{} ({}): {}...", MSG_SERVER_ERROR, .status, .snippet)]
    NonJson { status: u16, snippet: String },

    /// Declared JSON but did not parse.
    #[error("{0}")]
    MalformedJson(String),

    /// Network failure or request could not be built.
    #[error("{0}")]
    Transport(String),

    /// Success payload had neither `url` nor `output`.
    #[error("{}", MSG_INVALID_RESPONSE)]
    InvalidResponse,
}

impl UploadError {
    /// The message as HTML for the error region.
    ///
    /// Server-supplied text is escaped; the non-JSON snippet already is.
    pub fn markup(&self) -> String {
        match self {
            UploadError::NonJson { .. } => self.to_string(),
            other => escape_html(&other.to_string()),
        }
    }
}

/// Result type alias for upload operations.
pub type UploadResult<T> = Result<T, UploadError>;

//! Application configuration.
//!
//! Centralized configuration for the upscale frontend.
//! These are hardcoded; [`WidgetConfig`] lets a host (or a test)
//! override the parts that vary between deployments.

use std::fmt;
use std::str::FromStr;

/// Upscale endpoint, relative to the page origin.
///
/// The page must be served by the same host as the API.
pub const UPSCALE_ENDPOINT: &str = "/api/upscale";

/// Multipart field name carrying the video.
pub const UPLOAD_FIELD: &str = "file";

/// Application name, used as the page title.
pub const APP_NAME: &str = "Video Upscaler";

/// How many characters of a non-JSON body are shown to the user.
pub const SNIPPET_MAX_CHARS: usize = 200;

/// MIME prefix a selected file must carry.
pub const VIDEO_MIME_PREFIX: &str = "video/";

/// Shown when the selected file is not a video.
pub const MSG_INVALID_FILE: &str = "يرجى تحميل ملف فيديو صالح.";

/// Fallback when the server fails without a `detail`.
pub const MSG_UPLOAD_FAILED: &str = "فشل التحميل";

/// Prefix for non-JSON server failures.
pub const MSG_SERVER_ERROR: &str = "خطأ في السيرفر";

/// Shown when a success payload has neither `url` nor `output`.
pub const MSG_INVALID_RESPONSE: &str = "استجابة غير صالحة من السيرفر";

/// Prefix for a scalar `output` fallback.
pub const MSG_RAW_OUTPUT: &str = "المخرجات: ";

/// Prefix for an object `output` fallback.
pub const MSG_COMPLEX_OUTPUT: &str = "مخرجات معقدة: ";

// =============================================================================
// Target resolution
// =============================================================================

/// Output resolution requested from the upscaler (`WIDTHxHEIGHT`).
///
/// Without one the server picks 1920x1080.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl FromStr for Resolution {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (w, h) = s
            .trim()
            .split_once(['x', 'X'])
            .ok_or_else(|| format!("Invalid resolution: {}", s))?;
        let width = w.trim().parse().map_err(|_| format!("Invalid width: {}", w))?;
        let height = h.trim().parse().map_err(|_| format!("Invalid height: {}", h))?;
        Ok(Resolution { width, height })
    }
}

// =============================================================================
// Widget configuration
// =============================================================================

/// Runtime settings for an [`crate::UploadWidget`].
#[derive(Clone, Debug, PartialEq)]
pub struct WidgetConfig {
    /// POST target.
    pub endpoint: String,
    /// Multipart field for the file.
    pub field: String,
    /// When set, sent as `?target_resolution=WxH`.
    pub target_resolution: Option<Resolution>,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            endpoint: UPSCALE_ENDPOINT.to_string(),
            field: UPLOAD_FIELD.to_string(),
            target_resolution: None,
        }
    }
}

impl WidgetConfig {
    pub fn with_target_resolution(mut self, resolution: Resolution) -> Self {
        self.target_resolution = Some(resolution);
        self
    }

    /// Apply the page's `?resolution=WxH` parameter.
    ///
    /// An unparsable value is logged and leaves the server default in place.
    pub fn with_resolution_param(self, param: Option<&str>) -> Self {
        match param.map(str::parse::<Resolution>) {
            Some(Ok(resolution)) => self.with_target_resolution(resolution),
            Some(Err(e)) => {
                log::warn!("Ignoring resolution parameter: {}", e);
                self
            }
            None => self,
        }
    }

    /// Full request URL, including the optional resolution query.
    pub fn request_url(&self) -> String {
        match self.target_resolution {
            Some(res) => {
                let sep = if self.endpoint.contains('?') { '&' } else { '?' };
                format!("{}{}target_resolution={}", self.endpoint, sep, res)
            }
            None => self.endpoint.clone(),
        }
    }
}

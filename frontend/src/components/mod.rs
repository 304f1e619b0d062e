//! UI Components for the upscaler page.
//!
//! # Layout Components
//! - [`Hero`] - Main title and description
//! - [`Footer`] - Page footer
//!
//! # Feature Components
//! - [`UploadSection`] - Video drop zone, loading, result and error regions
//! - [`LogsPanel`] - Collapsible client-side upload log

mod hero;
mod upload;
mod footer;
mod logs;

pub use hero::*;
pub use upload::*;
pub use footer::*;
pub use logs::*;

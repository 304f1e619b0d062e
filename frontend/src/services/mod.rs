//! Backend services.
//!
//! # Services
//!
//! - [`upload`] - Video upload to the upscale endpoint
//!   and interpretation of its response

pub mod upload;

pub use upload::*;

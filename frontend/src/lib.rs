//! Video Upscaler - Frontend Rust/Leptos Application
//!
//! A WebAssembly frontend that uploads a video to the upscale endpoint
//! and plays back the result.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        App                                   │
//! ├─────────────────────────────────────────────────────────────┤
//! │  MainContent                                                 │
//! │  ├── Hero (title, description)                              │
//! │  ├── UploadSection (drop zone / loading / result / error)   │
//! │  └── LogsPanel (when the log is not empty)                  │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Footer                                                      │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`types`] - Common types (SelectedFile, UiState, LogEntry, UploadError)
//! - [`widget`] - Upload state machine, independent of the DOM
//! - [`components`] - UI components (Upload, Logs, Hero, Footer)
//! - [`services`] - Backend communication (upload)

use leptos::*;
use leptos_meta::*;
use leptos_router::*;

// =============================================================================
// Module declarations
// =============================================================================

pub mod config;
pub mod types;
pub mod widget;
pub mod components;
pub mod services;

// =============================================================================
// Re-exports
// =============================================================================

// Configuration
pub use config::*;

// Types
pub use types::{
    // Input
    SelectedFile,
    // State
    UiState,
    // Logs
    LogEntry, LogLevel,
    // API
    UpscaleResponse, UpscaleResult, OutputKind,
    // Errors
    UploadError, UploadResult,
};

// Widget
pub use widget::{Admission, LogSink, UploadWidget, WidgetView};

// Components
pub use components::*;

// Services
pub use services::*;

// =============================================================================
// Application Entry Point
// =============================================================================

/// Install the panic hook and console logger, then mount [`App`].
pub fn start() {
    // Setup panic hook for better error messages
    console_error_panic_hook::set_once();

    // Setup console logging
    _ = console_log::init_with_level(log::Level::Debug);

    log::info!("🦀 Video Upscaler - Starting Leptos App");

    mount_to_body(|| view! { <App/> });
}

#[component]
pub fn App() -> impl IntoView {
    provide_meta_context();

    view! {
        <Title text=APP_NAME/>
        <Router>
            <main>
                <Routes>
                    <Route path="/" view=MainContent/>
                </Routes>
            </main>
        </Router>
    }
}

#[component]
fn MainContent() -> impl IntoView {
    let (logs, set_logs) = create_signal(Vec::<LogEntry>::new());

    // `?resolution=3840x2160` asks the server for a specific output size
    let query = use_query_map();
    let config = query.with_untracked(|params| {
        WidgetConfig::default().with_resolution_param(params.get("resolution").map(String::as_str))
    });

    view! {
        <div class="container">
            <Hero/>

            <UploadSection set_logs=set_logs config=config/>

            // Log panel stays hidden until the first entry
            <Show
                when=move || !logs.get().is_empty()
                fallback=|| view! { }
            >
                <LogsPanel logs=logs/>
            </Show>
        </div>

        <Footer/>
    }
}

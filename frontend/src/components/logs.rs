//! Client-side log panel.
//!
//! Shows the upload log with auto-scroll support. The header toggles the
//! body open and closed.

use leptos::*;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use crate::LogEntry;

/// Request animation frame helper for smooth scrolling
fn request_animation_frame(f: impl FnOnce() + 'static) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let closure = Closure::once(f);
    if window
        .request_animation_frame(closure.as_ref().unchecked_ref())
        .is_ok()
    {
        closure.forget();
    }
}

/// Logs panel component, display only.
#[component]
pub fn LogsPanel(
    /// Signal for logs data
    logs: ReadSignal<Vec<LogEntry>>,
) -> impl IntoView {
    let (collapsed, set_collapsed) = create_signal(false);

    // Reference to the logs content div for auto-scroll
    let logs_container = create_node_ref::<leptos::html::Div>();

    // Auto-scroll to bottom when logs change
    create_effect(move |_| {
        let _ = logs.get();

        if let Some(container) = logs_container.get() {
            request_animation_frame(move || {
                container.set_scroll_top(container.scroll_height());
            });
        }
    });

    view! {
        <div class="logs-panel" id="logs-container">
            <div
                class="logs-header"
                style="cursor: pointer;"
                on:click=move |_| set_collapsed.update(|c| *c = !*c)
            >
                <span class="logs-title">"📋 سجل العمليات"</span>
                <span class="logs-toggle">
                    {move || if collapsed.get() { "▸" } else { "▾" }}
                </span>
            </div>
            <div
                class="logs-content"
                id="logs-content"
                class:hidden=move || collapsed.get()
                node_ref=logs_container
            >
                <For
                    each=move || logs.get().into_iter().enumerate()
                    key=|(i, entry)| (*i, entry.timestamp.clone())
                    children=move |(_, entry)| {
                        view! {
                            <div class=format!("log-entry {}", entry.level.css_class())>
                                {entry.display_line()}
                            </div>
                        }
                    }
                />
            </div>
        </div>
    }
}

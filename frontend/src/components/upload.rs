//! Video upload component with drag & drop support.
//!
//! Renders the four widget regions (drop zone, loading, result, error) and
//! forwards user actions to an [`UploadWidget`] backed by Leptos signals.

use std::rc::Rc;

use leptos::html::Input;
use leptos::*;
use web_sys::{DragEvent, Event, FileList, HtmlInputElement};

use crate::services::FetchTransport;
use crate::widget::{UploadWidget, WidgetView};
use crate::{LogEntry, SelectedFile, UiState, WidgetConfig};

/// The widget as mounted in the page.
pub type BrowserWidget = UploadWidget<FetchTransport, SignalView, WriteSignal<Vec<LogEntry>>>;

/// [`WidgetView`] writing into Leptos signals.
#[derive(Clone, Copy)]
pub struct SignalView {
    pub set_state: WriteSignal<UiState>,
    pub set_video_src: WriteSignal<String>,
    pub set_download_href: WriteSignal<String>,
    pub set_error_html: WriteSignal<String>,
    pub file_input: NodeRef<Input>,
}

impl WidgetView for SignalView {
    fn show(&self, state: &UiState) {
        self.set_state.set(state.clone());
    }

    fn set_video_source(&self, src: &str) {
        self.set_video_src.set(src.to_string());
    }

    fn set_download_link(&self, href: &str) {
        self.set_download_href.set(href.to_string());
    }

    fn set_error_markup(&self, html: &str) {
        self.set_error_html.set(html.to_string());
    }

    fn clear_file_input(&self) {
        if let Some(input) = self.file_input.get_untracked() {
            input.set_value("");
        }
    }
}

fn selected_files(files: Option<FileList>) -> Vec<SelectedFile<web_sys::File>> {
    let Some(files) = files else {
        return Vec::new();
    };
    (0..files.length())
        .filter_map(|i| files.get(i))
        .map(SelectedFile::from)
        .collect()
}

#[component]
pub fn UploadSection(
    set_logs: WriteSignal<Vec<LogEntry>>,
    #[prop(optional)] config: Option<WidgetConfig>,
) -> impl IntoView {
    let (state, set_state) = create_signal(UiState::Idle);
    let (video_src, set_video_src) = create_signal(String::new());
    let (download_href, set_download_href) = create_signal(String::new());
    let (error_html, set_error_html) = create_signal(String::new());
    let (drag_over, set_drag_over) = create_signal(false);
    let file_input = create_node_ref::<Input>();

    let view = SignalView {
        set_state,
        set_video_src,
        set_download_href,
        set_error_html,
        file_input,
    };
    let widget: StoredValue<Rc<BrowserWidget>> = store_value(Rc::new(UploadWidget::new(
        FetchTransport,
        view,
        set_logs,
        config.unwrap_or_default(),
    )));

    let handle_files = move |files: Option<FileList>| {
        let files = selected_files(files);
        if files.is_empty() {
            return;
        }
        let widget = widget.get_value();
        spawn_local(async move {
            widget.accept_input(files).await;
        });
    };

    let on_file_change = move |ev: Event| {
        let input: HtmlInputElement = event_target(&ev);
        handle_files(input.files());
    };

    let on_drag_enter = move |ev: DragEvent| {
        ev.prevent_default();
        ev.stop_propagation();
        set_drag_over.set(true);
    };

    let on_drag_leave = move |ev: DragEvent| {
        ev.prevent_default();
        ev.stop_propagation();
        set_drag_over.set(false);
    };

    let on_drop = move |ev: DragEvent| {
        ev.prevent_default();
        ev.stop_propagation();
        set_drag_over.set(false);
        handle_files(ev.data_transfer().and_then(|dt| dt.files()));
    };

    // Clicking the whole zone opens the picker
    let trigger_file_input = move |_| {
        if state.get_untracked() == UiState::Idle {
            if let Some(input) = file_input.get_untracked() {
                input.click();
            }
        }
    };

    let on_reset = move |_| widget.with_value(|w| w.reset());

    view! {
        <div
            class="drop-zone"
            id="drop-zone"
            class=("drag-over", move || drag_over.get())
            on:dragenter=on_drag_enter
            on:dragover=on_drag_enter
            on:dragleave=on_drag_leave
            on:drop=on_drop
        >
            <div
                id="upload-content"
                class="upload-content"
                class:hidden=move || state.get() != UiState::Idle
                on:click=trigger_file_input
            >
                <div class="upload-icon">"🎬"</div>
                <div class="upload-text">"اسحب الفيديو وأفلته هنا"</div>
                <div class="upload-hint">"أو انقر لاختيار ملف"</div>
                <input
                    type="file"
                    id="file-input"
                    accept="video/*"
                    style="display:none"
                    node_ref=file_input
                    on:change=on_file_change
                    on:click=|ev| ev.stop_propagation()
                />
            </div>

            <div
                id="loading-state"
                class="loading-state"
                class:hidden=move || !state.get().is_loading()
            >
                <div class="spinner"></div>
                <div class="loading-text">"⏳ جاري رفع الفيديو وتحسين جودته..."</div>
            </div>

            <div
                id="result-state"
                class="result-state"
                class:hidden=move || state.with(|s| s.result_url().is_none())
            >
                <video
                    id="output-video"
                    controls=true
                    src=move || video_src.get()
                ></video>
                <div class="result-actions">
                    <a
                        id="download-btn"
                        class="download-btn"
                        href=move || download_href.get()
                        download=""
                    >
                        "تحميل الفيديو"
                    </a>
                    <button id="reset-btn" class="reset-btn" on:click=on_reset>
                        "رفع فيديو آخر"
                    </button>
                </div>
            </div>

            <div
                id="error-state"
                class="error-state"
                class:hidden=move || state.with(|s| s.error_message().is_none())
            >
                <div class="error-icon">"⚠️"</div>
                <div
                    id="error-text"
                    class="error-message"
                    prop:innerHTML=move || error_html.get()
                ></div>
                <button id="retry-btn" class="retry-btn" on:click=on_reset>
                    "حاول مرة أخرى"
                </button>
            </div>
        </div>
    }
}

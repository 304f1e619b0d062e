//! The upload widget controller.
//!
//! [`UploadWidget`] owns the render state and drives one upload at a time:
//!
//! ```text
//! Idle ──valid file──▶ Loading ──response──▶ Result | Error ──reset──▶ Idle
//!   └──────────── non-video file ─────────────────▶ Error
//! ```
//!
//! It does not touch the DOM directly. Rendering goes through a
//! [`WidgetView`], log lines through a [`LogSink`], and the request through an
//! [`UpscaleTransport`], so the whole flow can run in a plain `#[test]`.

use std::cell::RefCell;

use leptos::{SignalUpdate, WriteSignal};

use crate::config::WidgetConfig;
use crate::services::{escape_html, interpret_response, RawResponse, UploadRequest, UpscaleTransport};
use crate::types::{LogEntry, LogLevel, SelectedFile, UiState, UploadError, UpscaleResult};

/// The DOM regions the widget writes to.
pub trait WidgetView {
    /// Show the region for `state` and hide the others.
    fn show(&self, state: &UiState);
    /// `src` of the output video; empty clears it.
    fn set_video_source(&self, src: &str);
    /// `href` of the download button.
    fn set_download_link(&self, href: &str);
    /// Inner HTML of the error text; callers escape anything untrusted.
    fn set_error_markup(&self, html: &str);
    /// Forget the picked file so the same file can be picked again.
    fn clear_file_input(&self);
}

/// Destination of the visible log lines.
pub trait LogSink {
    fn append(&self, entry: LogEntry);
    fn clear(&self);
}

impl LogSink for WriteSignal<Vec<LogEntry>> {
    fn append(&self, entry: LogEntry) {
        self.update(|logs| logs.push(entry));
    }

    fn clear(&self) {
        self.update(|logs| logs.clear());
    }
}

/// What happened to a file selection.
#[derive(Clone, Debug, PartialEq)]
pub enum Admission {
    /// Empty selection
    Nothing,
    /// Not a video, error shown
    Rejected,
    /// Another upload is still in flight
    Busy,
    /// Uploaded; the widget is now in Result or Error
    Uploaded,
}

pub struct UploadWidget<T, V, L> {
    transport: T,
    view: V,
    log: L,
    config: WidgetConfig,
    state: RefCell<UiState>,
}

impl<T, V, L> UploadWidget<T, V, L>
where
    T: UpscaleTransport,
    V: WidgetView,
    L: LogSink,
{
    pub fn new(transport: T, view: V, log: L, config: WidgetConfig) -> Self {
        Self {
            transport,
            view,
            log,
            config,
            state: RefCell::new(UiState::Idle),
        }
    }

    pub fn state(&self) -> UiState {
        self.state.borrow().clone()
    }

    /// Handle a picker or drop selection. Only the first file is considered.
    ///
    /// Selections arriving while an upload is in flight are ignored.
    pub async fn accept_input(&self, files: Vec<SelectedFile<T::Blob>>) -> Admission {
        let Some(file) = files.into_iter().next() else {
            return Admission::Nothing;
        };

        if self.state.borrow().is_loading() {
            self.add_log(
                LogLevel::Warning,
                format!("Upload already in progress, ignoring {}", file.name),
            );
            return Admission::Busy;
        }

        if !file.is_video() {
            log::warn!("Rejected {} ({})", file.name, file.mime_type);
            self.fail(UploadError::InvalidFile);
            return Admission::Rejected;
        }

        self.upload(file).await;
        Admission::Uploaded
    }

    /// Post `file` and render whatever comes back.
    pub async fn upload(&self, file: SelectedFile<T::Blob>) {
        self.set_state(UiState::Loading);

        self.add_log(
            LogLevel::Info,
            format!("Starting upload for file: {} ({:.2} MB)", file.name, file.size_mb()),
        );

        let url = self.config.request_url();
        self.add_log(LogLevel::Info, format!("Sending POST request to {}...", url));

        let request = UploadRequest {
            url: &url,
            field: &self.config.field,
            file: &file,
        };

        match self.transport.post_file(request).await {
            Ok(response) => self.handle_response(&response),
            Err(e) => self.fail(e),
        }
    }

    /// Render a server response.
    pub fn handle_response(&self, response: &RawResponse) {
        self.add_log(
            LogLevel::Info,
            format!("Response received. Status: {} {}", response.status, response.status_text),
        );

        match interpret_response(response) {
            Ok(result) => {
                self.add_log(LogLevel::Info, "Processing response data...");
                self.show_result(result);
            }
            Err(e) => {
                match &e {
                    UploadError::Server(detail) => {
                        self.add_log(LogLevel::Error, format!("Server returned error: {}", detail));
                    }
                    UploadError::NonJson { snippet, .. } => {
                        log::error!("Non-JSON response: {}", response.body);
                        self.add_log(LogLevel::Error, format!("Non-JSON Error received: {}", snippet));
                    }
                    UploadError::InvalidResponse => {
                        self.add_log(LogLevel::Error, "Error: Invalid response structure.");
                    }
                    _ => {}
                }
                self.fail(e);
            }
        }
    }

    /// Back to the drop zone with an empty log.
    pub fn reset(&self) {
        self.set_state(UiState::Idle);
        self.view.clear_file_input();
        self.view.set_video_source("");
        self.view.set_download_link("");
        self.view.set_error_markup("");
        self.log.clear();
    }

    fn show_result(&self, result: UpscaleResult) {
        match result {
            UpscaleResult::Video { url, kind } => {
                match kind {
                    Some(kind) => self.add_log(
                        LogLevel::Success,
                        format!("Success! Video URL: {} ({:?})", url, kind),
                    ),
                    None => self.add_log(LogLevel::Success, format!("Success! Video URL: {}", url)),
                }
                self.view.set_video_source(&url);
                self.view.set_download_link(&url);
                self.set_state(UiState::Result { url });
            }
            UpscaleResult::RawOutput(output) => {
                log::info!("Raw output: {}", output);
                self.add_log(LogLevel::Warning, "Warning: Raw output format received.");
                let message = UpscaleResult::raw_output_message(&output);
                self.view.set_error_markup(&escape_html(&message));
                self.set_state(UiState::Error { message });
            }
        }
    }

    fn fail(&self, error: UploadError) {
        let message = error.to_string();
        log::error!("Error: {:?}", error);
        self.add_log(LogLevel::Error, format!("EXCEPTION: {}", message));
        self.view.set_error_markup(&error.markup());
        self.set_state(UiState::Error { message });
    }

    /// The only place the state changes.
    fn set_state(&self, state: UiState) {
        log::debug!("Widget state -> {}", state.name());
        self.view.show(&state);
        *self.state.borrow_mut() = state;
    }

    fn add_log(&self, level: LogLevel, message: impl Into<String>) {
        let entry = LogEntry::now(level, message);
        log::info!("[Log] {}", entry.message);
        self.log.append(entry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Resolution, MSG_INVALID_FILE};
    use crate::types::UploadResult;
    use futures::executor::block_on;
    use serde_json::json;
    use std::cell::Cell;

    /// Records every request and answers with a canned response.
    #[derive(Default)]
    struct FakeTransport {
        requests: RefCell<Vec<(String, String, String)>>,
        reply: RefCell<Option<UploadResult<RawResponse>>>,
    }

    impl FakeTransport {
        fn replying(reply: UploadResult<RawResponse>) -> Self {
            Self {
                requests: RefCell::default(),
                reply: RefCell::new(Some(reply)),
            }
        }
    }

    impl UpscaleTransport for &FakeTransport {
        type Blob = Vec<u8>;

        async fn post_file(&self, request: UploadRequest<'_, Vec<u8>>) -> UploadResult<RawResponse> {
            self.requests.borrow_mut().push((
                request.url.to_string(),
                request.field.to_string(),
                request.file.name.clone(),
            ));
            self.reply
                .borrow_mut()
                .take()
                .unwrap_or_else(|| Err(UploadError::Transport("no reply".into())))
        }
    }

    #[derive(Default)]
    struct FakeView {
        shown: RefCell<Vec<UiState>>,
        video_src: RefCell<String>,
        download_href: RefCell<String>,
        error_markup: RefCell<String>,
        input_cleared: Cell<bool>,
    }

    impl WidgetView for &FakeView {
        fn show(&self, state: &UiState) {
            self.shown.borrow_mut().push(state.clone());
        }

        fn set_video_source(&self, src: &str) {
            *self.video_src.borrow_mut() = src.to_string();
        }

        fn set_download_link(&self, href: &str) {
            *self.download_href.borrow_mut() = href.to_string();
        }

        fn set_error_markup(&self, html: &str) {
            *self.error_markup.borrow_mut() = html.to_string();
        }

        fn clear_file_input(&self) {
            self.input_cleared.set(true);
        }
    }

    #[derive(Default)]
    struct FakeLog {
        entries: RefCell<Vec<LogEntry>>,
    }

    impl FakeLog {
        fn messages(&self) -> Vec<String> {
            self.entries.borrow().iter().map(|e| e.message.clone()).collect()
        }
    }

    impl LogSink for &FakeLog {
        fn append(&self, entry: LogEntry) {
            self.entries.borrow_mut().push(entry);
        }

        fn clear(&self) {
            self.entries.borrow_mut().clear();
        }
    }

    fn json_reply(status: u16, body: serde_json::Value) -> UploadResult<RawResponse> {
        Ok(RawResponse {
            status,
            status_text: if status == 200 { "OK".into() } else { "Internal Server Error".into() },
            content_type: Some("application/json".into()),
            body: body.to_string(),
        })
    }

    fn video(name: &str) -> SelectedFile<Vec<u8>> {
        SelectedFile::new(name, 3 * 1024 * 1024, "video/mp4", vec![0u8; 16])
    }

    fn widget<'a>(
        transport: &'a FakeTransport,
        view: &'a FakeView,
        log: &'a FakeLog,
    ) -> UploadWidget<&'a FakeTransport, &'a FakeView, &'a FakeLog> {
        UploadWidget::new(transport, view, log, WidgetConfig::default())
    }

    /// Upload one video against a canned reply and return the final state.
    fn run(reply: UploadResult<RawResponse>) -> (UiState, FakeTransport, FakeView, FakeLog) {
        let transport = FakeTransport::replying(reply);
        let view = FakeView::default();
        let log = FakeLog::default();
        let state = {
            let w = widget(&transport, &view, &log);
            assert_eq!(block_on(w.accept_input(vec![video("clip.mp4")])), Admission::Uploaded);
            w.state()
        };
        (state, transport, view, log)
    }

    #[test]
    fn test_non_video_is_rejected_without_request() {
        for mime in ["image/png", "audio/mpeg", "text/plain", "", "application/video"] {
            let transport = FakeTransport::default();
            let view = FakeView::default();
            let log = FakeLog::default();
            let w = widget(&transport, &view, &log);

            let file = SelectedFile::new("notes", 10, mime, Vec::new());
            assert_eq!(block_on(w.accept_input(vec![file])), Admission::Rejected);

            assert_eq!(w.state(), UiState::Error { message: MSG_INVALID_FILE.into() });
            assert!(transport.requests.borrow().is_empty());
            assert!(log.messages().iter().any(|m| m.starts_with("EXCEPTION:")));
        }
    }

    #[test]
    fn test_video_goes_through_loading_and_posts_once() {
        for mime in ["video/mp4", "video/webm", "video/quicktime"] {
            let transport = FakeTransport::replying(json_reply(200, json!({"url": "/out.mp4"})));
            let view = FakeView::default();
            let log = FakeLog::default();
            let w = widget(&transport, &view, &log);

            let file = SelectedFile::new("clip", 2048, mime, vec![1, 2, 3]);
            block_on(w.accept_input(vec![file]));

            assert_eq!(view.shown.borrow().first(), Some(&UiState::Loading));
            assert_eq!(
                *transport.requests.borrow(),
                vec![("/api/upscale".to_string(), "file".to_string(), "clip".to_string())]
            );
        }
    }

    #[test]
    fn test_only_first_file_is_used() {
        let transport = FakeTransport::replying(json_reply(200, json!({"url": "/out.mp4"})));
        let view = FakeView::default();
        let log = FakeLog::default();
        let w = widget(&transport, &view, &log);

        block_on(w.accept_input(vec![video("first.mp4"), video("second.mp4")]));

        let requests = transport.requests.borrow();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].2, "first.mp4");
    }

    #[test]
    fn test_empty_selection_does_nothing() {
        let transport = FakeTransport::default();
        let view = FakeView::default();
        let log = FakeLog::default();
        let w = widget(&transport, &view, &log);

        assert_eq!(block_on(w.accept_input(Vec::new())), Admission::Nothing);
        assert_eq!(w.state(), UiState::Idle);
        assert!(view.shown.borrow().is_empty());
        assert!(log.entries.borrow().is_empty());
    }

    #[test]
    fn test_url_response_shows_result() {
        let (state, _, view, log) = run(json_reply(200, json!({"url": "https://x/y.mp4"})));

        assert_eq!(state, UiState::Result { url: "https://x/y.mp4".into() });
        assert_eq!(*view.video_src.borrow(), "https://x/y.mp4");
        assert_eq!(*view.download_href.borrow(), "https://x/y.mp4");
        assert_eq!(
            log.messages(),
            vec![
                "Starting upload for file: clip.mp4 (3.00 MB)",
                "Sending POST request to /api/upscale...",
                "Response received. Status: 200 OK",
                "Processing response data...",
                "Success! Video URL: https://x/y.mp4",
            ]
        );
    }

    #[test]
    fn test_server_detail_is_shown_verbatim() {
        let (state, _, view, log) = run(json_reply(500, json!({"detail": "bad codec"})));

        assert_eq!(state, UiState::Error { message: "bad codec".into() });
        assert!(view.video_src.borrow().is_empty());
        assert!(log.messages().contains(&"Server returned error: bad codec".to_string()));
        assert_eq!(log.entries.borrow().last().map(|e| e.level.clone()), Some(LogLevel::Error));
    }

    #[test]
    fn test_html_error_page() {
        let body = format!("<html><body>{}</body></html>", "Gateway Timeout ".repeat(20));
        let (state, _, _, log) = run(Ok(RawResponse {
            status: 500,
            status_text: "Internal Server Error".into(),
            content_type: Some("text/html".into()),
            body: body.clone(),
        }));

        let snippet: String = body.chars().take(200).collect();
        let escaped = snippet.replace('<', "&lt;").replace('>', "&gt;");
        let message = state.error_message().unwrap();
        assert!(message.contains("(500)"));
        assert!(message.contains(&escaped));
        assert!(log.messages().iter().any(|m| m.starts_with("Non-JSON Error received: &lt;html&gt;")));
    }

    #[test]
    fn test_server_markup_is_escaped() {
        let (state, _, view, _) = run(json_reply(500, json!({"detail": "<script>alert(1)</script>"})));

        assert_eq!(state, UiState::Error { message: "<script>alert(1)</script>".into() });
        assert_eq!(*view.error_markup.borrow(), "&lt;script&gt;alert(1)&lt;/script&gt;");
    }

    #[test]
    fn test_raw_output_markup_is_escaped() {
        let (_, _, view, _) = run(json_reply(200, json!({"output": "<b>done</b>"})));

        assert_eq!(*view.error_markup.borrow(), "المخرجات: &lt;b&gt;done&lt;/b&gt;");
    }

    #[test]
    fn test_html_snippet_is_not_escaped_twice() {
        let (state, _, view, _) = run(Ok(RawResponse {
            status: 502,
            status_text: "Bad Gateway".into(),
            content_type: Some("text/html".into()),
            body: "<h1>Bad Gateway</h1>".into(),
        }));

        assert_eq!(*view.error_markup.borrow(), state.error_message().unwrap());
        assert!(view.error_markup.borrow().contains("&lt;h1&gt;Bad Gateway"));
    }

    #[test]
    fn test_array_body_is_invalid_structure() {
        let (state, _, view, _) = run(json_reply(200, json!([1, 2])));

        assert_eq!(state, UiState::Error { message: "استجابة غير صالحة من السيرفر".into() });
        assert!(view.video_src.borrow().is_empty());
    }

    #[test]
    fn test_output_url_fallback() {
        let (state, _, view, log) = run(json_reply(200, json!({"output": "https://x/y.mp4"})));

        assert_eq!(state, UiState::Result { url: "https://x/y.mp4".into() });
        assert_eq!(*view.download_href.borrow(), "https://x/y.mp4");
        assert!(!log.messages().iter().any(|m| m.contains("Raw output")));
    }

    #[test]
    fn test_output_object_is_shown_as_error() {
        let (state, _, view, log) = run(json_reply(200, json!({"output": {"foo": 1}})));

        let message = state.error_message().unwrap();
        assert!(message.contains(r#"{"foo":1}"#));
        assert!(view.video_src.borrow().is_empty());
        assert!(log.messages().contains(&"Warning: Raw output format received.".to_string()));
    }

    #[test]
    fn test_invalid_structure() {
        let (state, _, _, log) = run(json_reply(200, json!({"status": "ok"})));

        assert_eq!(state, UiState::Error { message: "استجابة غير صالحة من السيرفر".into() });
        assert!(log.messages().contains(&"Error: Invalid response structure.".to_string()));
    }

    #[test]
    fn test_transport_failure() {
        let (state, _, _, log) = run(Err(UploadError::Transport("HTTP request failed: offline".into())));

        assert_eq!(state, UiState::Error { message: "HTTP request failed: offline".into() });
        assert_eq!(
            log.messages().last().map(String::as_str),
            Some("EXCEPTION: HTTP request failed: offline")
        );
    }

    #[test]
    fn test_reset_after_terminal_states() {
        let replies = vec![
            json_reply(200, json!({"url": "https://x/y.mp4"})),
            json_reply(500, json!({"detail": "bad codec"})),
            json_reply(200, json!({"output": {"foo": 1}})),
        ];

        for reply in replies {
            let transport = FakeTransport::replying(reply);
            let view = FakeView::default();
            let log = FakeLog::default();
            let w = widget(&transport, &view, &log);

            block_on(w.accept_input(vec![video("clip.mp4")]));
            assert!(!log.entries.borrow().is_empty());

            w.reset();

            assert_eq!(w.state(), UiState::Idle);
            assert_eq!(view.shown.borrow().last(), Some(&UiState::Idle));
            assert!(log.entries.borrow().is_empty());
            assert!(view.video_src.borrow().is_empty());
            assert!(view.error_markup.borrow().is_empty());
            assert!(view.input_cleared.get());
        }
    }

    #[test]
    fn test_selection_while_loading_is_ignored() {
        let transport = FakeTransport::default();
        let view = FakeView::default();
        let log = FakeLog::default();
        let w = widget(&transport, &view, &log);

        w.set_state(UiState::Loading);
        assert_eq!(block_on(w.accept_input(vec![video("late.mp4")])), Admission::Busy);

        assert!(transport.requests.borrow().is_empty());
        assert_eq!(w.state(), UiState::Loading);
        assert_eq!(log.entries.borrow()[0].level, LogLevel::Warning);
    }

    #[test]
    fn test_new_file_after_error_uploads_again() {
        let transport = FakeTransport::replying(json_reply(200, json!({"url": "/out.mp4"})));
        let view = FakeView::default();
        let log = FakeLog::default();
        let w = widget(&transport, &view, &log);

        block_on(w.accept_input(vec![SelectedFile::new("a.txt", 1, "text/plain", Vec::new())]));
        assert!(w.state().error_message().is_some());

        block_on(w.accept_input(vec![video("clip.mp4")]));
        assert_eq!(w.state(), UiState::Result { url: "/out.mp4".into() });
    }

    #[test]
    fn test_target_resolution_is_sent() {
        let transport = FakeTransport::replying(json_reply(200, json!({"url": "/out.mp4"})));
        let view = FakeView::default();
        let log = FakeLog::default();
        let config = WidgetConfig::default().with_target_resolution(Resolution { width: 1280, height: 720 });
        let w = UploadWidget::new(&transport, &view, &log, config);

        block_on(w.accept_input(vec![video("clip.mp4")]));

        assert_eq!(transport.requests.borrow()[0].0, "/api/upscale?target_resolution=1280x720");
    }
}

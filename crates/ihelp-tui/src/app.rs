use ihelp_core::{BackendClient, DocumentRef, GatewayError, Session};
use ratatui::layout::Rect;
use ratatui::widgets::ListState;
use tokio::task::{JoinError, JoinHandle};
use tracing::{error, info};

/// Quick prompts offered under the input box
pub const SUGGESTIONS: [&str; 3] = [
    "Summarize the document",
    "Key findings?",
    "Main conclusions?",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

type DocumentsResult = Result<Vec<DocumentRef>, GatewayError>;

pub struct App {
    pub should_quit: bool,
    pub input_mode: InputMode,

    pub session: Session,
    client: BackendClient,

    // Message input
    pub input: String,
    pub input_cursor: usize, // cursor position in chars

    // Chat view
    pub chat_scroll: u16,
    pub chat_height: u16,         // visible rows inside the chat block
    pub chat_width: u16,          // visible columns inside the chat block
    pub chat_content_height: u16, // wrapped rows of the whole transcript
    pub chat_area: Option<Rect>,
    seen_revision: Option<u64>,

    // In-flight requests
    pub chat_task: Option<JoinHandle<String>>,
    pub documents_task: Option<JoinHandle<DocumentsResult>>,

    // Document picker
    pub show_document_picker: bool,
    pub document_picker_state: ListState,

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation
}

impl App {
    pub fn new(session: Session, client: BackendClient) -> Self {
        Self {
            should_quit: false,
            input_mode: InputMode::Editing,

            session,
            client,

            input: String::new(),
            input_cursor: 0,

            chat_scroll: 0,
            chat_height: 0,
            chat_width: 0,
            chat_content_height: 0,
            chat_area: None,
            seen_revision: None,

            chat_task: None,
            documents_task: None,

            show_document_picker: false,
            document_picker_state: ListState::default(),

            animation_frame: 0,
        }
    }

    pub fn backend_url(&self) -> &str {
        &self.client.settings().base_url
    }

    pub fn can_send(&self) -> bool {
        !self.session.is_pending() && !self.input.trim().is_empty()
    }

    /// Send the current input. Ignored while a reply is pending or the input is blank.
    pub fn submit(&mut self) {
        let Some(request) = self.session.begin_send(&self.input) else {
            return;
        };

        self.input.clear();
        self.input_cursor = 0;

        let client = self.client.clone();
        self.chat_task = Some(tokio::spawn(async move { client.send_chat(&request).await }));
    }

    /// Runs whenever the chat task ends, however it ended
    pub fn complete_chat(&mut self, result: Result<String, JoinError>) {
        self.chat_task = None;

        let reply = result.unwrap_or_else(|e| {
            error!(error = %e, "chat task failed");
            GatewayError::Unknown(e.to_string()).user_message()
        });

        self.session.finish_send(reply);
        self.input_mode = InputMode::Editing;
    }

    // Document picker

    pub fn open_document_picker(&mut self) {
        self.show_document_picker = true;
        self.document_picker_state.select(None);

        if self.documents_task.is_none() {
            let client = self.client.clone();
            self.documents_task = Some(tokio::spawn(async move { client.list_documents().await }));
        }
    }

    pub fn close_document_picker(&mut self) {
        self.show_document_picker = false;
    }

    pub fn documents_loading(&self) -> bool {
        self.documents_task.is_some()
    }

    pub fn complete_documents(&mut self, result: Result<DocumentsResult, JoinError>) {
        self.documents_task = None;

        let result = result.unwrap_or_else(|e| {
            error!(error = %e, "document task failed");
            Err(GatewayError::Unknown(e.to_string()))
        });
        let failed = result.is_err();

        let count = self.session.apply_documents(result).len();
        info!(count, "document list updated");

        if failed {
            // The explanation is in the chat
            self.show_document_picker = false;
            return;
        }

        let selected = self
            .session
            .active_document()
            .and_then(|id| self.session.documents().iter().position(|d| d.id == id))
            .or((count > 0).then_some(0));
        self.document_picker_state.select(selected);
    }

    pub fn document_picker_nav_down(&mut self) {
        let len = self.session.documents().len();
        if len > 0 {
            let i = self.document_picker_state.selected().unwrap_or(0);
            self.document_picker_state.select(Some((i + 1).min(len - 1)));
        }
    }

    pub fn document_picker_nav_up(&mut self) {
        if self.session.documents().is_empty() {
            return;
        }
        let i = self.document_picker_state.selected().unwrap_or(0);
        self.document_picker_state.select(Some(i.saturating_sub(1)));
    }

    /// Make the highlighted document the active one. Nothing to pick in an empty list.
    pub fn select_document(&mut self) {
        let Some(doc) = self
            .document_picker_state
            .selected()
            .and_then(|i| self.session.documents().get(i))
        else {
            return;
        };

        let id = doc.id.clone();
        self.session.set_active_document(Some(id));
        self.show_document_picker = false;
        self.input_mode = InputMode::Editing;
    }

    pub fn clear_document(&mut self) {
        self.session.set_active_document(None);
        self.show_document_picker = false;
    }

    /// Title of the active document when it is in the fetched list, otherwise its id
    pub fn active_document_title(&self) -> Option<&str> {
        let id = self.session.active_document()?;
        Some(
            self.session
                .documents()
                .iter()
                .find(|d| d.id == id)
                .map(|d| d.display_title())
                .unwrap_or(id),
        )
    }

    pub fn apply_suggestion(&mut self, index: usize) {
        if let Some(suggestion) = SUGGESTIONS.get(index) {
            self.input = suggestion.to_string();
            self.input_cursor = self.input.chars().count();
            self.input_mode = InputMode::Editing;
        }
    }

    // Input editing

    pub fn insert_char(&mut self, c: char) {
        let byte_pos = char_to_byte_index(&self.input, self.input_cursor);
        self.input.insert(byte_pos, c);
        self.input_cursor += 1;
    }

    pub fn insert_str(&mut self, text: &str) {
        for c in text.chars().filter(|c| *c != '\r') {
            self.insert_char(c);
        }
    }

    pub fn backspace(&mut self) {
        if self.input_cursor > 0 {
            self.input_cursor -= 1;
            let byte_pos = char_to_byte_index(&self.input, self.input_cursor);
            self.input.remove(byte_pos);
        }
    }

    pub fn delete(&mut self) {
        if self.input_cursor < self.input.chars().count() {
            let byte_pos = char_to_byte_index(&self.input, self.input_cursor);
            self.input.remove(byte_pos);
        }
    }

    pub fn cursor_left(&mut self) {
        self.input_cursor = self.input_cursor.saturating_sub(1);
    }

    pub fn cursor_right(&mut self) {
        self.input_cursor = (self.input_cursor + 1).min(self.input.chars().count());
    }

    pub fn cursor_home(&mut self) {
        self.input_cursor = 0;
    }

    pub fn cursor_end(&mut self) {
        self.input_cursor = self.input.chars().count();
    }

    // Chat scrolling

    pub fn max_chat_scroll(&self) -> u16 {
        self.chat_content_height.saturating_sub(self.chat_height)
    }

    pub fn scroll_chat_down(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_add(lines).min(self.max_chat_scroll());
    }

    pub fn scroll_chat_up(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_sub(lines);
    }

    pub fn scroll_chat_page_down(&mut self) {
        self.scroll_chat_down((self.chat_height / 2).max(1));
    }

    pub fn scroll_chat_page_up(&mut self) {
        self.scroll_chat_up((self.chat_height / 2).max(1));
    }

    pub fn scroll_chat_to_bottom(&mut self) {
        self.chat_scroll = self.max_chat_scroll();
    }

    /// Called after the transcript is measured: jump to the latest entry
    /// whenever the session changed since the last frame.
    pub fn sync_scroll(&mut self) {
        let revision = self.session.revision();
        if self.seen_revision != Some(revision) {
            self.seen_revision = Some(revision);
            self.scroll_chat_to_bottom();
        }
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.session.is_pending() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }
}

/// Wait for a task if there is one; never resolves otherwise
pub async fn wait_for<T>(task: &mut Option<JoinHandle<T>>) -> Result<T, JoinError> {
    match task.as_mut() {
        Some(handle) => handle.await,
        None => std::future::pending().await,
    }
}

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

/// Row and column (in chars) of the cursor within multi-line input
pub fn cursor_row_col(input: &str, cursor: usize) -> (usize, usize) {
    let mut row = 0;
    let mut col = 0;
    for c in input.chars().take(cursor) {
        if c == '\n' {
            row += 1;
            col = 0;
        } else {
            col += 1;
        }
    }
    (row, col)
}

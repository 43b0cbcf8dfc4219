use crate::api::client::ApiClient;
use crate::api::models::{Queue, QueuePage, QueueRecord, QueueSummary, RecordStatus};
use crate::tui::executor::{BatchAction, BatchDispatch, BatchOutcome, Executor};
use crate::tui::handlers::{
    BrowseModeAction, ConfirmModeAction, HelpModeAction, KeyHandler, NotesModeAction,
    SelectModeAction,
};
use crate::tui::selection::Selection;
use anyhow::Result;
use crossterm::event::KeyEvent;
use std::sync::Arc;

/// Per-view state machine. `Confirming` always has a pending action set and
/// `Notes` always has a prompt set; the executor's loading flag stands in
/// for the "executing" state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    Browsing,
    Selecting,
    Confirming,
    Notes,
}

/// Action waiting behind the confirmation dialog. Built from an immutable
/// snapshot of the selection, so toggling rows while the dialog is open
/// cannot change what gets sent.
#[derive(Debug, Clone, PartialEq)]
pub enum PendingAction {
    Batch {
        action: BatchAction,
        ids: Vec<u64>,
        sample: Vec<String>,
    },
    DeleteOne {
        id: u64,
        name: String,
    },
}

/// Inline text entry for rejection notes.
#[derive(Debug, Clone)]
pub struct NotesPrompt {
    pub id: u64,
    pub name: String,
    pub buffer: String,
    pub cursor: usize,
}

impl NotesPrompt {
    fn new(id: u64, name: String) -> Self {
        Self {
            id,
            name,
            buffer: String::new(),
            cursor: 0,
        }
    }

    fn insert_char(&mut self, c: char) {
        self.buffer.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    fn backspace(&mut self) {
        if let Some(c) = self.buffer[..self.cursor].chars().next_back() {
            self.cursor -= c.len_utf8();
            self.buffer.remove(self.cursor);
        }
    }

    fn delete(&mut self) {
        if self.cursor < self.buffer.len() {
            self.buffer.remove(self.cursor);
        }
    }

    fn move_cursor_left(&mut self) {
        if let Some(c) = self.buffer[..self.cursor].chars().next_back() {
            self.cursor -= c.len_utf8();
        }
    }

    fn move_cursor_right(&mut self) {
        if let Some(c) = self.buffer[self.cursor..].chars().next() {
            self.cursor += c.len_utf8();
        }
    }
}

pub struct App {
    pub queue: Queue,
    pub rows: Vec<QueueRecord>,
    pub page: u32,
    pub page_size: u32,
    pub total: u64,
    pub total_pages: u32,
    pub summary: Option<QueueSummary>,
    pub cursor: usize,
    pub mode: AppMode,
    pub help_visible: bool,
    pub selection: Selection,
    pub executor: Executor,
    pub pending: Option<PendingAction>,
    pub notes: Option<NotesPrompt>,
    pub status: Option<String>,
    pub error: Option<String>,
    pub should_quit: bool,
    needs_refresh: bool,
    client: Option<Arc<ApiClient>>,
}

impl App {
    pub fn new(queue: Queue, client: Arc<ApiClient>, page_size: u32) -> Self {
        let dispatch: Arc<dyn BatchDispatch> = client.clone();
        Self::build(queue, Some(client), dispatch, page_size)
    }

    #[cfg(test)]
    pub(crate) fn with_dispatch(
        queue: Queue,
        dispatch: Arc<dyn BatchDispatch>,
        page_size: u32,
    ) -> Self {
        Self::build(queue, None, dispatch, page_size)
    }

    fn build(
        queue: Queue,
        client: Option<Arc<ApiClient>>,
        dispatch: Arc<dyn BatchDispatch>,
        page_size: u32,
    ) -> Self {
        Self {
            queue,
            rows: Vec::new(),
            page: 1,
            page_size,
            total: 0,
            total_pages: 1,
            summary: None,
            cursor: 0,
            mode: AppMode::Browsing,
            help_visible: false,
            selection: Selection::new(),
            executor: Executor::new(dispatch),
            pending: None,
            notes: None,
            status: None,
            error: None,
            should_quit: false,
            needs_refresh: false,
            client,
        }
    }

    pub fn handle_key_event(&mut self, key_event: KeyEvent) -> Result<()> {
        if self.help_visible {
            self.handle_help_mode_key(key_event);
            return Ok(());
        }
        match self.mode {
            AppMode::Browsing => self.handle_browse_mode_key(key_event),
            AppMode::Selecting => self.handle_select_mode_key(key_event),
            AppMode::Confirming => self.handle_confirm_mode_key(key_event),
            AppMode::Notes => self.handle_notes_mode_key(key_event),
        }
        Ok(())
    }

    fn handle_browse_mode_key(&mut self, key_event: KeyEvent) {
        match KeyHandler::handle_browse_mode_key(key_event) {
            BrowseModeAction::Quit => self.should_quit = true,
            BrowseModeAction::CursorUp => self.move_cursor_up(),
            BrowseModeAction::CursorDown => self.move_cursor_down(),
            BrowseModeAction::NextPage => self.next_page(),
            BrowseModeAction::PrevPage => self.prev_page(),
            BrowseModeAction::Refresh => self.needs_refresh = true,
            BrowseModeAction::SwitchQueue => self.switch_queue(),
            BrowseModeAction::EnterSelection => self.enter_selection(),
            BrowseModeAction::ToggleCurrent => {
                self.enter_selection();
                self.toggle_current();
            }
            BrowseModeAction::ApproveCurrent => self.approve_current(),
            BrowseModeAction::RejectCurrent => self.open_notes_prompt(),
            BrowseModeAction::DeleteCurrent => self.request_delete_current(),
            BrowseModeAction::ToggleHelp => self.help_visible = true,
            BrowseModeAction::None => {}
        }
    }

    fn handle_select_mode_key(&mut self, key_event: KeyEvent) {
        match KeyHandler::handle_select_mode_key(key_event) {
            SelectModeAction::Quit => self.should_quit = true,
            SelectModeAction::CursorUp => self.move_cursor_up(),
            SelectModeAction::CursorDown => self.move_cursor_down(),
            SelectModeAction::ToggleRow => self.toggle_current(),
            SelectModeAction::ToggleAll => {
                let visible: Vec<u64> = self.rows.iter().map(|r| r.id).collect();
                self.selection.toggle_all(&visible);
            }
            SelectModeAction::ExitSelection => {
                self.selection.exit();
                self.mode = AppMode::Browsing;
            }
            SelectModeAction::Approve => self.begin_batch(BatchAction::Approve),
            SelectModeAction::Reject => self.begin_batch(BatchAction::Reject),
            SelectModeAction::Delete => self.begin_batch(BatchAction::Delete),
            SelectModeAction::ToggleHelp => self.help_visible = true,
            SelectModeAction::None => {}
        }
    }

    fn handle_confirm_mode_key(&mut self, key_event: KeyEvent) {
        match KeyHandler::handle_confirm_mode_key(key_event) {
            ConfirmModeAction::Confirm => self.confirm_pending(),
            ConfirmModeAction::Cancel => {
                // No network call; selection stays exactly as it was.
                self.pending = None;
                self.mode = if self.selection.is_active() {
                    AppMode::Selecting
                } else {
                    AppMode::Browsing
                };
            }
            ConfirmModeAction::None => {}
        }
    }

    fn handle_notes_mode_key(&mut self, key_event: KeyEvent) {
        match KeyHandler::handle_notes_mode_key(key_event) {
            NotesModeAction::Cancel => {
                self.notes = None;
                self.mode = AppMode::Browsing;
            }
            NotesModeAction::Submit => self.submit_notes(),
            NotesModeAction::Backspace => {
                if let Some(prompt) = self.notes.as_mut() {
                    prompt.backspace();
                }
            }
            NotesModeAction::Delete => {
                if let Some(prompt) = self.notes.as_mut() {
                    prompt.delete();
                }
            }
            NotesModeAction::MoveCursorLeft => {
                if let Some(prompt) = self.notes.as_mut() {
                    prompt.move_cursor_left();
                }
            }
            NotesModeAction::MoveCursorRight => {
                if let Some(prompt) = self.notes.as_mut() {
                    prompt.move_cursor_right();
                }
            }
            NotesModeAction::MoveCursorHome => {
                if let Some(prompt) = self.notes.as_mut() {
                    prompt.cursor = 0;
                }
            }
            NotesModeAction::MoveCursorEnd => {
                if let Some(prompt) = self.notes.as_mut() {
                    prompt.cursor = prompt.buffer.len();
                }
            }
            NotesModeAction::InsertChar(c) => {
                if let Some(prompt) = self.notes.as_mut() {
                    prompt.insert_char(c);
                }
            }
            NotesModeAction::None => {}
        }
    }

    fn handle_help_mode_key(&mut self, key_event: KeyEvent) {
        if KeyHandler::handle_help_mode_key(key_event) == HelpModeAction::ExitHelpMode {
            self.help_visible = false;
        }
    }

    fn move_cursor_up(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
        }
    }

    fn move_cursor_down(&mut self) {
        if self.cursor < self.rows.len().saturating_sub(1) {
            self.cursor += 1;
        }
    }

    fn enter_selection(&mut self) {
        if self.rows.is_empty() {
            return;
        }
        self.selection.enter();
        self.mode = AppMode::Selecting;
        self.status = None;
    }

    fn toggle_current(&mut self) {
        if let Some(row) = self.rows.get(self.cursor) {
            self.selection.toggle(row.id);
        }
    }

    /// Snapshot the selection and open the confirmation dialog. No network
    /// traffic happens here; that waits for an explicit confirm.
    fn begin_batch(&mut self, action: BatchAction) {
        if self.executor.is_loading() {
            return;
        }
        if action.endpoint(self.queue).is_none() {
            self.status = Some(format!(
                "{} is not available for this queue",
                action.label()
            ));
            return;
        }

        let ids: Vec<u64> = self
            .rows
            .iter()
            .filter(|r| self.selection.is_selected(r.id))
            .map(|r| r.id)
            .collect();
        if ids.is_empty() {
            self.status = Some("nothing selected".to_string());
            return;
        }

        let sample: Vec<String> = self
            .rows
            .iter()
            .filter(|r| self.selection.is_selected(r.id))
            .take(3)
            .map(|r| r.full_name.clone())
            .collect();

        self.pending = Some(PendingAction::Batch {
            action,
            ids,
            sample,
        });
        self.mode = AppMode::Confirming;
    }

    fn confirm_pending(&mut self) {
        let Some(pending) = self.pending.take() else {
            self.mode = AppMode::Browsing;
            return;
        };
        match pending {
            PendingAction::Batch { action, ids, .. } => {
                self.mode = AppMode::Selecting;
                self.status = None;
                if let Err(e) = self.executor.start(self.queue, action, ids) {
                    self.error = Some(e.to_string());
                }
            }
            PendingAction::DeleteOne { id, name } => {
                self.mode = AppMode::Browsing;
                self.delete_one(id, &name);
            }
        }
    }

    /// Drain the executor once per event-loop tick.
    pub fn on_tick(&mut self) {
        if let Some(outcome) = self.executor.poll() {
            self.apply_outcome(outcome);
        }
    }

    fn apply_outcome(&mut self, outcome: BatchOutcome) {
        match outcome.result {
            Ok(count) => {
                self.status = Some(outcome.action.success_message(count));
                self.error = None;
                self.selection.exit();
                self.mode = AppMode::Browsing;
                self.needs_refresh = true;
            }
            Err(_) => {
                // The executor keeps the message; the selection stays intact
                // so the operator can retry without re-selecting.
            }
        }
    }

    fn approve_current(&mut self) {
        if self.queue != Queue::Membership {
            self.status = Some("approve is not available for this queue".to_string());
            return;
        }
        if self.executor.is_loading() {
            return;
        }
        let Some(row) = self.rows.get(self.cursor) else {
            return;
        };
        let (id, name) = (row.id, row.full_name.clone());
        let Some(client) = self.client.clone() else {
            return;
        };
        match client.update_status(id, RecordStatus::Approved, None) {
            Ok(()) => {
                self.status = Some(format!("Approved {name}"));
                self.error = None;
                self.needs_refresh = true;
            }
            Err(e) => self.error = Some(e.to_string()),
        }
    }

    fn open_notes_prompt(&mut self) {
        if self.queue != Queue::Membership {
            self.status = Some("reject is not available for this queue".to_string());
            return;
        }
        if self.executor.is_loading() {
            return;
        }
        if let Some(row) = self.rows.get(self.cursor) {
            self.notes = Some(NotesPrompt::new(row.id, row.full_name.clone()));
            self.mode = AppMode::Notes;
        }
    }

    fn submit_notes(&mut self) {
        let Some(prompt) = self.notes.take() else {
            self.mode = AppMode::Browsing;
            return;
        };
        self.mode = AppMode::Browsing;
        let Some(client) = self.client.clone() else {
            return;
        };
        let trimmed = prompt.buffer.trim();
        let notes = (!trimmed.is_empty()).then(|| trimmed.to_string());
        match client.update_status(prompt.id, RecordStatus::Rejected, notes) {
            Ok(()) => {
                self.status = Some(format!("Rejected {}", prompt.name));
                self.error = None;
                self.needs_refresh = true;
            }
            Err(e) => self.error = Some(e.to_string()),
        }
    }

    fn request_delete_current(&mut self) {
        if self.queue != Queue::Beneficiaries {
            self.status = Some("delete is not available for this queue".to_string());
            return;
        }
        if self.executor.is_loading() {
            return;
        }
        if let Some(row) = self.rows.get(self.cursor) {
            self.pending = Some(PendingAction::DeleteOne {
                id: row.id,
                name: row.full_name.clone(),
            });
            self.mode = AppMode::Confirming;
        }
    }

    fn delete_one(&mut self, id: u64, name: &str) {
        let Some(client) = self.client.clone() else {
            return;
        };
        match client.delete_beneficiary(id) {
            Ok(()) => {
                self.status = Some(format!("Deleted {name}"));
                self.error = None;
                self.needs_refresh = true;
            }
            Err(e) => self.error = Some(e.to_string()),
        }
    }

    fn next_page(&mut self) {
        if self.page < self.total_pages {
            self.page += 1;
            self.needs_refresh = true;
        }
    }

    fn prev_page(&mut self) {
        if self.page > 1 {
            self.page -= 1;
            self.needs_refresh = true;
        }
    }

    fn switch_queue(&mut self) {
        self.queue = self.queue.next();
        self.page = 1;
        self.cursor = 0;
        self.summary = None;
        self.selection.exit();
        self.mode = AppMode::Browsing;
        self.needs_refresh = true;
    }

    /// Fetch the current page from the API. Kept off the key-handling path;
    /// the event loop calls this whenever a refresh has been requested.
    pub fn refresh(&mut self) {
        let Some(client) = self.client.clone() else {
            return;
        };
        match client.list(self.queue, self.page, self.page_size) {
            Ok(page) => self.set_page(page),
            Err(e) => {
                tracing::error!(error = %e, queue = self.queue.title(), "failed to load queue page");
                self.error = Some(e.to_string());
            }
        }
    }

    /// Install a freshly loaded page and prune ids that are no longer part
    /// of the visible row set.
    pub fn set_page(&mut self, page: QueuePage) {
        self.rows = page.rows;
        if page.meta.page > 0 {
            self.page = page.meta.page;
        }
        if page.meta.page_size > 0 {
            self.page_size = page.meta.page_size;
        }
        self.total = page.meta.total;
        self.total_pages = page.meta.total_pages.max(1);
        self.summary = page.summary;

        let visible: Vec<u64> = self.rows.iter().map(|r| r.id).collect();
        self.selection.prune(&visible);
        if self.cursor >= self.rows.len() {
            self.cursor = self.rows.len().saturating_sub(1);
        }
        self.error = None;
    }

    pub fn take_refresh_request(&mut self) -> bool {
        std::mem::take(&mut self.needs_refresh)
    }

    /// The error shown in the footer: a failed batch action wins over older
    /// view-level errors.
    pub fn display_error(&self) -> Option<&str> {
        self.executor.error().or(self.error.as_deref())
    }
}

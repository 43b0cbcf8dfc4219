use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Pure key-to-action mapping, one function per mode. Keys are only ever
/// interpreted through the active mode, so a shortcut can never fire while
/// the notes prompt has focus.
pub struct KeyHandler;

impl KeyHandler {
    pub fn handle_browse_mode_key(key_event: KeyEvent) -> BrowseModeAction {
        match key_event.code {
            KeyCode::Char('q') => BrowseModeAction::Quit,
            KeyCode::Char('c') if key_event.modifiers.contains(KeyModifiers::CONTROL) => {
                BrowseModeAction::Quit
            }
            KeyCode::Up | KeyCode::Char('k') => BrowseModeAction::CursorUp,
            KeyCode::Down | KeyCode::Char('j') => BrowseModeAction::CursorDown,
            KeyCode::Char('n') => BrowseModeAction::NextPage,
            KeyCode::Char('p') => BrowseModeAction::PrevPage,
            KeyCode::Char('g') => BrowseModeAction::Refresh,
            KeyCode::Tab => BrowseModeAction::SwitchQueue,
            KeyCode::Char('v') => BrowseModeAction::EnterSelection,
            KeyCode::Char(' ') => BrowseModeAction::ToggleCurrent,
            KeyCode::Char('a') => BrowseModeAction::ApproveCurrent,
            KeyCode::Char('r') => BrowseModeAction::RejectCurrent,
            KeyCode::Char('d') => BrowseModeAction::DeleteCurrent,
            KeyCode::Char('?') => BrowseModeAction::ToggleHelp,
            _ => BrowseModeAction::None,
        }
    }

    pub fn handle_select_mode_key(key_event: KeyEvent) -> SelectModeAction {
        match key_event.code {
            KeyCode::Char('a') if key_event.modifiers.contains(KeyModifiers::CONTROL) => {
                SelectModeAction::ToggleAll
            }
            KeyCode::Char('c') if key_event.modifiers.contains(KeyModifiers::CONTROL) => {
                SelectModeAction::Quit
            }
            KeyCode::Char('q') => SelectModeAction::Quit,
            KeyCode::Esc => SelectModeAction::ExitSelection,
            KeyCode::Up | KeyCode::Char('k') => SelectModeAction::CursorUp,
            KeyCode::Down | KeyCode::Char('j') => SelectModeAction::CursorDown,
            KeyCode::Char(' ') => SelectModeAction::ToggleRow,
            KeyCode::Char('a') => SelectModeAction::Approve,
            KeyCode::Char('r') => SelectModeAction::Reject,
            KeyCode::Char('d') => SelectModeAction::Delete,
            KeyCode::Char('?') => SelectModeAction::ToggleHelp,
            _ => SelectModeAction::None,
        }
    }

    pub fn handle_confirm_mode_key(key_event: KeyEvent) -> ConfirmModeAction {
        match key_event.code {
            KeyCode::Char('y') | KeyCode::Enter => ConfirmModeAction::Confirm,
            KeyCode::Char('n') | KeyCode::Esc => ConfirmModeAction::Cancel,
            _ => ConfirmModeAction::None,
        }
    }

    pub fn handle_notes_mode_key(key_event: KeyEvent) -> NotesModeAction {
        match key_event.code {
            KeyCode::Esc => NotesModeAction::Cancel,
            KeyCode::Enter => NotesModeAction::Submit,
            KeyCode::Backspace => NotesModeAction::Backspace,
            KeyCode::Delete => NotesModeAction::Delete,
            KeyCode::Left => NotesModeAction::MoveCursorLeft,
            KeyCode::Right => NotesModeAction::MoveCursorRight,
            KeyCode::Home => NotesModeAction::MoveCursorHome,
            KeyCode::End => NotesModeAction::MoveCursorEnd,
            KeyCode::Char(c) => NotesModeAction::InsertChar(c),
            _ => NotesModeAction::None,
        }
    }

    pub fn handle_help_mode_key(key_event: KeyEvent) -> HelpModeAction {
        match key_event.code {
            KeyCode::Char('q') | KeyCode::Esc | KeyCode::Char('?') => HelpModeAction::ExitHelpMode,
            _ => HelpModeAction::None,
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum BrowseModeAction {
    None,
    Quit,
    CursorUp,
    CursorDown,
    NextPage,
    PrevPage,
    Refresh,
    SwitchQueue,
    EnterSelection,
    ToggleCurrent,
    ApproveCurrent,
    RejectCurrent,
    DeleteCurrent,
    ToggleHelp,
}

#[derive(Debug, PartialEq)]
pub enum SelectModeAction {
    None,
    Quit,
    CursorUp,
    CursorDown,
    ToggleRow,
    ToggleAll,
    ExitSelection,
    Approve,
    Reject,
    Delete,
    ToggleHelp,
}

#[derive(Debug, PartialEq)]
pub enum ConfirmModeAction {
    None,
    Confirm,
    Cancel,
}

#[derive(Debug, PartialEq)]
pub enum NotesModeAction {
    None,
    Cancel,
    Submit,
    Backspace,
    Delete,
    MoveCursorLeft,
    MoveCursorRight,
    MoveCursorHome,
    MoveCursorEnd,
    InsertChar(char),
}

#[derive(Debug, PartialEq)]
pub enum HelpModeAction {
    None,
    ExitHelpMode,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_browse_mode_basic_keys() {
        let key_event = KeyEvent::from(KeyCode::Char('q'));
        assert_eq!(
            KeyHandler::handle_browse_mode_key(key_event),
            BrowseModeAction::Quit
        );

        let key_event = KeyEvent::from(KeyCode::Char('v'));
        assert_eq!(
            KeyHandler::handle_browse_mode_key(key_event),
            BrowseModeAction::EnterSelection
        );

        let key_event = KeyEvent::from(KeyCode::Char(' '));
        assert_eq!(
            KeyHandler::handle_browse_mode_key(key_event),
            BrowseModeAction::ToggleCurrent
        );

        let key_event = KeyEvent::from(KeyCode::Tab);
        assert_eq!(
            KeyHandler::handle_browse_mode_key(key_event),
            BrowseModeAction::SwitchQueue
        );
    }

    #[test]
    fn test_browse_mode_navigation_keys() {
        let key_event = KeyEvent::from(KeyCode::Up);
        assert_eq!(
            KeyHandler::handle_browse_mode_key(key_event),
            BrowseModeAction::CursorUp
        );

        let key_event = KeyEvent::from(KeyCode::Char('j'));
        assert_eq!(
            KeyHandler::handle_browse_mode_key(key_event),
            BrowseModeAction::CursorDown
        );

        let key_event = KeyEvent::from(KeyCode::Char('n'));
        assert_eq!(
            KeyHandler::handle_browse_mode_key(key_event),
            BrowseModeAction::NextPage
        );

        let key_event = KeyEvent::from(KeyCode::Char('p'));
        assert_eq!(
            KeyHandler::handle_browse_mode_key(key_event),
            BrowseModeAction::PrevPage
        );
    }

    #[test]
    fn test_browse_mode_ctrl_keys() {
        let mut key_event = KeyEvent::from(KeyCode::Char('c'));
        key_event.modifiers = KeyModifiers::CONTROL;
        assert_eq!(
            KeyHandler::handle_browse_mode_key(key_event),
            BrowseModeAction::Quit
        );
    }

    #[test]
    fn test_select_mode_ctrl_a_selects_all() {
        let mut key_event = KeyEvent::from(KeyCode::Char('a'));
        key_event.modifiers = KeyModifiers::CONTROL;
        assert_eq!(
            KeyHandler::handle_select_mode_key(key_event),
            SelectModeAction::ToggleAll
        );

        // Plain 'a' is the approve action, not select-all.
        let key_event = KeyEvent::from(KeyCode::Char('a'));
        assert_eq!(
            KeyHandler::handle_select_mode_key(key_event),
            SelectModeAction::Approve
        );
    }

    #[test]
    fn test_select_mode_keys() {
        let key_event = KeyEvent::from(KeyCode::Esc);
        assert_eq!(
            KeyHandler::handle_select_mode_key(key_event),
            SelectModeAction::ExitSelection
        );

        let key_event = KeyEvent::from(KeyCode::Char(' '));
        assert_eq!(
            KeyHandler::handle_select_mode_key(key_event),
            SelectModeAction::ToggleRow
        );

        let key_event = KeyEvent::from(KeyCode::Char('r'));
        assert_eq!(
            KeyHandler::handle_select_mode_key(key_event),
            SelectModeAction::Reject
        );

        let key_event = KeyEvent::from(KeyCode::Char('d'));
        assert_eq!(
            KeyHandler::handle_select_mode_key(key_event),
            SelectModeAction::Delete
        );
    }

    #[test]
    fn test_confirm_mode_keys() {
        let key_event = KeyEvent::from(KeyCode::Char('y'));
        assert_eq!(
            KeyHandler::handle_confirm_mode_key(key_event),
            ConfirmModeAction::Confirm
        );

        let key_event = KeyEvent::from(KeyCode::Enter);
        assert_eq!(
            KeyHandler::handle_confirm_mode_key(key_event),
            ConfirmModeAction::Confirm
        );

        let key_event = KeyEvent::from(KeyCode::Char('n'));
        assert_eq!(
            KeyHandler::handle_confirm_mode_key(key_event),
            ConfirmModeAction::Cancel
        );

        let key_event = KeyEvent::from(KeyCode::Esc);
        assert_eq!(
            KeyHandler::handle_confirm_mode_key(key_event),
            ConfirmModeAction::Cancel
        );

        let key_event = KeyEvent::from(KeyCode::Char('x'));
        assert_eq!(
            KeyHandler::handle_confirm_mode_key(key_event),
            ConfirmModeAction::None
        );
    }

    #[test]
    fn test_notes_mode_consumes_printable_keys() {
        // While the notes prompt is open, 'a' must insert text instead of
        // triggering the approve shortcut.
        let key_event = KeyEvent::from(KeyCode::Char('a'));
        assert_eq!(
            KeyHandler::handle_notes_mode_key(key_event),
            NotesModeAction::InsertChar('a')
        );

        let key_event = KeyEvent::from(KeyCode::Enter);
        assert_eq!(
            KeyHandler::handle_notes_mode_key(key_event),
            NotesModeAction::Submit
        );

        let key_event = KeyEvent::from(KeyCode::Esc);
        assert_eq!(
            KeyHandler::handle_notes_mode_key(key_event),
            NotesModeAction::Cancel
        );

        let key_event = KeyEvent::from(KeyCode::Backspace);
        assert_eq!(
            KeyHandler::handle_notes_mode_key(key_event),
            NotesModeAction::Backspace
        );
    }

    #[test]
    fn test_help_mode_keys() {
        let key_event = KeyEvent::from(KeyCode::Esc);
        assert_eq!(
            KeyHandler::handle_help_mode_key(key_event),
            HelpModeAction::ExitHelpMode
        );

        let key_event = KeyEvent::from(KeyCode::Char('?'));
        assert_eq!(
            KeyHandler::handle_help_mode_key(key_event),
            HelpModeAction::ExitHelpMode
        );

        let key_event = KeyEvent::from(KeyCode::Char('x'));
        assert_eq!(
            KeyHandler::handle_help_mode_key(key_event),
            HelpModeAction::None
        );
    }
}

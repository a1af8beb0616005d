use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppAction {
    Quit,
    MoveUp,
    MoveDown,
    MoveToTop,
    MoveToBottom,
    SelectItem,
    GenerateContent,
    Publish,
    ToggleAutopilot,
    CycleFilter,
    ReloadItems,
    ShowHelp,
    HideHelp,
    DismissNotification,
    // Search input actions
    StartSearch,
    SearchChar(char),
    SearchBackspace,
    SearchConfirm,
    SearchCancel,
    // Editor actions
    StartEditing,
    EditChar(char),
    EditNewline,
    EditBackspace,
    EditNextField,
    StopEditing,
}

/// Which keymap applies, from most to least modal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Notification,
    Help,
    Search,
    Edit,
    Normal,
}

pub fn handle_key_event(key: KeyEvent, mode: InputMode) -> Option<AppAction> {
    match mode {
        // Any key closes popups
        InputMode::Notification => Some(AppAction::DismissNotification),
        InputMode::Help => Some(AppAction::HideHelp),

        InputMode::Search => match key.code {
            KeyCode::Enter => Some(AppAction::SearchConfirm),
            KeyCode::Esc => Some(AppAction::SearchCancel),
            KeyCode::Backspace => Some(AppAction::SearchBackspace),
            KeyCode::Char(c) => Some(AppAction::SearchChar(c)),
            _ => None,
        },

        InputMode::Edit => match key.code {
            KeyCode::Esc => Some(AppAction::StopEditing),
            KeyCode::Tab => Some(AppAction::EditNextField),
            KeyCode::Enter => Some(AppAction::EditNewline),
            KeyCode::Backspace => Some(AppAction::EditBackspace),
            KeyCode::Char(c) => Some(AppAction::EditChar(c)),
            _ => None,
        },

        InputMode::Normal => match (key.code, key.modifiers) {
            (KeyCode::Char('q'), _) => Some(AppAction::Quit),
            (KeyCode::Char('c'), KeyModifiers::CONTROL) => Some(AppAction::Quit),

            (KeyCode::Char('j'), _) | (KeyCode::Down, _) => Some(AppAction::MoveDown),
            (KeyCode::Char('k'), _) | (KeyCode::Up, _) => Some(AppAction::MoveUp),
            (KeyCode::Char('<'), _) | (KeyCode::Home, _) => Some(AppAction::MoveToTop),
            (KeyCode::Char('>'), _) | (KeyCode::End, _) => Some(AppAction::MoveToBottom),

            (KeyCode::Enter, _) => Some(AppAction::SelectItem),

            (KeyCode::Char('g'), _) => Some(AppAction::GenerateContent),
            (KeyCode::Char('e'), _) => Some(AppAction::StartEditing),
            (KeyCode::Char('s'), _) => Some(AppAction::Publish),
            (KeyCode::Char('a'), _) => Some(AppAction::ToggleAutopilot),
            (KeyCode::Char('f'), _) => Some(AppAction::CycleFilter),
            (KeyCode::Char('r'), _) => Some(AppAction::ReloadItems),
            (KeyCode::Char('/'), _) => Some(AppAction::StartSearch),

            (KeyCode::Char('?'), _) => Some(AppAction::ShowHelp),

            _ => None,
        },
    }
}

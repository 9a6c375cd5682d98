//! Key bindings: arrows and vim-style, plus the start/pause/reset triggers.

use crate::game::Control;
use crate::piece::Move;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Action from a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Move(Move),
    Control(Control),
    Quit,
    None,
}

/// Map key event to game action. Supports both arrows and vim (hjkl).
pub fn key_to_action(key: KeyEvent) -> Action {
    let KeyEvent {
        code, modifiers, ..
    } = key;
    if modifiers == KeyModifiers::CONTROL && code == KeyCode::Char('c') {
        return Action::Quit;
    }
    if !(modifiers.is_empty() || modifiers == KeyModifiers::SHIFT) {
        return Action::None;
    }
    match code {
        KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
        KeyCode::Left | KeyCode::Char('h') => Action::Move(Move::Left),
        KeyCode::Right | KeyCode::Char('l') => Action::Move(Move::Right),
        KeyCode::Down | KeyCode::Char('j') => Action::Move(Move::Down),
        KeyCode::Up | KeyCode::Char('k') => Action::Move(Move::Rotate),
        KeyCode::Char('s') | KeyCode::Enter => Action::Control(Control::Start),
        KeyCode::Char('p') | KeyCode::Char(' ') => Action::Control(Control::TogglePause),
        KeyCode::Char('r') => Action::Control(Control::Reset),
        _ => Action::None,
    }
}

//! Key bindings: arrows plus vim-style letters.

use crate::game::Command;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Action from a key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Game(Command),
    CycleTheme,
    Restart,
    Quit,
    None,
}

/// Map a key event to an action. Soft drop follows the key: press or repeat turns it on,
/// release turns it off. Sideways moves also fire on repeats; everything else only on press.
pub fn key_to_action(key: KeyEvent) -> Action {
    let KeyEvent {
        code,
        modifiers,
        kind,
        ..
    } = key;
    if modifiers == KeyModifiers::CONTROL && code == KeyCode::Char('c') {
        return Action::Quit;
    }
    let no_mod = modifiers.is_empty() || modifiers == KeyModifiers::SHIFT;
    if !no_mod {
        return Action::None;
    }
    // Caps Lock or Shift still hit the same binding.
    let code = match code {
        KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
        other => other,
    };

    if matches!(code, KeyCode::Down | KeyCode::Char('j')) {
        return match kind {
            KeyEventKind::Release => Action::Game(Command::SoftDropOff),
            KeyEventKind::Press | KeyEventKind::Repeat => Action::Game(Command::SoftDropOn),
        };
    }
    let repeatable = matches!(
        code,
        KeyCode::Left | KeyCode::Right | KeyCode::Char('h' | 'l')
    );
    match kind {
        KeyEventKind::Press => {}
        KeyEventKind::Repeat if repeatable => {}
        _ => return Action::None,
    }

    match code {
        KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
        KeyCode::Left | KeyCode::Char('h') => Action::Game(Command::MoveLeft),
        KeyCode::Right | KeyCode::Char('l') => Action::Game(Command::MoveRight),
        KeyCode::Up | KeyCode::Char('k' | 'x') => Action::Game(Command::Rotate),
        KeyCode::Char('z' | 'u') => Action::Game(Command::RotateCounterClockwise),
        KeyCode::Enter | KeyCode::Char(' ') => Action::Game(Command::HardDrop),
        KeyCode::Char('t') => Action::CycleTheme,
        KeyCode::Char('r') => Action::Restart,
        _ => Action::None,
    }
}

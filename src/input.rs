//! Key bindings and per-tick input sampling.

use crate::game::TickInput;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::time::{Duration, Instant};

/// Without release events, fast drop stays held this long after the last press/repeat.
const FAST_DROP_GRACE: Duration = Duration::from_millis(150);

/// Action from a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    MoveLeft,
    MoveRight,
    FastDrop,
    Confirm,
    ToggleMonths,
    Quit,
    None,
}

/// Map key event to game action. Supports both arrows and vim keys (h/j/l).
pub fn key_to_action(key: KeyEvent) -> Action {
    let KeyEvent {
        code, modifiers, ..
    } = key;
    if modifiers == KeyModifiers::CONTROL && code == KeyCode::Char('c') {
        return Action::Quit;
    }
    let no_mod = modifiers.is_empty() || modifiers == KeyModifiers::SHIFT;
    if !no_mod {
        return Action::None;
    }
    match code {
        KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
        KeyCode::Left | KeyCode::Char('h') => Action::MoveLeft,
        KeyCode::Right | KeyCode::Char('l') => Action::MoveRight,
        KeyCode::Down | KeyCode::Char('j') => Action::FastDrop,
        KeyCode::Enter | KeyCode::Char(' ') => Action::Confirm,
        KeyCode::Char('d') => Action::ToggleMonths,
        _ => Action::None,
    }
}

/// Collects key events between ticks into one [`TickInput`].
#[derive(Debug, Default)]
pub struct InputState {
    pending: TickInput,
    /// Fast drop held until this instant (or until a release event).
    fast_drop_until: Option<Instant>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one key event. Returns the action for shell-level handling (quit, overlays).
    pub fn on_key(&mut self, key: KeyEvent, now: Instant) -> Action {
        let action = key_to_action(key);
        match key.kind {
            KeyEventKind::Release => {
                if action == Action::FastDrop {
                    self.fast_drop_until = None;
                }
                return Action::None;
            }
            KeyEventKind::Repeat => {
                // OS auto-repeat only keeps fast drop alive; moves stay one cell per press.
                if action == Action::FastDrop {
                    self.fast_drop_until = Some(now + FAST_DROP_GRACE);
                }
                return Action::None;
            }
            KeyEventKind::Press => {}
        }
        match action {
            Action::MoveLeft => self.pending.move_left = true,
            Action::MoveRight => self.pending.move_right = true,
            Action::Confirm => self.pending.confirm = true,
            Action::FastDrop => self.fast_drop_until = Some(now + FAST_DROP_GRACE),
            Action::ToggleMonths | Action::Quit | Action::None => {}
        }
        action
    }

    /// Input for the tick about to run; edge-triggered flags are consumed.
    pub fn take_tick(&mut self, now: Instant) -> TickInput {
        let mut input = std::mem::take(&mut self.pending);
        input.fast_drop = self.fast_drop_until.is_some_and(|until| now < until);
        if !input.fast_drop {
            self.fast_drop_until = None;
        }
        input
    }
}

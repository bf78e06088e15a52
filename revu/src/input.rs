//! Terminal input decoding.
//!
//! Turns crossterm key and mouse events into the reducer's `KeyPress` and
//! `MouseInput`. This is the only place that knows about crossterm's event
//! types; everything past here works on the core's input vocabulary.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use revu_core::nav::{Key, KeyPress, Modifiers, MouseInput, WHEEL_STEP};
use revu_core::state::{Mode, Panel};

use crate::ui::layout::{split_widths, GUTTER};

/// Maps a key event to a `KeyPress`, or `None` for keys the dashboard ignores.
pub fn decode_key(key: KeyEvent) -> Option<KeyPress> {
    let code = match key.code {
        KeyCode::Char(c) => Key::Char(c),
        KeyCode::Up => Key::Up,
        KeyCode::Down => Key::Down,
        KeyCode::Left => Key::Left,
        KeyCode::Right => Key::Right,
        KeyCode::Enter => Key::Enter,
        KeyCode::Esc => Key::Esc,
        KeyCode::Tab => Key::Tab,
        KeyCode::PageUp => Key::PageUp,
        KeyCode::PageDown => Key::PageDown,
        _ => return None,
    };
    let mods = Modifiers {
        ctrl: key.modifiers.contains(KeyModifiers::CONTROL),
        shift: key.modifiers.contains(KeyModifiers::SHIFT),
        alt: key.modifiers.contains(KeyModifiers::ALT),
    };
    Some(KeyPress { key: code, mods })
}

/// Resolves a mouse event to the panel under the pointer.
///
/// Wheel events scroll by `WHEEL_STEP` lines; releasing the left button is a
/// click. In list mode everything belongs to the single left panel.
pub fn decode_mouse(mouse: &MouseEvent, mode: Mode, width: u16) -> MouseInput {
    let panel = panel_at(mouse.column, mode, width);
    match mouse.kind {
        MouseEventKind::ScrollUp => MouseInput::Scroll { panel, lines: -WHEEL_STEP },
        MouseEventKind::ScrollDown => MouseInput::Scroll { panel, lines: WHEEL_STEP },
        MouseEventKind::Up(MouseButton::Left) => MouseInput::Click { panel },
        _ => MouseInput::None,
    }
}

fn panel_at(column: u16, mode: Mode, width: u16) -> Panel {
    if mode == Mode::List {
        return Panel::Left;
    }
    let (left, _) = split_widths(width as usize);
    // The divider sits in the middle of the gutter; it belongs to the left.
    if (column as usize) < left + GUTTER / 2 + 1 {
        Panel::Left
    } else {
        Panel::Right
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEventKind, KeyEventState};

    fn mouse(kind: MouseEventKind, column: u16) -> MouseEvent {
        MouseEvent { kind, column, row: 3, modifiers: KeyModifiers::NONE }
    }

    #[test]
    fn keys_carry_modifiers() {
        let ev = KeyEvent {
            code: KeyCode::Char('d'),
            modifiers: KeyModifiers::CONTROL,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        };
        assert_eq!(decode_key(ev), Some(KeyPress::ctrl('d')));
        let shifted = decode_key(KeyEvent::new(KeyCode::Down, KeyModifiers::SHIFT)).unwrap();
        assert!(shifted.mods.shift);
        assert_eq!(decode_key(KeyEvent::new(KeyCode::F(5), KeyModifiers::NONE)), None);
    }

    #[test]
    fn wheel_targets_the_panel_under_the_pointer() {
        // 100 columns: left 0..35, gutter 35..38, right 38..
        assert_eq!(
            decode_mouse(&mouse(MouseEventKind::ScrollDown, 10), Mode::Detail, 100),
            MouseInput::Scroll { panel: Panel::Left, lines: WHEEL_STEP }
        );
        assert_eq!(
            decode_mouse(&mouse(MouseEventKind::ScrollUp, 60), Mode::Detail, 100),
            MouseInput::Scroll { panel: Panel::Right, lines: -WHEEL_STEP }
        );
        assert_eq!(
            decode_mouse(&mouse(MouseEventKind::ScrollUp, 60), Mode::List, 100),
            MouseInput::Scroll { panel: Panel::Left, lines: -WHEEL_STEP }
        );
    }

    #[test]
    fn only_left_release_is_a_click() {
        assert_eq!(
            decode_mouse(&mouse(MouseEventKind::Up(MouseButton::Left), 80), Mode::Detail, 100),
            MouseInput::Click { panel: Panel::Right }
        );
        assert_eq!(
            decode_mouse(&mouse(MouseEventKind::Down(MouseButton::Left), 80), Mode::Detail, 100),
            MouseInput::None
        );
        assert_eq!(
            decode_mouse(&mouse(MouseEventKind::Moved, 80), Mode::Detail, 100),
            MouseInput::None
        );
    }
}

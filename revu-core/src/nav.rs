//! Navigation reducer.
//!
//! `reduce` is the only place input changes the session: the event loop decodes
//! terminal events into an [`Input`], calls `reduce`, and acts on the returned
//! [`Outcome`] (re-render, quit, copy). Rules are checked in a fixed precedence
//! order; the first one that claims the input wins.

use crate::parser::ParsedComment;
use crate::state::{Mode, Panel, SessionState};

/// Rows moved by a single arrow / `j` / `k` press.
pub const LINE_STEP: isize = 1;
/// Rows moved by PageUp / PageDown / Ctrl-U / Ctrl-D.
pub const PAGE_STEP: isize = 10;
/// Rows moved by one mouse-wheel notch.
pub const WHEEL_STEP: isize = 3;

/// Named keys the dashboard reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Up,
    Down,
    Left,
    Right,
    Enter,
    Esc,
    Tab,
    PageUp,
    PageDown,
}

/// Modifier keys held during a key press.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Modifiers {
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPress {
    pub key: Key,
    pub mods: Modifiers,
}

impl KeyPress {
    pub fn plain(key: Key) -> Self {
        Self { key, mods: Modifiers::default() }
    }

    pub fn ctrl(c: char) -> Self {
        Self {
            key: Key::Char(c),
            mods: Modifiers {
                ctrl: true,
                ..Modifiers::default()
            },
        }
    }
}

/// A decoded mouse action, already resolved to the panel under the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseInput {
    Scroll { panel: Panel, lines: isize },
    Click { panel: Panel },
    None,
}

/// Everything that can drive a state transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    Key(KeyPress),
    Mouse(MouseInput),
    Resize,
    Tick,
}

/// Side effects the event loop performs on the reducer's behalf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Quit,
    /// Copy the given AI-fix prompt to the system clipboard.
    CopyPrompt(String),
}

/// Result of one transition.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub render: bool,
    pub effect: Option<Effect>,
}

impl Outcome {
    fn ignore() -> Self {
        Self::default()
    }

    fn render() -> Self {
        Self { render: true, effect: None }
    }

    fn effect(effect: Effect) -> Self {
        Self { render: false, effect: Some(effect) }
    }
}

/// Applies `input` to `state`.
pub fn reduce(state: &mut SessionState, input: &Input) -> Outcome {
    match input {
        Input::Key(key) => reduce_key(state, *key),
        Input::Mouse(mouse) => reduce_mouse(state, *mouse),
        Input::Resize => Outcome::render(),
        Input::Tick => {
            if state.is_running() {
                state.spinner_frame = state.spinner_frame.wrapping_add(1);
                Outcome::render()
            } else {
                Outcome::ignore()
            }
        }
    }
}

fn is_quit(key: KeyPress) -> bool {
    match key.key {
        Key::Char('c') | Key::Char('C') if key.mods.ctrl => true,
        Key::Char('q') => !key.mods.ctrl && !key.mods.alt,
        _ => false,
    }
}

/// Vertical direction of a navigation key, with whether the scroll modifier
/// was held (`K`/`J` count as shifted `k`/`j`).
fn vertical(key: KeyPress) -> Option<(isize, bool)> {
    let held = key.mods.shift || key.mods.alt;
    match key.key {
        Key::Up => Some((-LINE_STEP, held)),
        Key::Down => Some((LINE_STEP, held)),
        Key::Char('k') if !key.mods.ctrl => Some((-LINE_STEP, key.mods.alt)),
        Key::Char('j') if !key.mods.ctrl => Some((LINE_STEP, key.mods.alt)),
        Key::Char('K') if !key.mods.ctrl => Some((-LINE_STEP, true)),
        Key::Char('J') if !key.mods.ctrl => Some((LINE_STEP, true)),
        _ => None,
    }
}

fn page(key: KeyPress) -> Option<isize> {
    match key.key {
        Key::PageUp => Some(-PAGE_STEP),
        Key::PageDown => Some(PAGE_STEP),
        Key::Char('u') if key.mods.ctrl => Some(-PAGE_STEP),
        Key::Char('d') if key.mods.ctrl => Some(PAGE_STEP),
        _ => None,
    }
}

fn reduce_key(state: &mut SessionState, key: KeyPress) -> Outcome {
    let had_notice = state.notice.take().is_some();

    // 1. quit
    if is_quit(key) {
        return Outcome::effect(Effect::Quit);
    }

    if state.show_help {
        state.show_help = false;
        return Outcome::render();
    }
    if key.key == Key::Char('?') {
        state.show_help = true;
        return Outcome::render();
    }

    let left_has_focus = state.mode == Mode::List || state.focus == Panel::Left;

    // 2. Tab: panel focus in detail, expansion in list
    if key.key == Key::Tab {
        return match state.mode {
            Mode::Detail => {
                state.focus = state.focus.toggle();
                Outcome::render()
            }
            Mode::List => redraw_if(state.toggle_selected_file() || had_notice),
        };
    }

    // 3-5. vertical navigation
    if let Some((delta, held)) = vertical(key) {
        let changed = match (state.mode, state.focus, held) {
            (Mode::List, _, _) | (Mode::Detail, Panel::Left, false) => state.move_cursor(delta),
            (Mode::Detail, Panel::Left, true) => {
                state.scroll(Panel::Left, delta);
                true
            }
            (Mode::Detail, Panel::Right, _) => {
                state.scroll(Panel::Right, delta);
                true
            }
        };
        return redraw_if(changed || had_notice);
    }

    match key.key {
        // 6-7. drill in / toggle expansion
        Key::Enter | Key::Right if left_has_focus => {
            if state.selected_comment.is_none() {
                return redraw_if(state.toggle_selected_file() || had_notice);
            }
            if state.current_comment().is_none() {
                return redraw_if(had_notice);
            }
            if state.mode == Mode::List {
                state.mode = Mode::Detail;
                state.left_scroll = 0;
                state.follow_cursor = true;
            }
            state.focus = Panel::Right;
            state.detail_scroll = 0;
            Outcome::render()
        }
        // 8. step back
        Key::Esc | Key::Left if state.mode == Mode::Detail => {
            match state.focus {
                Panel::Right => state.focus = Panel::Left,
                Panel::Left => state.mode = Mode::List,
            }
            Outcome::render()
        }
        // 10. copy prompt
        Key::Char('c') if !key.mods.ctrl => {
            let prompt = state
                .current_comment()
                .and_then(|c| ParsedComment::for_comment(c).ai_prompt);
            match prompt {
                Some(prompt) => Outcome {
                    render: had_notice,
                    effect: Some(Effect::CopyPrompt(prompt)),
                },
                None => redraw_if(had_notice),
            }
        }
        _ => match page(key) {
            // 9. bulk scroll
            Some(delta) if state.mode == Mode::Detail => {
                state.scroll(state.focus, delta);
                Outcome::render()
            }
            _ => redraw_if(had_notice),
        },
    }
}

fn reduce_mouse(state: &mut SessionState, mouse: MouseInput) -> Outcome {
    match mouse {
        MouseInput::Scroll { panel, lines } => {
            let panel = if state.mode == Mode::List { Panel::Left } else { panel };
            state.scroll(panel, lines);
            Outcome::render()
        }
        MouseInput::Click { panel } if state.mode == Mode::Detail => {
            let changed = state.focus != panel;
            state.focus = panel;
            redraw_if(changed)
        }
        MouseInput::Click { .. } | MouseInput::None => Outcome::ignore(),
    }
}

fn redraw_if(changed: bool) -> Outcome {
    Outcome { render: changed, effect: None }
}

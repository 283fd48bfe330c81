//! Input event types for the interaction engine.
//!
//! The embedding shell translates its native events into these value types
//! before handing them to the session.

use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Mouse button identity. Only the buttons the engine reacts to are modeled;
/// anything else is dropped by the shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    Primary,
    Middle,
}

/// Modifier key state delivered with pointer and key events.
///
/// `command` unifies Ctrl and Cmd so platform differences stay in the shell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub command: bool,
    pub alt: bool,
}

impl Modifiers {
    /// No modifiers held.
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        command: false,
        alt: false,
    };

    /// Only the command/ctrl modifier held.
    pub fn only_command() -> Self {
        Modifiers {
            command: true,
            ..Self::NONE
        }
    }

    /// Only the shift modifier held.
    pub fn only_shift() -> Self {
        Modifiers {
            shift: true,
            ..Self::NONE
        }
    }
}

/// Pointer event in device coordinates.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum PointerEvent {
    Down {
        position: Point,
        button: MouseButton,
        modifiers: Modifiers,
    },
    Move {
        position: Point,
    },
    Up {
        position: Point,
        button: MouseButton,
        modifiers: Modifiers,
    },
}

/// Keys the engine's shortcut surface reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Key {
    A,
    C,
    V,
    Y,
    Z,
    Delete,
    Backspace,
    Escape,
    Enter,
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
}

/// A key press with its modifier state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyPress {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyPress {
    pub fn new(key: Key, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }

    /// A bare key press with no modifiers.
    pub fn plain(key: Key) -> Self {
        Self::new(key, Modifiers::NONE)
    }
}

/// Tool mode owned by the embedding shell; gates which handler receives
/// pointer events. Exactly one mode is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ToolMode {
    /// Selection / transform cursor.
    #[default]
    Cursor,
    /// Freehand ink.
    Pen,
    /// Freehand erase.
    Eraser,
    /// Shape-recognition gesture capture ("magic wand").
    Wand,
    /// Freeform region selection.
    Lasso,
    /// Text selection; events pass through to the embedding shell.
    TextSelect,
}

//! Input events delivered to the app model.
//!
//! The crossterm runtime translates terminal events into these; tests build
//! them directly.

use crate::frame::FrameSize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Enter,
    Escape,
    Tab,
    Backspace,
    Up,
    Down,
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Key(Key),
    Resize(FrameSize),
}

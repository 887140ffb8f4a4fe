use std::time::Instant;

/// Where a key event came from.
///
/// The injection transport tags everything it emits as `Synthetic`; such
/// events exist only to reach the target application and are dropped
/// before the buffer. This is half of the loop guard.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum KeyOrigin {
    Physical,
    Synthetic,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Key {
    /// A printable character. Enter and Tab arrive as `'\n'` / `'\t'`.
    Char(char),
    Backspace,
    /// Escape, arrows, Home/End, Page Up/Down: breaks typing context.
    Nav,
}

/// One keystroke as delivered by the capture transport.
#[derive(Clone, Debug)]
pub struct KeyEvent {
    pub key: Key,
    pub origin: KeyOrigin,
    pub timestamp: Instant,
    /// Monotonic sequence id assigned by the capture transport.
    pub seq: u64,
}

impl KeyEvent {
    pub fn physical(key: Key, seq: u64) -> Self {
        Self {
            key,
            origin: KeyOrigin::Physical,
            timestamp: Instant::now(),
            seq,
        }
    }

    pub fn synthetic(key: Key, seq: u64) -> Self {
        Self {
            key,
            origin: KeyOrigin::Synthetic,
            timestamp: Instant::now(),
            seq,
        }
    }
}

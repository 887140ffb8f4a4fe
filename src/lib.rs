//! Real-time keyboard input correction core.
//!
//! Watches a keystroke stream, buffers words as they are typed, and
//! replaces text typed in the wrong keyboard layout (or misspelled, or
//! semantically off) in place, then hands the corrected span back to
//! the user. Platform capture and injection stay behind the
//! [`replace::Injector`] and [`dispatch::LayoutSwitcher`] traits; this
//! crate is the engine between them.

pub mod buffer;
pub mod config;
pub mod dispatch;
pub mod domain;
pub mod engine;
pub mod event;
pub mod history;
pub mod replace;
pub mod strategy;
pub mod utils;

#[cfg(test)]
mod tests;

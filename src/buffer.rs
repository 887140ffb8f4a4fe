//! Word/phrase buffer: accumulates content characters between boundaries.
//!
//! The buffer never talks to the platform. It tracks three things: the
//! still-open word, the line context (for semantic correction and polish)
//! and the recent finalized words a phrase-level pass may rewrite.

use crate::domain::text::mapping::{Layout, dominant_layout};

const MAX_PHRASE_WORDS: usize = 10;

/// A finalized word. Immutable once produced.
///
/// `start`/`end` are absolute typed-character positions, used by the
/// idempotency guard for span-overlap checks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WordSpan {
    pub text: String,
    pub start: u64,
    pub end: u64,
    /// Script the word looks typed in, if any letters are present.
    pub layout_guess: Option<Layout>,
}

#[derive(Debug, Default)]
pub struct WordBuffer {
    current: String,
    line: String,
    /// Absolute typed position in characters. Monotonic within one
    /// typing context; reset only with the context itself.
    pos: u64,
    word_start: u64,
    phrase_words: Vec<String>,
    phrase_total_len: usize,
}

impl WordBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a content character to the open word.
    pub fn push_content(&mut self, ch: char) {
        if self.current.is_empty() {
            self.word_start = self.pos;
        }
        self.current.push(ch);
        self.pos += 1;
    }

    /// Closes the open word on a boundary character.
    ///
    /// Returns the finalized span, or `None` when the boundary followed
    /// another boundary. The boundary itself joins the line context.
    pub fn finalize(&mut self, boundary: char) -> Option<WordSpan> {
        let span = self.take_open_word();
        self.line.push(boundary);
        self.pos += 1;
        span
    }

    /// Finalizes the open word without a boundary (rethink path).
    pub fn force_complete(&mut self) -> Option<WordSpan> {
        self.take_open_word()
    }

    fn take_open_word(&mut self) -> Option<WordSpan> {
        if self.current.is_empty() {
            return None;
        }

        let text = std::mem::take(&mut self.current);
        self.line.push_str(&text);
        let has_letters = text.chars().any(char::is_alphabetic);
        Some(WordSpan {
            start: self.word_start,
            end: self.pos,
            layout_guess: has_letters.then(|| dominant_layout(&text)),
            text,
        })
    }

    /// Backspace inside the open word rewinds it; after finalization it
    /// trims the line context (ordinary passthrough, not undo) and drops
    /// the phrase window, whose on-screen length no longer holds once a
    /// boundary is deleted.
    pub fn backspace(&mut self) {
        if self.current.pop().is_some() {
            self.pos = self.pos.saturating_sub(1);
        } else if self.line.pop().is_some() {
            self.pos = self.pos.saturating_sub(1);
            self.clear_phrase();
        }
    }

    /// Line context plus the open word, for semantic context and polish.
    pub fn context_text(&self) -> String {
        let mut s = self.line.clone();
        s.push_str(&self.current);
        s
    }

    pub fn current_word(&self) -> &str {
        &self.current
    }

    /// Absolute typed position in characters.
    pub fn position(&self) -> u64 {
        self.pos
    }

    /// Drops the open word and line context. Phrase words survive; the
    /// caller decides when those reset.
    pub fn clear_typing(&mut self) {
        self.current.clear();
        self.line.clear();
    }

    pub fn push_phrase_word(&mut self, word: &str) {
        self.phrase_words.push(word.to_string());
        self.phrase_total_len += word.chars().count() + 1;
        if self.phrase_words.len() > MAX_PHRASE_WORDS {
            let dropped = self.phrase_words.remove(0);
            self.phrase_total_len = self
                .phrase_total_len
                .saturating_sub(dropped.chars().count() + 1);
        }
    }

    pub fn pop_phrase_word(&mut self) {
        if let Some(dropped) = self.phrase_words.pop() {
            self.phrase_total_len = self
                .phrase_total_len
                .saturating_sub(dropped.chars().count() + 1);
        }
    }

    pub fn phrase_words(&self) -> &[String] {
        &self.phrase_words
    }

    /// Characters the buffered phrase occupies on screen: every word plus
    /// one boundary each.
    pub fn phrase_char_len(&self) -> usize {
        self.phrase_total_len
    }

    pub fn clear_phrase(&mut self) {
        self.phrase_words.clear();
        self.phrase_total_len = 0;
    }
}

//! Semantic fallback: pluggable last-resort correction.
//!
//! The collaborator may be the embedded rule engine or a remote model
//! behind the API contract in [`crate::strategy::api`]. Either way it is
//! raced against a hard deadline; a late or failed answer is "no
//! candidate", never an error, and a result arriving after the deadline
//! is discarded rather than applied retroactively.

use std::sync::Arc;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use crate::domain::text::mapping::{
    Mismatch, detect_layout_mismatch, dominant_layout, fix_mixed_layout, is_all_caps,
    map_en_to_ru, map_ru_to_en,
};
use crate::strategy::spell::{
    Dictionary, LangSet, clean_word, is_valid_text, is_valid_word, spell_correct_text,
    validity_score,
};

pub trait Semantic: Send + Sync {
    /// Returns corrected text, or `None` when no correction applies.
    fn correct(&self, text: &str, context: &str) -> Option<String>;

    /// Confidence the chain assigns to this source's answers.
    fn source_confidence(&self) -> f64 {
        0.75
    }
}

/// Runs `engine.correct` on a background thread and waits at most
/// `timeout`. Timeout wins ties; the abandoned call finishes on its own
/// and its result is dropped with the channel.
pub fn correct_with_deadline(
    engine: &Arc<dyn Semantic>,
    text: &str,
    context: &str,
    timeout: Duration,
) -> Option<String> {
    let (tx, rx) = mpsc::channel();
    let engine = Arc::clone(engine);
    let text_owned = text.to_string();
    let context_owned = context.to_string();

    thread::spawn(move || {
        let _ = tx.send(engine.correct(&text_owned, &context_owned));
    });

    match rx.recv_timeout(timeout) {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!(text = %text, timeout_ms = timeout.as_millis() as u64, "semantic fallback timed out");
            None
        }
    }
}

/// Embedded rule-based engine.
///
/// Follows the same contract as a remote model: never invent words,
/// never expand, prefer the minimal correction, stay silent when unsure.
pub struct RuleEngine {
    dictionary: Arc<dyn Dictionary>,
    langs: LangSet,
    threshold: f64,
}

impl RuleEngine {
    pub fn new(dictionary: Arc<dyn Dictionary>, langs: LangSet, threshold: f64) -> Self {
        Self {
            dictionary,
            langs,
            threshold,
        }
    }

    fn correct_single(&self, word: &str) -> Option<String> {
        let clean = clean_word(word);
        if clean.is_empty() || is_valid_word(self.dictionary.as_ref(), self.langs, clean) {
            return None;
        }

        if let Some(mapped) = self.layout_swap(clean) {
            return Some(word.replace(clean, &mapped));
        }

        spell_correct_text(self.dictionary.as_ref(), self.langs, self.threshold, word)
    }

    fn layout_swap(&self, text: &str) -> Option<String> {
        let dict = self.dictionary.as_ref();
        match detect_layout_mismatch(text)? {
            Mismatch::EnMeantRu => {
                let mapped = map_en_to_ru(text);
                (validity_score(dict, self.langs, &mapped) >= 0.5).then_some(mapped)
            }
            Mismatch::RuMeantEn => {
                let mapped = map_ru_to_en(text);
                (validity_score(dict, self.langs, &mapped) >= 0.5).then_some(mapped)
            }
            Mismatch::Mixed => {
                let fixed = fix_mixed_layout(text, dominant_layout(text));
                (fixed != text && is_valid_text(dict, self.langs, &fixed)).then_some(fixed)
            }
        }
    }
}

impl Semantic for RuleEngine {
    fn correct(&self, text: &str, _context: &str) -> Option<String> {
        if text.trim().is_empty() || is_all_caps(text) {
            return None;
        }

        let words: Vec<&str> = text.split_whitespace().collect();

        if words.len() > 1 {
            if let Some(mapped) = self.layout_swap(text) {
                let polished = spell_correct_text(
                    self.dictionary.as_ref(),
                    self.langs,
                    self.threshold,
                    &mapped,
                );
                return Some(polished.unwrap_or(mapped));
            }

            let mut out: Vec<String> = Vec::with_capacity(words.len());
            let mut any_changed = false;
            for w in &words {
                match self.correct_single(w) {
                    Some(fixed) => {
                        out.push(fixed);
                        any_changed = true;
                    }
                    None => out.push((*w).to_string()),
                }
            }
            return any_changed.then(|| out.join(" "));
        }

        self.correct_single(words.first()?)
    }
}

//! Idempotency and re-entrancy guards.
//!
//! The origin tag on key events is the first line of defense against
//! the corrector reacting to its own output; this module is the second:
//! span/text matching against the most recent applied correction, plus
//! a finalization set so one span is corrected at most once per typing
//! context.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::domain::outcome::SkipReason;

/// How long a just-applied correction keeps matching re-typed words.
const RECENT_WINDOW: Duration = Duration::from_secs(2);

#[derive(Clone, Debug)]
struct AppliedCorrection {
    replacement: String,
    span: (u64, u64),
    at: Instant,
}

#[derive(Debug, Default)]
pub struct IdempotencyGuard {
    last: Option<AppliedCorrection>,
    finalized: HashSet<String>,
}

impl IdempotencyGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn note_applied(&mut self, original: &str, replacement: &str, span: (u64, u64)) {
        self.finalized.insert(original.to_lowercase());
        self.finalized.insert(replacement.to_lowercase());
        self.last = Some(AppliedCorrection {
            replacement: replacement.to_string(),
            span,
            at: Instant::now(),
        });
    }

    /// A finalized word that equals the last correction's output within
    /// the recency window is that output echoed back, not user input.
    pub fn is_recent_output(&self, word: &str) -> bool {
        let Some(last) = &self.last else {
            return false;
        };
        if last.at.elapsed() >= RECENT_WINDOW {
            return false;
        }
        word == last.replacement || word.to_lowercase() == last.replacement.to_lowercase()
    }

    /// Rejects a candidate that would reproduce the most recent
    /// correction: same replacement within the recency window, or a
    /// source span overlapping the last resulting span.
    pub fn rejects_candidate(
        &self,
        span: (u64, u64),
        candidate_replacement: &str,
    ) -> Option<SkipReason> {
        let last = self.last.as_ref()?;

        if last.at.elapsed() < RECENT_WINDOW && candidate_replacement == last.replacement {
            return Some(SkipReason::GuardReplayedReplacement);
        }
        if span.0 < last.span.1 && last.span.0 < span.1 {
            return Some(SkipReason::GuardSpanOverlap);
        }

        None
    }

    pub fn note_finalized(&mut self, word: &str) {
        self.finalized.insert(word.to_lowercase());
    }

    /// One span is corrected at most once between two context resets.
    pub fn is_finalized(&self, word: &str) -> bool {
        self.finalized.contains(&word.to_lowercase())
    }

    /// Navigation or a fresh word after handoff: the finalization set
    /// resets, the last-correction record stays (it is time-bounded).
    pub fn reset_context(&mut self) {
        self.finalized.clear();
    }
}

/// Blocks recursive replacement while one is already emitting.
#[must_use = "guard must be kept alive to prevent reentry"]
pub struct ReentryGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> ReentryGuard<'a> {
    pub fn try_acquire(flag: &'a AtomicBool) -> Result<Self, SkipReason> {
        if flag.swap(true, Ordering::AcqRel) {
            return Err(SkipReason::Reentry);
        }
        Ok(Self { flag })
    }
}

impl Drop for ReentryGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

//! The event-to-correction engine.
//!
//! Owns the buffer, the state machine, the guards and the strategy
//! chain, and drives the replacement executor. Everything here runs on
//! the event-processing context; the only things that cross to other
//! threads are the layout-request slot (posted here, serviced by the
//! dispatcher) and the semantic fallback race.

pub mod guard;
pub mod state;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Instant;

use crate::buffer::{WordBuffer, WordSpan};
use crate::config::{Config, Model, PolishScope};
use crate::dispatch::{LayoutRequestSlot, LayoutSwitchRequest, SwitchReason};
use crate::domain::outcome::{CorrectionOutcome, Failure, SkipReason};
use crate::domain::text::boundary::{is_boundary, is_hard_boundary};
use crate::domain::text::mapping::{
    Mismatch, detect_layout_mismatch, detect_target_layout, dominant_layout, fix_mixed_layout,
    map_en_to_ru, map_ru_to_en,
};
use crate::event::{Key, KeyEvent, KeyOrigin};
use crate::history::{CorrectionRecord, RuleStore, UndoStack};
use crate::replace::{Injector, replacement_ops};
use crate::strategy::semantic::{RuleEngine, Semantic};
use crate::strategy::spell::{Dictionary, LangSet, is_valid_text, validity_score};
use crate::strategy::{CorrectionCandidate, Corrector};
use guard::{IdempotencyGuard, ReentryGuard};
use state::DaemonState;

const RULES_FILE: &str = "learned_rules.json";
const HISTORY_FILE: &str = "history.json";

/// External collaborators the engine is wired to at startup.
pub struct Collaborators {
    pub dictionary: Arc<dyn Dictionary>,
    /// Semantic fallback. When `None` and the config selects the
    /// embedded model, the built-in rule engine is used.
    pub semantic: Option<Arc<dyn Semantic>>,
    pub injector: Box<dyn Injector>,
    pub switch_slot: LayoutRequestSlot,
}

pub struct Engine {
    config: Config,
    corrector: Corrector,
    buffer: WordBuffer,
    state: DaemonState,
    guard: IdempotencyGuard,
    injector: Box<dyn Injector>,
    switch_slot: LayoutRequestSlot,
    undo: UndoStack,
    rules: RuleStore,
    history_path: Option<PathBuf>,
    phrase_deadline: Option<Instant>,
    last_boundary: Option<char>,
    replacing: AtomicBool,
}

impl Engine {
    pub fn new(config: Config, parts: Collaborators) -> Self {
        Self::build(config, parts, RuleStore::in_memory(), UndoStack::new(), None)
    }

    /// Like [`Engine::new`], with rules and the history window loaded
    /// from (and persisted to) `dir`.
    pub fn with_state_dir(config: Config, parts: Collaborators, dir: &Path) -> Self {
        let rules = RuleStore::open(&dir.join(RULES_FILE));
        let history_path = dir.join(HISTORY_FILE);
        let undo = UndoStack::load(&history_path).unwrap_or_default();
        Self::build(config, parts, rules, undo, Some(history_path))
    }

    fn build(
        config: Config,
        parts: Collaborators,
        rules: RuleStore,
        undo: UndoStack,
        history_path: Option<PathBuf>,
    ) -> Self {
        let langs = LangSet::from_codes(config.languages());
        let threshold = config.confidence_threshold();

        let semantic = parts.semantic.or_else(|| match config.model() {
            Model::Embedded => Some(Arc::new(RuleEngine::new(
                Arc::clone(&parts.dictionary),
                langs,
                threshold,
            )) as Arc<dyn Semantic>),
            Model::Api => None,
        });

        let corrector = Corrector::new(
            Arc::clone(&parts.dictionary),
            semantic,
            langs,
            threshold,
            config.ai_timeout(),
        );

        Self {
            config,
            corrector,
            buffer: WordBuffer::new(),
            state: DaemonState::Idle,
            guard: IdempotencyGuard::new(),
            injector: parts.injector,
            switch_slot: parts.switch_slot,
            undo,
            rules,
            history_path,
            phrase_deadline: None,
            last_boundary: None,
            replacing: AtomicBool::new(false),
        }
    }

    pub fn state(&self) -> DaemonState {
        self.state
    }

    pub fn enabled(&self) -> bool {
        self.config.enabled()
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.config.set_enabled(enabled);
        tracing::info!(enabled, "correction toggled");
    }

    pub fn rules(&self) -> &RuleStore {
        &self.rules
    }

    pub fn rules_mut(&mut self) -> &mut RuleStore {
        &mut self.rules
    }

    pub fn history_len(&self) -> usize {
        self.undo.len()
    }

    /// Feeds one captured keystroke. O(1) buffering; at most one
    /// bounded chain run when the event finalizes a word.
    ///
    /// Returns the correction decision when one was made.
    pub fn on_key_event(&mut self, ev: &KeyEvent) -> Option<CorrectionOutcome> {
        if ev.origin == KeyOrigin::Synthetic {
            tracing::trace!(seq = ev.seq, "synthetic event dropped");
            return Some(CorrectionOutcome::Skipped(SkipReason::SyntheticOrigin));
        }
        if !self.config.enabled() {
            return Some(CorrectionOutcome::Skipped(SkipReason::Disabled));
        }

        match ev.key {
            Key::Backspace => {
                self.phrase_deadline = None;
                self.buffer.backspace();
                None
            }
            Key::Nav => {
                self.reset_context();
                None
            }
            Key::Char(c) if is_boundary(c) => self.on_boundary(c, ev.timestamp),
            Key::Char(c) => {
                self.on_content(c);
                None
            }
        }
    }

    fn on_content(&mut self, c: char) {
        self.phrase_deadline = None;

        if self.state == DaemonState::Handoff {
            // New word after handoff: correction logic starts fresh.
            self.guard.reset_context();
            self.buffer.clear_phrase();
            tracing::trace!("handoff left on new content");
        }

        self.state = DaemonState::TypingWord;
        self.buffer.push_content(c);
    }

    fn on_boundary(&mut self, c: char, now: Instant) -> Option<CorrectionOutcome> {
        self.phrase_deadline = None;

        if self.state == DaemonState::Handoff {
            // Verbatim passthrough; the line context still accumulates
            // so a later polish sees it.
            let _ = self.buffer.finalize(c);
            return Some(CorrectionOutcome::Skipped(SkipReason::Handoff));
        }

        let span = self.buffer.finalize(c)?;
        self.state = DaemonState::WordFinalized;
        self.last_boundary = Some(c);

        let outcome = self.try_correct_word(&span, Some(c));

        if !matches!(outcome, CorrectionOutcome::Applied(_)) {
            if self.buffer.phrase_words().len() >= 2 {
                self.phrase_deadline = Some(now + self.config.phrase_idle_delay());
            } else {
                self.state = DaemonState::Idle;
            }
        }

        Some(outcome)
    }

    /// Word-level strategies run exactly once for a finalized span.
    fn try_correct_word(&mut self, span: &WordSpan, boundary: Option<char>) -> CorrectionOutcome {
        let word = span.text.as_str();

        if self.guard.is_recent_output(word) {
            tracing::debug!(word = %word, "guard hit: word matches last correction output");
            self.buffer.clear_phrase();
            return CorrectionOutcome::Skipped(SkipReason::GuardRecentOutput);
        }

        if self.guard.is_finalized(word) {
            tracing::debug!(word = %word, "already corrected in this context");
            self.buffer.push_phrase_word(word);
            return CorrectionOutcome::Skipped(SkipReason::AlreadyFinalized);
        }

        self.buffer.push_phrase_word(word);

        let context = self.buffer.context_text();
        let candidate = match self.corrector.correct_word(&self.rules, word, &context) {
            Ok(c) => c,
            Err(reason) => {
                tracing::trace!(word = %word, reason = reason.as_str(), "word skipped");
                // Settled words are not re-examined until the context
                // resets.
                self.guard.note_finalized(word);
                return CorrectionOutcome::Skipped(reason);
            }
        };

        if let Some(hit) = self
            .guard
            .rejects_candidate((span.start, span.end), &candidate.replacement)
        {
            tracing::debug!(
                word = %word,
                replacement = %candidate.replacement,
                reason = hit.as_str(),
                "guard hit: candidate discarded"
            );
            return CorrectionOutcome::Skipped(hit);
        }

        // The corrected word no longer belongs to the phrase context.
        self.buffer.pop_phrase_word();

        let delete = span.text.chars().count() + usize::from(boundary.is_some());
        self.apply_correction(
            word.to_string(),
            (span.start, span.end),
            boundary,
            delete,
            candidate,
            SwitchReason::Word,
        )
    }

    /// Deferred phrase correction. Driven by the host loop; the
    /// deadline was cancelled the moment any new content arrived.
    pub fn poll_idle(&mut self, now: Instant) -> Option<CorrectionOutcome> {
        let deadline = self.phrase_deadline?;
        if now < deadline {
            return None;
        }
        self.phrase_deadline = None;

        if !matches!(self.state, DaemonState::WordFinalized | DaemonState::Idle) {
            return None;
        }

        let words: Vec<String> = self.buffer.phrase_words().to_vec();
        let candidate = match self.corrector.correct_phrase(&self.rules, &words) {
            Ok(c) => c,
            Err(reason) => {
                tracing::trace!(reason = reason.as_str(), "phrase skipped");
                self.state = DaemonState::Idle;
                return Some(CorrectionOutcome::Skipped(reason));
            }
        };

        let phrase = words.join(" ");
        let len = self.buffer.phrase_char_len() as u64;
        let span = (self.buffer.position().saturating_sub(len), self.buffer.position());

        if let Some(hit) = self.guard.rejects_candidate(span, &candidate.replacement) {
            tracing::debug!(reason = hit.as_str(), "guard hit: phrase candidate discarded");
            self.state = DaemonState::Idle;
            return Some(CorrectionOutcome::Skipped(hit));
        }

        let delete = self.buffer.phrase_char_len();
        let boundary = self.last_boundary;
        let outcome = self.apply_correction(
            phrase,
            span,
            boundary,
            delete,
            candidate,
            SwitchReason::Phrase,
        );

        if !matches!(outcome, CorrectionOutcome::Applied(_)) {
            self.state = DaemonState::Idle;
        }
        Some(outcome)
    }

    /// Emits one correction atomically and records it.
    ///
    /// `delete` covers the typed span plus the echoed boundary when one
    /// is present; the boundary is re-emitted exactly once after the
    /// replacement, leaving the cursor right behind it.
    fn apply_correction(
        &mut self,
        original: String,
        span: (u64, u64),
        boundary: Option<char>,
        delete: usize,
        candidate: CorrectionCandidate,
        reason: SwitchReason,
    ) -> CorrectionOutcome {
        let _guard = match ReentryGuard::try_acquire(&self.replacing) {
            Ok(g) => g,
            Err(r) => return CorrectionOutcome::Skipped(r),
        };

        let boundary = candidate.consumes_boundary.then_some(boundary).flatten();
        let ops = replacement_ops(delete, &candidate.replacement, boundary);
        if let Err(e) = self.injector.inject(&ops) {
            tracing::warn!(
                original = %original,
                error = e.as_str(),
                "injection failed, correction aborted"
            );
            return CorrectionOutcome::Failed(Failure::Injection);
        }

        tracing::info!(
            original = %original,
            replacement = %candidate.replacement,
            strategy = candidate.strategy.as_str(),
            confidence = candidate.confidence,
            "correction applied"
        );

        self.guard.note_applied(&original, &candidate.replacement, span);
        self.undo
            .push(CorrectionRecord::new(&original, &candidate.replacement, boundary, span));
        self.persist_history();

        if let Some(target) = detect_target_layout(&candidate.replacement) {
            self.switch_slot.post(LayoutSwitchRequest { target, reason });
        }

        self.state = DaemonState::Handoff;
        self.buffer.clear_typing();
        self.buffer.clear_phrase();

        CorrectionOutcome::Applied(candidate.strategy)
    }

    /// Reverts the most recent correction exactly: deletes the
    /// replacement (and its boundary), re-types the original bytes and
    /// the same boundary. Three undos of one normalized pattern learn a
    /// suppression rule.
    pub fn undo(&mut self) -> CorrectionOutcome {
        let Some(record) = self.undo.pop() else {
            return CorrectionOutcome::Skipped(SkipReason::NothingToUndo);
        };
        self.phrase_deadline = None;

        let guard = match ReentryGuard::try_acquire(&self.replacing) {
            Ok(g) => g,
            Err(r) => {
                self.undo.push(record);
                return CorrectionOutcome::Skipped(r);
            }
        };

        let delete = record.replacement.chars().count() + usize::from(record.boundary.is_some());
        let ops = replacement_ops(delete, &record.original, record.boundary);
        if let Err(e) = self.injector.inject(&ops) {
            tracing::warn!(error = e.as_str(), "undo injection failed");
            drop(guard);
            self.undo.push(record);
            return CorrectionOutcome::Failed(Failure::Injection);
        }

        tracing::info!(
            replacement = %record.replacement,
            original = %record.original,
            "correction undone"
        );

        self.rules.record_undo(&record.original);
        self.persist_history();
        CorrectionOutcome::Undone
    }

    /// Re-runs the chain against the most recent record's original text
    /// with the current configuration and replaces whatever occupies
    /// that span. Does not consume an undo slot.
    pub fn rethink(&mut self) -> CorrectionOutcome {
        let Some(last) = self.undo.peek().cloned() else {
            // Nothing recorded: force-complete the open word and run
            // the chain on it inline.
            let Some(span) = self.buffer.force_complete() else {
                return CorrectionOutcome::Skipped(SkipReason::EmptyBuffer);
            };
            self.state = DaemonState::WordFinalized;
            return self.try_correct_word(&span, None);
        };

        let candidate = match self.corrector.correct_word(&self.rules, &last.original, "") {
            Ok(c) => c,
            Err(reason) => return CorrectionOutcome::Skipped(reason),
        };
        if candidate.replacement == last.replacement {
            return CorrectionOutcome::Skipped(SkipReason::NoChange);
        }

        let _guard = match ReentryGuard::try_acquire(&self.replacing) {
            Ok(g) => g,
            Err(r) => return CorrectionOutcome::Skipped(r),
        };

        let delete = last.replacement.chars().count() + usize::from(last.boundary.is_some());
        let ops = replacement_ops(delete, &candidate.replacement, last.boundary);
        if let Err(e) = self.injector.inject(&ops) {
            tracing::warn!(error = e.as_str(), "rethink injection failed");
            return CorrectionOutcome::Failed(Failure::Injection);
        }

        tracing::info!(
            original = %last.original,
            was = %last.replacement,
            now = %candidate.replacement,
            "rethink applied"
        );

        let span = (last.span_start, last.span_end);
        self.guard
            .note_applied(&last.original, &candidate.replacement, span);
        let strategy = candidate.strategy;
        self.undo.push(CorrectionRecord::new(
            &last.original,
            &candidate.replacement,
            last.boundary,
            span,
        ));
        self.persist_history();
        CorrectionOutcome::Applied(strategy)
    }

    /// One-shot cleanup of the typed context: layout fix, per-word
    /// chain pass, whitespace collapse. Corrects, never rephrases.
    pub fn polish(&mut self) -> CorrectionOutcome {
        self.phrase_deadline = None;
        let context = self.buffer.context_text();
        let scoped = match self.config.polish_scope() {
            PolishScope::Line => context.as_str(),
            PolishScope::LastBoundary => {
                match context.rfind(|c| is_hard_boundary(c)) {
                    Some(i) => &context[i + context[i..].chars().next().map_or(1, char::len_utf8)..],
                    None => context.as_str(),
                }
            }
        };

        let original = scoped.trim();
        if original.is_empty() {
            return CorrectionOutcome::Skipped(SkipReason::EmptyBuffer);
        }

        let Some(polished) = self.polish_text(original) else {
            tracing::debug!(text = %original, "polish: no changes needed");
            return CorrectionOutcome::Skipped(SkipReason::NoChange);
        };

        let _guard = match ReentryGuard::try_acquire(&self.replacing) {
            Ok(g) => g,
            Err(r) => return CorrectionOutcome::Skipped(r),
        };

        // The whole scoped slice is rewritten; whitespace at its edges
        // survives around the polished text.
        let lead = &scoped[..scoped.len() - scoped.trim_start().len()];
        let trail = &scoped[scoped.trim_end().len()..];
        let emitted = format!("{lead}{polished}{trail}");

        let delete = scoped.chars().count();
        let ops = replacement_ops(delete, &emitted, None);
        if let Err(e) = self.injector.inject(&ops) {
            tracing::warn!(error = e.as_str(), "polish injection failed");
            return CorrectionOutcome::Failed(Failure::Injection);
        }

        tracing::info!(original = %original, polished = %polished, "polish applied");

        let span = (
            self.buffer.position().saturating_sub(delete as u64),
            self.buffer.position(),
        );
        self.guard.note_applied(original, &polished, span);
        self.undo
            .push(CorrectionRecord::new(original, &polished, None, span));
        self.persist_history();

        if let Some(target) = detect_target_layout(&polished) {
            self.switch_slot
                .post(LayoutSwitchRequest { target, reason: SwitchReason::Polish });
        }

        self.state = DaemonState::Handoff;
        self.buffer.clear_typing();
        self.buffer.clear_phrase();
        self.guard.reset_context();

        CorrectionOutcome::Polished
    }

    fn polish_text(&self, original: &str) -> Option<String> {
        let langs = self.corrector.langs();
        let dict = self.corrector.dictionary();

        let mut text = original.to_string();

        match detect_layout_mismatch(&text) {
            Some(Mismatch::EnMeantRu) => {
                let mapped = map_en_to_ru(&text);
                if is_valid_text(dict, langs, &mapped) || validity_score(dict, langs, &mapped) > 0.5
                {
                    text = mapped;
                }
            }
            Some(Mismatch::RuMeantEn) => {
                let mapped = map_ru_to_en(&text);
                if is_valid_text(dict, langs, &mapped) {
                    text = mapped;
                }
            }
            Some(Mismatch::Mixed) => {
                let fixed = fix_mixed_layout(&text, dominant_layout(&text));
                if fixed != text {
                    text = fixed;
                }
            }
            None => {}
        }

        let mut words: Vec<String> = Vec::new();
        for word in text.split_whitespace() {
            match self.corrector.correct_word(&self.rules, word, &text) {
                Ok(c) => words.push(c.replacement),
                Err(_) => words.push(word.to_string()),
            }
        }
        let out = words.join(" ");

        (out != original).then_some(out)
    }

    fn reset_context(&mut self) {
        self.phrase_deadline = None;
        self.buffer.clear_typing();
        self.buffer.clear_phrase();
        self.guard.reset_context();
        self.state = DaemonState::Idle;
    }

    fn persist_history(&self) {
        let Some(path) = &self.history_path else {
            return;
        };
        if let Err(e) = self.undo.save(path) {
            tracing::warn!(path = %path.display(), error = %e, "history write failed");
        }
    }
}

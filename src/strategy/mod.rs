//! Correction strategy chain.
//!
//! The strategy set is closed and ordered; ordering is a correctness
//! property, so the chain is a fixed sequence of tagged steps rather
//! than open-ended dispatch. First acceptable candidate wins.

pub mod api;
pub mod semantic;
pub mod spell;

use std::sync::Arc;
use std::time::Duration;

use crate::domain::outcome::SkipReason;
use crate::domain::text::mapping::{
    Mismatch, detect_layout_mismatch, dominant_layout, fix_mixed_layout, is_all_caps,
    map_en_to_ru, map_ru_to_en,
};
use crate::history::RuleStore;
use semantic::{Semantic, correct_with_deadline};
use spell::{Dictionary, LangSet, is_valid_text, spell_correct_text, validity_score};

/// The closed set of correction strategies, in priority order.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Strategy {
    Suppression,
    PhraseSwap,
    WordSwap,
    MixedRepair,
    Spell,
    Semantic,
}

impl Strategy {
    pub fn as_str(self) -> &'static str {
        match self {
            Strategy::Suppression => "suppression",
            Strategy::PhraseSwap => "phrase_swap",
            Strategy::WordSwap => "word_swap",
            Strategy::MixedRepair => "mixed_repair",
            Strategy::Spell => "spell",
            Strategy::Semantic => "semantic",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct CorrectionCandidate {
    pub strategy: Strategy,
    pub replacement: String,
    pub confidence: f64,
    /// Whether applying this candidate swallows and re-emits the
    /// triggering boundary. True for inline corrections; polish has no
    /// triggering boundary.
    pub consumes_boundary: bool,
}

pub struct Corrector {
    dictionary: Arc<dyn Dictionary>,
    semantic: Option<Arc<dyn Semantic>>,
    langs: LangSet,
    threshold: f64,
    ai_timeout: Duration,
}

impl Corrector {
    pub fn new(
        dictionary: Arc<dyn Dictionary>,
        semantic: Option<Arc<dyn Semantic>>,
        langs: LangSet,
        threshold: f64,
        ai_timeout: Duration,
    ) -> Self {
        Self {
            dictionary,
            semantic,
            langs,
            threshold,
            ai_timeout,
        }
    }

    pub fn langs(&self) -> LangSet {
        self.langs
    }

    pub fn dictionary(&self) -> &dyn Dictionary {
        self.dictionary.as_ref()
    }

    fn accept(
        &self,
        original: &str,
        strategy: Strategy,
        replacement: String,
        confidence: f64,
    ) -> Option<CorrectionCandidate> {
        if replacement == original {
            return None;
        }
        if confidence < self.threshold {
            tracing::trace!(
                strategy = strategy.as_str(),
                confidence,
                threshold = self.threshold,
                "candidate below confidence threshold"
            );
            return None;
        }
        Some(CorrectionCandidate {
            strategy,
            replacement,
            confidence,
            consumes_boundary: true,
        })
    }

    /// Runs the word-level chain (suppression, layout swap, mixed
    /// repair, spelling, semantic fallback) against one finalized word.
    pub fn correct_word(
        &self,
        rules: &RuleStore,
        text: &str,
        context: &str,
    ) -> Result<CorrectionCandidate, SkipReason> {
        if text.trim().is_empty() {
            return Err(SkipReason::EmptyBuffer);
        }
        if rules.is_suppressed(text) {
            return Err(SkipReason::Suppressed);
        }
        if is_all_caps(text) {
            return Err(SkipReason::AllCaps);
        }
        if is_valid_text(self.dictionary.as_ref(), self.langs, text) {
            return Err(SkipReason::AlreadyValid);
        }

        if let Some(c) = self.try_word_swap(text) {
            return Ok(c);
        }
        if let Some(c) = self.try_mixed_repair(text) {
            return Ok(c);
        }
        if let Some(c) = self.try_spelling(text) {
            return Ok(c);
        }
        if let Some(c) = self.try_semantic(text, context) {
            return Ok(c);
        }

        Err(SkipReason::NoCandidate)
    }

    /// Runs the phrase-level chain against the buffered words.
    pub fn correct_phrase(
        &self,
        rules: &RuleStore,
        words: &[String],
    ) -> Result<CorrectionCandidate, SkipReason> {
        if words.len() < 2 {
            return Err(SkipReason::TooFewWords);
        }

        let phrase = words.join(" ");
        if rules.is_suppressed(&phrase) {
            return Err(SkipReason::Suppressed);
        }
        if is_all_caps(&phrase) {
            return Err(SkipReason::AllCaps);
        }
        if is_valid_text(self.dictionary.as_ref(), self.langs, &phrase) {
            return Err(SkipReason::AlreadyValid);
        }

        if let Some((mapped, confidence)) = self.swap_with_spell(&phrase) {
            // A phrase that still needs per-word fixes after the swap
            // gets them at a small confidence discount.
            let dict = self.dictionary.as_ref();
            if let Some(polished) = spell_correct_text(dict, self.langs, self.threshold, &mapped) {
                if polished != mapped {
                    if let Some(c) = self.accept(
                        &phrase,
                        Strategy::PhraseSwap,
                        polished,
                        confidence * 0.95,
                    ) {
                        return Ok(c);
                    }
                }
            }
            if let Some(c) = self.accept(&phrase, Strategy::PhraseSwap, mapped, confidence) {
                return Ok(c);
            }
        }

        Err(SkipReason::NoCandidate)
    }

    /// Layout swap plus spell repair of the mapped result. Shared by the
    /// word and phrase paths; returns the text and a raw confidence.
    fn swap_with_spell(&self, text: &str) -> Option<(String, f64)> {
        let dict = self.dictionary.as_ref();

        match detect_layout_mismatch(text)? {
            Mismatch::EnMeantRu => {
                let mapped = map_en_to_ru(text);
                if is_valid_text(dict, self.langs, &mapped) {
                    return Some((mapped, 0.95));
                }

                if let Some(fixed) = spell_correct_text(dict, self.langs, self.threshold, &mapped)
                {
                    if is_valid_text(dict, self.langs, &fixed) {
                        return Some((fixed, 0.9));
                    }
                }

                // Mostly-valid mapped text is still the best reading of
                // gibberish; the score doubles as the confidence.
                let score = validity_score(dict, self.langs, &mapped);
                (score > 0.5).then_some((mapped, score))
            }
            Mismatch::RuMeantEn => {
                let mapped = map_ru_to_en(text);
                is_valid_text(dict, self.langs, &mapped).then_some((mapped, 0.95))
            }
            Mismatch::Mixed => None,
        }
    }

    fn try_word_swap(&self, text: &str) -> Option<CorrectionCandidate> {
        let (mapped, confidence) = self.swap_with_spell(text)?;
        self.accept(text, Strategy::WordSwap, mapped, confidence)
    }

    fn try_mixed_repair(&self, text: &str) -> Option<CorrectionCandidate> {
        if detect_layout_mismatch(text) != Some(Mismatch::Mixed) {
            return None;
        }

        let dict = self.dictionary.as_ref();
        let fixed = fix_mixed_layout(text, dominant_layout(text));
        if fixed == text {
            return None;
        }

        if is_valid_text(dict, self.langs, &fixed) {
            return self.accept(text, Strategy::MixedRepair, fixed, 0.9);
        }

        let spelled = spell_correct_text(dict, self.langs, self.threshold, &fixed)?;
        if is_valid_text(dict, self.langs, &spelled) {
            return self.accept(text, Strategy::MixedRepair, spelled, 0.85);
        }

        None
    }

    fn try_spelling(&self, text: &str) -> Option<CorrectionCandidate> {
        let fixed =
            spell_correct_text(self.dictionary.as_ref(), self.langs, self.threshold, text)?;
        self.accept(text, Strategy::Spell, fixed, 0.8)
    }

    fn try_semantic(&self, text: &str, context: &str) -> Option<CorrectionCandidate> {
        let engine = self.semantic.as_ref()?;
        let fixed = correct_with_deadline(engine, text, context, self.ai_timeout)?;
        self.accept(text, Strategy::Semantic, fixed, engine.source_confidence())
    }
}

use std::sync::Arc;
use std::time::Duration;

use crate::domain::Lang;
use crate::domain::outcome::SkipReason;
use crate::history::RuleStore;
use crate::strategy::semantic::Semantic;
use crate::strategy::spell::{LangSet, WordList, damerau_levenshtein};
use crate::strategy::{Corrector, Strategy};
use crate::tests::support::word_list;

const BOTH: LangSet = LangSet { en: true, ru: true };

fn corrector() -> Corrector {
    Corrector::new(
        Arc::new(word_list()),
        None,
        BOTH,
        0.6,
        Duration::from_millis(100),
    )
}

#[test]
fn wrong_layout_word_wins_with_word_swap() {
    let rules = RuleStore::in_memory();
    let c = corrector().correct_word(&rules, "ghbdtn", "").unwrap();

    assert_eq!(c.strategy, Strategy::WordSwap);
    assert_eq!(c.replacement, "привет");
    assert!(c.confidence >= 0.95);
    assert!(c.consumes_boundary);
}

#[test]
fn mapped_word_with_typo_gets_spell_repair() {
    // "ghbdtm" maps to "привеь", one edit away from "привет".
    let rules = RuleStore::in_memory();
    let c = corrector().correct_word(&rules, "ghbdtm", "").unwrap();

    assert_eq!(c.strategy, Strategy::WordSwap);
    assert_eq!(c.replacement, "привет");
    assert!((c.confidence - 0.9).abs() < 1e-9);
}

#[test]
fn mixed_script_token_is_repaired_toward_the_dominant_script() {
    let rules = RuleStore::in_memory();
    let c = corrector().correct_word(&rules, "приvет", "").unwrap();

    assert_eq!(c.strategy, Strategy::MixedRepair);
    assert_eq!(c.replacement, "привет");
}

#[test]
fn plain_typo_falls_through_to_spelling() {
    let rules = RuleStore::in_memory();
    let c = corrector().correct_word(&rules, "helo", "").unwrap();

    assert_eq!(c.strategy, Strategy::Spell);
    assert_eq!(c.replacement, "hello");
    assert!((c.confidence - 0.8).abs() < 1e-9);
}

#[test]
fn scrambled_native_word_is_spell_repaired() {
    // Right layout, scrambled letters: transposition plus an extra char.
    let mut dict: WordList = crate::tests::support::word_list();
    dict.insert(Lang::Ru, "выключил");
    let corrector = Corrector::new(Arc::new(dict), None, BOTH, 0.6, Duration::from_millis(100));

    let rules = RuleStore::in_memory();
    let c = corrector.correct_word(&rules, "ывгключил", "").unwrap();

    assert_eq!(c.strategy, Strategy::Spell);
    assert_eq!(c.replacement, "выключил");
}

#[test]
fn chain_skips_before_it_corrects() {
    let rules = RuleStore::in_memory();
    let corrector = corrector();

    assert_eq!(
        corrector.correct_word(&rules, "", "").unwrap_err(),
        SkipReason::EmptyBuffer
    );
    assert_eq!(
        corrector.correct_word(&rules, "hello", "").unwrap_err(),
        SkipReason::AlreadyValid
    );
    assert_eq!(
        corrector.correct_word(&rules, "GHBDTN", "").unwrap_err(),
        SkipReason::AllCaps
    );
}

#[test]
fn suppression_outranks_every_strategy() {
    let mut rules = RuleStore::in_memory();
    for _ in 0..3 {
        rules.record_undo("ghbdtn");
    }

    assert_eq!(
        corrector().correct_word(&rules, "ghbdtn", "").unwrap_err(),
        SkipReason::Suppressed
    );
}

#[test]
fn phrase_swap_corrects_the_joined_words() {
    let rules = RuleStore::in_memory();
    let words = vec!["rfr".to_string(), "ltkf".to_string()];

    let c = corrector().correct_phrase(&rules, &words).unwrap();

    assert_eq!(c.strategy, Strategy::PhraseSwap);
    assert_eq!(c.replacement, "как дела");
    assert!(c.confidence >= 0.95);
}

#[test]
fn phrase_needs_at_least_two_words() {
    let rules = RuleStore::in_memory();
    let words = vec!["rfr".to_string()];

    assert_eq!(
        corrector().correct_phrase(&rules, &words).unwrap_err(),
        SkipReason::TooFewWords
    );
}

#[test]
fn suppressed_phrase_is_skipped() {
    let mut rules = RuleStore::in_memory();
    for _ in 0..3 {
        rules.record_undo("rfr ltkf");
    }
    let words = vec!["rfr".to_string(), "ltkf".to_string()];

    assert_eq!(
        corrector().correct_phrase(&rules, &words).unwrap_err(),
        SkipReason::Suppressed
    );
}

struct CannedSemantic(Option<String>);

impl Semantic for CannedSemantic {
    fn correct(&self, _text: &str, _context: &str) -> Option<String> {
        self.0.clone()
    }
}

#[test]
fn semantic_fallback_runs_last() {
    let rules = RuleStore::in_memory();
    let corrector = Corrector::new(
        Arc::new(word_list()),
        Some(Arc::new(CannedSemantic(Some("test".to_string())))),
        BOTH,
        0.6,
        Duration::from_millis(100),
    );

    // Nothing earlier in the chain can place this token.
    let c = corrector.correct_word(&rules, "zzqq", "").unwrap();
    assert_eq!(c.strategy, Strategy::Semantic);
    assert_eq!(c.replacement, "test");
}

#[test]
fn silent_semantic_means_no_candidate() {
    let rules = RuleStore::in_memory();
    let corrector = Corrector::new(
        Arc::new(word_list()),
        Some(Arc::new(CannedSemantic(None))),
        BOTH,
        0.6,
        Duration::from_millis(100),
    );

    assert_eq!(
        corrector.correct_word(&rules, "zzqq", "").unwrap_err(),
        SkipReason::NoCandidate
    );
}

#[test]
fn below_threshold_candidates_are_rejected() {
    // Spelling carries 0.8; a 0.9 threshold filters it out.
    let rules = RuleStore::in_memory();
    let corrector = Corrector::new(
        Arc::new(word_list()),
        None,
        BOTH,
        0.9,
        Duration::from_millis(100),
    );

    assert_eq!(
        corrector.correct_word(&rules, "helo", "").unwrap_err(),
        SkipReason::NoCandidate
    );
}

#[test]
fn transpositions_count_as_one_edit() {
    assert_eq!(damerau_levenshtein("hlelo", "hello"), 1);
    assert_eq!(damerau_levenshtein("ывгключил", "выключил"), 2);
    assert_eq!(damerau_levenshtein("same", "same"), 0);
    assert_eq!(damerau_levenshtein("", "abc"), 3);
}

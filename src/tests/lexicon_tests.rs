use crate::domain::Lang;
use crate::strategy::spell::{Dictionary, HeuristicLexicon};

#[test]
fn plausible_words_in_their_own_script_are_accepted() {
    let lex = HeuristicLexicon::new();

    assert!(lex.contains(Lang::En, "hello"));
    assert!(lex.contains(Lang::Ru, "привет"));
}

#[test]
fn wrong_layout_gibberish_is_rejected() {
    let lex = HeuristicLexicon::new();

    assert!(!lex.contains(Lang::En, "ghbdtn"));
    assert!(!lex.contains(Lang::Ru, "фшвркнл"));
}

#[test]
fn cross_script_lookups_are_rejected() {
    let lex = HeuristicLexicon::new();

    assert!(!lex.contains(Lang::En, "привет"));
    assert!(!lex.contains(Lang::Ru, "hello"));
}

#[test]
fn shape_heuristics_never_propose_spellings() {
    let lex = HeuristicLexicon::new();
    assert!(lex.lookup(Lang::En, "helo").is_none());
}

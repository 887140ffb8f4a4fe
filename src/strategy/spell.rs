//! Spell correction against a pluggable dictionary collaborator.

use std::collections::HashSet;

use crate::domain::Lang;
use crate::domain::text::mapping::{apply_casing, is_cyrillic, looks_like_ascii_word};

/// Maximum edit distance a dictionary suggestion may sit from the typed
/// word before it is rejected as too speculative.
const MAX_EDIT_DISTANCE: usize = 3;

const EDGE_PUNCT: &str = ".,;:!?()[]{}\"'/\\-=+@#$%^&*~`<>|";

#[derive(Clone, Debug, PartialEq)]
pub struct Suggestion {
    pub candidate: String,
    pub confidence: f64,
}

/// Dictionary/spellcheck collaborator.
///
/// Implementations must answer within the configured lookup budget or
/// return nothing; a slow lookup is treated as a failed one.
pub trait Dictionary: Send + Sync {
    fn contains(&self, lang: Lang, word: &str) -> bool;
    fn lookup(&self, lang: Lang, word: &str) -> Option<Suggestion>;
}

/// Which languages the corrector currently targets.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct LangSet {
    pub en: bool,
    pub ru: bool,
}

impl LangSet {
    pub fn from_codes<S: AsRef<str>>(codes: &[S]) -> Self {
        let mut set = Self::default();
        for code in codes {
            match Lang::from_code(code.as_ref()) {
                Some(Lang::En) => set.en = true,
                Some(Lang::Ru) => set.ru = true,
                None => {}
            }
        }
        set
    }

    pub fn enabled(self, lang: Lang) -> bool {
        match lang {
            Lang::En => self.en,
            Lang::Ru => self.ru,
        }
    }
}

pub(crate) fn clean_word(word: &str) -> &str {
    word.trim_matches(|c: char| EDGE_PUNCT.contains(c))
}

fn is_english_script(word: &str) -> bool {
    let mut has_alpha = false;
    for ch in word.chars().filter(|c| c.is_alphabetic()) {
        has_alpha = true;
        if !ch.is_ascii_alphabetic() {
            return false;
        }
    }
    has_alpha
}

fn is_russian_script(word: &str) -> bool {
    let mut has_alpha = false;
    for ch in word.chars().filter(|c| c.is_alphabetic()) {
        has_alpha = true;
        if !is_cyrillic(ch) {
            return false;
        }
    }
    has_alpha
}

/// A word is valid when some enabled language's dictionary knows it.
pub(crate) fn is_valid_word(dict: &dyn Dictionary, langs: LangSet, word: &str) -> bool {
    if word.is_empty() {
        return true;
    }

    if langs.en && is_english_script(word) && dict.contains(Lang::En, &word.to_lowercase()) {
        return true;
    }
    if langs.ru && is_russian_script(word) && dict.contains(Lang::Ru, &word.to_lowercase()) {
        return true;
    }

    false
}

pub(crate) fn is_valid_text(dict: &dyn Dictionary, langs: LangSet, text: &str) -> bool {
    let mut words = text.split_whitespace().peekable();
    if words.peek().is_none() {
        return true;
    }
    words.all(|w| is_valid_word(dict, langs, clean_word(w)))
}

/// Share of valid words in `text`, 0.0..=1.0.
pub(crate) fn validity_score(dict: &dyn Dictionary, langs: LangSet, text: &str) -> f64 {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() {
        return 0.0;
    }

    let valid = words
        .iter()
        .filter(|w| is_valid_word(dict, langs, clean_word(w)))
        .count();
    #[allow(clippy::cast_precision_loss)]
    let score = valid as f64 / words.len() as f64;
    score
}

fn spell_correct_word(
    dict: &dyn Dictionary,
    langs: LangSet,
    threshold: f64,
    word: &str,
) -> Option<String> {
    let lower = word.to_lowercase();

    let langs_to_try = [
        (langs.ru && is_russian_script(word), Lang::Ru),
        (langs.en && is_english_script(word), Lang::En),
    ];

    for (eligible, lang) in langs_to_try {
        if !eligible {
            continue;
        }
        let Some(sug) = dict.lookup(lang, &lower) else {
            continue;
        };
        if sug.confidence < threshold {
            tracing::trace!(
                word = %word,
                candidate = %sug.candidate,
                confidence = sug.confidence,
                "spell suggestion below threshold"
            );
            continue;
        }
        if sug.candidate != lower && damerau_levenshtein(&lower, &sug.candidate) <= MAX_EDIT_DISTANCE
        {
            return Some(sug.candidate);
        }
    }

    None
}

/// Spell-corrects each word of `text`; `None` when nothing changed.
/// Edge punctuation and casing of the originals are preserved.
pub(crate) fn spell_correct_text(
    dict: &dyn Dictionary,
    langs: LangSet,
    threshold: f64,
    text: &str,
) -> Option<String> {
    let mut out: Vec<String> = Vec::new();
    let mut any_corrected = false;

    for word in text.split_whitespace() {
        let clean = clean_word(word);
        if clean.is_empty() || is_valid_word(dict, langs, clean) {
            out.push(word.to_string());
            continue;
        }

        match spell_correct_word(dict, langs, threshold, clean) {
            Some(fixed) => {
                let cased = apply_casing(clean, &fixed);
                out.push(word.replace(clean, &cased));
                any_corrected = true;
            }
            None => out.push(word.to_string()),
        }
    }

    any_corrected.then(|| out.join(" "))
}

/// Damerau-Levenshtein distance with adjacent transpositions.
pub fn damerau_levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let (la, lb) = (a.len(), b.len());

    let mut d = vec![vec![0usize; lb + 1]; la + 1];
    for (i, row) in d.iter_mut().enumerate() {
        row[0] = i;
    }
    for j in 0..=lb {
        d[0][j] = j;
    }

    for i in 1..=la {
        for j in 1..=lb {
            let cost = usize::from(a[i - 1] != b[j - 1]);
            let mut best = (d[i - 1][j] + 1).min(d[i][j - 1] + 1).min(d[i - 1][j - 1] + cost);
            if i > 1 && j > 1 && a[i - 1] == b[j - 2] && a[i - 2] == b[j - 1] {
                best = best.min(d[i - 2][j - 2] + cost);
            }
            d[i][j] = best;
        }
    }

    d[la][lb]
}

/// Plain word-list dictionary.
///
/// Suggestions are picked by minimal edit distance, then minimal length
/// difference; confidence degrades with distance.
#[derive(Debug, Default)]
pub struct WordList {
    en: HashSet<String>,
    ru: HashSet<String>,
}

impl WordList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, lang: Lang, word: &str) {
        let set = match lang {
            Lang::En => &mut self.en,
            Lang::Ru => &mut self.ru,
        };
        set.insert(word.to_lowercase());
    }

    fn set(&self, lang: Lang) -> &HashSet<String> {
        match lang {
            Lang::En => &self.en,
            Lang::Ru => &self.ru,
        }
    }
}

impl Dictionary for WordList {
    fn contains(&self, lang: Lang, word: &str) -> bool {
        self.set(lang).contains(word)
    }

    fn lookup(&self, lang: Lang, word: &str) -> Option<Suggestion> {
        let mut best: Option<(usize, usize, &String)> = None;
        for entry in self.set(lang) {
            let dist = damerau_levenshtein(word, entry);
            if dist == 0 || dist > 2 {
                continue;
            }
            let len_diff = word.chars().count().abs_diff(entry.chars().count());
            let key = (dist, len_diff);
            if best.is_none_or(|(d, l, _)| key < (d, l)) {
                best = Some((dist, len_diff, entry));
            }
        }

        best.map(|(dist, _, candidate)| Suggestion {
            candidate: candidate.clone(),
            #[allow(clippy::cast_precision_loss)]
            confidence: 1.0 - 0.15 * dist as f64,
        })
    }
}

/// Plausibility-based lexicon for setups without a word list.
///
/// Combines token-shape heuristics with `lingua` relative confidence, so
/// wrong-layout gibberish ("ghbdtn") reads as invalid while ordinary
/// words in either language read as valid.
pub struct HeuristicLexicon {
    detector: lingua::LanguageDetector,
}

impl Default for HeuristicLexicon {
    fn default() -> Self {
        Self::new()
    }
}

impl HeuristicLexicon {
    pub fn new() -> Self {
        use lingua::{Language, LanguageDetectorBuilder};
        Self {
            detector: LanguageDetectorBuilder::from_languages(&[
                Language::English,
                Language::Russian,
            ])
            .with_minimum_relative_distance(0.20)
            .build(),
        }
    }
}

impl Dictionary for HeuristicLexicon {
    fn contains(&self, lang: Lang, word: &str) -> bool {
        use crate::domain::text::mapping::{
            is_plausible_english_like_token, is_plausible_russian_like_token,
        };
        use lingua::Language;

        match lang {
            Lang::En => {
                looks_like_ascii_word(word)
                    && is_plausible_english_like_token(word)
                    && self
                        .detector
                        .compute_language_confidence(word, Language::English)
                        >= 0.5
            }
            Lang::Ru => {
                is_plausible_russian_like_token(word)
                    && self
                        .detector
                        .compute_language_confidence(word, Language::Russian)
                        >= 0.5
            }
        }
    }

    fn lookup(&self, _lang: Lang, _word: &str) -> Option<Suggestion> {
        // Shape heuristics cannot propose a spelling.
        None
    }
}

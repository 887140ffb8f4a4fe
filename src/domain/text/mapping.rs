//! Physical key inversion between EN (US QWERTY) and RU (ЙЦУКЕН).
//!
//! Direction is chosen ONCE per token, then applied to all chars. This is
//! required for punctuation/symbols to stay reversible.

const EN_UNSHIFT: &str = "`qwertyuiop[]asdfghjkl;'zxcvbnm,./";
const RU_UNSHIFT: &str = "ёйцукенгшщзхъфывапролджэячсмитьбю.";

const EN_SHIFT: &str = "~QWERTYUIOP{}ASDFGHJKL:\"ZXCVBNM<>?";
const RU_SHIFT: &str = "ЁЙЦУКЕНГШЩЗХЪФЫВАПРОЛДЖЭЯЧСМИТЬБЮ,";

// Digit row (Shift+1..=Shift+=) differs on the RU layout.
const EN_DIGIT_SHIFT: &str = "!@#$%^&*()_+";
const RU_DIGIT_SHIFT: &str = "!\"№;%:?*()_+";

/// A keyboard layout the corrected text can belong to, named the way the
/// platform switcher knows them.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Layout {
    Us,
    Ru,
}

impl Layout {
    pub fn as_str(self) -> &'static str {
        match self {
            Layout::Us => "us",
            Layout::Ru => "ru",
        }
    }
}

/// Wrong-layout classification of a token.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Mismatch {
    /// Typed on EN while RU was meant.
    EnMeantRu,
    /// Typed on RU while EN was meant.
    RuMeantEn,
    /// Both scripts present in a single token.
    Mixed,
}

fn map_by_table(ch: char, from: &str, to: &str) -> Option<char> {
    let mut fi = from.chars();
    let mut ti = to.chars();
    loop {
        match (fi.next(), ti.next()) {
            (Some(f), Some(t)) => {
                if f == ch {
                    return Some(t);
                }
            }
            _ => return None,
        }
    }
}

pub fn map_char_en_to_ru(ch: char) -> char {
    // order matters: digit-shift first (contains '@', '#', '$', '^', '&')
    if let Some(x) = map_by_table(ch, EN_DIGIT_SHIFT, RU_DIGIT_SHIFT) {
        return x;
    }
    if let Some(x) = map_by_table(ch, EN_SHIFT, RU_SHIFT) {
        return x;
    }
    if let Some(x) = map_by_table(ch, EN_UNSHIFT, RU_UNSHIFT) {
        return x;
    }
    ch
}

pub fn map_char_ru_to_en(ch: char) -> char {
    if let Some(x) = map_by_table(ch, RU_DIGIT_SHIFT, EN_DIGIT_SHIFT) {
        return x;
    }
    if let Some(x) = map_by_table(ch, RU_SHIFT, EN_SHIFT) {
        return x;
    }
    if let Some(x) = map_by_table(ch, RU_UNSHIFT, EN_UNSHIFT) {
        return x;
    }
    ch
}

/// Maps text typed on the EN layout as if RU had been active.
pub fn map_en_to_ru(text: &str) -> String {
    text.chars().map(map_char_en_to_ru).collect()
}

/// Maps text typed on the RU layout as if EN had been active.
pub fn map_ru_to_en(text: &str) -> String {
    text.chars().map(map_char_ru_to_en).collect()
}

pub fn is_cyrillic(ch: char) -> bool {
    ('\u{0400}'..='\u{04ff}').contains(&ch)
}

fn script_counts(text: &str) -> (usize, usize, usize) {
    let mut en = 0usize;
    let mut ru = 0usize;
    let mut total = 0usize;
    for ch in text.chars().filter(|c| c.is_alphabetic()) {
        total += 1;
        if ch.is_ascii_alphabetic() {
            en += 1;
        } else if is_cyrillic(ch) {
            ru += 1;
        }
    }
    (en, ru, total)
}

/// Classifies a token as likely typed in the wrong layout.
///
/// Both scripts inside one token mean `Mixed`; otherwise a single script
/// must dominate (>70% of alpha chars) to count as a candidate at all.
pub fn detect_layout_mismatch(text: &str) -> Option<Mismatch> {
    if text.trim().is_empty() {
        return None;
    }

    let (en, ru, total) = script_counts(text);
    if total == 0 {
        return None;
    }

    if en > 0 && ru > 0 {
        return Some(Mismatch::Mixed);
    }

    #[allow(clippy::cast_precision_loss)]
    let share = |n: usize| n as f64 / total as f64;
    if share(en) > 0.7 {
        return Some(Mismatch::EnMeantRu);
    }
    if share(ru) > 0.7 {
        return Some(Mismatch::RuMeantEn);
    }

    None
}

/// Rewrites the stray-script characters of a mixed token toward `target`.
pub fn fix_mixed_layout(text: &str, target: Layout) -> String {
    match target {
        Layout::Ru => text
            .chars()
            .map(|c| {
                if c.is_ascii_alphabetic() {
                    map_char_en_to_ru(c)
                } else {
                    c
                }
            })
            .collect(),
        Layout::Us => text
            .chars()
            .map(|c| if is_cyrillic(c) { map_char_ru_to_en(c) } else { c })
            .collect(),
    }
}

/// Dominant script of a mixed token, used as the repair target.
pub fn dominant_layout(text: &str) -> Layout {
    let (en, ru, _) = script_counts(text);
    if ru > en { Layout::Ru } else { Layout::Us }
}

/// CapsLock detection: more than one alpha char and every one uppercase.
///
/// ALL-CAPS text is passed through unchanged by policy; deliberate
/// shouting and acronyms must never be remapped.
pub fn is_all_caps(text: &str) -> bool {
    let mut alpha = 0usize;
    for ch in text.chars().filter(|c| c.is_alphabetic()) {
        alpha += 1;
        if !ch.is_uppercase() {
            return false;
        }
    }
    alpha > 1
}

/// Which layout the corrected text belongs to.
///
/// Pure string analysis of the last word; no platform calls, safe on any
/// thread. The dispatcher turns the answer into an actual switch.
pub fn detect_target_layout(corrected: &str) -> Option<Layout> {
    let last = corrected.split_whitespace().next_back().unwrap_or(corrected);

    let (en, ru, total) = script_counts(last);
    if total == 0 {
        return None;
    }

    if ru > en {
        Some(Layout::Ru)
    } else if en > ru {
        Some(Layout::Us)
    } else {
        None
    }
}

/// Transfers the casing pattern of `original` onto `corrected`.
pub fn apply_casing(original: &str, corrected: &str) -> String {
    if is_all_caps(original) {
        return corrected.to_uppercase();
    }

    let starts_upper = original.chars().next().is_some_and(char::is_uppercase);
    if starts_upper {
        let mut chars = corrected.chars();
        return match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        };
    }

    corrected.to_string()
}

fn has_ascii_vowel(s: &str) -> bool {
    s.chars().any(|ch| {
        let c = ch.to_ascii_lowercase();
        matches!(c, 'a' | 'e' | 'i' | 'o' | 'u')
    })
}

fn has_cyrillic_vowel(s: &str) -> bool {
    s.chars().any(|ch| {
        let c = ch.to_lowercase().next().unwrap_or(ch);
        matches!(c, 'а' | 'е' | 'ё' | 'и' | 'о' | 'у' | 'ы' | 'э' | 'ю' | 'я')
    })
}

pub fn looks_like_ascii_word(s: &str) -> bool {
    let mut has_letter = false;
    for ch in s.chars() {
        if ch.is_ascii_alphabetic() {
            has_letter = true;
        } else if ch != '\'' {
            return false;
        }
    }
    has_letter
}

pub fn looks_like_cyrillic_word(s: &str) -> bool {
    let mut has_letter = false;
    for ch in s.chars() {
        if is_cyrillic(ch) {
            has_letter = true;
        } else if ch != '\'' && ch != '-' {
            return false;
        }
    }
    has_letter
}

/// Quick shape check for an ASCII token that could be real English.
///
/// 'y' intentionally treated as consonant here to reduce false positives.
pub fn is_plausible_english_like_token(s: &str) -> bool {
    if !looks_like_ascii_word(s) {
        return false;
    }

    let mut consonant_run = 0usize;
    let mut max_consonant_run = 0usize;
    let mut rare = 0usize;
    for ch in s.chars() {
        if ch == '\'' {
            continue;
        }
        let c = ch.to_ascii_lowercase();
        if matches!(c, 'a' | 'e' | 'i' | 'o' | 'u') {
            consonant_run = 0;
        } else {
            consonant_run += 1;
            max_consonant_run = max_consonant_run.max(consonant_run);
            if matches!(c, 'j' | 'q' | 'x' | 'z') {
                rare += 1;
            }
        }
    }

    has_ascii_vowel(s) && max_consonant_run <= 4 && rare <= 1
}

/// Quick shape check for a Cyrillic token that could be real Russian.
pub fn is_plausible_russian_like_token(s: &str) -> bool {
    if !looks_like_cyrillic_word(s) || !has_cyrillic_vowel(s) {
        return false;
    }

    let mut consonant_run = 0usize;
    let mut max_consonant_run = 0usize;
    for ch in s.chars() {
        if !ch.is_alphabetic() {
            continue;
        }
        let c = ch.to_lowercase().next().unwrap_or(ch);
        if matches!(
            c,
            'а' | 'е' | 'ё' | 'и' | 'о' | 'у' | 'ы' | 'э' | 'ю' | 'я'
        ) {
            consonant_run = 0;
        } else {
            consonant_run += 1;
            max_consonant_run = max_consonant_run.max(consonant_run);
        }
    }

    max_consonant_run <= 4
}

use crate::domain::text::boundary::{is_boundary, is_hard_boundary};
use crate::domain::text::mapping::{
    Layout, Mismatch, apply_casing, detect_layout_mismatch, detect_target_layout,
    dominant_layout, fix_mixed_layout, is_all_caps, is_plausible_english_like_token,
    is_plausible_russian_like_token, map_en_to_ru, map_ru_to_en,
};

#[test]
fn russian_word_roundtrip_lowercase() {
    assert_eq!(map_en_to_ru("ghbdtn"), "привет");
    assert_eq!(map_ru_to_en("привет"), "ghbdtn");
}

#[test]
fn shift_rows_roundtrip() {
    assert_eq!(map_en_to_ru("Ghbdtn"), "Привет");
    assert_eq!(map_ru_to_en("Привет"), "Ghbdtn");
}

#[test]
fn digit_row_shift_symbols_mapping() {
    assert_eq!(map_en_to_ru("@#$^&"), "\"№;:?");
    assert_eq!(map_ru_to_en("\"№;:?"), "@#$^&");
}

#[test]
fn unmapped_characters_pass_through() {
    assert_eq!(map_en_to_ru("12 34"), "12 34");
    assert_eq!(map_ru_to_en("12 34"), "12 34");
}

#[test]
fn mismatch_detection_by_script() {
    assert_eq!(detect_layout_mismatch("ghbdtn"), Some(Mismatch::EnMeantRu));
    assert_eq!(detect_layout_mismatch("привет"), Some(Mismatch::RuMeantEn));
    assert_eq!(detect_layout_mismatch("приvет"), Some(Mismatch::Mixed));
    assert_eq!(detect_layout_mismatch("123"), None);
    assert_eq!(detect_layout_mismatch("   "), None);
}

#[test]
fn mixed_repair_targets_the_dominant_script() {
    assert_eq!(dominant_layout("приvет"), Layout::Ru);
    assert_eq!(fix_mixed_layout("приvет", Layout::Ru), "примет");

    assert_eq!(dominant_layout("heлlo"), Layout::Us);
    assert_eq!(fix_mixed_layout("heлlo", Layout::Us), "heklo");
}

#[test]
fn all_caps_needs_more_than_one_letter() {
    assert!(is_all_caps("GHBDTN"));
    assert!(is_all_caps("ПРИВЕТ"));
    assert!(!is_all_caps("Ghbdtn"));
    assert!(!is_all_caps("I"));
    assert!(!is_all_caps("123"));
}

#[test]
fn casing_transfers_from_the_original() {
    assert_eq!(apply_casing("Ghbdtn", "привет"), "Привет");
    assert_eq!(apply_casing("GHBDTN", "привет"), "ПРИВЕТ");
    assert_eq!(apply_casing("ghbdtn", "привет"), "привет");
}

#[test]
fn target_layout_follows_the_last_word() {
    assert_eq!(detect_target_layout("привет"), Some(Layout::Ru));
    assert_eq!(detect_target_layout("hello"), Some(Layout::Us));
    assert_eq!(detect_target_layout("hello мир"), Some(Layout::Ru));
    assert_eq!(detect_target_layout("123"), None);
}

#[test]
fn boundary_set_matches_typing_separators() {
    for ch in [' ', '\t', '\n', '.', ',', '!', '?', '(', ')', '"'] {
        assert!(is_boundary(ch), "{ch:?} should be a boundary");
    }
    for ch in ['a', 'я', '1', '_'] {
        assert!(!is_boundary(ch), "{ch:?} should not be a boundary");
    }

    assert!(is_hard_boundary('\n'));
    assert!(is_hard_boundary('.'));
    assert!(!is_hard_boundary(','));
    assert!(!is_hard_boundary(' '));
}

#[test]
fn plausibility_rejects_wrong_layout_gibberish() {
    assert!(is_plausible_english_like_token("hello"));
    assert!(!is_plausible_english_like_token("ghbdtn"));

    assert!(is_plausible_russian_like_token("привет"));
    assert!(!is_plausible_russian_like_token("фшвркнл"));
}

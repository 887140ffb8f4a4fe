/// Characters that terminate a word.
///
/// Whitespace plus the punctuation set that ends a token in any of the
/// supported layouts. The triggering boundary is re-emitted by the
/// replacement executor, so membership here decides both when a word is
/// finalized and which character gets preserved after a correction.
const BOUNDARIES: &str = " \t\n.,;:!?()[]{}\"'/\\-=+@#$%^&*~`<>|";

pub fn is_boundary(ch: char) -> bool {
    BOUNDARIES.contains(ch)
}

/// Hard boundaries end a correction scope (polish in `LastBoundary` mode
/// never reaches past one).
pub fn is_hard_boundary(ch: char) -> bool {
    matches!(ch, '\n' | '.' | '!' | '?')
}

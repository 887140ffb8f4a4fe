/// Process-wide input state, owned by the engine and mutated only on
/// the event-processing context.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum DaemonState {
    #[default]
    Idle,
    TypingWord,
    WordFinalized,
    /// Post-correction passive state: input passes through verbatim and
    /// no strategy runs until new content starts a fresh word. Handoff
    /// is about control, not about whether the layout switch succeeded.
    Handoff,
}

impl DaemonState {
    pub fn as_str(self) -> &'static str {
        match self {
            DaemonState::Idle => "idle",
            DaemonState::TypingWord => "typing_word",
            DaemonState::WordFinalized => "word_finalized",
            DaemonState::Handoff => "handoff",
        }
    }
}

use crate::strategy::Strategy;

/// Result of one correction attempt, reported for logging and tests.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CorrectionOutcome {
    Applied(Strategy),
    Undone,
    Polished,
    Skipped(SkipReason),
    Failed(Failure),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SkipReason {
    Disabled,
    SyntheticOrigin,
    Handoff,
    EmptyBuffer,
    AllCaps,
    AlreadyValid,
    Suppressed,
    AlreadyFinalized,
    GuardRecentOutput,
    GuardReplayedReplacement,
    GuardSpanOverlap,
    NoCandidate,
    NoChange,
    TooFewWords,
    Reentry,
    NothingToUndo,
}

impl SkipReason {
    pub fn as_str(self) -> &'static str {
        match self {
            SkipReason::Disabled => "disabled",
            SkipReason::SyntheticOrigin => "synthetic_origin",
            SkipReason::Handoff => "handoff",
            SkipReason::EmptyBuffer => "empty_buffer",
            SkipReason::AllCaps => "all_caps",
            SkipReason::AlreadyValid => "already_valid",
            SkipReason::Suppressed => "suppressed",
            SkipReason::AlreadyFinalized => "already_finalized",
            SkipReason::GuardRecentOutput => "guard_recent_output",
            SkipReason::GuardReplayedReplacement => "guard_replayed_replacement",
            SkipReason::GuardSpanOverlap => "guard_span_overlap",
            SkipReason::NoCandidate => "no_candidate",
            SkipReason::NoChange => "no_change",
            SkipReason::TooFewWords => "too_few_words",
            SkipReason::Reentry => "reentry",
            SkipReason::NothingToUndo => "nothing_to_undo",
        }
    }
}

/// Hard failures. Layout-switch and persistence errors are logged and
/// absorbed where they happen; only a rejected injection surfaces.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Failure {
    Injection,
}

impl Failure {
    pub fn as_str(self) -> &'static str {
        match self {
            Failure::Injection => "injection",
        }
    }
}

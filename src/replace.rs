//! Replacement emission through the injection transport.
//!
//! The executor never talks to the platform directly: it plans an
//! ordered op list and hands the whole list to the collaborator in one
//! call, so a rejected injection leaves nothing half-applied. The
//! transport must tag everything it emits as synthetic on loop-back
//! capture; the engine's origin filter does the rest.

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InjectOp {
    /// Delete `n` characters behind the cursor.
    DeleteBack(usize),
    /// Type a string at the cursor.
    Insert(String),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum InjectError {
    /// Target application refused the synthetic events.
    Rejected,
    /// Transport is gone (display connection lost, device closed).
    Closed,
}

impl InjectError {
    pub fn as_str(self) -> &'static str {
        match self {
            InjectError::Rejected => "rejected",
            InjectError::Closed => "closed",
        }
    }
}

/// Injection transport collaborator.
///
/// `inject` must apply the ops strictly in order and either complete the
/// whole list or fail without partial effect.
pub trait Injector {
    fn inject(&mut self, ops: &[InjectOp]) -> Result<(), InjectError>;
}

/// Plans the op sequence for one correction: delete the typed span, type
/// the replacement, then re-emit the triggering boundary exactly once.
/// The cursor ends immediately after the boundary.
pub fn replacement_ops(
    delete_chars: usize,
    replacement: &str,
    boundary: Option<char>,
) -> Vec<InjectOp> {
    let mut ops = Vec::with_capacity(3);
    if delete_chars > 0 {
        ops.push(InjectOp::DeleteBack(delete_chars));
    }
    if !replacement.is_empty() {
        ops.push(InjectOp::Insert(replacement.to_string()));
    }
    if let Some(b) = boundary {
        ops.push(InjectOp::Insert(b.to_string()));
    }
    ops
}

//! Thread-affinity dispatcher for layout switching.
//!
//! Layout/UI toolkit calls crash when made off their owning thread, so
//! the capability to make them is a type: only [`Dispatcher`] holds the
//! switcher, and `Dispatcher` is `!Send` by construction. Every other
//! component holds a [`LayoutRequestSlot`] and can merely ask.

use std::marker::PhantomData;
use std::sync::{Arc, Mutex};

use crate::domain::text::mapping::Layout;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SwitchReason {
    Word,
    Phrase,
    Polish,
}

impl SwitchReason {
    pub fn as_str(self) -> &'static str {
        match self {
            SwitchReason::Word => "word",
            SwitchReason::Phrase => "phrase",
            SwitchReason::Polish => "polish",
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LayoutSwitchRequest {
    pub target: Layout,
    pub reason: SwitchReason,
}

/// Single-slot, last-writer-wins request queue.
///
/// At most one request is pending; posting over an unserviced request
/// replaces it. Cheap to clone and safe to post from the
/// event-processing context without ever blocking on the dispatcher.
#[derive(Clone, Default)]
pub struct LayoutRequestSlot {
    slot: Arc<Mutex<Option<LayoutSwitchRequest>>>,
}

impl LayoutRequestSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn post(&self, request: LayoutSwitchRequest) {
        let Ok(mut slot) = self.slot.lock() else {
            return;
        };
        if let Some(stale) = slot.replace(request) {
            tracing::trace!(
                stale = stale.target.as_str(),
                new = request.target.as_str(),
                "pending layout request superseded"
            );
        }
    }

    pub fn take(&self) -> Option<LayoutSwitchRequest> {
        self.slot.lock().ok().and_then(|mut s| s.take())
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SwitchError {
    /// No switching backend available on this session.
    Unavailable,
    /// The backend accepted the call but reported failure.
    CommandFailed,
}

impl SwitchError {
    pub fn as_str(self) -> &'static str {
        match self {
            SwitchError::Unavailable => "unavailable",
            SwitchError::CommandFailed => "command_failed",
        }
    }
}

/// The actual layout-swap mechanism. Only ever invoked by the
/// dispatcher, on the dispatcher's thread.
pub trait LayoutSwitcher {
    fn switch(&mut self, target: Layout) -> Result<(), SwitchError>;
}

/// Owns the switcher and services requests on its creating thread.
///
/// Switch failure is caught here, logged and never propagated: the
/// system stays in its post-correction state with the old layout active
/// and the user switches manually.
pub struct Dispatcher {
    switcher: Box<dyn LayoutSwitcher>,
    slot: LayoutRequestSlot,
    // Pins the dispatcher to its creating thread.
    _affinity: PhantomData<*const ()>,
}

impl Dispatcher {
    pub fn new(switcher: Box<dyn LayoutSwitcher>, slot: LayoutRequestSlot) -> Self {
        Self {
            switcher,
            slot,
            _affinity: PhantomData,
        }
    }

    /// Drains the pending request, if any. Called periodically from the
    /// owning thread's run loop.
    pub fn service(&mut self) {
        let Some(request) = self.slot.take() else {
            return;
        };

        match self.switcher.switch(request.target) {
            Ok(()) => tracing::trace!(
                target = request.target.as_str(),
                reason = request.reason.as_str(),
                "layout switched"
            ),
            Err(e) => tracing::warn!(
                target = request.target.as_str(),
                reason = request.reason.as_str(),
                error = e.as_str(),
                "layout switch failed"
            ),
        }
    }
}

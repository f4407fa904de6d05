use std::sync::{Mutex, PoisonError};

/// Single-value mailbox with last-write-wins semantics.
///
/// Writing replaces whatever has not been taken yet; taking empties the slot.
#[derive(Debug, Default)]
pub(crate) struct PendingSlot {
    value: Mutex<Option<String>>,
}

impl PendingSlot {
    /// Store `value`, returning the unsent value it replaced.
    pub(crate) fn replace(&self, value: String) -> Option<String> {
        self.value
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(value)
    }

    pub(crate) fn take(&self) -> Option<String> {
        self.value
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}

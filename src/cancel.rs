//! Cooperative cancellation for the decoder.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared flag checked by [`Reader::each_row`](crate::io::Reader::each_row)
/// between records.
///
/// Clones share the same flag, so one clone can be handed to another thread
/// (or a signal handler) while the reader holds the other.
#[derive(Clone, Debug, Default)]
pub struct Cancellation {
    flag: Arc<AtomicBool>,
}

impl Cancellation {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request that readers observing this flag stop after the current record.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}

use crate::errors::Error;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A shared flag used to cancel long-running lookups.
///
/// Replay across a large slot gap can take arbitrarily long, so every entry
/// point takes one of these and checks it between per-slot and per-block
/// transition steps. Cloned handles observe the same flag; dropping a handle
/// does not cancel.
#[derive(Default, Clone, Debug)]
pub struct CancelSignal(Arc<AtomicBool>);

impl CancelSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Trip the flag; every clone observes it.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    /// Unwind out of a lookup once the flag is set.
    pub fn checkpoint(&self) -> Result<(), Error> {
        if self.is_cancelled() {
            Err(Error::Canceled)
        } else {
            Ok(())
        }
    }
}

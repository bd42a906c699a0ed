//! The logical clock.
//!
//! Heights come from outside the registry. The core only consumes
//! `current_height()`; implementations must never go backwards.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::types::Height;

/// Source of the current logical height.
pub trait Clock: Send + Sync {
    fn current_height(&self) -> Height;
}

impl<C: Clock + ?Sized> Clock for std::sync::Arc<C> {
    fn current_height(&self) -> Height {
        (**self).current_height()
    }
}

/// A clock pinned to one height.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub Height);

impl Clock for FixedClock {
    fn current_height(&self) -> Height {
        self.0
    }
}

/// A clock driven by the embedding application or by tests.
///
/// `set` refuses to move backwards, so the clock stays monotonic no matter
/// what the driver does.
#[derive(Debug, Default)]
pub struct ManualClock {
    height: AtomicU64,
}

impl ManualClock {
    pub fn new(start: Height) -> Self {
        Self {
            height: AtomicU64::new(start.get()),
        }
    }

    /// Move forward by `delta` heights and return the new height.
    pub fn advance(&self, delta: u64) -> Height {
        let prev = self
            .height
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |h| {
                Some(h.saturating_add(delta))
            })
            .unwrap_or_else(|h| h);
        Height::new(prev.saturating_add(delta))
    }

    /// Jump to `height` if it is ahead of the current one.
    pub fn set(&self, height: Height) -> Height {
        let prev = self.height.fetch_max(height.get(), Ordering::SeqCst);
        Height::new(prev.max(height.get()))
    }
}

impl Clock for ManualClock {
    fn current_height(&self) -> Height {
        Height::new(self.height.load(Ordering::SeqCst))
    }
}

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::{BusyWaitStrategy, Hint};
use crate::error::{BusyWaitInterrupted, Side};

/// Decorator that lets another thread cancel a wait in progress.
///
/// A call to [`interrupt`](Self::interrupt) (or to an [`Interrupter`]) makes the
/// next `tick()` clear the flag and fail with [`BusyWaitInterrupted`] instead of
/// delegating. One interrupt cancels exactly one wait. Clones share the flag,
/// so with several handles waiting the first one to tick takes the interrupt.
///
/// ```
/// use ringbuffer_rs::wait::{BusyWaitStrategy, Hint, Interruptible, Side};
///
/// let mut strategy = Interruptible::new(Side::Reading, Hint);
/// strategy.interrupter().interrupt();
/// let err = strategy.tick().unwrap_err();
/// assert!(err.was_reading());
/// assert!(strategy.tick().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct Interruptible<S = Hint> {
    side: Side,
    interrupted: Arc<AtomicBool>,
    next: S,
}

impl<S: BusyWaitStrategy> Interruptible<S> {
    pub fn new(side: Side, next: S) -> Self {
        Self {
            side,
            interrupted: Arc::new(AtomicBool::new(false)),
            next,
        }
    }

    /// Requests that the next tick fail.
    #[inline]
    pub fn interrupt(&self) {
        self.interrupted.store(true, Ordering::Release);
    }

    /// A thread-safe handle for interrupting from elsewhere.
    pub fn interrupter(&self) -> Interrupter {
        Interrupter {
            interrupted: Arc::clone(&self.interrupted),
        }
    }

    #[inline]
    pub fn side(&self) -> Side {
        self.side
    }
}

impl<S: BusyWaitStrategy + Clone> BusyWaitStrategy for Interruptible<S> {
    #[inline]
    fn reset(&mut self) {
        self.next.reset();
    }

    fn tick(&mut self) -> Result<(), BusyWaitInterrupted> {
        if self.interrupted.swap(false, Ordering::AcqRel) {
            tracing::debug!(side = %self.side, "busy wait interrupted");
            return Err(BusyWaitInterrupted::new(self.side));
        }
        self.next.tick()
    }
}

/// Cloneable handle that interrupts an [`Interruptible`] strategy.
#[derive(Debug, Clone)]
pub struct Interrupter {
    interrupted: Arc<AtomicBool>,
}

impl Interrupter {
    #[inline]
    pub fn interrupt(&self) {
        self.interrupted.store(true, Ordering::Release);
    }
}

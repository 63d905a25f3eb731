//! Error types for ring buffer construction and operation.
//!
//! Construction problems ([`BuildError`], [`StrategyError`]) are kept apart from
//! runtime failures ([`RingError`], [`PublishError`]) so calling code can tell a
//! configuration bug from a live interrupt.

use std::fmt;
use thiserror::Error;

/// Which side of a ring buffer a waiting thread was on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// The thread was waiting to consume.
    Reading,
    /// The thread was waiting to publish.
    Writing,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reading => f.write_str("reading"),
            Self::Writing => f.write_str("writing"),
        }
    }
}

/// Cancellation signal raised by an interruptible busy-wait strategy.
///
/// Propagates out of the exact blocking call that was waiting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("busy wait interrupted while {side}")]
pub struct BusyWaitInterrupted {
    side: Side,
}

impl BusyWaitInterrupted {
    /// Creates a cancellation signal for the given side.
    pub const fn new(side: Side) -> Self {
        Self { side }
    }

    /// Returns the side that was waiting when the interrupt arrived.
    #[inline]
    pub fn side(&self) -> Side {
        self.side
    }

    #[inline]
    pub fn was_reading(&self) -> bool {
        self.side == Side::Reading
    }

    #[inline]
    pub fn was_writing(&self) -> bool {
        self.side == Side::Writing
    }
}

/// Rejected ring buffer configuration. Nothing is constructed when this is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BuildError {
    /// Capacity below the minimum of two slots.
    #[error("capacity must be at least 2 (got {capacity})")]
    CapacityTooSmall {
        /// The requested capacity.
        capacity: usize,
    },
    /// The lock-free overlay masks indices and needs a power-of-two capacity.
    #[error("capacity must be a power of 2 without locks (got {capacity})")]
    CapacityNotPowerOfTwo {
        /// The requested capacity.
        capacity: usize,
    },
    /// Neither writer nor reader cardinality was declared.
    #[error("declare one or many readers and one or many writers")]
    MissingCardinality,
    /// Writer cardinality was not declared.
    #[error("declare one or many writers")]
    MissingWriters,
    /// Reader cardinality was not declared.
    #[error("declare one or many readers")]
    MissingReaders,
}

/// Rejected multi-step busy-wait strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StrategyError {
    /// Only a final step was given.
    #[error("a multi-step strategy needs at least one step before the final one")]
    NoIntermediateSteps,
    /// A step was given a budget of zero ticks.
    #[error("step {step} must run for at least one tick")]
    ZeroTicks {
        /// Position of the offending step in execution order.
        step: usize,
    },
}

/// Failure of a publish or consume call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RingError {
    /// The buffer is full and the overlay does not wait or discard.
    #[error("ring buffer is full")]
    Full,
    /// A batch larger than the whole buffer can never be satisfied.
    #[error("batch of {requested} exceeds capacity {capacity}")]
    BatchTooLarge {
        /// Number of slots asked for.
        requested: usize,
        /// Capacity of the buffer.
        capacity: usize,
    },
    /// The waiting side was interrupted.
    #[error(transparent)]
    Interrupted(#[from] BusyWaitInterrupted),
}

impl RingError {
    /// Returns `true` for a full buffer, which a later retry may get past.
    #[inline]
    pub fn is_full(&self) -> bool {
        matches!(self, Self::Full)
    }

    #[inline]
    pub fn is_interrupted(&self) -> bool {
        matches!(self, Self::Interrupted(_))
    }
}

/// A failed single-element publish. Hands the element back to the caller.
#[derive(Debug, Error)]
#[error("{error}")]
pub struct PublishError<T> {
    value: T,
    #[source]
    error: RingError,
}

impl<T> PublishError<T> {
    pub(crate) fn new(value: T, error: RingError) -> Self {
        Self { value, error }
    }

    /// The reason the element was not published.
    #[inline]
    pub fn error(&self) -> RingError {
        self.error
    }

    /// Recovers the element that was not published.
    #[inline]
    pub fn into_inner(self) -> T {
        self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interrupt_side() {
        let e = BusyWaitInterrupted::new(Side::Reading);
        assert!(e.was_reading());
        assert!(!e.was_writing());
        assert_eq!(e.to_string(), "busy wait interrupted while reading");
    }

    #[test]
    fn test_ring_error_from_interrupt() {
        let e: RingError = BusyWaitInterrupted::new(Side::Writing).into();
        assert!(e.is_interrupted());
        assert!(!e.is_full());
    }

    #[test]
    fn test_publish_error_returns_value() {
        let e = PublishError::new(String::from("payload"), RingError::Full);
        assert_eq!(e.to_string(), "ring buffer is full");
        assert_eq!(e.error(), RingError::Full);
        assert_eq!(e.into_inner(), "payload");
    }
}

//! Typed ring buffer builder.
//!
//! The builder records each choice in its type, so the concurrency class and
//! overlay of the resulting handles are known at compile time. Forgetting to
//! declare writers or readers leaves `build()` unavailable:
//!
//! ```compile_fail
//! use ringbuffer_rs::RingBufferBuilder;
//!
//! // No reader cardinality: does not compile.
//! let _ = RingBufferBuilder::<u32>::with_capacity(8).one_writer().build();
//! ```

use crate::concurrency::{Arity, Blocking, Class, Clearing, Discarding, Fast, Many, One, Overlay};
use crate::config::validate_capacity;
use crate::error::BuildError;
use crate::handle::{pair, Reader, Writer};
use crate::wait::{BusyWaitStrategy, Hint};
use std::marker::PhantomData;

/// Placeholder for a cardinality that has not been declared yet.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unset;

/// Builder for a ring buffer's writer and reader handles.
///
/// ```
/// use ringbuffer_rs::RingBufferBuilder;
///
/// let (mut writer, mut reader) = RingBufferBuilder::with_capacity(4)
///     .many_writers()
///     .one_reader()
///     .blocking()
///     .build()
///     .unwrap();
///
/// let mut second = writer.clone();
/// writer.publish(1).unwrap();
/// second.publish(2).unwrap();
/// assert_eq!(reader.consume().unwrap() + reader.consume().unwrap(), 3);
/// ```
pub struct RingBufferBuilder<T, W = Unset, R = Unset, O = Clearing> {
    capacity: usize,
    write_wait: Box<dyn BusyWaitStrategy>,
    read_wait: Box<dyn BusyWaitStrategy>,
    _shape: PhantomData<fn() -> (T, W, R, O)>,
}

impl<T> RingBufferBuilder<T> {
    /// Starts a builder for a buffer of `capacity` slots.
    ///
    /// Any capacity of at least 2 works; the lock-free overlay needs a power of two.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            write_wait: Box::new(Hint),
            read_wait: Box::new(Hint),
            _shape: PhantomData,
        }
    }
}

impl<T, W, R, O> RingBufferBuilder<T, W, R, O> {
    fn retype<W2, R2, O2>(self) -> RingBufferBuilder<T, W2, R2, O2> {
        RingBufferBuilder {
            capacity: self.capacity,
            write_wait: self.write_wait,
            read_wait: self.read_wait,
            _shape: PhantomData,
        }
    }

    /// Sets the strategy readers use while the buffer is empty (default [`Hint`]).
    ///
    /// Each reader handle gets its own clone.
    pub fn waiting_with<S: BusyWaitStrategy>(mut self, strategy: S) -> Self {
        self.read_wait = Box::new(strategy);
        self
    }
}

// ---------------------------------------------------------------------
// CARDINALITY
// ---------------------------------------------------------------------

impl<T, R, O> RingBufferBuilder<T, Unset, R, O> {
    pub fn one_writer(self) -> RingBufferBuilder<T, One, R, O> {
        self.retype()
    }

    pub fn many_writers(self) -> RingBufferBuilder<T, Many, R, O> {
        self.retype()
    }
}

impl<T, W, O> RingBufferBuilder<T, W, Unset, O> {
    pub fn one_reader(self) -> RingBufferBuilder<T, W, One, O> {
        self.retype()
    }

    pub fn many_readers(self) -> RingBufferBuilder<T, W, Many, O> {
        self.retype()
    }
}

// ---------------------------------------------------------------------
// OVERLAY
// ---------------------------------------------------------------------

impl<T, W, R> RingBufferBuilder<T, W, R, Clearing> {
    /// Writers wait with [`Hint`] while the buffer is full.
    pub fn blocking(self) -> RingBufferBuilder<T, W, R, Blocking> {
        self.retype()
    }

    /// Writers wait with `strategy` while the buffer is full.
    ///
    /// Each writer handle gets its own clone.
    pub fn blocking_with<S: BusyWaitStrategy>(mut self, strategy: S) -> RingBufferBuilder<T, W, R, Blocking> {
        self.write_wait = Box::new(strategy);
        self.retype()
    }

    /// Writers drop the oldest unread elements to make room.
    pub fn discarding(self) -> RingBufferBuilder<T, W, R, Discarding> {
        self.retype()
    }

    /// Lock-free slots with per-slot sequence stamps. Requires a power-of-two
    /// capacity. Writers never fail; one that laps a slow reader waits for its slot.
    pub fn without_locks(self) -> RingBufferBuilder<T, W, R, Fast> {
        self.retype()
    }
}

// ---------------------------------------------------------------------
// BUILD
// ---------------------------------------------------------------------

impl<T, W: Arity, R: Arity, O: Overlay> RingBufferBuilder<T, W, R, O> {
    /// Validates the capacity and creates the handles.
    ///
    /// # Errors
    ///
    /// [`BuildError::CapacityTooSmall`] below 2 slots, and
    /// [`BuildError::CapacityNotPowerOfTwo`] for the lock-free overlay.
    pub fn build(self) -> Result<(Writer<T, Class<W, R>, O>, Reader<T, Class<W, R>, O>), BuildError> {
        validate_capacity(self.capacity, O::KIND)?;
        Ok(pair(self.capacity, self.write_wait, self.read_wait))
    }
}

//! Run-time selection among the sixteen ring buffer shapes.
//!
//! [`RingConfig::build`] validates a configuration and returns a
//! [`DynWriter`] / [`DynReader`] pair wrapping the matching typed handles.
//! Each method is a single `match` into the monomorphized implementation.

use crate::concurrency::{
    AtomicRead, AtomicWrite, Blocking, Clearing, Concurrent, ConcurrencyKind, Discarding, Fast,
    OverlayKind, Volatile,
};
use crate::config::RingConfig;
use crate::error::{BuildError, BusyWaitInterrupted, PublishError, RingError};
use crate::handle::{pair, Reader, Writer};
use crate::wait::{BusyWaitStrategy, Hint};

/// Writer handle whose concurrency class and overlay were chosen at run time.
#[derive(Debug)]
pub enum DynWriter<T> {
    VolatileClearing(Writer<T, Volatile, Clearing>),
    VolatileBlocking(Writer<T, Volatile, Blocking>),
    VolatileDiscarding(Writer<T, Volatile, Discarding>),
    VolatileFast(Writer<T, Volatile, Fast>),
    AtomicReadClearing(Writer<T, AtomicRead, Clearing>),
    AtomicReadBlocking(Writer<T, AtomicRead, Blocking>),
    AtomicReadDiscarding(Writer<T, AtomicRead, Discarding>),
    AtomicReadFast(Writer<T, AtomicRead, Fast>),
    AtomicWriteClearing(Writer<T, AtomicWrite, Clearing>),
    AtomicWriteBlocking(Writer<T, AtomicWrite, Blocking>),
    AtomicWriteDiscarding(Writer<T, AtomicWrite, Discarding>),
    AtomicWriteFast(Writer<T, AtomicWrite, Fast>),
    ConcurrentClearing(Writer<T, Concurrent, Clearing>),
    ConcurrentBlocking(Writer<T, Concurrent, Blocking>),
    ConcurrentDiscarding(Writer<T, Concurrent, Discarding>),
    ConcurrentFast(Writer<T, Concurrent, Fast>),
}

/// Reader handle whose concurrency class and overlay were chosen at run time.
#[derive(Debug)]
pub enum DynReader<T> {
    VolatileClearing(Reader<T, Volatile, Clearing>),
    VolatileBlocking(Reader<T, Volatile, Blocking>),
    VolatileDiscarding(Reader<T, Volatile, Discarding>),
    VolatileFast(Reader<T, Volatile, Fast>),
    AtomicReadClearing(Reader<T, AtomicRead, Clearing>),
    AtomicReadBlocking(Reader<T, AtomicRead, Blocking>),
    AtomicReadDiscarding(Reader<T, AtomicRead, Discarding>),
    AtomicReadFast(Reader<T, AtomicRead, Fast>),
    AtomicWriteClearing(Reader<T, AtomicWrite, Clearing>),
    AtomicWriteBlocking(Reader<T, AtomicWrite, Blocking>),
    AtomicWriteDiscarding(Reader<T, AtomicWrite, Discarding>),
    AtomicWriteFast(Reader<T, AtomicWrite, Fast>),
    ConcurrentClearing(Reader<T, Concurrent, Clearing>),
    ConcurrentBlocking(Reader<T, Concurrent, Blocking>),
    ConcurrentDiscarding(Reader<T, Concurrent, Discarding>),
    ConcurrentFast(Reader<T, Concurrent, Fast>),
}

/// Forwards a call to whichever typed handle the enum holds.
macro_rules! dispatch {
    ($self:expr, $h:ident => $body:expr) => {
        match $self {
            Self::VolatileClearing($h) => $body,
            Self::VolatileBlocking($h) => $body,
            Self::VolatileDiscarding($h) => $body,
            Self::VolatileFast($h) => $body,
            Self::AtomicReadClearing($h) => $body,
            Self::AtomicReadBlocking($h) => $body,
            Self::AtomicReadDiscarding($h) => $body,
            Self::AtomicReadFast($h) => $body,
            Self::AtomicWriteClearing($h) => $body,
            Self::AtomicWriteBlocking($h) => $body,
            Self::AtomicWriteDiscarding($h) => $body,
            Self::AtomicWriteFast($h) => $body,
            Self::ConcurrentClearing($h) => $body,
            Self::ConcurrentBlocking($h) => $body,
            Self::ConcurrentDiscarding($h) => $body,
            Self::ConcurrentFast($h) => $body,
        }
    };
}

/// Builds the typed pair for a resolved `(class, overlay)` and wraps it.
macro_rules! build_shape {
    ($class:expr, $overlay:expr, $capacity:expr, $ww:expr, $rw:expr;
     $($variant:ident => $c:ident, $o:ident;)*) => {
        match ($class, $overlay) {
            $(
                (ConcurrencyKind::$c, OverlayKind::$o) => {
                    let (w, r) = pair::<T, $c, $o>($capacity, $ww, $rw);
                    (DynWriter::$variant(w), DynReader::$variant(r))
                }
            )*
        }
    };
}

impl RingConfig {
    /// Validates the configuration and builds handles with the default
    /// [`Hint`] strategies.
    ///
    /// ```
    /// use ringbuffer_rs::{Cardinality, OverlayKind, RingConfig};
    ///
    /// let (mut writer, mut reader) = RingConfig::new(16)
    ///     .with_writers(Cardinality::Many)
    ///     .with_readers(Cardinality::One)
    ///     .with_overlay(OverlayKind::Discarding)
    ///     .build::<u64>()
    ///     .unwrap();
    ///
    /// writer.publish(5).unwrap();
    /// assert_eq!(reader.consume().unwrap(), 5);
    /// ```
    pub fn build<T>(&self) -> Result<(DynWriter<T>, DynReader<T>), BuildError> {
        self.build_with(Box::new(Hint), Box::new(Hint))
    }

    /// Like [`build`](Self::build), with explicit write and read strategies.
    ///
    /// The write strategy is only consulted by the blocking overlay.
    pub fn build_with<T>(
        &self,
        write_wait: Box<dyn BusyWaitStrategy>,
        read_wait: Box<dyn BusyWaitStrategy>,
    ) -> Result<(DynWriter<T>, DynReader<T>), BuildError> {
        let (class, overlay) = self.validate()?;
        Ok(build_shape!(class, overlay, self.capacity, write_wait, read_wait;
            VolatileClearing => Volatile, Clearing;
            VolatileBlocking => Volatile, Blocking;
            VolatileDiscarding => Volatile, Discarding;
            VolatileFast => Volatile, Fast;
            AtomicReadClearing => AtomicRead, Clearing;
            AtomicReadBlocking => AtomicRead, Blocking;
            AtomicReadDiscarding => AtomicRead, Discarding;
            AtomicReadFast => AtomicRead, Fast;
            AtomicWriteClearing => AtomicWrite, Clearing;
            AtomicWriteBlocking => AtomicWrite, Blocking;
            AtomicWriteDiscarding => AtomicWrite, Discarding;
            AtomicWriteFast => AtomicWrite, Fast;
            ConcurrentClearing => Concurrent, Clearing;
            ConcurrentBlocking => Concurrent, Blocking;
            ConcurrentDiscarding => Concurrent, Discarding;
            ConcurrentFast => Concurrent, Fast;
        ))
    }
}

impl<T> DynWriter<T> {
    /// See [`Writer::publish`].
    pub fn publish(&mut self, value: T) -> Result<(), PublishError<T>> {
        dispatch!(self, w => w.publish(value))
    }

    /// See [`Writer::publish_batch`].
    pub fn publish_batch(&mut self, items: &[T]) -> Result<(), RingError>
    where
        T: Copy,
    {
        dispatch!(self, w => w.publish_batch(items))
    }

    pub fn capacity(&self) -> usize {
        dispatch!(self, w => w.capacity())
    }

    pub fn len(&self) -> usize {
        dispatch!(self, w => w.len())
    }

    pub fn is_empty(&self) -> bool {
        dispatch!(self, w => w.is_empty())
    }

    pub fn is_full(&self) -> bool {
        dispatch!(self, w => w.is_full())
    }

    pub fn discarded(&self) -> u64 {
        dispatch!(self, w => w.discarded())
    }

    pub fn concurrency(&self) -> ConcurrencyKind {
        dispatch!(self, w => w.concurrency())
    }

    pub fn overlay(&self) -> OverlayKind {
        dispatch!(self, w => w.overlay())
    }

    /// Another writer for the same buffer, if the class allows many writers.
    pub fn try_clone(&self) -> Option<Self> {
        match self {
            Self::AtomicWriteClearing(w) => Some(Self::AtomicWriteClearing(w.clone())),
            Self::AtomicWriteBlocking(w) => Some(Self::AtomicWriteBlocking(w.clone())),
            Self::AtomicWriteDiscarding(w) => Some(Self::AtomicWriteDiscarding(w.clone())),
            Self::AtomicWriteFast(w) => Some(Self::AtomicWriteFast(w.clone())),
            Self::ConcurrentClearing(w) => Some(Self::ConcurrentClearing(w.clone())),
            Self::ConcurrentBlocking(w) => Some(Self::ConcurrentBlocking(w.clone())),
            Self::ConcurrentDiscarding(w) => Some(Self::ConcurrentDiscarding(w.clone())),
            Self::ConcurrentFast(w) => Some(Self::ConcurrentFast(w.clone())),
            _ => None,
        }
    }
}

impl<T> DynReader<T> {
    /// See [`Reader::consume`].
    pub fn consume(&mut self) -> Result<T, BusyWaitInterrupted> {
        dispatch!(self, r => r.consume())
    }

    /// See [`Reader::consume_with`].
    pub fn consume_with(&mut self, wait: &mut dyn BusyWaitStrategy) -> Result<T, BusyWaitInterrupted> {
        dispatch!(self, r => r.consume_with(wait))
    }

    pub fn try_consume(&mut self) -> Option<T> {
        dispatch!(self, r => r.try_consume())
    }

    /// See [`Reader::consume_batch`].
    pub fn consume_batch(&mut self, n: usize, out: &mut Vec<T>) -> Result<(), RingError> {
        dispatch!(self, r => r.consume_batch(n, out))
    }

    /// See [`Reader::consume_up_to`].
    pub fn consume_up_to<F>(&mut self, max: usize, handler: F) -> usize
    where
        F: FnMut(T),
    {
        dispatch!(self, r => r.consume_up_to(max, handler))
    }

    /// See [`Reader::consume_latest`].
    pub fn consume_latest(&mut self) -> Result<T, BusyWaitInterrupted> {
        dispatch!(self, r => r.consume_latest())
    }

    pub fn capacity(&self) -> usize {
        dispatch!(self, r => r.capacity())
    }

    pub fn len(&self) -> usize {
        dispatch!(self, r => r.len())
    }

    pub fn is_empty(&self) -> bool {
        dispatch!(self, r => r.is_empty())
    }

    pub fn concurrency(&self) -> ConcurrencyKind {
        dispatch!(self, r => r.concurrency())
    }

    pub fn overlay(&self) -> OverlayKind {
        dispatch!(self, r => r.overlay())
    }

    /// Another reader for the same buffer, if the class allows many readers.
    pub fn try_clone(&self) -> Option<Self> {
        match self {
            Self::AtomicReadClearing(r) => Some(Self::AtomicReadClearing(r.clone())),
            Self::AtomicReadBlocking(r) => Some(Self::AtomicReadBlocking(r.clone())),
            Self::AtomicReadDiscarding(r) => Some(Self::AtomicReadDiscarding(r.clone())),
            Self::AtomicReadFast(r) => Some(Self::AtomicReadFast(r.clone())),
            Self::ConcurrentClearing(r) => Some(Self::ConcurrentClearing(r.clone())),
            Self::ConcurrentBlocking(r) => Some(Self::ConcurrentBlocking(r.clone())),
            Self::ConcurrentDiscarding(r) => Some(Self::ConcurrentDiscarding(r.clone())),
            Self::ConcurrentFast(r) => Some(Self::ConcurrentFast(r.clone())),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::concurrency::Cardinality;
    use crate::config::{HIGH_THROUGHPUT_CONFIG, LOW_LATENCY_CONFIG};

    const CARDINALITIES: [Cardinality; 2] = [Cardinality::One, Cardinality::Many];
    const OVERLAYS: [OverlayKind; 4] = [
        OverlayKind::Clearing,
        OverlayKind::Blocking,
        OverlayKind::Discarding,
        OverlayKind::Fast,
    ];

    #[test]
    fn test_every_shape_round_trips() {
        for writers in CARDINALITIES {
            for readers in CARDINALITIES {
                for overlay in OVERLAYS {
                    let config = RingConfig::new(8)
                        .with_writers(writers)
                        .with_readers(readers)
                        .with_overlay(overlay);
                    let (mut w, mut r) = config.build::<u32>().unwrap();

                    let class = ConcurrencyKind::from_cardinalities(writers, readers);
                    assert_eq!(w.concurrency(), class);
                    assert_eq!(r.overlay(), overlay);

                    w.publish_batch(&[1, 2, 3]).unwrap();
                    w.publish(4).unwrap();
                    assert_eq!(r.len(), 4);

                    let mut out = Vec::new();
                    r.consume_batch(2, &mut out).unwrap();
                    assert_eq!(out, vec![1, 2]);
                    assert_eq!(r.consume().unwrap(), 3);
                    assert_eq!(r.try_consume(), Some(4));
                    assert!(r.is_empty());

                    assert_eq!(w.try_clone().is_some(), writers == Cardinality::Many);
                    assert_eq!(r.try_clone().is_some(), readers == Cardinality::Many);
                }
            }
        }
    }

    #[test]
    fn test_presets_build() {
        let (w, _r) = LOW_LATENCY_CONFIG.build::<u64>().unwrap();
        assert!(matches!(w, DynWriter::VolatileFast(_)));
        assert_eq!(w.capacity(), 4096);

        let (w, r) = HIGH_THROUGHPUT_CONFIG.build::<u64>().unwrap();
        assert!(matches!(w, DynWriter::ConcurrentBlocking(_)));
        assert!(matches!(r, DynReader::ConcurrentBlocking(_)));
    }

    #[test]
    fn test_invalid_config_builds_nothing() {
        let err = RingConfig::new(8).build::<u64>().unwrap_err();
        assert_eq!(err, BuildError::MissingCardinality);
    }
}

//! Type-level description of a ring buffer's shape.
//!
//! A ring buffer is parameterized by a concurrency class (how many writers and
//! readers may touch it) and an overlay (what happens when the buffer is full).
//! Both are zero-sized markers, so every combination compiles to its own
//! specialized code with no run-time branching on configuration.
//!
//! | class          | writers | readers |
//! |----------------|---------|---------|
//! | [`Volatile`]   | one     | one     |
//! | [`AtomicRead`] | one     | many    |
//! | [`AtomicWrite`]| many    | one     |
//! | [`Concurrent`] | many    | many    |

use std::fmt;
use std::marker::PhantomData;

mod sealed {
    pub trait Sealed {}
}

// =============================================================================
// CARDINALITY
// =============================================================================

/// Marker for "exactly one thread on this side".
#[derive(Debug, Clone, Copy, Default)]
pub struct One;

/// Marker for "any number of threads on this side".
#[derive(Debug, Clone, Copy, Default)]
pub struct Many;

/// Cardinality of one side of a ring buffer, as a type.
pub trait Arity: sealed::Sealed + Send + Sync + 'static {
    const KIND: Cardinality;
}

impl sealed::Sealed for One {}
impl sealed::Sealed for Many {}

impl Arity for One {
    const KIND: Cardinality = Cardinality::One;
}

impl Arity for Many {
    const KIND: Cardinality = Cardinality::Many;
}

/// Cardinality of one side of a ring buffer, as a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cardinality {
    One,
    Many,
}

// =============================================================================
// CONCURRENCY CLASS
// =============================================================================

/// A concurrency class: writer cardinality `W`, reader cardinality `R`.
pub struct Class<W, R>(PhantomData<fn() -> (W, R)>);

/// One writer, one reader.
pub type Volatile = Class<One, One>;
/// One writer, many readers.
pub type AtomicRead = Class<One, Many>;
/// Many writers, one reader.
pub type AtomicWrite = Class<Many, One>;
/// Many writers, many readers.
pub type Concurrent = Class<Many, Many>;

/// Implemented by every [`Class`].
pub trait ConcurrencyClass: sealed::Sealed + Send + Sync + 'static {
    type Writers: Arity;
    type Readers: Arity;

    const MANY_WRITERS: bool = matches!(<Self::Writers as Arity>::KIND, Cardinality::Many);
    const MANY_READERS: bool = matches!(<Self::Readers as Arity>::KIND, Cardinality::Many);
    const KIND: ConcurrencyKind =
        ConcurrencyKind::from_cardinalities(<Self::Writers as Arity>::KIND, <Self::Readers as Arity>::KIND);
}

impl<W: Arity, R: Arity> sealed::Sealed for Class<W, R> {}

impl<W: Arity, R: Arity> ConcurrencyClass for Class<W, R> {
    type Writers = W;
    type Readers = R;
}

/// Concurrency class as a value, for run-time configuration and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConcurrencyKind {
    Volatile,
    AtomicRead,
    AtomicWrite,
    Concurrent,
}

impl ConcurrencyKind {
    pub const fn from_cardinalities(writers: Cardinality, readers: Cardinality) -> Self {
        match (writers, readers) {
            (Cardinality::One, Cardinality::One) => Self::Volatile,
            (Cardinality::One, Cardinality::Many) => Self::AtomicRead,
            (Cardinality::Many, Cardinality::One) => Self::AtomicWrite,
            (Cardinality::Many, Cardinality::Many) => Self::Concurrent,
        }
    }

    #[inline]
    pub const fn writers(self) -> Cardinality {
        match self {
            Self::Volatile | Self::AtomicRead => Cardinality::One,
            Self::AtomicWrite | Self::Concurrent => Cardinality::Many,
        }
    }

    #[inline]
    pub const fn readers(self) -> Cardinality {
        match self {
            Self::Volatile | Self::AtomicWrite => Cardinality::One,
            Self::AtomicRead | Self::Concurrent => Cardinality::Many,
        }
    }
}

impl fmt::Display for ConcurrencyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Volatile => "volatile",
            Self::AtomicRead => "atomic-read",
            Self::AtomicWrite => "atomic-write",
            Self::Concurrent => "concurrent",
        })
    }
}

// =============================================================================
// OVERLAY
// =============================================================================

/// Full buffer rejects the write and hands the element back.
#[derive(Debug, Clone, Copy, Default)]
pub struct Clearing;

/// Full buffer makes the writer wait with its busy-wait strategy.
#[derive(Debug, Clone, Copy, Default)]
pub struct Blocking;

/// Full buffer makes the writer drop the oldest unread elements.
#[derive(Debug, Clone, Copy, Default)]
pub struct Discarding;

/// Lock-free slots with per-slot sequence stamps and no capacity check.
#[derive(Debug, Clone, Copy, Default)]
pub struct Fast;

/// Behavior layered over a concurrency class.
pub trait Overlay: sealed::Sealed + Send + Sync + 'static {
    const KIND: OverlayKind;
}

impl sealed::Sealed for Clearing {}
impl sealed::Sealed for Blocking {}
impl sealed::Sealed for Discarding {}
impl sealed::Sealed for Fast {}

impl Overlay for Clearing {
    const KIND: OverlayKind = OverlayKind::Clearing;
}

impl Overlay for Blocking {
    const KIND: OverlayKind = OverlayKind::Blocking;
}

impl Overlay for Discarding {
    const KIND: OverlayKind = OverlayKind::Discarding;
}

impl Overlay for Fast {
    const KIND: OverlayKind = OverlayKind::Fast;
}

/// Overlays whose writers never take unread elements away from the reader.
///
/// A single reader of such a ring can inspect what it has not read yet.
pub trait NonDiscarding: Overlay {}

impl NonDiscarding for Clearing {}
impl NonDiscarding for Blocking {}
impl NonDiscarding for Fast {}

/// Overlay as a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OverlayKind {
    #[default]
    Clearing,
    Blocking,
    Discarding,
    Fast,
}

impl fmt::Display for OverlayKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Clearing => "clearing",
            Self::Blocking => "blocking",
            Self::Discarding => "discarding",
            Self::Fast => "fast",
        })
    }
}

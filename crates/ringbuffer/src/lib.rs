//! ringbuffer-rs - Bounded Lock-Free Ring Buffers
//!
//! One ring buffer algorithm, specialized at compile time for each writer and
//! reader cardinality and for each policy on a full buffer.
//!
//! # Key Features
//!
//! - Four concurrency classes: one or many writers × one or many readers
//! - Four overlays for a full buffer: fail (clearing), wait (blocking),
//!   drop the oldest (discarding), or lock-free per-slot stamps (fast)
//! - Pluggable busy-wait strategies: spin hint, yield, park, sleep,
//!   multi-step escalation, interruption and external wake-up
//! - Batch publish/consume and a zero-copy claim API for single writers
//! - 128-byte cursor padding (false sharing elimination)
//!
//! # Example
//!
//! ```
//! use ringbuffer_rs::RingBufferBuilder;
//! use ringbuffer_rs::wait::escalating;
//!
//! let (mut writer, mut reader) = RingBufferBuilder::with_capacity(1024)
//!     .one_writer()
//!     .one_reader()
//!     .waiting_with(escalating())
//!     .build()
//!     .unwrap();
//!
//! // Simple API: publish() for single items
//! writer.publish(42u64).unwrap();
//!
//! // Zero-copy API: claim() + write() + publish()
//! let mut claim = writer.claim(2).unwrap();
//! claim.write(43).unwrap();
//! claim.write(44).unwrap();
//! claim.publish();
//!
//! // Batch consume
//! let mut sum = 0;
//! let consumed = reader.consume_up_to(8, |item| sum += item);
//! assert_eq!((consumed, sum), (3, 129));
//! ```

mod backoff;
mod builder;
mod concurrency;
mod config;
mod dispatch;
mod error;
mod handle;
mod invariants;
mod ring;
pub mod wait;

pub use builder::{RingBufferBuilder, Unset};
pub use concurrency::{
    Arity, AtomicRead, AtomicWrite, Blocking, Cardinality, Class, Clearing, Concurrent,
    ConcurrencyClass, ConcurrencyKind, Discarding, Fast, Many, NonDiscarding, One, Overlay,
    OverlayKind, Volatile,
};
pub use config::{RingConfig, HIGH_THROUGHPUT_CONFIG, LOW_LATENCY_CONFIG, MIN_CAPACITY};
pub use dispatch::{DynReader, DynWriter};
pub use error::{BuildError, BusyWaitInterrupted, PublishError, RingError, Side, StrategyError};
pub use handle::{Claim, Contents, Reader, Writer};

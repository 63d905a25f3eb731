use crate::concurrency::{Cardinality, ConcurrencyKind, OverlayKind};
use crate::error::BuildError;

/// Smallest usable capacity.
pub const MIN_CAPACITY: usize = 2;

/// Run-time ring buffer configuration.
///
/// The typed [`RingBufferBuilder`](crate::RingBufferBuilder) rejects a missing
/// cardinality at compile time; a `RingConfig` can be assembled from run-time
/// values instead and is checked by [`validate`](Self::validate). Build handles
/// from it with [`RingConfig::build`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RingConfig {
    /// Number of slots
    pub capacity: usize,
    /// Writer cardinality (must be set)
    pub writers: Option<Cardinality>,
    /// Reader cardinality (must be set)
    pub readers: Option<Cardinality>,
    /// Behavior when the buffer is full
    pub overlay: OverlayKind,
}

impl RingConfig {
    /// Creates a clearing configuration with no cardinalities declared.
    pub const fn new(capacity: usize) -> Self {
        Self {
            capacity,
            writers: None,
            readers: None,
            overlay: OverlayKind::Clearing,
        }
    }

    pub const fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub const fn with_writers(mut self, writers: Cardinality) -> Self {
        self.writers = Some(writers);
        self
    }

    pub const fn with_readers(mut self, readers: Cardinality) -> Self {
        self.readers = Some(readers);
        self
    }

    pub const fn with_overlay(mut self, overlay: OverlayKind) -> Self {
        self.overlay = overlay;
        self
    }

    /// Checks the configuration and resolves its concurrency class.
    ///
    /// # Errors
    ///
    /// - [`BuildError::MissingCardinality`] / [`BuildError::MissingWriters`] /
    ///   [`BuildError::MissingReaders`] for undeclared cardinalities.
    /// - [`BuildError::CapacityTooSmall`] below [`MIN_CAPACITY`].
    /// - [`BuildError::CapacityNotPowerOfTwo`] for the fast overlay.
    pub fn validate(&self) -> Result<(ConcurrencyKind, OverlayKind), BuildError> {
        let class = match (self.writers, self.readers) {
            (None, None) => return Err(BuildError::MissingCardinality),
            (None, Some(_)) => return Err(BuildError::MissingWriters),
            (Some(_), None) => return Err(BuildError::MissingReaders),
            (Some(w), Some(r)) => ConcurrencyKind::from_cardinalities(w, r),
        };
        validate_capacity(self.capacity, self.overlay)?;
        Ok((class, self.overlay))
    }
}

impl Default for RingConfig {
    /// Single writer, single reader, clearing, 64K slots.
    fn default() -> Self {
        Self::new(1 << 16)
            .with_writers(Cardinality::One)
            .with_readers(Cardinality::One)
    }
}

/// Capacity rules shared by the typed builder and [`RingConfig::validate`].
pub(crate) fn validate_capacity(capacity: usize, overlay: OverlayKind) -> Result<(), BuildError> {
    if capacity < MIN_CAPACITY {
        return Err(BuildError::CapacityTooSmall { capacity });
    }
    if overlay == OverlayKind::Fast && !capacity.is_power_of_two() {
        return Err(BuildError::CapacityNotPowerOfTwo { capacity });
    }
    Ok(())
}

/// Low latency configuration (4K slots, one writer, one reader, lock-free)
pub const LOW_LATENCY_CONFIG: RingConfig = RingConfig::new(1 << 12)
    .with_writers(Cardinality::One)
    .with_readers(Cardinality::One)
    .with_overlay(OverlayKind::Fast);

/// High throughput configuration (64K slots, many writers, many readers, blocking)
pub const HIGH_THROUGHPUT_CONFIG: RingConfig = RingConfig::new(1 << 16)
    .with_writers(Cardinality::Many)
    .with_readers(Cardinality::Many)
    .with_overlay(OverlayKind::Blocking);

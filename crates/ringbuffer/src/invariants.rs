//! Debug assertion macros for ring buffer cursor invariants.
//!
//! Cursors are unbounded `u64` positions; a slot index is derived from a
//! position only when touching the buffer. All checks compile away in release
//! builds (`debug_assert!`).
//!
//! Used by `Ring<T, C, O>`.

// =============================================================================
// Bounded count
// =============================================================================

/// Assert that a claim never lets the writer get more than `capacity` ahead of
/// the released read cursor.
///
/// **Invariant**: `0 ≤ (claim_end - head) ≤ capacity`
///
/// Used in: write claims, after the space check succeeds
macro_rules! debug_assert_bounded_count {
    ($count:expr, $capacity:expr) => {
        debug_assert!(
            $count <= $capacity as u64,
            "bounded count violated: {} elements in a buffer of {}",
            $count,
            $capacity
        )
    };
}

/// Assert that a read claim does not run past the published write cursor.
///
/// **Invariant**: `read_end ≤ tail`
///
/// Used in: read claims, before handing out slots
macro_rules! debug_assert_head_not_past_tail {
    ($new_head:expr, $tail:expr) => {
        debug_assert!(
            $new_head <= $tail,
            "read cursor {} advanced beyond published tail {}",
            $new_head,
            $tail
        )
    };
}

// =============================================================================
// Monotonic progress
// =============================================================================

/// Assert that a cursor only increases.
///
/// **Invariant**: `new_value ≥ old_value`
///
/// Used in: publish (tail) and release (head)
macro_rules! debug_assert_monotonic {
    ($name:literal, $old:expr, $new:expr) => {
        debug_assert!(
            $new >= $old,
            "{} decreased from {} to {}",
            $name,
            $old,
            $new
        )
    };
}

// =============================================================================
// Initialized range
// =============================================================================

/// Assert that we're reading from an initialized slot.
///
/// **Invariant**: `slot(pos) is initialized ⟺ head ≤ pos < tail`
///
/// Used in: read guards before `assume_init_read()`
macro_rules! debug_assert_initialized_read {
    ($pos:expr, $start:expr, $end:expr) => {
        debug_assert!(
            $pos >= $start && $pos < $end,
            "reading slot at position {} outside claimed range [{}, {})",
            $pos,
            $start,
            $end
        )
    };
}

// =============================================================================
// Slot stamps (fast overlay)
// =============================================================================

/// Assert that a slot stamp belongs to the expected lap.
///
/// **Invariant**: a slot for position `pos` is stamped `pos` when free and
/// `pos + 1` when written; the reader re-stamps it `pos + capacity`.
///
/// Used in: fast-overlay reads, after the stamp wait completes
macro_rules! debug_assert_stamp {
    ($stamp:expr, $expected:expr) => {
        debug_assert_eq!(
            $stamp, $expected,
            "slot stamp {} does not match expected {}",
            $stamp, $expected
        )
    };
}

// =============================================================================
// Re-exports for crate-internal use
// =============================================================================

pub(crate) use debug_assert_bounded_count;
pub(crate) use debug_assert_head_not_past_tail;
pub(crate) use debug_assert_initialized_read;
pub(crate) use debug_assert_monotonic;
pub(crate) use debug_assert_stamp;

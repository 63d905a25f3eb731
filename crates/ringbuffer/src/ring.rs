use crate::backoff::Backoff;
use crate::concurrency::{ConcurrencyClass, Overlay, OverlayKind};
use crate::error::{BusyWaitInterrupted, PublishError, RingError};
use crate::invariants::{
    debug_assert_bounded_count, debug_assert_head_not_past_tail, debug_assert_initialized_read,
    debug_assert_monotonic, debug_assert_stamp,
};
use crate::wait::BusyWaitStrategy;
use crossbeam_utils::CachePadded;
use std::cell::UnsafeCell;
use std::marker::PhantomData;
use std::mem::MaybeUninit;
use std::ops::ControlFlow;
use std::sync::atomic::{AtomicU64, Ordering};

// =============================================================================
// MEMORY ORDERING & SYNCHRONIZATION STRATEGY
// =============================================================================
//
// One algorithm serves every concurrency class and overlay. The class and the
// overlay are type parameters with associated constants, so every branch below
// on `C::MANY_WRITERS`, `C::MANY_READERS` or `O::KIND` is resolved at compile
// time and each combination gets its own specialized code.
//
// ## Sequence Numbers (ABA Prevention)
//
// All cursors are unbounded u64 positions. A slot index is computed as
// `pos & mask` (power-of-two capacity) or `pos % capacity` only when touching
// the buffer. At 10 billion messages/second, wrap takes ~58 years.
//
// ## Cursors
//
// - `tail`: published write cursor. Everything below it is readable.
// - `write_claim`: next unclaimed write position (many writers only).
// - `head`: released read cursor. Everything below it may be overwritten.
// - `read_claim`: next unclaimed read position. Used when the read side is
//   contended: many readers, or a discarding writer competing with readers.
//
// ## Write path (clearing / blocking / discarding)
//
// 1. Claim `[start, start + n)` once `start + n - head <= capacity`.
//    One writer: `start = tail`, no atomics beyond an Acquire refresh of head.
//    Many writers: CAS `write_claim` from `start` to `start + n`.
// 2. Write the slots (exclusive by claim; readers released them via head).
// 3. Publish: one writer stores `tail = start + n` (Release). Many writers
//    first wait until `tail == start` (Acquire) so publication stays in claim
//    order, then store.
//
// ## Read path
//
// 1. Claim `[start, start + n)` once `start + n <= tail` (Acquire).
//    One reader: `start = head`. Contended: CAS `read_claim`.
// 2. Move the values out (`assume_init_read`).
// 3. Release: store `head = start + n` (Release). Contended claimers first
//    wait until `head == start` so the writer never sees a hole.
//
// A discarding writer that finds the buffer full claims the oldest published
// elements through the same read-claim protocol, drops them and releases them.
// It never writes a slot a reader might still be reading.
//
// ## Fast overlay (per-slot stamps)
//
// `stamps[i]` holds the lap state of slot `i`:
// - `pos`: vacant, waiting for the writer of position `pos`
// - `pos + 1`: written by the writer of `pos`, readable
// - `pos + capacity`: read, vacant for the writer of the next lap
//
// Writers take positions from `tail` (fetch_add with many writers) without a
// capacity check, wait until the stamp says vacant, write, and stamp
// `pos + 1` (Release). Readers wait for `pos + 1` (Acquire), read, and stamp
// `pos + capacity` (Release). Many readers CAS `head` only after every slot
// they take is stamped readable, so an interrupted reader never holds a claim.
//
// =============================================================================

/// What a reader wants from a read claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Want {
    /// Wait until exactly this many elements are available.
    Exactly(usize),
    /// Take whatever is available, up to this many, without waiting.
    UpTo(usize),
    /// Wait for at least one element, then take all available.
    All,
}

/// Outcome of one non-waiting claim attempt.
enum ReadAttempt<'a, T, C: ConcurrencyClass, O: Overlay> {
    Claimed(ReadGuard<'a, T, C, O>),
    /// Fewer elements available than wanted
    Short,
    /// Another claimer moved the cursor first
    Raced,
}

/// The ring buffer algorithm shared by every handle of one buffer.
#[repr(C)]
pub(crate) struct Ring<T, C, O> {
    // === WRITER HOT ===
    /// Published write cursor (fast overlay: next write position)
    tail: CachePadded<AtomicU64>,
    /// Next unclaimed write position (many writers only)
    write_claim: CachePadded<AtomicU64>,

    // === READER HOT ===
    /// Released read cursor (fast overlay: next read position)
    head: CachePadded<AtomicU64>,
    /// Next unclaimed read position (contended read side only)
    read_claim: CachePadded<AtomicU64>,

    // === COLD STATE ===
    /// Elements dropped by a discarding writer
    discarded: AtomicU64,
    capacity: usize,
    /// `capacity - 1` when capacity is a power of two
    mask: Option<u64>,
    /// Per-slot lap stamps (fast overlay only, empty otherwise)
    stamps: Box<[AtomicU64]>,

    // === DATA BUFFER ===
    buffer: Box<[UnsafeCell<MaybeUninit<T>>]>,

    _shape: PhantomData<fn() -> (C, O)>,
}

// Safety: Ring is Send + Sync as long as T is Send.
// Slot access is serialized by the claim protocols described above.
unsafe impl<T: Send, C, O> Send for Ring<T, C, O> {}
unsafe impl<T: Send, C, O> Sync for Ring<T, C, O> {}

impl<T, C, O> Ring<T, C, O> {
    /// Returns the buffer index of a position.
    #[inline]
    fn index(&self, pos: u64) -> usize {
        match self.mask {
            Some(mask) => (pos & mask) as usize,
            None => (pos % self.capacity as u64) as usize,
        }
    }

    /// Writes a value into the slot of `pos`.
    ///
    /// # Safety
    ///
    /// The caller holds a write claim on `pos` and the slot is vacant.
    #[inline]
    unsafe fn write_slot(&self, pos: u64, value: T) {
        (*self.buffer[self.index(pos)].get()).write(value);
    }

    /// Moves the value out of the slot of `pos`.
    ///
    /// # Safety
    ///
    /// The caller holds a read claim on `pos` and the slot was published.
    #[inline]
    unsafe fn read_slot(&self, pos: u64) -> T {
        (*self.buffer[self.index(pos)].get()).assume_init_read()
    }

    /// Drops the value in the slot of `pos`.
    ///
    /// # Safety
    ///
    /// The caller holds a write claim on `pos` and wrote the slot.
    #[inline]
    unsafe fn drop_slot(&self, pos: u64) {
        (*self.buffer[self.index(pos)].get()).assume_init_drop();
    }

    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of elements dropped by a discarding writer so far.
    #[inline]
    pub(crate) fn discarded(&self) -> u64 {
        self.discarded.load(Ordering::Relaxed)
    }

    /// Approximate number of unread elements.
    #[inline]
    pub(crate) fn len(&self) -> usize {
        let head = self.head.load(Ordering::Acquire);
        let tail = self.tail.load(Ordering::Acquire);
        (tail.saturating_sub(head) as usize).min(self.capacity)
    }
}

impl<T, C: ConcurrencyClass, O: Overlay> Ring<T, C, O> {
    const FAST: bool = matches!(O::KIND, OverlayKind::Fast);
    const DISCARDING: bool = matches!(O::KIND, OverlayKind::Discarding);
    const CONTENDED_READS: bool = C::MANY_READERS || Self::DISCARDING;

    /// Creates an empty ring buffer.
    ///
    /// `capacity` must already be validated: at least 2, and a power of two
    /// for the fast overlay.
    pub(crate) fn new(capacity: usize) -> Self {
        debug_assert!(capacity >= 2);
        debug_assert!(!Self::FAST || capacity.is_power_of_two());

        let buffer = (0..capacity)
            .map(|_| UnsafeCell::new(MaybeUninit::uninit()))
            .collect();
        let stamps = if Self::FAST {
            (0..capacity as u64).map(AtomicU64::new).collect()
        } else {
            Box::default()
        };

        Self {
            tail: CachePadded::new(AtomicU64::new(0)),
            write_claim: CachePadded::new(AtomicU64::new(0)),
            head: CachePadded::new(AtomicU64::new(0)),
            read_claim: CachePadded::new(AtomicU64::new(0)),
            discarded: AtomicU64::new(0),
            capacity,
            mask: capacity.is_power_of_two().then(|| capacity as u64 - 1),
            stamps,
            buffer,
            _shape: PhantomData,
        }
    }

    // ---------------------------------------------------------------------
    // WRITER API
    // ---------------------------------------------------------------------

    /// Publishes one element, applying the overlay's full-buffer policy.
    pub(crate) fn publish(
        &self,
        value: T,
        cached_head: &mut u64,
        wait: &mut dyn BusyWaitStrategy,
    ) -> Result<(), PublishError<T>> {
        if Self::FAST {
            let pos = self.fast_claim(1);
            // SAFETY: `pos` was handed to this writer alone by `fast_claim`.
            unsafe { self.fast_write(pos, value) };
            return Ok(());
        }

        match self.claim_write(1, cached_head, wait) {
            Ok(start) => {
                // SAFETY: `claim_write` gave this writer exclusive use of
                // `start`, and readers released the slot before head passed it.
                unsafe { self.write_slot(start, value) };
                self.publish_write(start, 1);
                Ok(())
            }
            Err(error) => Err(PublishError::new(value, error)),
        }
    }

    /// Publishes a batch as one contiguous run.
    ///
    /// `T: Copy` keeps the write loop panic-free, so a claim can never be left
    /// unpublished and stall later writers.
    pub(crate) fn publish_batch(
        &self,
        items: &[T],
        cached_head: &mut u64,
        wait: &mut dyn BusyWaitStrategy,
    ) -> Result<(), RingError>
    where
        T: Copy,
    {
        if items.is_empty() {
            return Ok(());
        }
        self.check_batch(items.len())?;

        if Self::FAST {
            let start = self.fast_claim(items.len());
            for (pos, item) in (start..).zip(items) {
                // SAFETY: `[start, start + len)` was handed to this writer alone.
                unsafe { self.fast_write(pos, *item) };
            }
            return Ok(());
        }

        let start = self.claim_write(items.len(), cached_head, wait)?;
        for (pos, item) in (start..).zip(items) {
            // SAFETY: the claim covers `[start, start + len)`.
            unsafe { self.write_slot(pos, *item) };
        }
        self.publish_write(start, items.len());
        Ok(())
    }

    /// Reserves `n` slots for a single writer's zero-copy claim.
    ///
    /// Nothing becomes visible to readers until [`Self::commit_claim`].
    pub(crate) fn reserve(
        &self,
        n: usize,
        cached_head: &mut u64,
        wait: &mut dyn BusyWaitStrategy,
    ) -> Result<u64, RingError> {
        debug_assert!(!C::MANY_WRITERS);
        self.check_batch(n)?;

        if Self::FAST {
            let start = self.tail.load(Ordering::Relaxed);
            for pos in start..start + n as u64 {
                self.fast_wait_vacant(pos);
            }
            return Ok(start);
        }
        self.claim_write(n, cached_head, wait)
    }

    /// Writes one value into a reserved slot.
    ///
    /// # Safety
    ///
    /// `pos` lies inside a reservation held by the caller and was not written yet.
    #[inline]
    pub(crate) unsafe fn write_reserved(&self, pos: u64, value: T) {
        self.write_slot(pos, value);
    }

    /// Publishes the first `n` slots of a reservation starting at `start`.
    pub(crate) fn commit_claim(&self, start: u64, n: usize) {
        if Self::FAST {
            for pos in start..start + n as u64 {
                self.stamps[self.index(pos)].store(pos + 1, Ordering::Release);
            }
            self.tail.store(start + n as u64, Ordering::Release);
        } else {
            self.publish_write(start, n);
        }
    }

    /// Drops the values written into an unpublished reservation.
    ///
    /// # Safety
    ///
    /// Exactly the slots `[start, start + written)` were written and are not published.
    pub(crate) unsafe fn abandon_claim(&self, start: u64, written: usize) {
        for pos in start..start + written as u64 {
            self.drop_slot(pos);
        }
    }

    fn check_batch(&self, n: usize) -> Result<(), RingError> {
        if n > self.capacity {
            return Err(RingError::BatchTooLarge {
                requested: n,
                capacity: self.capacity,
            });
        }
        Ok(())
    }

    /// Claims `n` slots for writing and returns the first claimed position.
    ///
    /// When the buffer is too full the overlay decides: clearing fails with
    /// [`RingError::Full`], blocking ticks `wait`, discarding drops the oldest
    /// unread elements.
    fn claim_write(
        &self,
        n: usize,
        cached_head: &mut u64,
        wait: &mut dyn BusyWaitStrategy,
    ) -> Result<u64, RingError> {
        debug_assert!(!Self::FAST);
        let n = n as u64;
        let capacity = self.capacity as u64;
        let mut waiting = false;
        let mut backoff = Backoff::new();

        loop {
            let start = if C::MANY_WRITERS {
                self.write_claim.load(Ordering::Relaxed)
            } else {
                self.tail.load(Ordering::Relaxed)
            };
            let end = start + n;

            // A stale `start` (another writer claimed meanwhile) saturates to a
            // small count here and then fails the CAS.
            if end.saturating_sub(*cached_head) > capacity {
                *cached_head = self.head.load(Ordering::Acquire);
            }

            if end.saturating_sub(*cached_head) <= capacity {
                debug_assert_bounded_count!(end.saturating_sub(*cached_head), self.capacity);
                if !C::MANY_WRITERS {
                    return Ok(start);
                }
                if self
                    .write_claim
                    .compare_exchange_weak(start, end, Ordering::Relaxed, Ordering::Relaxed)
                    .is_ok()
                {
                    return Ok(start);
                }
                continue;
            }

            match O::KIND {
                OverlayKind::Blocking => {
                    if !waiting {
                        wait.reset();
                        waiting = true;
                    }
                    wait.tick()?;
                }
                OverlayKind::Discarding => {
                    if self.discard_until(end - capacity) {
                        backoff.reset();
                    } else {
                        backoff.snooze();
                    }
                }
                OverlayKind::Clearing | OverlayKind::Fast => return Err(RingError::Full),
            }
        }
    }

    /// Publishes `[start, start + n)` after its slots were written.
    fn publish_write(&self, start: u64, n: usize) {
        let end = start + n as u64;
        if C::MANY_WRITERS {
            // Earlier claimers publish first
            Backoff::snooze_until(|| self.tail.load(Ordering::Acquire) == start);
        }
        debug_assert_monotonic!("tail", start, end);
        self.tail.store(end, Ordering::Release);
    }

    /// Drops the oldest unread elements until the read cursor reaches `target`.
    ///
    /// Returns `false` when nothing could be claimed yet: either readers or
    /// another writer already hold the elements below `target`, or the only
    /// elements in the way are still being written by other writers.
    fn discard_until(&self, target: u64) -> bool {
        loop {
            let start = self.read_claim.load(Ordering::Acquire);
            if start >= target {
                return false;
            }
            let end = target.min(self.tail.load(Ordering::Acquire));
            if end <= start {
                return false;
            }
            if self
                .read_claim
                .compare_exchange_weak(start, end, Ordering::AcqRel, Ordering::Relaxed)
                .is_ok()
            {
                // Dropping the guard drops the elements and releases the slots
                drop(ReadGuard::new(self, start, end));
                let count = end - start;
                self.discarded.fetch_add(count, Ordering::Relaxed);
                tracing::trace!(count, "discarded unread elements");
                return true;
            }
        }
    }

    // ---------------------------------------------------------------------
    // FAST OVERLAY
    // ---------------------------------------------------------------------

    /// Hands out `n` consecutive write positions. No capacity check.
    #[inline]
    fn fast_claim(&self, n: usize) -> u64 {
        if C::MANY_WRITERS {
            self.tail.fetch_add(n as u64, Ordering::Relaxed)
        } else {
            let start = self.tail.load(Ordering::Relaxed);
            self.tail.store(start + n as u64, Ordering::Release);
            start
        }
    }

    /// Waits until the slot of `pos` has been read on the previous lap.
    #[inline]
    fn fast_wait_vacant(&self, pos: u64) {
        let stamp = &self.stamps[self.index(pos)];
        Backoff::snooze_until(|| stamp.load(Ordering::Acquire) == pos);
    }

    /// # Safety
    ///
    /// `pos` was handed to the caller alone by `fast_claim`.
    #[inline]
    unsafe fn fast_write(&self, pos: u64, value: T) {
        self.fast_wait_vacant(pos);
        self.write_slot(pos, value);
        self.stamps[self.index(pos)].store(pos + 1, Ordering::Release);
    }

    /// Counts readable slots from `start`, stopping at the first unwritten one.
    fn fast_ready(&self, start: u64, limit: usize) -> usize {
        (start..start + limit as u64)
            .take_while(|&pos| self.stamps[self.index(pos)].load(Ordering::Acquire) == pos + 1)
            .count()
    }

    /// One attempt at claiming readable slots, stopping at the first unwritten stamp.
    fn fast_attempt_read(&self, want: Want) -> ReadAttempt<'_, T, C, O> {
        let start = self.head.load(Ordering::Acquire);
        let limit = match want {
            Want::Exactly(n) | Want::UpTo(n) => n.min(self.capacity),
            Want::All => self.capacity,
        };
        let ready = self.fast_ready(start, limit);
        let take = match want {
            Want::Exactly(n) => (ready >= n).then_some(n),
            Want::UpTo(_) | Want::All => (ready > 0).then_some(ready),
        };

        let Some(n) = take else {
            // Another reader moved head: the stamps seen belong to an old lap
            if C::MANY_READERS && self.head.load(Ordering::Acquire) != start {
                return ReadAttempt::Raced;
            }
            return ReadAttempt::Short;
        };

        let end = start + n as u64;
        if C::MANY_READERS
            && self
                .head
                .compare_exchange_weak(start, end, Ordering::AcqRel, Ordering::Relaxed)
                .is_err()
        {
            return ReadAttempt::Raced;
        }
        ReadAttempt::Claimed(ReadGuard::new(self, start, end))
    }

    // ---------------------------------------------------------------------
    // READER API
    // ---------------------------------------------------------------------

    /// Claims elements for reading, waiting with `wait` until enough are available.
    ///
    /// An interrupt leaves nothing claimed.
    pub(crate) fn claim_read(
        &self,
        want: Want,
        cached_tail: &mut u64,
        wait: &mut dyn BusyWaitStrategy,
    ) -> Result<ReadGuard<'_, T, C, O>, BusyWaitInterrupted> {
        debug_assert!(!matches!(want, Want::UpTo(_)));
        let mut waiting = false;
        loop {
            match self.attempt_read(want, cached_tail) {
                ReadAttempt::Claimed(guard) => return Ok(guard),
                ReadAttempt::Raced => {}
                ReadAttempt::Short => {
                    if !waiting {
                        wait.reset();
                        waiting = true;
                    }
                    wait.tick()?;
                }
            }
        }
    }

    /// Claims up to `max` available elements. Never waits.
    pub(crate) fn try_claim_read(
        &self,
        max: usize,
        cached_tail: &mut u64,
    ) -> Option<ReadGuard<'_, T, C, O>> {
        if max == 0 {
            return None;
        }
        loop {
            match self.attempt_read(Want::UpTo(max), cached_tail) {
                ReadAttempt::Claimed(guard) => return Some(guard),
                ReadAttempt::Raced => {}
                ReadAttempt::Short => return None,
            }
        }
    }

    /// Visits the unread elements in order without taking them, until `f` breaks.
    ///
    /// # Safety
    ///
    /// The caller is the only reader and cannot read while this runs, and the
    /// overlay never discards: nothing in `[head, tail)` can move or be dropped.
    pub(crate) unsafe fn peek<F>(&self, mut f: F) -> ControlFlow<()>
    where
        F: FnMut(&T) -> ControlFlow<()>,
    {
        debug_assert!(!C::MANY_READERS && !Self::DISCARDING);
        let head = self.head.load(Ordering::Relaxed);
        let end = if Self::FAST {
            head + self.fast_ready(head, self.capacity) as u64
        } else {
            self.tail.load(Ordering::Acquire)
        };
        for pos in head..end {
            f((*self.buffer[self.index(pos)].get()).assume_init_ref())?;
        }
        ControlFlow::Continue(())
    }

    fn attempt_read(&self, want: Want, cached_tail: &mut u64) -> ReadAttempt<'_, T, C, O> {
        if Self::FAST {
            return self.fast_attempt_read(want);
        }

        let start = if Self::CONTENDED_READS {
            self.read_claim.load(Ordering::Acquire)
        } else {
            self.head.load(Ordering::Relaxed)
        };
        let wanted = match want {
            Want::Exactly(n) | Want::UpTo(n) => n as u64,
            Want::All => self.capacity as u64,
        };

        let mut avail = cached_tail.saturating_sub(start);
        if avail < wanted {
            *cached_tail = self.tail.load(Ordering::Acquire);
            avail = cached_tail.saturating_sub(start);
        }

        let take = match want {
            Want::Exactly(n) => (avail >= n as u64).then_some(n as u64),
            Want::UpTo(max) => (avail > 0).then(|| avail.min(max as u64)),
            Want::All => (avail > 0).then_some(avail),
        };
        let Some(n) = take else {
            return ReadAttempt::Short;
        };

        let end = start + n;
        debug_assert_head_not_past_tail!(end, *cached_tail);
        if Self::CONTENDED_READS
            && self
                .read_claim
                .compare_exchange_weak(start, end, Ordering::AcqRel, Ordering::Relaxed)
                .is_err()
        {
            return ReadAttempt::Raced;
        }
        ReadAttempt::Claimed(ReadGuard::new(self, start, end))
    }

    /// Returns claimed slots `[start, end)` to the writers.
    fn release_read(&self, start: u64, end: u64) {
        debug_assert_monotonic!("head", start, end);
        if Self::FAST {
            // Many fast readers advanced head when claiming
            if !C::MANY_READERS {
                self.head.store(end, Ordering::Release);
            }
            return;
        }
        if Self::CONTENDED_READS {
            // Earlier claimers release first
            Backoff::snooze_until(|| self.head.load(Ordering::Acquire) == start);
        }
        self.head.store(end, Ordering::Release);
    }
}

impl<T, C, O> Drop for Ring<T, C, O> {
    fn drop(&mut self) {
        if !std::mem::needs_drop::<T>() {
            return;
        }

        if self.stamps.is_empty() {
            // No claims are in flight once every handle is gone: [head, tail) is live
            let head = *self.head.get_mut();
            let tail = *self.tail.get_mut();
            for pos in head..tail {
                // SAFETY: published and never released
                unsafe { self.drop_slot(pos) };
            }
        } else {
            let capacity = self.capacity as u64;
            for (i, stamp) in self.stamps.iter_mut().enumerate() {
                // Written slots carry `pos + 1`, vacant ones `pos`
                if *stamp.get_mut() % capacity == (i as u64 + 1) % capacity {
                    // SAFETY: the stamp says written and not yet read
                    unsafe { self.buffer[i].get_mut().assume_init_drop() };
                }
            }
        }
    }
}

// ---------------------------------------------------------------------
// READ GUARD
// ---------------------------------------------------------------------

/// A claimed run of readable slots.
///
/// Yields the values in order. Whatever is not taken is dropped when the guard
/// is dropped, and the slots are then released, so a panicking consumer cannot
/// leave a claim behind.
pub(crate) struct ReadGuard<'a, T, C: ConcurrencyClass, O: Overlay> {
    ring: &'a Ring<T, C, O>,
    start: u64,
    next: u64,
    end: u64,
}

impl<'a, T, C: ConcurrencyClass, O: Overlay> ReadGuard<'a, T, C, O> {
    fn new(ring: &'a Ring<T, C, O>, start: u64, end: u64) -> Self {
        Self {
            ring,
            start,
            next: start,
            end,
        }
    }
}

impl<T, C: ConcurrencyClass, O: Overlay> Iterator for ReadGuard<'_, T, C, O> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.next == self.end {
            return None;
        }
        let pos = self.next;
        debug_assert_initialized_read!(pos, self.start, self.end);
        self.next += 1;

        // SAFETY: Slot access is safe because:
        // 1. `pos` lies in `[start, end)`, which this guard claimed exclusively
        // 2. every slot in the claim was published (tail or stamp, Acquire)
        // 3. each position is read at most once: `next` moves past it first
        let value = unsafe { self.ring.read_slot(pos) };

        if Ring::<T, C, O>::FAST {
            let stamp = &self.ring.stamps[self.ring.index(pos)];
            debug_assert_stamp!(stamp.load(Ordering::Relaxed), pos + 1);
            stamp.store(pos + self.ring.capacity as u64, Ordering::Release);
        }
        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = (self.end - self.next) as usize;
        (n, Some(n))
    }
}

impl<T, C: ConcurrencyClass, O: Overlay> ExactSizeIterator for ReadGuard<'_, T, C, O> {}

impl<T, C: ConcurrencyClass, O: Overlay> Drop for ReadGuard<'_, T, C, O> {
    fn drop(&mut self) {
        self.by_ref().for_each(drop);
        self.ring.release_read(self.start, self.end);
    }
}

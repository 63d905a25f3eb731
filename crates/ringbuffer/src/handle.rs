use crate::concurrency::{
    Arity, Class, ConcurrencyClass, ConcurrencyKind, Many, NonDiscarding, One, Overlay, OverlayKind,
};
use crate::error::{BusyWaitInterrupted, PublishError, RingError};
use crate::ring::{Ring, Want};
use crate::wait::BusyWaitStrategy;
use std::fmt;
use std::ops::ControlFlow;
use std::sync::Arc;

/// Creates the shared ring and its two handles. `capacity` is already validated.
pub(crate) fn pair<T, C: ConcurrencyClass, O: Overlay>(
    capacity: usize,
    write_wait: Box<dyn BusyWaitStrategy>,
    read_wait: Box<dyn BusyWaitStrategy>,
) -> (Writer<T, C, O>, Reader<T, C, O>) {
    let class = C::KIND;
    let overlay = O::KIND;
    tracing::debug!(capacity, %class, %overlay, "ring buffer built");
    let ring = Arc::new(Ring::new(capacity));
    (
        Writer {
            ring: Arc::clone(&ring),
            wait: write_wait,
            cached_head: 0,
        },
        Reader {
            ring,
            wait: read_wait,
            cached_tail: 0,
        },
    )
}

// =============================================================================
// WRITER
// =============================================================================

/// Writing handle of a ring buffer.
///
/// With one writer (`Class<One, _>`) the handle is the only way to write and
/// cannot be cloned. With many writers, clone it once per writing thread.
///
/// Every publishing method takes `&mut self`: the handle carries its own
/// busy-wait strategy state and a cached view of the read cursor.
pub struct Writer<T, C, O> {
    ring: Arc<Ring<T, C, O>>,
    wait: Box<dyn BusyWaitStrategy>,
    /// This writer's last view of `head` (avoids cross-core reads)
    cached_head: u64,
}

impl<T, C: ConcurrencyClass, O: Overlay> Writer<T, C, O> {
    /// Publishes one element.
    ///
    /// When the buffer is full the overlay decides: clearing fails with
    /// [`RingError::Full`], blocking waits with the write strategy, discarding
    /// drops the oldest unread element, and fast waits for its slot.
    ///
    /// # Errors
    ///
    /// Returns the element inside a [`PublishError`] if the buffer is full
    /// (clearing) or the wait was interrupted (blocking).
    #[inline]
    pub fn publish(&mut self, value: T) -> Result<(), PublishError<T>> {
        self.ring
            .publish(value, &mut self.cached_head, self.wait.as_mut())
    }

    /// Publishes a batch as one contiguous run.
    ///
    /// Either the whole batch becomes visible to readers at once, or nothing
    /// does.
    pub fn publish_batch(&mut self, items: &[T]) -> Result<(), RingError>
    where
        T: Copy,
    {
        self.ring
            .publish_batch(items, &mut self.cached_head, self.wait.as_mut())
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.ring.capacity()
    }

    /// Approximate number of unread elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.ring.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.len() >= self.capacity()
    }

    /// Elements dropped unread by discarding writers so far.
    #[inline]
    pub fn discarded(&self) -> u64 {
        self.ring.discarded()
    }

    #[inline]
    pub fn concurrency(&self) -> ConcurrencyKind {
        C::KIND
    }

    #[inline]
    pub fn overlay(&self) -> OverlayKind {
        O::KIND
    }
}

impl<T, R: Arity, O: Overlay> Writer<T, Class<One, R>, O> {
    /// Claims `n` slots for zero-copy writing.
    ///
    /// Applies the same full-buffer policy as [`publish`](Self::publish) for
    /// all `n` slots up front. Only available with a single writer.
    ///
    /// # Example
    ///
    /// ```
    /// use ringbuffer_rs::RingBufferBuilder;
    ///
    /// let (mut writer, mut reader) = RingBufferBuilder::<u64>::with_capacity(8)
    ///     .one_writer()
    ///     .one_reader()
    ///     .build()
    ///     .unwrap();
    ///
    /// let mut claim = writer.claim(3).unwrap();
    /// claim.write(1).unwrap();
    /// claim.write(2).unwrap();
    /// assert_eq!(claim.publish(), 2);
    /// assert_eq!(reader.consume().unwrap(), 1);
    /// ```
    pub fn claim(&mut self, n: usize) -> Result<Claim<'_, T, Class<One, R>, O>, RingError> {
        let start = self
            .ring
            .reserve(n, &mut self.cached_head, self.wait.as_mut())?;
        Ok(Claim {
            ring: &self.ring,
            start,
            len: n,
            written: 0,
        })
    }
}

impl<T, R: Arity, O: Overlay> Clone for Writer<T, Class<Many, R>, O> {
    fn clone(&self) -> Self {
        Self {
            ring: Arc::clone(&self.ring),
            wait: self.wait.clone(),
            cached_head: self.cached_head,
        }
    }
}

impl<T, C: ConcurrencyClass, O: Overlay> fmt::Debug for Writer<T, C, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Writer")
            .field("class", &C::KIND)
            .field("overlay", &O::KIND)
            .field("capacity", &self.capacity())
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

// =============================================================================
// CLAIM
// =============================================================================

/// Zero-copy claim on consecutive slots, for single-writer ring buffers.
///
/// Values are written straight into the buffer. Nothing is visible to readers
/// until [`publish`](Self::publish); dropping the claim instead drops the
/// written values and publishes nothing.
pub struct Claim<'a, T, C: ConcurrencyClass, O: Overlay> {
    ring: &'a Ring<T, C, O>,
    start: u64,
    len: usize,
    written: usize,
}

impl<T, C: ConcurrencyClass, O: Overlay> Claim<'_, T, C, O> {
    /// Writes the next value. Hands it back if the claim is already filled.
    #[inline]
    pub fn write(&mut self, value: T) -> Result<(), T> {
        if self.written == self.len {
            return Err(value);
        }
        // SAFETY: `start + written` lies inside this claim and was not written yet.
        unsafe {
            self.ring
                .write_reserved(self.start + self.written as u64, value);
        }
        self.written += 1;
        Ok(())
    }

    /// Number of claimed slots.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn written(&self) -> usize {
        self.written
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.len - self.written
    }

    /// Publishes the written values. Returns how many were published.
    pub fn publish(mut self) -> usize {
        let n = self.written;
        self.ring.commit_claim(self.start, n);
        self.written = 0;
        n
    }
}

impl<T, C: ConcurrencyClass, O: Overlay> Drop for Claim<'_, T, C, O> {
    fn drop(&mut self) {
        // SAFETY: exactly `[start, start + written)` was written and never published.
        unsafe { self.ring.abandon_claim(self.start, self.written) };
    }
}

// =============================================================================
// READER
// =============================================================================

/// Reading handle of a ring buffer.
///
/// With one reader (`Class<_, One>`) the handle cannot be cloned. With many
/// readers, clone it once per reading thread.
///
/// Readers always wait on an empty buffer, ticking their busy-wait strategy;
/// an interruptible strategy makes the wait fail with [`BusyWaitInterrupted`].
pub struct Reader<T, C, O> {
    ring: Arc<Ring<T, C, O>>,
    wait: Box<dyn BusyWaitStrategy>,
    /// This reader's last view of `tail` (avoids cross-core reads)
    cached_tail: u64,
}

impl<T, C: ConcurrencyClass, O: Overlay> Reader<T, C, O> {
    /// Takes the oldest element, waiting with the read strategy while empty.
    #[inline]
    pub fn consume(&mut self) -> Result<T, BusyWaitInterrupted> {
        loop {
            let mut guard = self
                .ring
                .claim_read(Want::Exactly(1), &mut self.cached_tail, self.wait.as_mut())?;
            if let Some(value) = guard.next() {
                return Ok(value);
            }
        }
    }

    /// Like [`consume`](Self::consume), but waits with `wait` for this call only.
    pub fn consume_with(&mut self, wait: &mut dyn BusyWaitStrategy) -> Result<T, BusyWaitInterrupted> {
        loop {
            let mut guard = self
                .ring
                .claim_read(Want::Exactly(1), &mut self.cached_tail, wait)?;
            if let Some(value) = guard.next() {
                return Ok(value);
            }
        }
    }

    /// Takes the oldest element if there is one. Never waits.
    pub fn try_consume(&mut self) -> Option<T> {
        self.ring
            .try_claim_read(1, &mut self.cached_tail)
            .and_then(|mut guard| guard.next())
    }

    /// Waits until `n` elements are available and appends them to `out` in order.
    ///
    /// `out` is grown before waiting, so no allocation happens while the
    /// elements are claimed.
    ///
    /// # Errors
    ///
    /// [`RingError::BatchTooLarge`] if `n` exceeds the capacity, or
    /// [`RingError::Interrupted`] if the wait was interrupted (nothing is taken).
    pub fn consume_batch(&mut self, n: usize, out: &mut Vec<T>) -> Result<(), RingError> {
        if n > self.capacity() {
            return Err(RingError::BatchTooLarge {
                requested: n,
                capacity: self.capacity(),
            });
        }
        if n == 0 {
            return Ok(());
        }
        out.reserve(n);
        out.extend(
            self.ring
                .claim_read(Want::Exactly(n), &mut self.cached_tail, self.wait.as_mut())?,
        );
        Ok(())
    }

    /// Hands up to `max` available elements to `handler` with a single cursor
    /// update. Never waits. Returns how many were handled.
    ///
    /// If `handler` panics, the remaining claimed elements are dropped and
    /// their slots released.
    pub fn consume_up_to<F>(&mut self, max: usize, handler: F) -> usize
    where
        F: FnMut(T),
    {
        match self.ring.try_claim_read(max, &mut self.cached_tail) {
            Some(guard) => {
                let n = guard.len();
                guard.for_each(handler);
                n
            }
            None => 0,
        }
    }

    /// Skips to the most recently published element.
    ///
    /// Waits while empty, then takes every available element, drops all but
    /// the newest and returns it.
    pub fn consume_latest(&mut self) -> Result<T, BusyWaitInterrupted> {
        loop {
            let guard = self
                .ring
                .claim_read(Want::All, &mut self.cached_tail, self.wait.as_mut())?;
            if let Some(value) = guard.last() {
                return Ok(value);
            }
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.ring.capacity()
    }

    /// Approximate number of unread elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.ring.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn concurrency(&self) -> ConcurrencyKind {
        C::KIND
    }

    #[inline]
    pub fn overlay(&self) -> OverlayKind {
        O::KIND
    }
}

impl<T, W: Arity, O: NonDiscarding> Reader<T, Class<W, One>, O> {
    /// Visits the unread elements, oldest first, without taking them.
    ///
    /// Elements published while the visit runs may or may not be seen.
    pub fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(&T),
    {
        self.visit(|value| {
            f(value);
            ControlFlow::Continue(())
        });
    }

    /// Whether an unread element equals `value`. Stops at the first match.
    pub fn contains(&self, value: &T) -> bool
    where
        T: PartialEq,
    {
        self.visit(|v| if v == value { ControlFlow::Break(()) } else { ControlFlow::Continue(()) })
            .is_break()
    }

    /// The unread elements as a `Debug` list, e.g. `[3, 4, 5]`.
    pub fn contents(&self) -> Contents<'_, T, W, O> {
        Contents { reader: self }
    }

    fn visit<F>(&self, f: F) -> ControlFlow<()>
    where
        F: FnMut(&T) -> ControlFlow<()>,
    {
        // SAFETY: `&self` on the only reader rules out a concurrent read, and a
        // non-discarding writer never touches unread slots.
        unsafe { self.ring.peek(f) }
    }
}

/// `Debug` view of a reader's unread elements. See [`Reader::contents`].
pub struct Contents<'a, T, W, O> {
    reader: &'a Reader<T, Class<W, One>, O>,
}

impl<T: fmt::Debug, W: Arity, O: NonDiscarding> fmt::Debug for Contents<'_, T, W, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut list = f.debug_list();
        self.reader.for_each(|value| {
            list.entry(value);
        });
        list.finish()
    }
}

impl<T, W: Arity, O: Overlay> Clone for Reader<T, Class<W, Many>, O> {
    fn clone(&self) -> Self {
        Self {
            ring: Arc::clone(&self.ring),
            wait: self.wait.clone(),
            cached_tail: self.cached_tail,
        }
    }
}

impl<T, C: ConcurrencyClass, O: Overlay> fmt::Debug for Reader<T, C, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reader")
            .field("class", &C::KIND)
            .field("overlay", &O::KIND)
            .field("capacity", &self.capacity())
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::concurrency::{AtomicRead, AtomicWrite, Blocking, Clearing, Concurrent, Discarding, Fast, Volatile};
    use crate::error::Side;
    use crate::wait::{Hint, Interruptible, Noop};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn spsc<O: Overlay>(capacity: usize) -> (Writer<u64, Volatile, O>, Reader<u64, Volatile, O>) {
        pair(capacity, Box::new(Hint), Box::new(Hint))
    }

    #[test]
    fn test_publish_consume_in_order() {
        let (mut w, mut r) = spsc::<Clearing>(4);
        for i in 1..=4 {
            w.publish(i).unwrap();
        }
        assert!(w.is_full());
        let got: Vec<u64> = (0..4).map(|_| r.consume().unwrap()).collect();
        assert_eq!(got, vec![1, 2, 3, 4]);
        assert!(r.is_empty());
    }

    #[test]
    fn test_try_consume_empty() {
        let (_w, mut r) = spsc::<Blocking>(4);
        assert_eq!(r.try_consume(), None);
    }

    #[test]
    fn test_consume_batch() {
        let (mut w, mut r) = spsc::<Clearing>(8);
        w.publish_batch(&[1, 2, 3, 4, 5]).unwrap();

        let mut out = Vec::new();
        r.consume_batch(3, &mut out).unwrap();
        assert_eq!(out, vec![1, 2, 3]);
        assert_eq!(r.len(), 2);

        let err = r.consume_batch(9, &mut out).unwrap_err();
        assert_eq!(
            err,
            RingError::BatchTooLarge {
                requested: 9,
                capacity: 8
            }
        );
    }

    #[test]
    fn test_consume_up_to() {
        let (mut w, mut r) = spsc::<Fast>(8);
        w.publish_batch(&[10, 20, 30, 40, 50]).unwrap();

        let mut sum = 0;
        assert_eq!(r.consume_up_to(3, |v| sum += v), 3);
        assert_eq!(sum, 60);
        assert_eq!(r.consume_up_to(10, |v| sum += v), 2);
        assert_eq!(sum, 150);
        assert_eq!(r.consume_up_to(10, |_| {}), 0);
    }

    #[test]
    fn test_consume_latest_skips_older() {
        let (mut w, mut r) = spsc::<Discarding>(4);
        w.publish_batch(&[1, 2, 3]).unwrap();
        assert_eq!(r.consume_latest().unwrap(), 3);
        assert!(r.is_empty());
    }

    #[test]
    fn test_consume_interrupted_while_empty() {
        let interruptible = Interruptible::new(Side::Reading, Noop);
        let interrupter = interruptible.interrupter();
        let (_w, mut r) = pair::<u64, AtomicWrite, Clearing>(4, Box::new(Hint), Box::new(interruptible));

        interrupter.interrupt();
        let err = r.consume().unwrap_err();
        assert!(err.was_reading());
    }

    #[test]
    fn test_blocking_publish_interrupted_returns_value() {
        let interruptible = Interruptible::new(Side::Writing, Noop);
        let interrupter = interruptible.interrupter();
        let (mut w, _r) = pair::<String, AtomicRead, Blocking>(2, Box::new(interruptible), Box::new(Hint));

        w.publish("a".into()).unwrap();
        w.publish("b".into()).unwrap();
        interrupter.interrupt();
        let err = w.publish("c".into()).unwrap_err();
        assert!(err.error().is_interrupted());
        assert_eq!(err.into_inner(), "c");
    }

    #[test]
    fn test_claim_publish_and_abandon() {
        static DROPS: AtomicUsize = AtomicUsize::new(0);
        struct Tracked(u32);
        impl Drop for Tracked {
            fn drop(&mut self) {
                DROPS.fetch_add(1, Ordering::SeqCst);
            }
        }

        let (mut w, mut r) = pair::<Tracked, Volatile, Clearing>(4, Box::new(Hint), Box::new(Hint));

        {
            let mut claim = w.claim(2).unwrap();
            assert!(claim.write(Tracked(1)).is_ok());
            assert_eq!(claim.remaining(), 1);
            // Abandoned: the written value is dropped, nothing is published
        }
        assert_eq!(DROPS.load(Ordering::SeqCst), 1);
        assert!(r.try_consume().is_none());

        let mut claim = w.claim(2).unwrap();
        assert!(claim.write(Tracked(2)).is_ok());
        assert!(claim.write(Tracked(3)).is_ok());
        let overflow = claim.write(Tracked(4)).unwrap_err();
        assert_eq!(overflow.0, 4);
        drop(overflow);
        assert_eq!(claim.publish(), 2);
        assert_eq!(DROPS.load(Ordering::SeqCst), 2);

        assert_eq!(r.consume().unwrap().0, 2);
        assert_eq!(r.consume().unwrap().0, 3);
    }

    #[test]
    fn test_fast_claim() {
        let (mut w, mut r) = spsc::<Fast>(4);
        let mut claim = w.claim(4).unwrap();
        for i in 0..4 {
            claim.write(i).unwrap();
        }
        assert_eq!(claim.publish(), 4);
        let mut out = Vec::new();
        r.consume_batch(4, &mut out).unwrap();
        assert_eq!(out, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_many_handles_clone() {
        let (w, r) = pair::<u64, Concurrent, Blocking>(8, Box::new(Hint), Box::new(Hint));
        let mut w2 = w.clone();
        let mut r2 = r.clone();
        w2.publish(7).unwrap();
        assert_eq!(r2.consume().unwrap(), 7);
        assert_eq!(w.concurrency(), ConcurrencyKind::Concurrent);
        assert_eq!(r.overlay(), OverlayKind::Blocking);
    }

    fn wrapped<C: ConcurrencyClass, O: NonDiscarding>(capacity: usize) -> Reader<u64, C, O> {
        let (mut w, mut r) = pair::<u64, C, O>(capacity, Box::new(Hint), Box::new(Hint));
        for i in 1..=capacity as u64 {
            w.publish(i).unwrap();
        }
        assert_eq!(r.consume().unwrap(), 1);
        assert_eq!(r.consume().unwrap(), 2);
        // lands in the slots just released
        w.publish(capacity as u64 + 1).unwrap();
        r
    }

    #[test]
    fn test_inspect_unread_across_wrap() {
        let r = wrapped::<Volatile, Clearing>(4);
        let mut seen = Vec::new();
        r.for_each(|v| seen.push(*v));
        assert_eq!(seen, vec![3, 4, 5]);
        assert!(r.contains(&5));
        assert!(!r.contains(&2));
        assert_eq!(format!("{:?}", r.contents()), "[3, 4, 5]");
        assert_eq!(r.len(), 3);
    }

    #[test]
    fn test_inspect_fast_after_consume() {
        let mut r = wrapped::<Volatile, Fast>(4);
        assert_eq!(format!("{:?}", r.contents()), "[3, 4, 5]");
        assert!(r.contains(&3));
        assert_eq!(r.consume().unwrap(), 3);
        assert!(!r.contains(&3));
        assert_eq!(format!("{:?}", r.contents()), "[4, 5]");
    }

    #[test]
    fn test_inspect_many_writers_non_power_of_two() {
        let mut r = wrapped::<AtomicWrite, Blocking>(3);
        assert_eq!(format!("{:?}", r.contents()), "[3, 4]");
        r.consume_up_to(usize::MAX, drop);
        assert_eq!(format!("{:?}", r.contents()), "[]");
        assert!(!r.contains(&4));
    }
}

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::{BusyWaitStrategy, Hint};
use crate::error::BusyWaitInterrupted;

/// Shared "keep waiting" flag behind both wakeup decorators.
#[derive(Debug, Clone)]
struct WaitFlag(Arc<AtomicBool>);

impl WaitFlag {
    fn new() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }

    #[inline]
    fn should_wait(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    #[inline]
    fn rearm(&self) {
        self.0.store(true, Ordering::Release);
    }

    #[inline]
    fn clear(&self) {
        self.0.store(false, Ordering::Release);
    }

    /// Runs `inner` until cleared or `budget` ticks have elapsed, then re-arms.
    fn wait_on<S: BusyWaitStrategy>(
        &self,
        inner: &mut S,
        budget: Option<u32>,
    ) -> Result<(), BusyWaitInterrupted> {
        inner.reset();
        let mut remaining = budget;
        while remaining != Some(0) && self.should_wait() {
            if let Err(e) = inner.tick() {
                self.rearm();
                return Err(e);
            }
            if let Some(n) = remaining.as_mut() {
                *n -= 1;
            }
        }
        self.rearm();
        Ok(())
    }
}

/// One tick waits, using an inner strategy, until another thread calls
/// [`wakeup`](Self::wakeup).
///
/// Each wakeup releases exactly one tick; the flag re-arms afterwards. The
/// wakeup is remembered if it arrives before the tick starts.
#[derive(Debug, Clone)]
pub struct Wakeup<S = Hint> {
    flag: WaitFlag,
    inner: S,
}

impl Wakeup<Hint> {
    pub fn new() -> Self {
        Self::with_inner(Hint)
    }
}

impl Default for Wakeup<Hint> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: BusyWaitStrategy> Wakeup<S> {
    pub fn with_inner(inner: S) -> Self {
        Self {
            flag: WaitFlag::new(),
            inner,
        }
    }

    /// Ends the current (or next) tick.
    #[inline]
    pub fn wakeup(&self) {
        self.flag.clear();
    }

    /// A thread-safe handle for waking from elsewhere.
    pub fn waker(&self) -> WakeupHandle {
        WakeupHandle {
            flag: self.flag.clone(),
        }
    }
}

impl<S: BusyWaitStrategy + Clone> BusyWaitStrategy for Wakeup<S> {
    #[inline]
    fn reset(&mut self) {}

    fn tick(&mut self) -> Result<(), BusyWaitInterrupted> {
        self.flag.wait_on(&mut self.inner, None)
    }
}

/// Like [`Wakeup`], but a tick also ends after `max_iterations` inner ticks.
#[derive(Debug, Clone)]
pub struct Wakeupable<S = Hint> {
    flag: WaitFlag,
    max_iterations: u32,
    inner: S,
}

impl Wakeupable<Hint> {
    pub fn new(max_iterations: u32) -> Self {
        Self::with_inner(max_iterations, Hint)
    }
}

impl<S: BusyWaitStrategy> Wakeupable<S> {
    pub fn with_inner(max_iterations: u32, inner: S) -> Self {
        Self {
            flag: WaitFlag::new(),
            max_iterations,
            inner,
        }
    }

    #[inline]
    pub fn wakeup(&self) {
        self.flag.clear();
    }

    pub fn waker(&self) -> WakeupHandle {
        WakeupHandle {
            flag: self.flag.clone(),
        }
    }

    #[inline]
    pub fn max_iterations(&self) -> u32 {
        self.max_iterations
    }
}

impl<S: BusyWaitStrategy + Clone> BusyWaitStrategy for Wakeupable<S> {
    #[inline]
    fn reset(&mut self) {}

    fn tick(&mut self) -> Result<(), BusyWaitInterrupted> {
        self.flag.wait_on(&mut self.inner, Some(self.max_iterations))
    }
}

/// Cloneable handle that wakes a [`Wakeup`] or [`Wakeupable`] strategy.
#[derive(Debug, Clone)]
pub struct WakeupHandle {
    flag: WaitFlag,
}

impl WakeupHandle {
    #[inline]
    pub fn wakeup(&self) {
        self.flag.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Side;
    use crate::wait::{Interruptible, Noop, Yield};
    use std::sync::atomic::AtomicUsize;
    use std::thread;
    use std::time::Duration;

    #[derive(Clone)]
    struct Counting(Arc<AtomicUsize>);

    impl BusyWaitStrategy for Counting {
        fn reset(&mut self) {}

        fn tick(&mut self) -> Result<(), BusyWaitInterrupted> {
            self.0.fetch_add(1, Ordering::Relaxed);
            Ok(())
        }
    }

    #[test]
    fn test_wakeup_before_tick_is_remembered() {
        let mut strategy = Wakeup::with_inner(Noop);
        strategy.wakeup();
        assert!(strategy.tick().is_ok());
    }

    #[test]
    fn test_wakeup_from_another_thread() {
        let mut strategy = Wakeup::with_inner(Yield);
        let waker = strategy.waker();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(10));
            waker.wakeup();
        });
        assert!(strategy.tick().is_ok());
        handle.join().unwrap();
        // Re-armed: a fresh wakeup is needed for the next tick.
        assert!(strategy.flag.should_wait());
    }

    #[test]
    fn test_wakeupable_is_bounded() {
        let count = Arc::new(AtomicUsize::new(0));
        let mut strategy = Wakeupable::with_inner(25, Counting(Arc::clone(&count)));
        strategy.tick().unwrap();
        assert_eq!(count.load(Ordering::Relaxed), 25);
        strategy.tick().unwrap();
        assert_eq!(count.load(Ordering::Relaxed), 50);
    }

    #[test]
    fn test_wakeupable_stops_early_on_wakeup() {
        let count = Arc::new(AtomicUsize::new(0));
        let mut strategy = Wakeupable::with_inner(1_000, Counting(Arc::clone(&count)));
        strategy.wakeup();
        strategy.tick().unwrap();
        assert_eq!(count.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_inner_interrupt_propagates() {
        let inner = Interruptible::new(Side::Writing, Noop);
        inner.interrupt();
        let mut strategy = Wakeup::with_inner(inner);
        let err = strategy.tick().unwrap_err();
        assert!(err.was_writing());
    }
}

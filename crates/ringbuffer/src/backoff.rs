use std::hint;
use std::thread;

/// Backoff for internal hand-offs between claimers.
///
/// Used where a thread waits on another thread that is guaranteed to make
/// progress without any help: an earlier claimer finishing its publish or
/// release, or a reader returning an overrun slot. These waits are short and
/// never interruptible, so they bypass the user's busy-wait strategy.
///
/// Doubles the spin count each round, then yields to the OS for good.
#[derive(Debug)]
pub(crate) struct Backoff {
    round: u32,
}

impl Backoff {
    /// Rounds spent spinning (1, 2, 4 .. 64 PAUSE hints) before yielding.
    const SPIN_ROUNDS: u32 = 7;

    #[inline]
    pub(crate) fn new() -> Self {
        Self { round: 0 }
    }

    /// Waits a little longer than last time.
    #[inline]
    pub(crate) fn snooze(&mut self) {
        if !self.is_yielding() {
            for _ in 0..1u32 << self.round {
                hint::spin_loop();
            }
            self.round += 1;
        } else {
            thread::yield_now();
        }
    }

    /// Snoozes until `done` returns true.
    #[inline]
    pub(crate) fn snooze_until(mut done: impl FnMut() -> bool) {
        let mut backoff = Self::new();
        while !done() {
            backoff.snooze();
        }
    }

    /// Back to short spins after progress was made.
    #[inline]
    pub(crate) fn reset(&mut self) {
        self.round = 0;
    }

    fn is_yielding(&self) -> bool {
        self.round >= Self::SPIN_ROUNDS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spins_then_yields() {
        let mut b = Backoff::new();
        for _ in 0..Backoff::SPIN_ROUNDS {
            assert!(!b.is_yielding());
            b.snooze();
        }
        assert!(b.is_yielding());

        b.snooze();
        assert_eq!(b.round, Backoff::SPIN_ROUNDS);

        b.reset();
        assert!(!b.is_yielding());
    }

    #[test]
    fn test_snooze_until() {
        let mut calls = 0;
        Backoff::snooze_until(|| {
            calls += 1;
            calls == 5
        });
        assert_eq!(calls, 5);
    }
}

//! Busy-wait strategies.
//!
//! A strategy is consulted whenever a ring buffer side has to wait for the
//! other side's cursor to move: a blocking writer on a full buffer, or any
//! reader on an empty one. The waiting loop is always owned by the caller:
//!
//! ```text
//! strategy.reset();
//! while !condition() {
//!     strategy.tick()?;
//! }
//! ```
//!
//! `tick()` performs exactly one unit of waiting (a spin hint, a yield, a short
//! park) and returns so the condition can be re-checked. Only the wakeup
//! decorators loop inside `tick()`.
//!
//! | strategy        | one tick                    | typical use                  |
//! |-----------------|-----------------------------|------------------------------|
//! | [`Noop`]        | nothing                     | pure-spin baselines          |
//! | [`Hint`]        | CPU spin-loop hint          | short waits (default)        |
//! | [`Yield`]       | `thread::yield_now()`       | shared cores                 |
//! | [`Park`]        | `thread::park_timeout()`    | long waits (POSIX)           |
//! | [`Sleep`]       | `thread::sleep()`           | long waits (Windows)         |
//! | [`MultiStep`]   | escalates through steps     | spin → yield → park          |
//! | [`Interruptible`] | may raise cancellation    | externally cancellable waits |
//! | [`Wakeup`]      | loops until woken           | indefinite waits             |

mod interruptible;
mod multi_step;
mod wakeup;

pub use crate::error::{BusyWaitInterrupted, Side};
pub use interruptible::{Interruptible, Interrupter};
pub use multi_step::{MultiStep, MultiStepBuilder};
pub use wakeup::{Wakeup, WakeupHandle, Wakeupable};

use std::hint;
use std::thread;
use std::time::Duration;

/// Pluggable policy for waiting until ring buffer state changes.
///
/// Instances are stateful and single-threaded: each waiting handle owns its own
/// copy (cloned from the configured prototype), so implementations need `Clone`
/// but not `Sync`. Any `Clone` implementor gets boxed cloning for free.
pub trait BusyWaitStrategy: BoxedStrategyClone + Send + 'static {
    /// Reinitializes waiting state at the start of a wait episode.
    fn reset(&mut self);

    /// Performs one unit of waiting work.
    ///
    /// Returns `Err` only from strategies that support cancellation.
    fn tick(&mut self) -> Result<(), BusyWaitInterrupted>;
}

/// Object-safe cloning for boxed strategies.
pub trait BoxedStrategyClone {
    fn box_clone(&self) -> Box<dyn BusyWaitStrategy>;
}

impl<S: BusyWaitStrategy + Clone> BoxedStrategyClone for S {
    fn box_clone(&self) -> Box<dyn BusyWaitStrategy> {
        Box::new(self.clone())
    }
}

impl Clone for Box<dyn BusyWaitStrategy> {
    fn clone(&self) -> Self {
        (**self).box_clone()
    }
}

impl std::fmt::Debug for dyn BusyWaitStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("BusyWaitStrategy")
    }
}

/// Does nothing on each tick.
#[derive(Debug, Clone, Copy, Default)]
pub struct Noop;

impl BusyWaitStrategy for Noop {
    #[inline]
    fn reset(&mut self) {}

    #[inline]
    fn tick(&mut self) -> Result<(), BusyWaitInterrupted> {
        Ok(())
    }
}

/// Issues a CPU spin-wait hint (PAUSE on x86, YIELD on ARM) without giving up the thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct Hint;

impl BusyWaitStrategy for Hint {
    #[inline]
    fn reset(&mut self) {}

    #[inline]
    fn tick(&mut self) -> Result<(), BusyWaitInterrupted> {
        hint::spin_loop();
        Ok(())
    }
}

/// Yields the processor to the OS scheduler.
#[derive(Debug, Clone, Copy, Default)]
pub struct Yield;

impl BusyWaitStrategy for Yield {
    #[inline]
    fn reset(&mut self) {}

    #[inline]
    fn tick(&mut self) -> Result<(), BusyWaitInterrupted> {
        thread::yield_now();
        Ok(())
    }
}

/// Parks the thread for a short interval.
#[derive(Debug, Clone, Copy)]
pub struct Park {
    timeout: Duration,
}

impl Park {
    pub const fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for Park {
    fn default() -> Self {
        Self::new(Duration::from_micros(1))
    }
}

impl BusyWaitStrategy for Park {
    #[inline]
    fn reset(&mut self) {}

    #[inline]
    fn tick(&mut self) -> Result<(), BusyWaitInterrupted> {
        thread::park_timeout(self.timeout);
        Ok(())
    }
}

/// Sleeps the thread for a short interval.
#[derive(Debug, Clone, Copy)]
pub struct Sleep {
    duration: Duration,
}

impl Sleep {
    pub const fn new(duration: Duration) -> Self {
        Self { duration }
    }
}

impl Default for Sleep {
    fn default() -> Self {
        Self::new(Duration::from_millis(1))
    }
}

impl BusyWaitStrategy for Sleep {
    #[inline]
    fn reset(&mut self) {}

    #[inline]
    fn tick(&mut self) -> Result<(), BusyWaitInterrupted> {
        thread::sleep(self.duration);
        Ok(())
    }
}

/// The platform's cheapest OS-level pause.
///
/// Windows has no fast unpark primitive, so it sleeps instead of parking.
#[cfg(windows)]
pub type Pause = Sleep;

/// The platform's cheapest OS-level pause.
#[cfg(not(windows))]
pub type Pause = Park;

/// Number of yields before [`escalating`] falls back to [`Pause`].
pub const ESCALATION_YIELD_TICKS: u32 = 100;

/// Default strategy for long waits: yield for a while, then pause.
pub fn escalating() -> MultiStep {
    MultiStep::from_steps(vec![
        (Box::new(Yield), ESCALATION_YIELD_TICKS),
        (Box::new(Pause::default()), 0),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leaf_strategies_never_fail() {
        let mut strategies: Vec<Box<dyn BusyWaitStrategy>> = vec![
            Box::new(Noop),
            Box::new(Hint),
            Box::new(Yield),
            Box::new(Park::new(Duration::from_nanos(1))),
            Box::new(Sleep::new(Duration::from_nanos(1))),
        ];
        for strategy in &mut strategies {
            strategy.reset();
            for _ in 0..3 {
                assert!(strategy.tick().is_ok());
            }
        }
    }

    #[test]
    fn test_boxed_clone() {
        let original: Box<dyn BusyWaitStrategy> = Box::new(Hint);
        let mut copy = original.clone();
        assert!(copy.tick().is_ok());
    }

    #[test]
    fn test_escalating_shape() {
        let strategy = escalating();
        assert_eq!(strategy.step_ticks(), vec![Some(ESCALATION_YIELD_TICKS), None]);
    }
}

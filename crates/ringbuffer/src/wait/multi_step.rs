use std::any::Any;

use super::BusyWaitStrategy;
use crate::error::{BusyWaitInterrupted, StrategyError};

#[derive(Clone)]
struct Step {
    strategy: Box<dyn BusyWaitStrategy>,
    /// Tick budget. Zero on the final step, which runs until the wait ends.
    ticks: u32,
}

/// Escalating busy-wait strategy.
///
/// Runs each intermediate step for its tick budget, then stays on the final
/// step until the wait ends. Each step is reset right before its first tick.
///
/// ```
/// use ringbuffer_rs::wait::{Hint, MultiStep, Park, Yield};
///
/// // 100 spin hints, then 100 yields, then park until done.
/// let strategy = MultiStep::end_with(Park::default())
///     .after(Yield, 100)
///     .after(Hint, 100)
///     .build()
///     .unwrap();
/// assert_eq!(strategy.step_ticks(), vec![Some(100), Some(100), None]);
/// ```
#[derive(Clone)]
pub struct MultiStep {
    // Execution order
    steps: Box<[Step]>,
    next: usize,
    counter: u32,
}

impl MultiStep {
    /// Starts a builder whose last step is `final_step`.
    ///
    /// Steps added with [`MultiStepBuilder::after`] run *before* everything
    /// added so far, so a builder chain reads from the last step backwards.
    pub fn end_with<S: BusyWaitStrategy>(final_step: S) -> MultiStepBuilder {
        MultiStepBuilder::default().push(final_step, 0)
    }

    /// Builds directly from steps in execution order. The final tick budget is ignored.
    pub(crate) fn from_steps(steps: Vec<(Box<dyn BusyWaitStrategy>, u32)>) -> Self {
        let last = steps.len().saturating_sub(1);
        let steps = steps
            .into_iter()
            .enumerate()
            .map(|(i, (strategy, ticks))| Step {
                strategy,
                ticks: if i == last { 0 } else { ticks },
            })
            .collect();
        Self {
            steps,
            next: 0,
            counter: 0,
        }
    }

    /// Tick budget of each step in execution order; `None` for the final step.
    pub fn step_ticks(&self) -> Vec<Option<u32>> {
        let last = self.steps.len().saturating_sub(1);
        self.steps
            .iter()
            .enumerate()
            .map(|(i, s)| (i != last).then_some(s.ticks))
            .collect()
    }

    /// Number of steps, including the final one.
    #[inline]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    fn into_steps(self) -> Vec<Step> {
        self.steps.into_vec()
    }
}

impl BusyWaitStrategy for MultiStep {
    fn reset(&mut self) {
        self.next = 0;
        self.counter = 0;
    }

    fn tick(&mut self) -> Result<(), BusyWaitInterrupted> {
        if self.counter == 0 && self.next < self.steps.len() {
            let step = &mut self.steps[self.next];
            step.strategy.reset();
            self.counter = step.ticks.saturating_sub(1);
            self.next += 1;
        } else if self.counter > 0 {
            self.counter -= 1;
        }
        match self.steps.get_mut(self.next.wrapping_sub(1)) {
            Some(step) => step.strategy.tick(),
            None => Ok(()),
        }
    }
}

impl std::fmt::Debug for MultiStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MultiStep")
            .field("step_ticks", &self.step_ticks())
            .field("next", &self.next)
            .field("counter", &self.counter)
            .finish()
    }
}

/// Builder for [`MultiStep`], created by [`MultiStep::end_with`].
#[derive(Default)]
pub struct MultiStepBuilder {
    // Reverse execution order: the final step first.
    pending: Vec<Step>,
}

impl MultiStepBuilder {
    /// Adds `step` to run for `ticks` ticks before all previously added steps.
    ///
    /// A nested [`MultiStep`] is flattened into its own steps; its final step
    /// gets the `ticks` budget.
    pub fn after<S: BusyWaitStrategy>(self, step: S, ticks: u32) -> Self {
        self.push(step, ticks)
    }

    fn push<S: BusyWaitStrategy>(mut self, step: S, ticks: u32) -> Self {
        let mut slot = Some(step);
        let nested = (&mut slot as &mut dyn Any)
            .downcast_mut::<Option<MultiStep>>()
            .and_then(Option::take);
        match (nested, slot) {
            (Some(multi), _) => {
                let mut steps = multi.into_steps();
                if let Some(last) = steps.last_mut() {
                    last.ticks = ticks;
                }
                self.pending.extend(steps.into_iter().rev());
            }
            (None, Some(step)) => self.pending.push(Step {
                strategy: Box::new(step),
                ticks,
            }),
            (None, None) => {}
        }
        self
    }

    /// Validates and builds the strategy.
    ///
    /// # Errors
    ///
    /// - [`StrategyError::NoIntermediateSteps`] if only a final step was given.
    /// - [`StrategyError::ZeroTicks`] if a step before the final one has no ticks.
    pub fn build(self) -> Result<MultiStep, StrategyError> {
        if self.pending.len() < 2 {
            return Err(StrategyError::NoIntermediateSteps);
        }
        let mut steps = self.pending;
        steps.reverse();
        let last = steps.len() - 1;
        if let Some(step) = steps[..last].iter().position(|s| s.ticks == 0) {
            return Err(StrategyError::ZeroTicks { step });
        }
        steps[last].ticks = 0;
        Ok(MultiStep {
            steps: steps.into_boxed_slice(),
            next: 0,
            counter: 0,
        })
    }
}

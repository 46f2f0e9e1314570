//! Fixed-timestep accumulator.
//!
//! Real elapsed time is pushed in, whole steps come out. The remainder
//! carries over to the next push, so the number of steps run depends only on
//! the total time fed in, not on how it was sliced.

use bulwark_core::constants::ACCUMULATOR_EPSILON;

#[derive(Debug, Clone)]
pub struct FixedStepClock {
    step_secs: f64,
    max_steps: u32,
    accumulator: f64,
}

impl FixedStepClock {
    pub fn new(tick_rate: u32, max_steps: u32) -> Self {
        Self {
            step_secs: 1.0 / f64::from(tick_rate.max(1)),
            max_steps: max_steps.max(1),
            accumulator: 0.0,
        }
    }

    pub fn step_secs(&self) -> f64 {
        self.step_secs
    }

    /// Time carried over that has not yet made a whole step.
    pub fn pending(&self) -> f64 {
        self.accumulator
    }

    /// Add `elapsed` seconds and return how many fixed steps are now due.
    ///
    /// At most `max_steps` are returned; if more were due, the backlog beyond
    /// the cap is dropped and only the sub-step remainder is kept.
    pub fn push(&mut self, elapsed: f64) -> u32 {
        if elapsed.is_finite() && elapsed > 0.0 {
            self.accumulator += elapsed;
        }
        let mut steps = 0;
        while self.accumulator + ACCUMULATOR_EPSILON >= self.step_secs && steps < self.max_steps {
            self.accumulator -= self.step_secs;
            steps += 1;
        }
        if steps == self.max_steps && self.accumulator + ACCUMULATOR_EPSILON >= self.step_secs {
            let dropped = self.accumulator - self.accumulator % self.step_secs;
            tracing::debug!(dropped_secs = dropped, "clock fell behind, dropping backlog");
            self.accumulator %= self.step_secs;
        }
        self.accumulator = self.accumulator.max(0.0);
        steps
    }

    /// Forget any carried-over time.
    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }
}

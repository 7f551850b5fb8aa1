/// Converts arbitrary elapsed time into a whole number of fixed sub-steps,
/// carrying the remainder into the next call.
///
/// The backlog is clamped to `max_step` seconds, so one abnormally long
/// frame cannot trigger an unbounded catch-up burst; the excess is dropped.
#[derive(Clone, Debug)]
pub struct TimeAccumulator {
    accumulated: f32,
    fixed_step: f32,
    max_step: f32,
}

impl TimeAccumulator {
    pub fn new(fixed_step: f32, max_step: f32) -> Self {
        assert!(fixed_step > 0.0);
        assert!(max_step >= fixed_step);

        TimeAccumulator {
            accumulated: 0.0,
            fixed_step,
            max_step,
        }
    }

    /// Banks `elapsed` seconds and returns how many fixed sub-steps are now
    /// due. Negative elapsed time is treated as zero.
    pub fn advance(&mut self, elapsed: f32) -> u32 {
        self.accumulated += elapsed.max(0.0);
        if self.accumulated > self.max_step {
            eprintln!(
                "capping physics catch-up from {}s to {}s",
                self.accumulated, self.max_step,
            );
            self.accumulated = self.max_step;
        }

        let num_steps = (self.accumulated / self.fixed_step) as u32;
        self.accumulated -= self.fixed_step * num_steps as f32;
        num_steps
    }

    /// The fixed size of each sub-step produced by [`advance`](Self::advance).
    pub fn time_step(&self) -> f32 {
        self.fixed_step
    }
}

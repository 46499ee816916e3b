use num_traits::clamp;

/// Smallest time step (in seconds) handed to the position controller.
pub const MIN_DT: f32 = 0.01;

/// Largest time step (in seconds) handed to the position controller.
pub const MAX_DT: f32 = 0.03;

/// Measures the time between control loop cycles.
///
/// The measured time step is clamped to [`MIN_DT`, `MAX_DT`] so that integrating controllers
/// never see an unbounded step after a scheduling hiccup or on the first cycle.
#[derive(Clone, Copy, Debug)]
pub struct LoopTimer {
    /// Time of the previous cycle in seconds (unclamped).
    last_time: f32,
}

impl LoopTimer {
    /// Create a new timer starting at `start` seconds.
    pub fn new(start: f32) -> Self {
        Self { last_time: start }
    }

    /// Record a new cycle at `now` seconds and return the clamped time step.
    pub fn tick(&mut self, now: f32) -> f32 {
        let dt = now - self.last_time;
        self.last_time = now;

        clamp(dt, MIN_DT, MAX_DT)
    }

    pub fn last_time(&self) -> f32 {
        self.last_time
    }
}

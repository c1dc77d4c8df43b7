/// Fixed-step accumulator for the physics board.
/// Converts variable frame times into a whole number of fixed steps.
#[derive(Debug, Clone)]
pub struct StepClock {
    dt: f32,
    accumulator: f32,
    max_steps: u32,
}

impl StepClock {
    pub fn new(dt: f32) -> Self {
        Self {
            dt,
            accumulator: 0.0,
            max_steps: 8,
        }
    }

    /// Cap on steps per frame after a long stall (tab switch, debugger).
    pub fn with_max_steps(mut self, max_steps: u32) -> Self {
        self.max_steps = max_steps.max(1);
        self
    }

    /// Add frame time; returns how many fixed steps to run now.
    pub fn advance(&mut self, frame_dt: f32) -> u32 {
        if !frame_dt.is_finite() || frame_dt <= 0.0 {
            return 0;
        }
        self.accumulator += frame_dt;
        let steps = (self.accumulator / self.dt) as u32;
        if steps > self.max_steps {
            // Drop the backlog instead of fast-forwarding the board.
            self.accumulator = 0.0;
            return self.max_steps;
        }
        self.accumulator -= steps as f32 * self.dt;
        steps
    }

    pub fn dt(&self) -> f32 {
        self.dt
    }
}

/// One-shot countdown, used for the AI "thinking" pause before it shoots.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Countdown {
    remaining: Option<f32>,
}

impl Countdown {
    pub fn start(&mut self, seconds: f32) {
        self.remaining = Some(seconds.max(0.0));
    }

    pub fn cancel(&mut self) {
        self.remaining = None;
    }

    pub fn is_running(&self) -> bool {
        self.remaining.is_some()
    }

    /// Advance by `dt`. Returns `true` exactly once, on the tick it expires.
    pub fn tick(&mut self, dt: f32) -> bool {
        match self.remaining {
            Some(left) if left - dt <= 0.0 => {
                self.remaining = None;
                true
            }
            Some(left) => {
                self.remaining = Some(left - dt);
                false
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_step_exact() {
        let mut clock = StepClock::new(1.0 / 60.0);
        assert_eq!(clock.advance(1.0 / 60.0), 1);
    }

    #[test]
    fn accumulates_partial_frames() {
        let mut clock = StepClock::new(1.0 / 60.0);
        assert_eq!(clock.advance(0.008), 0);
        assert_eq!(clock.advance(0.010), 1);
    }

    #[test]
    fn long_stall_is_capped() {
        let mut clock = StepClock::new(1.0 / 60.0).with_max_steps(4);
        assert_eq!(clock.advance(2.0), 4);
    }

    #[test]
    fn bad_frame_times_are_ignored() {
        let mut clock = StepClock::new(1.0 / 60.0);
        assert_eq!(clock.advance(-1.0), 0);
        assert_eq!(clock.advance(f32::NAN), 0);
    }

    #[test]
    fn countdown_fires_once() {
        let mut c = Countdown::default();
        assert!(!c.tick(1.0));
        c.start(0.5);
        assert!(c.is_running());
        assert!(!c.tick(0.3));
        assert!(c.tick(0.3));
        assert!(!c.is_running());
        assert!(!c.tick(0.3));
    }

    #[test]
    fn zero_countdown_fires_on_next_tick() {
        let mut c = Countdown::default();
        c.start(0.0);
        assert!(c.tick(0.0));
    }
}

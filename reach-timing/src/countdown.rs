use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CountdownStatus {
    Running { remaining: Duration },
    /// Reported on the tick that crosses zero, and only then.
    Expired,
    Finished,
}

/// Frame-driven countdown, advanced by `tick(delta)`.
#[derive(Debug, Clone)]
pub struct Countdown {
    duration: Duration,
    remaining: Duration,
    fired: bool,
}

impl Countdown {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            remaining: duration,
            fired: false,
        }
    }

    pub fn tick(&mut self, delta: Duration) -> CountdownStatus {
        if self.fired {
            return CountdownStatus::Finished;
        }
        self.remaining = self.remaining.saturating_sub(delta);
        if self.remaining.is_zero() {
            self.fired = true;
            CountdownStatus::Expired
        } else {
            CountdownStatus::Running {
                remaining: self.remaining,
            }
        }
    }

    pub fn remaining(&self) -> Duration {
        self.remaining
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Fraction elapsed in `[0, 1]`; a zero-length countdown counts as done.
    pub fn progress(&self) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        1.0 - self.remaining.as_secs_f32() / self.duration.as_secs_f32()
    }

    /// Whole seconds left, rounded up, for "Transition in: Ns" style text.
    pub fn display_seconds(&self) -> u64 {
        let secs = self.remaining.as_secs();
        if self.remaining.subsec_nanos() > 0 {
            secs + 1
        } else {
            secs
        }
    }

    pub fn is_finished(&self) -> bool {
        self.fired
    }

    pub fn reset(&mut self) {
        self.remaining = self.duration;
        self.fired = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expires_exactly_once() {
        let mut c = Countdown::new(Duration::from_millis(100));
        assert_eq!(
            c.tick(Duration::from_millis(60)),
            CountdownStatus::Running {
                remaining: Duration::from_millis(40)
            }
        );
        assert_eq!(c.tick(Duration::from_millis(60)), CountdownStatus::Expired);
        assert_eq!(c.tick(Duration::from_millis(60)), CountdownStatus::Finished);
        assert!(c.is_finished());
    }

    #[test]
    fn display_rounds_up() {
        let mut c = Countdown::new(Duration::from_secs(30));
        assert_eq!(c.display_seconds(), 30);
        c.tick(Duration::from_millis(100));
        assert_eq!(c.display_seconds(), 30);
        c.tick(Duration::from_millis(29_000));
        assert_eq!(c.display_seconds(), 1);
    }

    #[test]
    fn reset_rearms() {
        let mut c = Countdown::new(Duration::from_millis(10));
        c.tick(Duration::from_secs(1));
        c.reset();
        assert!(!c.is_finished());
        assert_eq!(c.progress(), 0.0);
    }

    #[test]
    fn zero_duration_expires_on_first_tick() {
        let mut c = Countdown::new(Duration::ZERO);
        assert_eq!(c.progress(), 1.0);
        assert_eq!(c.tick(Duration::ZERO), CountdownStatus::Expired);
    }
}

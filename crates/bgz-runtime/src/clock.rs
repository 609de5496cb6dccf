//! Frame clock driven by host timestamps

/// Longest frame delta the clock will report, in seconds
pub const MAX_FRAME_DELTA: f64 = 0.25;

/// Tracks frame time from timestamps handed in by the host
/// (an animation-frame callback, or a synthetic clock when headless)
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    /// Total elapsed time in seconds
    pub total_time: f64,
    /// Time since last frame in seconds
    pub delta_time: f64,
    /// Frames observed so far
    pub frame_count: u64,
    /// Timestamp of the previous frame
    last_timestamp: Option<f64>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the clock to `now` (seconds). Call once per frame.
    pub fn tick(&mut self, now: f64) {
        self.frame_count += 1;

        let Some(last) = self.last_timestamp.replace(now) else {
            self.delta_time = 0.0;
            return;
        };

        // Clamp to avoid catch-up bursts after a stalled tab (max 250ms frame time)
        self.delta_time = (now - last).clamp(0.0, MAX_FRAME_DELTA);
        self.total_time += self.delta_time;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_defaults() {
        let clock = FrameClock::new();
        assert_eq!(clock.total_time, 0.0);
        assert_eq!(clock.delta_time, 0.0);
        assert_eq!(clock.frame_count, 0);
    }

    #[test]
    fn test_first_tick_zero_delta() {
        let mut clock = FrameClock::new();
        clock.tick(12.5);
        assert_eq!(clock.delta_time, 0.0);
        assert_eq!(clock.frame_count, 1);
    }

    #[test]
    fn test_delta_accumulates() {
        let mut clock = FrameClock::new();
        clock.tick(1.0);
        clock.tick(1.1);
        clock.tick(1.2);
        assert!((clock.delta_time - 0.1).abs() < 1e-9);
        assert!((clock.total_time - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_delta_clamped() {
        let mut clock = FrameClock::new();
        clock.tick(0.0);
        clock.tick(10.0);
        assert_eq!(clock.delta_time, MAX_FRAME_DELTA);
        // Timestamps going backwards never yield a negative delta
        clock.tick(5.0);
        assert_eq!(clock.delta_time, 0.0);
    }
}

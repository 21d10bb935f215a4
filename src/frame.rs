use crate::constants::{FRAMES_PER_SECOND, TIME_OFFSET};

/// Monotonic frame counter driving the animation.
///
/// Only ever moves forward, one step per rendered frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameClock {
    frame: u64,
}

impl FrameClock {
    pub fn new(start_frame: u64) -> Self {
        FrameClock { frame: start_frame }
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Animation time parameter for the current frame.
    pub fn time(&self) -> f32 {
        frame_time(self.frame)
    }

    pub fn advance(&mut self) {
        self.frame += 1;
    }
}

pub fn frame_time(frame: u64) -> f32 {
    frame as f32 / FRAMES_PER_SECOND + TIME_OFFSET
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_offset() {
        let clock = FrameClock::new(0);
        assert_eq!(clock.frame(), 0);
        assert_eq!(clock.time(), 19.0);
    }

    #[test]
    fn one_second_per_sixty_frames() {
        let mut clock = FrameClock::new(0);
        for _ in 0..60 {
            clock.advance();
        }
        assert_eq!(clock.frame(), 60);
        assert!((clock.time() - 20.0).abs() < 1e-5);
    }

    #[test]
    fn time_increases_monotonically() {
        let mut clock = FrameClock::new(120);
        let mut last = clock.time();
        for _ in 0..10 {
            clock.advance();
            assert!(clock.time() > last);
            last = clock.time();
        }
        assert_eq!(clock.frame(), 130);
    }
}

use std::time::{Duration, Instant};

use tessel_core::profiling::profile_function;

/// How often the measured frame rate is reported.
pub const FPS_REPORT_INTERVAL: Duration = Duration::from_secs(4);

/// Frame timing information for the app lifecycle.
#[derive(Debug, Clone)]
pub struct FrameTime {
    /// Time elapsed since the last frame
    pub delta: Duration,
    /// Total time elapsed since app start
    pub elapsed: Duration,
    /// Total number of frames run
    pub frame_count: u64,
}

impl FrameTime {
    pub fn new() -> Self {
        Self {
            delta: Duration::ZERO,
            elapsed: Duration::ZERO,
            frame_count: 0,
        }
    }

    #[inline]
    pub fn delta_seconds(&self) -> f32 {
        self.delta.as_secs_f32()
    }

    #[inline]
    pub fn elapsed_seconds(&self) -> f32 {
        self.elapsed.as_secs_f32()
    }
}

impl Default for FrameTime {
    fn default() -> Self {
        Self::new()
    }
}

/// Tracks time for the app loop
pub(crate) struct TimeTracker {
    start_time: Instant,
    last_frame_time: Instant,
    frame_count: u64,
}

impl TimeTracker {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start_time: now,
            last_frame_time: now,
            frame_count: 0,
        }
    }

    pub fn tick(&mut self) -> FrameTime {
        profile_function!();
        let now = Instant::now();
        let delta = now.duration_since(self.last_frame_time);
        let elapsed = now.duration_since(self.start_time);

        self.last_frame_time = now;
        self.frame_count += 1;

        FrameTime {
            delta,
            elapsed,
            frame_count: self.frame_count,
        }
    }
}

/// Caps the frame rate by sleeping away what is left of the frame budget.
///
/// The cap is advisory: a frame that overruns its budget is never
/// compensated for by shortening the next one.
#[derive(Debug, Clone)]
pub struct FrameLimiter {
    budget: Option<Duration>,
}

impl FrameLimiter {
    /// `None` or `Some(0)` runs uncapped.
    pub fn new(target_fps: Option<u32>) -> Self {
        let budget = target_fps
            .filter(|fps| *fps > 0)
            .map(|fps| Duration::from_nanos(1_000_000_000 / fps as u64));
        Self { budget }
    }

    pub fn budget(&self) -> Option<Duration> {
        self.budget
    }

    /// Time left to wait after a frame that took `spent`.
    pub fn remaining(&self, spent: Duration) -> Option<Duration> {
        let budget = self.budget?;
        budget.checked_sub(spent).filter(|left| !left.is_zero())
    }

    /// Sleep until the budget of a frame started at `frame_start` is used up.
    pub fn wait(&self, frame_start: Instant) {
        profile_function!();
        if let Some(left) = self.remaining(frame_start.elapsed()) {
            std::thread::sleep(left);
        }
    }
}

/// Counts frames and reports the rate once per [`FPS_REPORT_INTERVAL`].
#[derive(Debug, Clone)]
pub struct FpsCounter {
    window_start: Instant,
    frames: u32,
    last_fps: f32,
}

impl FpsCounter {
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    pub fn starting_at(now: Instant) -> Self {
        Self {
            window_start: now,
            frames: 0,
            last_fps: 0.0,
        }
    }

    /// Count a frame finished at `now`. Returns the measured rate when a
    /// report interval has elapsed.
    pub fn frame(&mut self, now: Instant) -> Option<f32> {
        self.frames += 1;
        let elapsed = now.duration_since(self.window_start);
        if elapsed < FPS_REPORT_INTERVAL {
            return None;
        }

        self.last_fps = self.frames as f32 / elapsed.as_secs_f32();
        self.frames = 0;
        self.window_start = now;
        tracing::info!("fps: {:.1}", self.last_fps);
        Some(self.last_fps)
    }

    pub fn last_fps(&self) -> f32 {
        self.last_fps
    }
}

impl Default for FpsCounter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sixty_fps_budget() {
        let limiter = FrameLimiter::new(Some(60));
        let budget = limiter.budget().unwrap();
        assert!((budget.as_secs_f64() - 0.016_666).abs() < 0.000_01);
    }

    #[test]
    fn test_uncapped_limiter() {
        assert!(FrameLimiter::new(None).budget().is_none());
        assert!(FrameLimiter::new(Some(0)).budget().is_none());
        assert!(FrameLimiter::new(None).remaining(Duration::ZERO).is_none());
    }

    #[test]
    fn test_remaining_budget() {
        let limiter = FrameLimiter::new(Some(100));
        assert_eq!(
            limiter.remaining(Duration::from_millis(4)),
            Some(Duration::from_millis(6))
        );
        // overrun frames do not wait
        assert_eq!(limiter.remaining(Duration::from_millis(25)), None);
        assert_eq!(limiter.remaining(Duration::from_millis(10)), None);
    }

    #[test]
    fn test_fps_counter_reports_per_interval() {
        let start = Instant::now();
        let mut counter = FpsCounter::starting_at(start);

        for i in 1..240 {
            let at = start + Duration::from_millis(i * 16);
            assert!(counter.frame(at).is_none());
        }

        let fps = counter.frame(start + FPS_REPORT_INTERVAL).unwrap();
        assert!((fps - 60.0).abs() < 0.01);
        assert_eq!(counter.last_fps(), fps);
        // the window restarts after a report
        assert!(counter.frame(start + FPS_REPORT_INTERVAL + Duration::from_millis(16)).is_none());
    }

    #[test]
    fn test_time_tracker_counts_frames() {
        let mut tracker = TimeTracker::new();
        let first = tracker.tick();
        let second = tracker.tick();
        assert_eq!(first.frame_count, 1);
        assert_eq!(second.frame_count, 2);
        assert!(second.elapsed >= first.elapsed);
    }
}

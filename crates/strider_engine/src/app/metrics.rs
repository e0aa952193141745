use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, Default)]
pub struct LoopMetricsSnapshot {
    pub fps: f32,
    pub tps: f32,
    pub frame_time_ms: f32,
}

/// Rolling frame/tick counters over a fixed logging window.
#[derive(Debug)]
pub(crate) struct MetricsWindow {
    window_start: Instant,
    window: Duration,
    frame_count: u32,
    tick_count: u32,
    frame_time_total: Duration,
}

impl MetricsWindow {
    pub(crate) fn new(window: Duration) -> Self {
        Self {
            window_start: Instant::now(),
            window,
            frame_count: 0,
            tick_count: 0,
            frame_time_total: Duration::ZERO,
        }
    }

    pub(crate) fn on_frame(&mut self, frame_dt: Duration) {
        self.frame_count = self.frame_count.saturating_add(1);
        self.frame_time_total = self.frame_time_total.saturating_add(frame_dt);
    }

    pub(crate) fn on_ticks(&mut self, count: u32) {
        self.tick_count = self.tick_count.saturating_add(count);
    }

    /// Emits a snapshot and restarts the window once `window` has elapsed.
    pub(crate) fn rollover(&mut self, now: Instant) -> Option<LoopMetricsSnapshot> {
        let elapsed = now.saturating_duration_since(self.window_start);
        if elapsed < self.window {
            return None;
        }

        let elapsed_seconds = elapsed.as_secs_f32().max(f32::EPSILON);
        let frame_time_ms = if self.frame_count == 0 {
            0.0
        } else {
            self.frame_time_total.as_secs_f32() * 1000.0 / self.frame_count as f32
        };
        let snapshot = LoopMetricsSnapshot {
            fps: self.frame_count as f32 / elapsed_seconds,
            tps: self.tick_count as f32 / elapsed_seconds,
            frame_time_ms,
        };

        self.window_start = now;
        self.frame_count = 0;
        self.tick_count = 0;
        self.frame_time_total = Duration::ZERO;
        Some(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rollover_reports_rates_over_the_window() {
        let mut window = MetricsWindow::new(Duration::from_secs(1));
        let start = window.window_start;

        window.on_frame(Duration::from_millis(20));
        window.on_frame(Duration::from_millis(10));
        window.on_ticks(3);

        let snapshot = window
            .rollover(start + Duration::from_secs(1))
            .expect("window elapsed");
        assert!((snapshot.fps - 2.0).abs() < 0.05);
        assert!((snapshot.tps - 3.0).abs() < 0.05);
        assert!((snapshot.frame_time_ms - 15.0).abs() < 0.001);
    }

    #[test]
    fn rollover_is_silent_before_the_window_elapses() {
        let mut window = MetricsWindow::new(Duration::from_secs(1));
        let start = window.window_start;
        window.on_frame(Duration::from_millis(16));

        assert!(window.rollover(start + Duration::from_millis(400)).is_none());
    }

    #[test]
    fn counters_reset_after_rollover() {
        let mut window = MetricsWindow::new(Duration::from_secs(1));
        let start = window.window_start;
        window.on_frame(Duration::from_millis(16));
        window.on_ticks(1);
        window
            .rollover(start + Duration::from_secs(1))
            .expect("first window");

        let second = window
            .rollover(start + Duration::from_secs(2))
            .expect("second window");
        assert_eq!(second.fps, 0.0);
        assert_eq!(second.tps, 0.0);
        assert_eq!(second.frame_time_ms, 0.0);
    }
}

use serde::Serialize;
use std::time::Instant;

/// Collects capture statistics for one acquisition session.
pub struct CaptureStats {
    frame_count: u64,
    failure_count: u64,
    total_bytes: u64,
    start_time: Instant,
}

/// Snapshot of capture stats for UI delivery.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSnapshot {
    pub fps: f64,
    pub frame_count: u64,
    pub failure_count: u64,
    pub failure_rate: f64,
    pub bandwidth_bps: u64,
}

impl CaptureStats {
    /// Create new stats with zeroed counters.
    pub fn new() -> Self {
        Self {
            frame_count: 0,
            failure_count: 0,
            total_bytes: 0,
            start_time: Instant::now(),
        }
    }

    /// Record a successfully captured frame.
    pub fn record_frame(&mut self, bytes: usize) {
        self.frame_count += 1;
        self.total_bytes += bytes as u64;
    }

    /// Record a transient capture failure.
    pub fn record_failure(&mut self) {
        self.failure_count += 1;
    }

    /// Achieved capture rate since session start.
    pub fn fps(&self) -> f64 {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        if elapsed < 0.001 {
            return 0.0;
        }
        self.frame_count as f64 / elapsed
    }

    /// Failure rate as a percentage (0.0 - 100.0).
    pub fn failure_rate(&self) -> f64 {
        let total = self.frame_count + self.failure_count;
        if total == 0 {
            return 0.0;
        }
        (self.failure_count as f64 / total as f64) * 100.0
    }

    /// Raw pixel throughput in bytes per second.
    pub fn bandwidth_bps(&self) -> u64 {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        if elapsed < 0.001 {
            return 0;
        }
        (self.total_bytes as f64 / elapsed) as u64
    }

    /// Take a serialisable snapshot.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            fps: self.fps(),
            frame_count: self.frame_count,
            failure_count: self.failure_count,
            failure_rate: self.failure_rate(),
            bandwidth_bps: self.bandwidth_bps(),
        }
    }
}

impl Default for CaptureStats {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn initialises_with_zero_values() {
        let stats = CaptureStats::new();
        assert_eq!(stats.frame_count, 0);
        assert_eq!(stats.failure_count, 0);
        assert_eq!(stats.total_bytes, 0);
    }

    #[test]
    fn record_frame_increments_frame_count() {
        let mut stats = CaptureStats::new();
        stats.record_frame(1000);
        stats.record_frame(1000);
        assert_eq!(stats.frame_count, 2);
        assert_eq!(stats.total_bytes, 2000);
    }

    #[test]
    fn record_failure_increments_failure_count() {
        let mut stats = CaptureStats::new();
        stats.record_failure();
        stats.record_failure();
        assert_eq!(stats.failure_count, 2);
    }

    #[test]
    fn fps_is_positive_after_recording_frames() {
        let mut stats = CaptureStats::new();
        for _ in 0..30 {
            stats.record_frame(1000);
        }
        thread::sleep(Duration::from_millis(50));
        let fps = stats.fps();
        assert!(fps > 0.0, "fps should be positive, got {fps}");
    }

    #[test]
    fn failure_rate_returns_percentage() {
        let mut stats = CaptureStats::new();
        stats.record_frame(1000);
        stats.record_frame(1000);
        stats.record_failure();
        let rate = stats.failure_rate();
        assert!(
            (rate - 33.333).abs() < 1.0,
            "failure rate should be ~33%, got {rate}"
        );
    }

    #[test]
    fn failure_rate_zero_when_no_events() {
        let stats = CaptureStats::new();
        assert_eq!(stats.failure_rate(), 0.0);
    }

    #[test]
    fn bandwidth_bps_tracks_bytes() {
        let mut stats = CaptureStats::new();
        stats.record_frame(10_000);
        thread::sleep(Duration::from_millis(50));
        let bps = stats.bandwidth_bps();
        assert!(bps > 0, "bandwidth should be positive, got {bps}");
    }

    #[test]
    fn snapshot_produces_serialisable_data() {
        let mut stats = CaptureStats::new();
        stats.record_frame(5000);
        stats.record_failure();
        let json = serde_json::to_value(stats.snapshot()).unwrap();
        assert_eq!(json["frameCount"], 1);
        assert_eq!(json["failureCount"], 1);
        assert!(json["failureRate"].is_number());
    }
}

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::{error, info, warn};

use crate::camera::session::CameraSession;
use crate::controls::store::ParameterStore;
use crate::diagnostics::stats::{CaptureStats, StatsSnapshot};
use crate::events::{CloseReason, SessionEvent};
use crate::overlay;
use crate::preview::slot::FrameSlot;

/// Tuning for the preview loop.
#[derive(Debug, Clone)]
pub struct PreviewConfig {
    /// Upper bound on one capture wait before it counts as a transient
    /// failure.
    pub capture_timeout: Duration,
    /// Consecutive transient failures after which the session is closed.
    pub max_consecutive_failures: u32,
    /// Granularity of the shutdown check while sleeping out a tick.
    pub shutdown_poll: Duration,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            capture_timeout: Duration::from_millis(500),
            max_consecutive_failures: 30,
            shutdown_poll: Duration::from_millis(5),
        }
    }
}

/// Floor for the framerate used to derive the tick interval.
const MIN_FRAMERATE_HZ: f64 = 0.1;

/// Target inter-frame interval for a framerate.
///
/// The framerate is a soft target: the true cadence is bounded below by the
/// sensor exposure time, so this only controls how long the loop sleeps
/// between capture attempts.
fn tick_interval(framerate_hz: f64) -> Duration {
    Duration::from_secs_f64(1.0 / framerate_hz.max(MIN_FRAMERATE_HZ))
}

/// Continuously running acquisition-display cycle on a dedicated thread.
///
/// Each tick reads the current parameter snapshot, captures one frame with
/// a bounded wait, renders the annotation overlay, and publishes the result
/// into the frame slot. Transient capture errors are logged and retried on
/// the next tick; fatal errors (or a bounded run of transient ones) end the
/// loop. The session is released exactly once, on every exit path.
pub struct PreviewLoop {
    slot: Arc<FrameSlot>,
    stats: Arc<Mutex<CaptureStats>>,
    running: Arc<AtomicBool>,
    shutdown: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl PreviewLoop {
    /// Spawn the preview thread for an open session.
    pub fn start(
        session: Arc<dyn CameraSession>,
        store: Arc<ParameterStore>,
        events: Sender<SessionEvent>,
        config: PreviewConfig,
    ) -> Self {
        let slot = Arc::new(FrameSlot::new());
        let stats = Arc::new(Mutex::new(CaptureStats::new()));
        let running = Arc::new(AtomicBool::new(true));
        let shutdown = Arc::new(AtomicBool::new(false));

        let thread = {
            let slot = Arc::clone(&slot);
            let stats = Arc::clone(&stats);
            let running = Arc::clone(&running);
            let shutdown = Arc::clone(&shutdown);

            std::thread::Builder::new()
                .name("preview".to_string())
                .spawn(move || {
                    info!("preview thread starting");
                    let reason = run_loop(
                        session.as_ref(),
                        &store,
                        &slot,
                        &stats,
                        &events,
                        &shutdown,
                        &config,
                    );
                    session.close();
                    running.store(false, Ordering::Relaxed);
                    let _ = events.send(SessionEvent::SessionClosed { reason });
                    info!("preview thread exiting: {reason:?}");
                })
                .expect("failed to spawn preview thread")
        };

        Self {
            slot,
            stats,
            running,
            shutdown,
            thread: Some(thread),
        }
    }

    /// The slot this loop publishes into.
    pub fn slot(&self) -> Arc<FrameSlot> {
        Arc::clone(&self.slot)
    }

    /// Whether the loop is still producing frames.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Take a snapshot of capture stats for this session.
    pub fn diagnostics(&self) -> StatsSnapshot {
        self.stats.lock().snapshot()
    }

    /// Stop the loop and release the session. Honoured within one tick.
    /// Idempotent: calling stop twice does not panic.
    pub fn stop(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for PreviewLoop {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_loop(
    session: &dyn CameraSession,
    store: &ParameterStore,
    slot: &FrameSlot,
    stats: &Mutex<CaptureStats>,
    events: &Sender<SessionEvent>,
    shutdown: &AtomicBool,
    config: &PreviewConfig,
) -> CloseReason {
    let mut consecutive_failures: u32 = 0;

    loop {
        if shutdown.load(Ordering::Relaxed) {
            return CloseReason::Shutdown;
        }

        let tick_start = Instant::now();
        let snapshot = store.snapshot();
        let interval = tick_interval(snapshot.framerate_hz);

        match session.capture(config.capture_timeout) {
            Ok(frame) => {
                consecutive_failures = 0;
                let annotated = overlay::render(&frame, &snapshot);
                stats.lock().record_frame(frame.data.len());
                let sequence = slot.publish(annotated);
                let _ = events.send(SessionEvent::FramePublished {
                    sequence,
                    timestamp_us: frame.timestamp_us,
                });
            }
            Err(e) if !e.is_fatal() => {
                consecutive_failures += 1;
                stats.lock().record_failure();
                warn!("transient capture failure ({consecutive_failures}): {e}");
                let _ = events.send(SessionEvent::CaptureFailed {
                    consecutive: consecutive_failures,
                    message: e.to_string(),
                });
                if consecutive_failures >= config.max_consecutive_failures {
                    error!("capture failed {consecutive_failures} times in a row, closing session");
                    return CloseReason::TooManyFailures;
                }
            }
            Err(e) => {
                error!("fatal session error: {e}");
                return CloseReason::DeviceLost;
            }
        }

        if sleep_remainder(tick_start, interval, shutdown, config.shutdown_poll) {
            return CloseReason::Shutdown;
        }
    }
}

/// Sleep out the rest of the tick in short slices.
///
/// Returns true if shutdown was signalled, so stop requests never wait for
/// a full frame interval.
fn sleep_remainder(
    tick_start: Instant,
    interval: Duration,
    shutdown: &AtomicBool,
    poll: Duration,
) -> bool {
    loop {
        if shutdown.load(Ordering::Relaxed) {
            return true;
        }
        let elapsed = tick_start.elapsed();
        if elapsed >= interval {
            return false;
        }
        std::thread::sleep((interval - elapsed).min(poll));
    }
}

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::camera::error::{CameraError, Result};
use crate::camera::session::CameraSession;
use crate::camera::types::{Frame, ParameterDescriptor, ParameterId};

const SIM_WIDTH: u32 = 640;
const SIM_HEIGHT: u32 = 480;

/// Static metadata for a simulated setting.
struct ParameterDef {
    id: ParameterId,
    min: f64,
    max: f64,
    default: f64,
}

/// Ranges modelled on a small FLIR machine-vision sensor; framerate and
/// gain defaults match the acquisition utility's startup values.
const PARAMETER_DEFS: &[ParameterDef] = &[
    ParameterDef {
        id: ParameterId::Exposure,
        min: 20.0,
        max: 1_000_000.0,
        default: 10_000.0,
    },
    ParameterDef {
        id: ParameterId::Gain,
        min: 0.0,
        max: 47.99,
        default: 10.0,
    },
    ParameterDef {
        id: ParameterId::Framerate,
        min: 1.0,
        max: 120.0,
        default: 10.0,
    },
];

struct SimParameter {
    min: f64,
    max: f64,
    default: f64,
    value: f64,
}

/// A fake camera session for testing and hardware-free development.
///
/// Produces a deterministic Mono8 gradient pattern whose brightness
/// responds to the exposure and gain settings. Transient capture faults can
/// be queued with [`inject_fault`](Self::inject_fault) and a mid-session
/// device loss simulated with [`disconnect`](Self::disconnect).
pub struct SimulatedCamera {
    parameters: Mutex<HashMap<ParameterId, SimParameter>>,
    fault_queue: Mutex<VecDeque<CameraError>>,
    frame_index: AtomicU64,
    disconnected: AtomicBool,
    closed: AtomicBool,
    close_count: AtomicUsize,
    reject_writes: AtomicBool,
    opened_at: Instant,
}

impl SimulatedCamera {
    /// Open a simulated session with the default parameter ranges.
    pub fn open() -> Result<Self> {
        let defs: Vec<(ParameterId, f64, f64, f64)> = PARAMETER_DEFS
            .iter()
            .map(|d| (d.id, d.min, d.max, d.default))
            .collect();
        Self::open_with(&defs)
    }

    /// Open a simulated session with custom `(id, min, max, default)` ranges.
    pub fn open_with(defs: &[(ParameterId, f64, f64, f64)]) -> Result<Self> {
        let mut parameters = HashMap::new();
        for &(id, min, max, default) in defs {
            if min > max || default < min || default > max {
                return Err(CameraError::DeviceUnavailable(format!(
                    "invalid range for {id}: [{min}, {max}] default {default}"
                )));
            }
            parameters.insert(
                id,
                SimParameter {
                    min,
                    max,
                    default,
                    value: default,
                },
            );
        }
        Ok(Self {
            parameters: Mutex::new(parameters),
            fault_queue: Mutex::new(VecDeque::new()),
            frame_index: AtomicU64::new(0),
            disconnected: AtomicBool::new(false),
            closed: AtomicBool::new(false),
            close_count: AtomicUsize::new(0),
            reject_writes: AtomicBool::new(false),
            opened_at: Instant::now(),
        })
    }

    /// Queue an error to be returned by the next `capture` call.
    ///
    /// Faults are consumed in FIFO order before any frame is produced.
    pub fn inject_fault(&self, error: CameraError) {
        self.fault_queue.lock().push_back(error);
    }

    /// Simulate the device dropping off the bus: every subsequent call
    /// fails with `Disconnected`.
    pub fn disconnect(&self) {
        self.disconnected.store(true, Ordering::Relaxed);
    }

    /// When enabled, every `set_parameter` call fails with
    /// `HardwareRejected` without changing the device state.
    pub fn reject_parameter_writes(&self, reject: bool) {
        self.reject_writes.store(reject, Ordering::Relaxed);
    }

    /// Number of times `close` has been called.
    pub fn close_count(&self) -> usize {
        self.close_count.load(Ordering::Relaxed)
    }

    /// Total frames produced so far.
    pub fn frames_produced(&self) -> u64 {
        self.frame_index.load(Ordering::Relaxed)
    }

    fn check_open(&self) -> Result<()> {
        if self.closed.load(Ordering::Relaxed) {
            return Err(CameraError::Disconnected("session closed".to_string()));
        }
        if self.disconnected.load(Ordering::Relaxed) {
            return Err(CameraError::Disconnected(
                "simulated device lost".to_string(),
            ));
        }
        Ok(())
    }

    /// Brightness lift derived from exposure and gain, so parameter changes
    /// are visible in the test pattern.
    fn brightness_lift(exposure_us: f64, gain_db: f64) -> u8 {
        let lift = exposure_us / 1000.0 + gain_db * 2.0;
        lift.clamp(0.0, 120.0) as u8
    }
}

impl CameraSession for SimulatedCamera {
    fn describe_parameters(&self) -> Result<Vec<ParameterDescriptor>> {
        self.check_open()?;
        let parameters = self.parameters.lock();
        let mut descriptors: Vec<ParameterDescriptor> = parameters
            .iter()
            .map(|(&id, p)| ParameterDescriptor {
                id,
                min: p.min,
                max: p.max,
                default: p.default,
                current: p.value,
            })
            .collect();
        descriptors.sort_by_key(|d| d.id.as_id_str());
        Ok(descriptors)
    }

    fn set_parameter(&self, id: ParameterId, value: f64) -> Result<()> {
        self.check_open()?;
        if self.reject_writes.load(Ordering::Relaxed) {
            return Err(CameraError::HardwareRejected(format!(
                "{} node is not writable",
                id.display_name()
            )));
        }
        let mut parameters = self.parameters.lock();
        let param = parameters.get_mut(&id).ok_or_else(|| {
            CameraError::HardwareRejected(format!("device has no {id} node"))
        })?;
        // Real sensors clamp at the node level; the store has already
        // range-checked, so this only matters for direct session access.
        param.value = value.clamp(param.min, param.max);
        Ok(())
    }

    fn capture(&self, _timeout: Duration) -> Result<Frame> {
        self.check_open()?;
        if let Some(fault) = self.fault_queue.lock().pop_front() {
            return Err(fault);
        }

        let (exposure_us, gain_db) = {
            let parameters = self.parameters.lock();
            let read = |id: ParameterId| parameters.get(&id).map_or(0.0, |p| p.value);
            (read(ParameterId::Exposure), read(ParameterId::Gain))
        };
        let lift = Self::brightness_lift(exposure_us, gain_db);

        self.frame_index.fetch_add(1, Ordering::Relaxed);
        let mut data = Vec::with_capacity((SIM_WIDTH * SIM_HEIGHT) as usize);
        for y in 0..SIM_HEIGHT {
            for x in 0..SIM_WIDTH {
                let base = ((x ^ y) & 0x7F) as u8;
                data.push(base.saturating_add(lift));
            }
        }

        Ok(Frame {
            data,
            width: SIM_WIDTH,
            height: SIM_HEIGHT,
            timestamp_us: self.opened_at.elapsed().as_micros() as u64,
        })
    }

    fn close(&self) {
        self.closed.store(true, Ordering::Relaxed);
        self.close_count.fetch_add(1, Ordering::Relaxed);
    }
}

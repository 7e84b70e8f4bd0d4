use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use thiserror::Error;
use tracing::warn;

use crate::camera::error::CameraError;
use crate::camera::session::CameraSession;
use crate::camera::types::{ParameterDescriptor, ParameterId, ParameterSnapshot, ALL_PARAMETERS};

/// Parameter store errors.
#[derive(Debug, Error)]
pub enum ParameterError {
    #[error("unknown parameter: {0}")]
    UnknownParameter(String),

    #[error("{id} value {value} outside valid range [{min}, {max}]")]
    OutOfRange {
        id: ParameterId,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("hardware rejected {id}: {source}")]
    HardwareRejected {
        id: ParameterId,
        source: CameraError,
    },
}

struct Bounded {
    value: f64,
    min: f64,
    max: f64,
    default: f64,
}

/// Holds the current exposure, gain, and framerate values and their
/// device-reported ranges.
///
/// Writes are validated against `[min, max]` and rejected when out of
/// range. Accepted values are forwarded to the session immediately; if the
/// hardware refuses the write, the stored value stays at the last accepted
/// one and `HardwareRejected` is surfaced without retry.
pub struct ParameterStore {
    session: Arc<dyn CameraSession>,
    values: Mutex<HashMap<ParameterId, Bounded>>,
}

impl ParameterStore {
    /// Seed a store from the session's reported parameters.
    ///
    /// Fails with `DeviceUnavailable` if the device does not expose all of
    /// exposure, gain, and framerate, since the preview loop and overlay
    /// depend on all three being present.
    pub fn from_session(session: Arc<dyn CameraSession>) -> Result<Self, CameraError> {
        let descriptors = session.describe_parameters()?;
        let mut values = HashMap::new();
        for desc in descriptors {
            values.insert(
                desc.id,
                Bounded {
                    value: desc.current,
                    min: desc.min,
                    max: desc.max,
                    default: desc.default,
                },
            );
        }
        for id in ALL_PARAMETERS {
            if !values.contains_key(&id) {
                return Err(CameraError::DeviceUnavailable(format!(
                    "device does not expose a {id} parameter"
                )));
            }
        }
        Ok(Self {
            session,
            values: Mutex::new(values),
        })
    }

    /// Current value of a parameter.
    pub fn get(&self, id: ParameterId) -> Result<f64, ParameterError> {
        self.values
            .lock()
            .get(&id)
            .map(|b| b.value)
            .ok_or_else(|| ParameterError::UnknownParameter(id.to_string()))
    }

    /// Full descriptor for a single parameter.
    pub fn descriptor(&self, id: ParameterId) -> Option<ParameterDescriptor> {
        self.values.lock().get(&id).map(|b| ParameterDescriptor {
            id,
            min: b.min,
            max: b.max,
            default: b.default,
            current: b.value,
        })
    }

    /// Descriptors for every managed parameter, in display order.
    pub fn descriptors(&self) -> Vec<ParameterDescriptor> {
        ALL_PARAMETERS
            .iter()
            .filter_map(|&id| self.descriptor(id))
            .collect()
    }

    /// Validate and apply a parameter change.
    ///
    /// Out-of-range values are rejected before touching the hardware. The
    /// stored value only moves once the session accepts the write, so a
    /// hardware rejection leaves `get` unchanged.
    pub fn set(&self, id: ParameterId, value: f64) -> Result<(), ParameterError> {
        let (min, max) = {
            let values = self.values.lock();
            let bounded = values
                .get(&id)
                .ok_or_else(|| ParameterError::UnknownParameter(id.to_string()))?;
            (bounded.min, bounded.max)
        };

        if value < min || value > max {
            return Err(ParameterError::OutOfRange {
                id,
                value,
                min,
                max,
            });
        }

        if let Err(source) = self.session.set_parameter(id, value) {
            warn!("hardware rejected {id}={value}: {source}");
            return Err(ParameterError::HardwareRejected { id, source });
        }

        if let Some(bounded) = self.values.lock().get_mut(&id) {
            bounded.value = value;
        }
        Ok(())
    }

    /// Copy of the current values, taken once per preview tick.
    pub fn snapshot(&self) -> ParameterSnapshot {
        let values = self.values.lock();
        let read = |id: ParameterId| values.get(&id).map_or(0.0, |b| b.value);
        ParameterSnapshot {
            exposure_us: read(ParameterId::Exposure),
            gain_db: read(ParameterId::Gain),
            framerate_hz: read(ParameterId::Framerate),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::sim::SimulatedCamera;

    fn exposure_1_to_1000_store() -> (Arc<SimulatedCamera>, ParameterStore) {
        let cam = Arc::new(
            SimulatedCamera::open_with(&[
                (ParameterId::Exposure, 1.0, 1000.0, 10.0),
                (ParameterId::Gain, 0.0, 47.99, 10.0),
                (ParameterId::Framerate, 1.0, 120.0, 10.0),
            ])
            .unwrap(),
        );
        let store = ParameterStore::from_session(cam.clone() as Arc<dyn CameraSession>).unwrap();
        (cam, store)
    }

    #[test]
    fn from_session_seeds_defaults() {
        let (_cam, store) = exposure_1_to_1000_store();
        assert_eq!(store.get(ParameterId::Exposure).unwrap(), 10.0);
        assert_eq!(store.get(ParameterId::Gain).unwrap(), 10.0);
        assert_eq!(store.get(ParameterId::Framerate).unwrap(), 10.0);
    }

    #[test]
    fn from_session_requires_all_core_parameters() {
        let cam = Arc::new(
            SimulatedCamera::open_with(&[(ParameterId::Exposure, 1.0, 1000.0, 10.0)]).unwrap(),
        );
        let result = ParameterStore::from_session(cam as Arc<dyn CameraSession>);
        assert!(matches!(result, Err(CameraError::DeviceUnavailable(_))));
    }

    #[test]
    fn set_then_get_returns_value_for_in_range_writes() {
        let (_cam, store) = exposure_1_to_1000_store();
        for value in [1.0, 10.0, 500.0, 1000.0] {
            store.set(ParameterId::Exposure, value).unwrap();
            assert_eq!(store.get(ParameterId::Exposure).unwrap(), value);
        }
    }

    #[test]
    fn out_of_range_write_is_rejected_and_value_unchanged() {
        let (_cam, store) = exposure_1_to_1000_store();

        let err = store.set(ParameterId::Exposure, 5000.0).unwrap_err();
        assert!(matches!(err, ParameterError::OutOfRange { .. }));
        assert_eq!(store.get(ParameterId::Exposure).unwrap(), 10.0);

        let err = store.set(ParameterId::Exposure, 0.5).unwrap_err();
        assert!(matches!(err, ParameterError::OutOfRange { .. }));
        assert_eq!(store.get(ParameterId::Exposure).unwrap(), 10.0);
    }

    #[test]
    fn range_bounds_are_inclusive() {
        let (_cam, store) = exposure_1_to_1000_store();
        assert!(store.set(ParameterId::Exposure, 1.0).is_ok());
        assert!(store.set(ParameterId::Exposure, 1000.0).is_ok());
    }

    #[test]
    fn accepted_write_is_forwarded_to_the_session() {
        let (cam, store) = exposure_1_to_1000_store();
        store.set(ParameterId::Gain, 20.0).unwrap();

        let descriptors = cam.describe_parameters().unwrap();
        let gain = descriptors.iter().find(|d| d.id == ParameterId::Gain).unwrap();
        assert_eq!(gain.current, 20.0);
    }

    #[test]
    fn hardware_rejection_rolls_back_to_last_accepted_value() {
        let (cam, store) = exposure_1_to_1000_store();
        store.set(ParameterId::Gain, 15.0).unwrap();

        cam.reject_parameter_writes(true);
        let err = store.set(ParameterId::Gain, 30.0).unwrap_err();
        assert!(matches!(err, ParameterError::HardwareRejected { .. }));
        assert_eq!(store.get(ParameterId::Gain).unwrap(), 15.0);
    }

    #[test]
    fn rejected_write_is_not_retried() {
        let (cam, store) = exposure_1_to_1000_store();
        cam.reject_parameter_writes(true);
        assert!(store.set(ParameterId::Gain, 30.0).is_err());

        // One failed write must not leave the store poisoned: re-enabling
        // the hardware makes the next explicit call succeed.
        cam.reject_parameter_writes(false);
        store.set(ParameterId::Gain, 30.0).unwrap();
        assert_eq!(store.get(ParameterId::Gain).unwrap(), 30.0);
    }

    #[test]
    fn snapshot_reflects_current_values() {
        let (_cam, store) = exposure_1_to_1000_store();
        store.set(ParameterId::Exposure, 250.0).unwrap();
        store.set(ParameterId::Framerate, 30.0).unwrap();

        let snap = store.snapshot();
        assert_eq!(snap.exposure_us, 250.0);
        assert_eq!(snap.gain_db, 10.0);
        assert_eq!(snap.framerate_hz, 30.0);
    }

    #[test]
    fn descriptors_come_back_in_display_order() {
        let (_cam, store) = exposure_1_to_1000_store();
        let descriptors = store.descriptors();
        let ids: Vec<ParameterId> = descriptors.iter().map(|d| d.id).collect();
        assert_eq!(ids, ALL_PARAMETERS.to_vec());
    }

    #[test]
    fn error_messages_are_human_readable() {
        let (_cam, store) = exposure_1_to_1000_store();
        let err = store.set(ParameterId::Exposure, 5000.0).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("5000"), "message should name the value: {msg}");
        assert!(msg.contains("1000"), "message should name the range: {msg}");
    }

    #[test]
    fn store_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ParameterStore>();
    }
}

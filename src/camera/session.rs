use std::time::Duration;

use crate::camera::error::Result;
use crate::camera::types::{Frame, ParameterDescriptor, ParameterId};

/// Vendor-agnostic camera session trait.
///
/// Wraps one open device handle. Methods take `&self` with interior
/// mutability so a session can be shared between the preview loop (capture)
/// and the parameter store (control writes) behind an `Arc`.
pub trait CameraSession: Send + Sync {
    /// Report every parameter the device exposes, including its valid range
    /// and current value. Called once at session start to seed the store.
    fn describe_parameters(&self) -> Result<Vec<ParameterDescriptor>>;

    /// Write a single parameter to the device.
    ///
    /// The value has already been range-checked by the parameter store;
    /// the device may still refuse it (`HardwareRejected`).
    fn set_parameter(&self, id: ParameterId, value: f64) -> Result<()>;

    /// Capture one frame, waiting at most `timeout`.
    ///
    /// Must never block indefinitely: an expired wait is reported as
    /// `CaptureTimeout`, which the preview loop treats as transient.
    fn capture(&self, timeout: Duration) -> Result<Frame>;

    /// Release the device. Further calls on the session fail with
    /// `Disconnected`.
    fn close(&self);
}

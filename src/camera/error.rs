use std::time::Duration;

use thiserror::Error;

/// Camera session errors.
#[derive(Debug, Clone, Error)]
pub enum CameraError {
    #[error("device unavailable: {0}")]
    DeviceUnavailable(String),

    #[error("device disconnected: {0}")]
    Disconnected(String),

    #[error("capture timed out after {0:?}")]
    CaptureTimeout(Duration),

    #[error("sensor delivered an incomplete frame")]
    IncompleteFrame,

    #[error("parameter rejected by hardware: {0}")]
    HardwareRejected(String),
}

impl CameraError {
    /// Whether this error ends the session.
    ///
    /// Transient capture errors are retried on the next preview tick;
    /// fatal errors terminate the preview loop and release the device.
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::DeviceUnavailable(_) | Self::Disconnected(_) => true,
            Self::CaptureTimeout(_) | Self::IncompleteFrame | Self::HardwareRejected(_) => false,
        }
    }
}

/// Convenience Result alias.
pub type Result<T> = std::result::Result<T, CameraError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disconnect_and_unavailable_are_fatal() {
        assert!(CameraError::Disconnected("usb gone".to_string()).is_fatal());
        assert!(CameraError::DeviceUnavailable("no camera detected".to_string()).is_fatal());
    }

    #[test]
    fn capture_errors_are_transient() {
        assert!(!CameraError::CaptureTimeout(Duration::from_millis(500)).is_fatal());
        assert!(!CameraError::IncompleteFrame.is_fatal());
    }

    #[test]
    fn hardware_rejection_is_not_fatal() {
        assert!(!CameraError::HardwareRejected("exposure not writable".to_string()).is_fatal());
    }

    #[test]
    fn messages_are_human_readable() {
        let err = CameraError::CaptureTimeout(Duration::from_millis(500));
        assert!(err.to_string().contains("timed out"));

        let err = CameraError::Disconnected("serial 1234".to_string());
        assert!(err.to_string().contains("serial 1234"));
    }
}

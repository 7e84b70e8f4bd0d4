use serde::Serialize;

use crate::camera::types::ParameterId;

/// Why the preview loop released the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CloseReason {
    /// Orderly shutdown requested through the controller.
    Shutdown,
    /// Fatal session error, e.g. the device disconnected.
    DeviceLost,
    /// Transient capture failures recurred beyond the configured bound.
    TooManyFailures,
}

/// Discrete messages emitted by the acquisition core for the UI shell.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// A new annotated frame is available in the slot.
    #[serde(rename_all = "camelCase")]
    FramePublished { sequence: u64, timestamp_us: u64 },

    /// A transient capture failure; the loop retries on the next tick.
    #[serde(rename_all = "camelCase")]
    CaptureFailed { consecutive: u32, message: String },

    /// A parameter write was accepted by store and hardware.
    #[serde(rename_all = "camelCase")]
    ParameterChanged { id: ParameterId, value: f64 },

    /// The preview loop has exited and the session is released.
    #[serde(rename_all = "camelCase")]
    SessionClosed { reason: CloseReason },
}

/// Discrete messages the UI shell sends into the acquisition core.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlCommand {
    /// Slider or spinner moved: apply a new parameter value.
    SetParameter { id: ParameterId, value: f64 },
    /// Copy the current annotated frame to the clipboard.
    ExportFrame,
    /// Close the session and stop the preview loop.
    Shutdown,
}

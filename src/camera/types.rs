use serde::{Deserialize, Serialize};

/// Identifies a bounded numeric camera setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterId {
    /// Sensor exposure time in microseconds.
    Exposure,
    /// Analog gain in decibels.
    Gain,
    /// Acquisition framerate in hertz.
    Framerate,
}

/// Every parameter the acquisition core manages, in display order.
pub const ALL_PARAMETERS: [ParameterId; 3] = [
    ParameterId::Exposure,
    ParameterId::Gain,
    ParameterId::Framerate,
];

impl ParameterId {
    /// Human-readable display name.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Exposure => "Exposure",
            Self::Gain => "Gain",
            Self::Framerate => "Framerate",
        }
    }

    /// Unit suffix for captions and UI labels.
    pub fn unit(self) -> &'static str {
        match self {
            Self::Exposure => "us",
            Self::Gain => "dB",
            Self::Framerate => "Hz",
        }
    }

    /// Snake-case string identifier for event payloads.
    pub fn as_id_str(self) -> &'static str {
        match self {
            Self::Exposure => "exposure",
            Self::Gain => "gain",
            Self::Framerate => "framerate",
        }
    }

    /// Parse a snake_case string into a `ParameterId`.
    ///
    /// Returns `None` if the string does not match any known parameter.
    pub fn from_str_id(s: &str) -> Option<Self> {
        match s {
            "exposure" => Some(Self::Exposure),
            "gain" => Some(Self::Gain),
            "framerate" => Some(Self::Framerate),
            _ => None,
        }
    }
}

impl std::fmt::Display for ParameterId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_id_str())
    }
}

/// Full metadata for a single camera parameter, as reported by the device.
///
/// Invariant: `min <= current <= max` and `min <= default <= max`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterDescriptor {
    pub id: ParameterId,
    pub min: f64,
    pub max: f64,
    pub default: f64,
    pub current: f64,
}

impl ParameterDescriptor {
    /// Whether `value` lies inside the device-reported range.
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// A copy of the current parameter values, taken once per preview tick.
///
/// The preview loop derives its tick interval from `framerate_hz` and the
/// annotation renderer draws the other values into the overlay caption.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterSnapshot {
    pub exposure_us: f64,
    pub gain_db: f64,
    pub framerate_hz: f64,
}

/// A single captured frame from the camera.
///
/// Pixel data is Mono8, row-major, one byte per pixel. Frames are immutable
/// once captured; the next capture supersedes rather than mutates them.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Raw pixel data (Mono8).
    pub data: Vec<u8>,
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Capture timestamp in microseconds since session start.
    pub timestamp_us: u64,
}

impl Frame {
    /// Pixel value at `(x, y)`, or `None` when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<u8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data.get((y * self.width + x) as usize).copied()
    }
}

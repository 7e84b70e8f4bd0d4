// Annotation rendering: parameter/timestamp overlay on captured frames.

pub mod font;

use image::{Rgba, RgbaImage};

use crate::camera::types::{Frame, ParameterSnapshot};

/// Upper bound on the overlay band height. The caption must never obscure
/// more than this margin along the top edge of the frame.
pub const OVERLAY_MARGIN_PX: u32 = 24;

const TEXT_SCALE: u32 = 2;
const TEXT_PADDING: u32 = 4;
const TEXT_COLOR: Rgba<u8> = Rgba([255, 255, 255, 255]);
/// Band pixels keep 3/8 of the underlying brightness.
const BAND_DIM_NUM: u16 = 3;
const BAND_DIM_DEN: u16 = 8;

/// A frame with the rendered overlay, ready for display or export.
///
/// Derived from exactly one [`Frame`]; never persisted beyond the current
/// display cycle except through an explicit clipboard export.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotatedFrame {
    /// RGBA pixels, fully opaque.
    pub image: RgbaImage,
    /// Capture timestamp of the source frame, microseconds.
    pub timestamp_us: u64,
}

impl AnnotatedFrame {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

/// Caption text for the overlay band.
///
/// Pure function of the snapshot and timestamp, so rendering stays
/// deterministic.
pub fn format_caption(params: &ParameterSnapshot, timestamp_us: u64) -> String {
    format!(
        "EXP {:.2} MS  GAIN {:.1} DB  {:.1} HZ  T+{:.3} S",
        params.exposure_us / 1000.0,
        params.gain_db,
        params.framerate_hz,
        timestamp_us as f64 / 1_000_000.0,
    )
}

/// Render the annotation overlay onto a captured frame.
///
/// Pure: identical `(frame, params)` inputs produce byte-identical output.
/// The Mono8 source is expanded to opaque RGBA, the top band (at most
/// [`OVERLAY_MARGIN_PX`] rows) is dimmed, and the caption is drawn inside
/// it. The source frame is not modified.
pub fn render(frame: &Frame, params: &ParameterSnapshot) -> AnnotatedFrame {
    let mut image = RgbaImage::new(frame.width, frame.height);
    for (y, row) in frame.data.chunks_exact(frame.width as usize).enumerate() {
        for (x, &v) in row.iter().enumerate() {
            image.put_pixel(x as u32, y as u32, Rgba([v, v, v, 255]));
        }
    }

    let band_height = OVERLAY_MARGIN_PX.min(frame.height);
    for y in 0..band_height {
        for x in 0..frame.width {
            let Rgba([r, g, b, a]) = *image.get_pixel(x, y);
            let dim = |v: u8| (u16::from(v) * BAND_DIM_NUM / BAND_DIM_DEN) as u8;
            image.put_pixel(x, y, Rgba([dim(r), dim(g), dim(b), a]));
        }
    }

    let caption = format_caption(params, frame.timestamp_us);
    let text_y = band_height.saturating_sub(font::text_height(TEXT_SCALE)) / 2;
    font::draw_text(
        &mut image,
        TEXT_PADDING,
        text_y,
        &caption,
        TEXT_COLOR,
        TEXT_SCALE,
    );

    AnnotatedFrame {
        image,
        timestamp_us: frame.timestamp_us,
    }
}

// Export: copy the current annotated frame to the system clipboard.

use std::borrow::Cow;

use thiserror::Error;
use tracing::info;

use crate::preview::slot::FrameSlot;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("no frame has been captured yet")]
    NoFrameAvailable,

    #[error("clipboard error: {0}")]
    Clipboard(String),
}

/// Destination for exported frames.
///
/// Abstracting the clipboard keeps the export path testable without a
/// windowing system.
pub trait ClipboardSink: Send {
    /// Place an RGBA image on the clipboard, replacing prior contents.
    fn set_image(&mut self, width: u32, height: u32, rgba: &[u8]) -> Result<(), ExportError>;
}

/// Sink backed by the OS clipboard.
pub struct SystemClipboard {
    clipboard: arboard::Clipboard,
}

impl SystemClipboard {
    /// Connect to the system clipboard.
    pub fn new() -> Result<Self, ExportError> {
        let clipboard = arboard::Clipboard::new().map_err(|e| ExportError::Clipboard(e.to_string()))?;
        Ok(Self { clipboard })
    }
}

impl ClipboardSink for SystemClipboard {
    fn set_image(&mut self, width: u32, height: u32, rgba: &[u8]) -> Result<(), ExportError> {
        let image = arboard::ImageData {
            width: width as usize,
            height: height as usize,
            bytes: Cow::Borrowed(rgba),
        };
        self.clipboard
            .set_image(image)
            .map_err(|e| ExportError::Clipboard(e.to_string()))
    }
}

/// Copy the frame currently in the slot to the sink.
///
/// Exports exactly what the preview shows, annotations included. Returns
/// the sequence number of the exported frame.
pub fn export_current(
    slot: &FrameSlot,
    sink: &mut dyn ClipboardSink,
) -> Result<u64, ExportError> {
    let frame = slot.latest().ok_or(ExportError::NoFrameAvailable)?;
    let sequence = slot.sequence();

    sink.set_image(frame.width(), frame.height(), frame.image.as_raw())?;
    info!(
        sequence,
        width = frame.width(),
        height = frame.height(),
        "copied frame to clipboard"
    );
    Ok(sequence)
}

/// In-memory sink for exercising the export path in tests.
#[cfg(test)]
pub struct MemoryClipboard {
    pub images: Vec<(u32, u32, Vec<u8>)>,
    pub fail_next: bool,
}

#[cfg(test)]
impl MemoryClipboard {
    pub fn new() -> Self {
        Self {
            images: Vec::new(),
            fail_next: false,
        }
    }
}

#[cfg(test)]
impl Default for MemoryClipboard {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
impl ClipboardSink for MemoryClipboard {
    fn set_image(&mut self, width: u32, height: u32, rgba: &[u8]) -> Result<(), ExportError> {
        if self.fail_next {
            self.fail_next = false;
            return Err(ExportError::Clipboard("clipboard is busy".to_string()));
        }
        self.images.push((width, height, rgba.to_vec()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlay::AnnotatedFrame;
    use image::RgbaImage;

    fn publish_solid(slot: &FrameSlot, value: u8) {
        slot.publish(AnnotatedFrame {
            image: RgbaImage::from_pixel(4, 2, image::Rgba([value, value, value, 255])),
            timestamp_us: 0,
        });
    }

    #[test]
    fn export_before_first_frame_reports_no_frame() {
        let slot = FrameSlot::new();
        let mut sink = MemoryClipboard::new();
        let err = export_current(&slot, &mut sink).unwrap_err();
        assert!(matches!(err, ExportError::NoFrameAvailable));
        assert!(sink.images.is_empty());
    }

    #[test]
    fn export_sends_current_frame_pixels() {
        let slot = FrameSlot::new();
        publish_solid(&slot, 9);

        let mut sink = MemoryClipboard::new();
        let sequence = export_current(&slot, &mut sink).unwrap();
        assert_eq!(sequence, 1);

        let (width, height, rgba) = &sink.images[0];
        assert_eq!((*width, *height), (4, 2));
        assert_eq!(rgba.len(), 4 * 2 * 4);
        assert_eq!(&rgba[0..4], &[9, 9, 9, 255]);
    }

    #[test]
    fn export_picks_up_the_latest_frame() {
        let slot = FrameSlot::new();
        publish_solid(&slot, 1);
        publish_solid(&slot, 2);

        let mut sink = MemoryClipboard::new();
        let sequence = export_current(&slot, &mut sink).unwrap();
        assert_eq!(sequence, 2);
        assert_eq!(sink.images[0].2[0], 2);
    }

    #[test]
    fn clipboard_failure_surfaces_as_error() {
        let slot = FrameSlot::new();
        publish_solid(&slot, 1);

        let mut sink = MemoryClipboard::new();
        sink.fail_next = true;
        let err = export_current(&slot, &mut sink).unwrap_err();
        assert!(matches!(err, ExportError::Clipboard(_)));

        // The frame is still there for a retry.
        assert!(export_current(&slot, &mut sink).is_ok());
    }
}

//! Live machine-vision camera preview.
//!
//! One open session feeds a free-running capture loop. Each captured frame
//! is annotated with the active exposure, gain, framerate, and capture
//! timestamp, then published for display. The current annotated frame can
//! be copied to the system clipboard on demand. Exposure, gain, and
//! framerate are adjustable while the stream runs, with range validation
//! against device-reported limits.

pub mod camera;
pub mod controls;
pub mod diagnostics;
pub mod events;
pub mod export;
pub mod overlay;
pub mod preview;

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use crate::camera::error::CameraError;
use crate::camera::session::CameraSession;
use crate::camera::types::ParameterDescriptor;
use crate::controls::store::{ParameterError, ParameterStore};
use crate::diagnostics::stats::StatsSnapshot;
use crate::events::{ControlCommand, SessionEvent};
use crate::export::{ClipboardSink, ExportError};
use crate::overlay::AnnotatedFrame;
use crate::preview::capture::{PreviewConfig, PreviewLoop};
use crate::preview::slot::FrameSlot;

/// Failures while applying a control command.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Parameter(#[from] ParameterError),

    #[error(transparent)]
    Export(#[from] ExportError),
}

/// A running acquisition session: parameter store, preview loop, and
/// clipboard export wired together behind a command interface.
///
/// Commands come in through [`Acquisition::handle`]; state changes flow
/// back out on the [`SessionEvent`] channel returned by `start`.
pub struct Acquisition {
    store: Arc<ParameterStore>,
    preview: PreviewLoop,
    slot: Arc<FrameSlot>,
    sink: Box<dyn ClipboardSink>,
    events: Sender<SessionEvent>,
}

impl Acquisition {
    /// Build the store from the session's reported parameters and spawn
    /// the preview loop.
    pub fn start(
        session: Arc<dyn CameraSession>,
        sink: Box<dyn ClipboardSink>,
        config: PreviewConfig,
    ) -> Result<(Self, Receiver<SessionEvent>), CameraError> {
        let store = Arc::new(ParameterStore::from_session(Arc::clone(&session))?);
        let (tx, rx) = mpsc::channel();
        let preview = PreviewLoop::start(session, Arc::clone(&store), tx.clone(), config);
        let slot = preview.slot();
        info!("acquisition session started");

        Ok((
            Self {
                store,
                preview,
                slot,
                sink,
                events: tx,
            },
            rx,
        ))
    }

    /// Apply one control command.
    ///
    /// Failures leave the stream running: a rejected parameter write or a
    /// clipboard error is reported to the caller and nothing else changes.
    pub fn handle(&mut self, command: ControlCommand) -> Result<(), CommandError> {
        match command {
            ControlCommand::SetParameter { id, value } => {
                self.store.set(id, value)?;
                let _ = self
                    .events
                    .send(SessionEvent::ParameterChanged { id, value });
                Ok(())
            }
            ControlCommand::ExportFrame => {
                export::export_current(&self.slot, self.sink.as_mut())?;
                Ok(())
            }
            ControlCommand::Shutdown => {
                self.preview.stop();
                Ok(())
            }
        }
    }

    /// Descriptors for the adjustable parameters, in display order.
    pub fn parameters(&self) -> Vec<ParameterDescriptor> {
        self.store.descriptors()
    }

    /// The most recent annotated frame, if one has been published.
    pub fn latest_frame(&self) -> Option<Arc<AnnotatedFrame>> {
        self.slot.latest()
    }

    /// Capture statistics for this session.
    pub fn diagnostics(&self) -> StatsSnapshot {
        self.preview.diagnostics()
    }

    /// Whether the preview loop is still producing frames.
    pub fn is_running(&self) -> bool {
        self.preview.is_running()
    }
}

//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is the fan-out hub for [`EditorEvent`]s. The rendering
//! backend's push results and the session controller's UI notifications both
//! travel through it; view code subscribes and applies events
//! opportunistically. It is designed to be shared via `Arc<EventBus>`.

use serde::Serialize;
use tokio::sync::broadcast;
use uuid::Uuid;

use darkroom_core::types::Revision;

// ---------------------------------------------------------------------------
// EditorEvent
// ---------------------------------------------------------------------------

/// An event consumed by the UI layer.
///
/// The first four variants mirror the backend's push channel one-to-one;
/// their [`channel_name`](EditorEvent::channel_name)s are the wire strings
/// the UI bridge listens on. The remaining variants are produced by the
/// session controller itself.
#[derive(Debug, Clone, Serialize)]
pub enum EditorEvent {
    /// A finished preview frame for the currently processing image.
    PreviewUpdateFinal {
        bytes: Vec<u8>,
        /// True for low-latency interactive frames, false for
        /// authoritative-quality ones.
        interactive: bool,
    },

    /// A preview of the full uncropped frame (crop tool backdrop).
    PreviewUpdateUncropped { bytes: Vec<u8> },

    /// Fresh histogram data for the current preview.
    HistogramUpdate(serde_json::Value),

    /// Fresh waveform data for the current preview.
    WaveformUpdate(serde_json::Value),

    /// Result of an explicit fullscreen preview request.
    FullscreenPreviewReady { bytes: Vec<u8> },

    /// Result of a zoom-triggered full-resolution render.
    FullResolutionReady {
        bytes: Vec<u8>,
        cache_key: String,
        /// True when the render was served from the cache without
        /// re-invoking the backend.
        cached: bool,
    },

    /// Result of an original (pre-adjustment) transformed preview request.
    OriginalPreviewReady { bytes: Vec<u8> },

    /// A rendered mask overlay for one mask container.
    MaskOverlayReady {
        container_id: Uuid,
        bytes: Option<Vec<u8>>,
    },

    /// The live document changed (edit, undo, redo, image switch). Carries
    /// the new revision so views can cheaply skip stale refreshes.
    DocumentChanged { revision: Revision },

    /// A non-fatal, dismissable failure notice. Never blocks editing.
    TransientError {
        /// Short machine-readable context, e.g. `"render"`, `"metadata"`.
        context: &'static str,
        message: String,
    },
}

impl EditorEvent {
    /// The wire channel name the UI bridge listens on for this event.
    pub fn channel_name(&self) -> &'static str {
        match self {
            Self::PreviewUpdateFinal { .. } => "preview-update-final",
            Self::PreviewUpdateUncropped { .. } => "preview-update-uncropped",
            Self::HistogramUpdate(_) => "histogram-update",
            Self::WaveformUpdate(_) => "waveform-update",
            Self::FullscreenPreviewReady { .. } => "fullscreen-preview-ready",
            Self::FullResolutionReady { .. } => "full-resolution-ready",
            Self::OriginalPreviewReady { .. } => "original-preview-ready",
            Self::MaskOverlayReady { .. } => "mask-overlay-ready",
            Self::DocumentChanged { .. } => "document-changed",
            Self::TransientError { .. } => "transient-error",
        }
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 256;

/// In-process fan-out event bus.
///
/// Wraps a [`broadcast::Sender`] so that any number of subscribers can
/// independently receive every published [`EditorEvent`].
pub struct EventBus {
    sender: broadcast::Sender<EditorEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full, the oldest un-consumed events are dropped and
    /// slow receivers observe a `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// If there are no active subscribers the event is silently dropped.
    pub fn publish(&self, event: EditorEvent) {
        // Ignore the SendError -- it only means there are zero receivers.
        let _ = self.sender.send(event);
    }

    /// Subscribe to all events published on this bus.
    pub fn subscribe(&self) -> broadcast::Receiver<EditorEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

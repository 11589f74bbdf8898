//! The edit session controller.
//!
//! [`EditSession`] is the single coordinating object that owns all
//! image-scoped editing state: the live [`AdjustmentDocument`], the
//! [`EditHistory`], the [`SentPayloadTracker`], the coalescing timers, and
//! the [`RenderSequencer`]. UI code calls its methods; rendered results and
//! failure notices come back through the [`EventBus`].
//!
//! Locking discipline: the session state sits behind one `std::sync::Mutex`
//! that is never held across an await point. Every backend call runs in its
//! own task and re-checks liveness (is this still the selected image? is
//! this ticket still current?) before touching shared state. Timer jobs hold
//! only a `Weak` session handle, so a job firing after teardown is a no-op.

use std::sync::{Arc, Mutex, Weak};

use uuid::Uuid;

use darkroom_core::adjustments::{AdjustmentDocument, DocumentPatch};
use darkroom_core::hashing::visual_fingerprint;
use darkroom_core::history::EditHistory;
use darkroom_core::masks::SubMaskKind;
use darkroom_core::metadata::ImageMetadata;
use darkroom_core::types::Revision;
use darkroom_engine::backend::{AiMaskRequest, RenderBackend, RenderRegion};
use darkroom_engine::elision::{encode_for_wire, PayloadKey, SentPayloadTracker};
use darkroom_engine::error::EngineError;
use darkroom_events::bus::{EditorEvent, EventBus};

use crate::config::SessionConfig;
use crate::sequencer::{RenderKind, RenderSequencer};
use crate::timer::{DelayedTask, Throttle};

/// Errors returned to the caller of a session operation.
///
/// Backend failures are additionally surfaced on the bus as
/// [`EditorEvent::TransientError`]; they never corrupt the timers, the
/// history, or the sequencer.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("No image selected")]
    NoImageSelected,

    #[error("Unknown entity: {0}")]
    UnknownEntity(Uuid),

    #[error("Sub-mask kind {0:?} is not AI-generated")]
    UnsupportedMaskKind(SubMaskKind),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// One cached full-resolution render.
struct FullResCache {
    key: String,
    bytes: Vec<u8>,
}

/// Image-scoped mutable state. Cleared/replaced on every image switch.
struct SessionState {
    image_path: Option<String>,
    live: AdjustmentDocument,
    history: EditHistory,
    tracker: SentPayloadTracker,
    dragging: bool,
    full_res_cache: Option<FullResCache>,
}

/// The coordinating object for one editing surface.
///
/// Create with [`EditSession::new`] and share via `Arc`; all methods take
/// `&self` and are safe to call from the UI event loop -- none of them blocks
/// on the backend.
pub struct EditSession {
    /// Self-handle for timer jobs and spawned tasks.
    weak: Weak<EditSession>,
    backend: Arc<dyn RenderBackend>,
    bus: Arc<EventBus>,
    config: SessionConfig,
    state: Mutex<SessionState>,
    sequencer: RenderSequencer,
    history_snapshot: DelayedTask,
    authoritative_render: DelayedTask,
    settle_render: DelayedTask,
    interactive_render: Throttle,
}

impl EditSession {
    pub fn new(
        backend: Arc<dyn RenderBackend>,
        bus: Arc<EventBus>,
        config: SessionConfig,
    ) -> Arc<Self> {
        let interactive_render = Throttle::new(config.interactive_throttle);
        Arc::new_cyclic(|weak| Self {
            weak: weak.clone(),
            backend,
            bus,
            config,
            state: Mutex::new(SessionState {
                image_path: None,
                live: AdjustmentDocument::default(),
                history: EditHistory::default(),
                tracker: SentPayloadTracker::new(),
                dragging: false,
                full_res_cache: None,
            }),
            sequencer: RenderSequencer::new(),
            history_snapshot: DelayedTask::new(),
            authoritative_render: DelayedTask::new(),
            settle_render: DelayedTask::new(),
            interactive_render,
        })
    }

    // -----------------------------------------------------------------------
    // Image lifecycle
    // -----------------------------------------------------------------------

    /// Switch the session to another image.
    ///
    /// This is a barrier: every pending timer and in-flight ticket from the
    /// previous image is invalidated before anything is issued for the new
    /// one, the sent-payload tracker and full-resolution cache are cleared,
    /// and history restarts at the loaded (or default) document.
    pub async fn select_image(&self, path: impl Into<String>) -> Result<(), SessionError> {
        let path = path.into();
        self.cancel_pending_work();
        {
            let mut state = self.state.lock().unwrap();
            state.image_path = Some(path.clone());
            state.tracker.clear();
            state.full_res_cache = None;
            state.dragging = false;
        }

        let metadata = match self.backend.load_metadata(&path).await {
            Ok(metadata) => metadata,
            Err(e) => {
                tracing::warn!(path = %path, error = %e, "Metadata load failed; starting from defaults");
                self.notify_error("metadata", &e);
                ImageMetadata::default()
            }
        };

        let mut doc = AdjustmentDocument::normalize(&metadata.adjustments);
        doc.rating = metadata.rating.min(5);

        let revision = {
            let mut state = self.state.lock().unwrap();
            // A newer selection may have superseded this one while the
            // metadata loaded.
            if state.image_path.as_deref() != Some(path.as_str()) {
                tracing::debug!(path = %path, "Stale image selection discarded");
                return Ok(());
            }
            let revision = Self::install_document(&mut state, doc);
            let snapshot = state.live.clone();
            state.history.reset(snapshot);
            revision
        };

        self.bus.publish(EditorEvent::DocumentChanged { revision });
        self.dispatch_render(RenderKind::Authoritative, false).await;
        Ok(())
    }

    /// Reset all edits for the current image to the canonical defaults.
    ///
    /// The star rating is metadata, not an edit -- it survives the reset.
    /// History is deliberately discarded: reset starts a fresh session.
    pub fn reset_adjustments(&self) {
        self.cancel_pending_work();
        let revision = {
            let mut state = self.state.lock().unwrap();
            if state.image_path.is_none() {
                return;
            }
            let mut doc = AdjustmentDocument::default();
            doc.rating = state.live.rating;
            let revision = Self::install_document(&mut state, doc);
            let snapshot = state.live.clone();
            state.history.reset(snapshot);
            state.full_res_cache = None;
            revision
        };
        self.bus.publish(EditorEvent::DocumentChanged { revision });
        self.spawn_render(RenderKind::Authoritative, false);
    }

    // -----------------------------------------------------------------------
    // Editing
    // -----------------------------------------------------------------------

    /// Apply one live edit.
    ///
    /// Schedules the debounced history snapshot, the debounced authoritative
    /// render, and -- while dragging with live previews enabled -- the
    /// throttled interactive render. Each has a single pending slot: a burst
    /// of edits reschedules, never stacks.
    pub fn edit(&self, patch: DocumentPatch) {
        let (revision, dragging) = {
            let mut state = self.state.lock().unwrap();
            if state.image_path.is_none() {
                tracing::debug!("Edit ignored: no image selected");
                return;
            }
            state.live = state.live.with_patch(patch);
            (state.live.revision, state.dragging)
        };
        self.bus.publish(EditorEvent::DocumentChanged { revision });

        let weak = self.weak.clone();
        self.history_snapshot
            .schedule(self.config.history_debounce, async move {
                if let Some(this) = weak.upgrade() {
                    this.push_history_snapshot();
                }
            });

        if dragging && self.config.live_previews_enabled {
            let weak = self.weak.clone();
            self.interactive_render.call(async move {
                if let Some(this) = weak.upgrade() {
                    this.dispatch_render(RenderKind::Interactive, true).await;
                }
            });
        }

        self.sequencer.mark_pending(RenderKind::Authoritative);
        let weak = self.weak.clone();
        self.authoritative_render
            .schedule(self.config.render_debounce, async move {
                if let Some(this) = weak.upgrade() {
                    this.dispatch_render(RenderKind::Authoritative, false).await;
                }
            });
    }

    /// Flag the start/end of an interactive drag.
    ///
    /// On the true->false transition, one more authoritative render is
    /// scheduled after the idle-settle delay so the final state is reflected
    /// even if the user stops mid-drag. The delay is shorter when live
    /// previews are enabled, since the interactive stream already supplied a
    /// preview.
    pub fn set_dragging(&self, dragging: bool) {
        let was_dragging = {
            let mut state = self.state.lock().unwrap();
            std::mem::replace(&mut state.dragging, dragging)
        };

        if was_dragging && !dragging {
            self.sequencer.mark_pending(RenderKind::Authoritative);
            let weak = self.weak.clone();
            self.settle_render
                .schedule(self.config.settle_delay(), async move {
                    if let Some(this) = weak.upgrade() {
                        this.dispatch_render(RenderKind::Authoritative, false).await;
                    }
                });
        }
    }

    /// Set the star rating, clamped to `0..=5`.
    pub fn set_rating(&self, rating: u8) {
        if darkroom_core::adjustments::validate_rating(rating).is_err() {
            tracing::debug!(rating, "Rating clamped to 5");
        }
        self.edit(DocumentPatch::rating(rating.min(5)));
    }

    /// Apply a preset's partial document through the normal edit path.
    pub fn apply_preset(&self, patch: DocumentPatch) {
        self.edit(patch);
    }

    /// Ask the backend for auto-adjustments and apply them as one edit.
    pub async fn apply_auto_adjustments(&self) -> Result<(), SessionError> {
        self.require_image()?;
        match self.backend.calculate_auto_adjustments().await {
            Ok(patch) => {
                self.edit(patch);
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "Auto-adjustment calculation failed");
                self.notify_error("auto-adjust", &e);
                Err(e.into())
            }
        }
    }

    // -----------------------------------------------------------------------
    // History navigation
    // -----------------------------------------------------------------------

    /// Step back one history entry. Returns false (silently) at the start.
    ///
    /// Any pending snapshot or render timer is cancelled first -- a snapshot
    /// scheduled before the undo must never land after it.
    pub fn undo(&self) -> bool {
        self.navigate_history(|history| history.undo().cloned())
    }

    /// Step forward one history entry. Returns false (silently) at the tail.
    pub fn redo(&self) -> bool {
        self.navigate_history(|history| history.redo().cloned())
    }

    /// Jump to an arbitrary history entry. Out-of-range is a silent no-op.
    pub fn go_to_history(&self, index: usize) -> bool {
        self.navigate_history(move |history| history.go_to(index).cloned())
    }

    fn navigate_history(
        &self,
        navigate: impl FnOnce(&mut EditHistory) -> Option<AdjustmentDocument>,
    ) -> bool {
        self.cancel_pending_work();
        let revision = {
            let mut state = self.state.lock().unwrap();
            let Some(doc) = navigate(&mut state.history) else {
                return false;
            };
            Self::install_document(&mut state, doc)
        };
        self.bus.publish(EditorEvent::DocumentChanged { revision });
        self.spawn_render(RenderKind::Authoritative, false);
        true
    }

    // -----------------------------------------------------------------------
    // Preview requests
    // -----------------------------------------------------------------------

    /// Request an explicit fullscreen preview. Result arrives on the bus.
    pub fn request_fullscreen_preview(&self) {
        let Some(wire) = self.wire_document() else {
            return;
        };
        let ticket = self.sequencer.begin(RenderKind::Fullscreen);
        let weak = self.weak.clone();
        tokio::spawn(async move {
            let Some(this) = weak.upgrade() else {
                return;
            };
            match this.backend.generate_fullscreen_preview(&wire).await {
                Ok(bytes) => {
                    if this.sequencer.complete(&ticket) {
                        this.bus.publish(EditorEvent::FullscreenPreviewReady { bytes });
                    }
                }
                Err(e) => {
                    if this.sequencer.complete(&ticket) {
                        tracing::warn!(error = %e, "Fullscreen preview failed");
                        this.notify_error("fullscreen", &e);
                    }
                }
            }
        });
    }

    /// Request a zoom-triggered full-resolution render.
    ///
    /// Served from the cache -- without re-invoking the backend -- when no
    /// pixel-affecting adjustment changed since the last full-resolution
    /// render of this image.
    pub fn request_full_resolution(&self) {
        enum Plan {
            Hit(String, Vec<u8>),
            Miss(String, AdjustmentDocument),
        }

        let plan = {
            let mut state = self.state.lock().unwrap();
            let Some(path) = state.image_path.clone() else {
                return;
            };
            let key = visual_fingerprint(&path, &state.live);
            match state.full_res_cache.as_ref() {
                Some(cache) if cache.key == key => Plan::Hit(key, cache.bytes.clone()),
                _ => {
                    let state = &mut *state;
                    Plan::Miss(key, encode_for_wire(&state.live, &mut state.tracker))
                }
            }
        };

        match plan {
            Plan::Hit(cache_key, bytes) => {
                tracing::debug!(cache_key = %cache_key, "Full-resolution cache hit");
                self.bus.publish(EditorEvent::FullResolutionReady {
                    bytes,
                    cache_key,
                    cached: true,
                });
            }
            Plan::Miss(cache_key, wire) => {
                let ticket = self.sequencer.begin(RenderKind::FullResolution);
                let weak = self.weak.clone();
                tokio::spawn(async move {
                    let Some(this) = weak.upgrade() else {
                        return;
                    };
                    match this.backend.generate_fullscreen_preview(&wire).await {
                        Ok(bytes) => {
                            if this.sequencer.complete(&ticket) {
                                {
                                    let mut state = this.state.lock().unwrap();
                                    state.full_res_cache = Some(FullResCache {
                                        key: cache_key.clone(),
                                        bytes: bytes.clone(),
                                    });
                                }
                                this.bus.publish(EditorEvent::FullResolutionReady {
                                    bytes,
                                    cache_key,
                                    cached: false,
                                });
                            }
                        }
                        Err(e) => {
                            if this.sequencer.complete(&ticket) {
                                tracing::warn!(error = %e, "Full-resolution render failed");
                                this.notify_error("full-resolution", &e);
                            }
                        }
                    }
                });
            }
        }
    }

    /// Request the uncropped backdrop preview (crop tool). Result arrives on
    /// the backend's push channel.
    pub fn request_uncropped_preview(&self) {
        let Some(wire) = self.wire_document() else {
            return;
        };
        let weak = self.weak.clone();
        tokio::spawn(async move {
            let Some(this) = weak.upgrade() else {
                return;
            };
            if let Err(e) = this.backend.generate_uncropped_preview(&wire).await {
                tracing::warn!(error = %e, "Uncropped preview failed");
                this.notify_error("uncropped", &e);
            }
        });
    }

    /// Request the original (pre-adjustment) image with geometry applied --
    /// the before/after toggle.
    pub fn request_original_preview(&self) {
        let Some(wire) = self.wire_document() else {
            return;
        };
        let weak = self.weak.clone();
        tokio::spawn(async move {
            let Some(this) = weak.upgrade() else {
                return;
            };
            match this.backend.generate_original_transformed_preview(&wire).await {
                Ok(bytes) => this.bus.publish(EditorEvent::OriginalPreviewReady { bytes }),
                Err(e) => {
                    tracing::warn!(error = %e, "Original preview failed");
                    this.notify_error("original-preview", &e);
                }
            }
        });
    }

    /// Rasterize one mask container's overlay for on-canvas display.
    pub fn request_mask_overlay(&self, container_id: Uuid, region: RenderRegion) {
        let container = {
            let state = self.state.lock().unwrap();
            state
                .live
                .masks
                .iter()
                .find(|container| container.id == container_id)
                .cloned()
        };
        let Some(container) = container else {
            tracing::debug!(container_id = %container_id, "Mask overlay for unknown container");
            return;
        };

        let weak = self.weak.clone();
        tokio::spawn(async move {
            let Some(this) = weak.upgrade() else {
                return;
            };
            match this.backend.generate_mask_overlay(&container, region).await {
                Ok(bytes) => this.bus.publish(EditorEvent::MaskOverlayReady {
                    container_id,
                    bytes,
                }),
                Err(e) => {
                    tracing::warn!(container_id = %container_id, error = %e, "Mask overlay failed");
                    this.notify_error("mask-overlay", &e);
                }
            }
        });
    }

    // -----------------------------------------------------------------------
    // AI operations
    // -----------------------------------------------------------------------

    /// Generate (or regenerate) an AI sub-mask's bitmap.
    ///
    /// On success the sub-mask's parameters are replaced and its payload key
    /// invalidated so the fresh bitmap is retransmitted on the next render.
    pub async fn generate_ai_mask(
        &self,
        container_id: Uuid,
        sub_mask_id: Uuid,
        request: AiMaskRequest,
    ) -> Result<(), SessionError> {
        self.require_image()?;
        let kind = {
            let state = self.state.lock().unwrap();
            state
                .live
                .masks
                .iter()
                .find(|container| container.id == container_id)
                .and_then(|container| {
                    container.sub_masks.iter().find(|sub| sub.id == sub_mask_id)
                })
                .map(|sub| sub.kind)
        };
        let kind = kind.ok_or(SessionError::UnknownEntity(sub_mask_id))?;

        let result = match kind {
            SubMaskKind::AiSubject => self.backend.generate_ai_subject_mask(&request).await,
            SubMaskKind::AiForeground => self.backend.generate_ai_foreground_mask(&request).await,
            SubMaskKind::AiSky => self.backend.generate_ai_sky_mask(&request).await,
            other => return Err(SessionError::UnsupportedMaskKind(other)),
        };

        let parameters = match result {
            Ok(parameters) => parameters,
            Err(e) => {
                tracing::warn!(sub_mask_id = %sub_mask_id, error = %e, "AI mask generation failed");
                self.notify_error("ai-mask", &e);
                return Err(e.into());
            }
        };

        let masks = {
            let mut state = self.state.lock().unwrap();
            let mut masks = state.live.masks.clone();
            let mut found = false;
            for container in &mut masks {
                if container.id != container_id {
                    continue;
                }
                for sub in &mut container.sub_masks {
                    if sub.id == sub_mask_id {
                        sub.parameters = parameters.clone();
                        found = true;
                    }
                }
            }
            if !found {
                // The mask was deleted (or the image switched) while the
                // generation ran; drop the result.
                tracing::debug!(sub_mask_id = %sub_mask_id, "AI mask result discarded");
                return Ok(());
            }
            state.tracker.invalidate(PayloadKey::Mask(sub_mask_id));
            masks
        };
        self.edit(DocumentPatch::masks(masks));
        Ok(())
    }

    /// Run generative inpainting for one AI patch.
    ///
    /// The patch's `isLoading` flag is set for the duration of the call (a
    /// loading patch is never elided from the wire). On success the result is
    /// stored and the patch's payload key invalidated for retransmission.
    pub async fn generative_replace(
        &self,
        patch_id: Uuid,
        use_fast_inpaint: bool,
    ) -> Result<(), SessionError> {
        let (path, doc_for_call, patch_snapshot, loading_patches) = {
            let mut state = self.state.lock().unwrap();
            let path = state
                .image_path
                .clone()
                .ok_or(SessionError::NoImageSelected)?;
            let mut patches = state.live.ai_patches.clone();
            let Some(patch) = patches.iter_mut().find(|patch| patch.id == patch_id) else {
                return Err(SessionError::UnknownEntity(patch_id));
            };
            patch.is_loading = true;
            let snapshot = patch.clone();
            let state = &mut *state;
            let wire = encode_for_wire(&state.live, &mut state.tracker);
            (path, wire, snapshot, patches)
        };
        self.edit(DocumentPatch::ai_patches(loading_patches));

        let result = self
            .backend
            .invoke_generative_replace(&doc_for_call, &patch_snapshot, &path, use_fast_inpaint)
            .await;

        let patches = {
            let mut state = self.state.lock().unwrap();
            if state.image_path.as_deref() != Some(path.as_str()) {
                tracing::debug!(patch_id = %patch_id, "Generative replace result discarded (image switched)");
                return Ok(());
            }
            let mut patches = state.live.ai_patches.clone();
            let Some(patch) = patches.iter_mut().find(|patch| patch.id == patch_id) else {
                tracing::debug!(patch_id = %patch_id, "Generative replace result discarded (patch deleted)");
                return Ok(());
            };
            patch.is_loading = false;
            if let Ok(data) = &result {
                patch.patch_data = Some(data.clone());
                state.tracker.invalidate(PayloadKey::Patch(patch_id));
            }
            patches
        };
        self.edit(DocumentPatch::ai_patches(patches));

        match result {
            Ok(_) => Ok(()),
            Err(e) => {
                tracing::warn!(patch_id = %patch_id, error = %e, "Generative replace failed");
                self.notify_error("generative-replace", &e);
                Err(e.into())
            }
        }
    }

    // -----------------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------------

    /// Persist the live document and refresh the library thumbnail.
    ///
    /// The full document is sent -- persistence must never elide payloads.
    pub async fn save_metadata(&self) -> Result<(), SessionError> {
        let (path, doc) = {
            let state = self.state.lock().unwrap();
            let path = state
                .image_path
                .clone()
                .ok_or(SessionError::NoImageSelected)?;
            (path, state.live.clone())
        };
        match self
            .backend
            .save_metadata_and_update_thumbnail(&path, &doc)
            .await
        {
            Ok(()) => Ok(()),
            Err(e) => {
                tracing::warn!(path = %path, error = %e, "Metadata save failed");
                self.notify_error("metadata", &e);
                Err(e.into())
            }
        }
    }

    /// Reset persisted adjustments for a batch of images. If the currently
    /// selected image is in the batch, its live session resets too.
    pub async fn reset_for_paths(&self, paths: &[String]) -> Result<(), SessionError> {
        if let Err(e) = self.backend.reset_adjustments_for_paths(paths).await {
            tracing::warn!(count = paths.len(), error = %e, "Batch reset failed");
            self.notify_error("reset", &e);
            return Err(e.into());
        }
        let selected = {
            let state = self.state.lock().unwrap();
            state.image_path.clone()
        };
        if let Some(selected) = selected {
            if paths.iter().any(|path| path == &selected) {
                self.reset_adjustments();
            }
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// A copy of the live document.
    pub fn document(&self) -> AdjustmentDocument {
        self.state.lock().unwrap().live.clone()
    }

    pub fn selected_image(&self) -> Option<String> {
        self.state.lock().unwrap().image_path.clone()
    }

    pub fn can_undo(&self) -> bool {
        self.state.lock().unwrap().history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.state.lock().unwrap().history.can_redo()
    }

    pub fn history_len(&self) -> usize {
        self.state.lock().unwrap().history.len()
    }

    pub fn history_index(&self) -> usize {
        self.state.lock().unwrap().history.index()
    }

    pub fn is_dragging(&self) -> bool {
        self.state.lock().unwrap().dragging
    }

    /// Cancel every pending timer and in-flight ticket. Used on teardown and
    /// as the first step of every barrier.
    pub fn shutdown(&self) {
        self.cancel_pending_work();
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    /// Install `doc` as the live document with a session-monotonic revision,
    /// so views comparing revisions never see time move backwards across
    /// undo/redo.
    fn install_document(state: &mut SessionState, mut doc: AdjustmentDocument) -> Revision {
        doc.revision = state.live.revision.max(doc.revision) + 1;
        let revision = doc.revision;
        state.live = doc;
        revision
    }

    fn require_image(&self) -> Result<(), SessionError> {
        if self.state.lock().unwrap().image_path.is_some() {
            Ok(())
        } else {
            Err(SessionError::NoImageSelected)
        }
    }

    fn cancel_pending_work(&self) {
        self.history_snapshot.cancel();
        self.authoritative_render.cancel();
        self.settle_render.cancel();
        self.interactive_render.cancel();
        self.sequencer.cancel_all();
    }

    fn push_history_snapshot(&self) {
        let revision = {
            let mut state = self.state.lock().unwrap();
            if state.image_path.is_none() {
                return;
            }
            let snapshot = state.live.clone();
            state.history.push(snapshot);
            state.live.revision
        };
        tracing::debug!(revision, "History snapshot");
    }

    /// Encode the live document for transmission, eliding already-sent
    /// payloads.
    fn wire_document(&self) -> Option<AdjustmentDocument> {
        let mut state = self.state.lock().unwrap();
        state.image_path.as_ref()?;
        let state = &mut *state;
        Some(encode_for_wire(&state.live, &mut state.tracker))
    }

    fn spawn_render(&self, kind: RenderKind, interactive: bool) {
        let weak = self.weak.clone();
        tokio::spawn(async move {
            if let Some(this) = weak.upgrade() {
                this.dispatch_render(kind, interactive).await;
            }
        });
    }

    /// Submit the live document for preview rendering.
    ///
    /// Fire-and-forget: the rendered frame, histogram, and waveform arrive
    /// on the backend's push channel. The ticket still guards against a
    /// dispatch racing an image switch.
    async fn dispatch_render(&self, kind: RenderKind, interactive: bool) {
        let Some(wire) = self.wire_document() else {
            return;
        };
        let ticket = self.sequencer.begin(kind);
        match self.backend.apply_adjustments(&wire, interactive).await {
            Ok(()) => {
                let _ = self.sequencer.complete(&ticket);
            }
            Err(e) => {
                if self.sequencer.complete(&ticket) {
                    tracing::warn!(kind = kind.as_str(), error = %e, "Render dispatch failed");
                    self.notify_error("render", &e);
                }
            }
        }
    }

    fn notify_error(&self, context: &'static str, error: &EngineError) {
        self.bus.publish(EditorEvent::TransientError {
            context,
            message: error.to_string(),
        });
    }
}

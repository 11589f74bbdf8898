//! The abstract RPC contract to the native rendering backend.
//!
//! The backend is a separate process reached only through asynchronous
//! request/response plus a push-style event channel; the UI thread never
//! blocks on it. [`RenderBackend`] captures exactly that surface. Preview
//! results for [`apply_adjustments`](RenderBackend::apply_adjustments) and
//! [`generate_uncropped_preview`](RenderBackend::generate_uncropped_preview)
//! arrive via the event channel, keyed implicitly to the currently
//! processing image; the other calls return their result directly.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use darkroom_core::adjustments::{AdjustmentDocument, DocumentPatch};
use darkroom_core::masks::{MaskContainer, SubMaskParameters};
use darkroom_core::metadata::ImageMetadata;
use darkroom_core::patches::{AiPatch, PatchData};

use crate::error::EngineError;

/// The pixel region a mask overlay should be rendered for.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RenderRegion {
    pub width: u32,
    pub height: u32,
    /// Preview-to-full-resolution scale factor.
    pub scale: f64,
}

/// Geometry context for an AI mask generation call.
///
/// AI segmentation runs on the geometry-warped image, so the request carries
/// the transform subset the backend needs to place the selection box.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiMaskRequest {
    pub image_path: String,
    pub start_point: (f64, f64),
    pub end_point: (f64, f64),
    pub rotation: f64,
    pub flip_horizontal: bool,
    pub flip_vertical: bool,
    pub orientation_steps: u8,
}

/// Asynchronous interface to the native rendering process.
///
/// Every method corresponds to one backend command. Implementations must be
/// cancellation-safe: the session may drop a call's future (or ignore its
/// result) when a newer request supersedes it.
#[async_trait]
pub trait RenderBackend: Send + Sync {
    /// Submit an adjustment document for preview rendering.
    ///
    /// Fire-and-forget: the rendered frame, histogram, and waveform arrive
    /// on the push event channel. `interactive` requests the low-latency,
    /// reduced-quality path used while dragging.
    async fn apply_adjustments(
        &self,
        doc: &AdjustmentDocument,
        interactive: bool,
    ) -> Result<(), EngineError>;

    /// Render a high-quality fullscreen/zoom preview and return its bytes.
    async fn generate_fullscreen_preview(
        &self,
        doc: &AdjustmentDocument,
    ) -> Result<Vec<u8>, EngineError>;

    /// Render the uncropped frame used as the crop tool's backdrop.
    /// Result arrives via the push event channel.
    async fn generate_uncropped_preview(&self, doc: &AdjustmentDocument)
        -> Result<(), EngineError>;

    /// Render the original (pre-adjustment) image with geometry applied.
    async fn generate_original_transformed_preview(
        &self,
        doc: &AdjustmentDocument,
    ) -> Result<Vec<u8>, EngineError>;

    /// Rasterize a mask container's overlay for on-canvas display.
    ///
    /// Returns `None` when the container has no renderable sub-masks.
    async fn generate_mask_overlay(
        &self,
        mask: &MaskContainer,
        region: RenderRegion,
    ) -> Result<Option<Vec<u8>>, EngineError>;

    /// Run AI subject segmentation for the given selection box.
    async fn generate_ai_subject_mask(
        &self,
        request: &AiMaskRequest,
    ) -> Result<SubMaskParameters, EngineError>;

    /// Run AI foreground extraction.
    async fn generate_ai_foreground_mask(
        &self,
        request: &AiMaskRequest,
    ) -> Result<SubMaskParameters, EngineError>;

    /// Run AI sky segmentation.
    async fn generate_ai_sky_mask(
        &self,
        request: &AiMaskRequest,
    ) -> Result<SubMaskParameters, EngineError>;

    /// Run generative inpainting for one patch region.
    async fn invoke_generative_replace(
        &self,
        doc: &AdjustmentDocument,
        patch: &AiPatch,
        image_path: &str,
        use_fast_inpaint: bool,
    ) -> Result<PatchData, EngineError>;

    /// Load the persisted sidecar metadata for an image.
    async fn load_metadata(&self, path: &str) -> Result<ImageMetadata, EngineError>;

    /// Persist the document and refresh the library thumbnail.
    async fn save_metadata_and_update_thumbnail(
        &self,
        path: &str,
        doc: &AdjustmentDocument,
    ) -> Result<(), EngineError>;

    /// Reset persisted adjustments for a batch of images.
    async fn reset_adjustments_for_paths(&self, paths: &[String]) -> Result<(), EngineError>;

    /// Compute auto-adjustments for the currently loaded image.
    async fn calculate_auto_adjustments(&self) -> Result<DocumentPatch, EngineError>;
}

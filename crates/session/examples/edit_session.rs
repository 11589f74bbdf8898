//! Drives an edit session against a stub backend and prints the resulting
//! event stream.
//!
//! ```sh
//! cargo run -p darkroom-session --example edit_session
//! ```

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use darkroom_core::adjustments::{AdjustmentDocument, DocumentPatch};
use darkroom_core::masks::{MaskContainer, SubMaskParameters};
use darkroom_core::metadata::ImageMetadata;
use darkroom_core::patches::{AiPatch, PatchData};
use darkroom_engine::backend::{AiMaskRequest, RenderBackend, RenderRegion};
use darkroom_engine::error::EngineError;
use darkroom_events::bus::EventBus;
use darkroom_session::{EditSession, SessionConfig};

/// A backend that renders nothing but behaves like the real one timing-wise.
struct StubBackend;

#[async_trait]
impl RenderBackend for StubBackend {
    async fn apply_adjustments(
        &self,
        doc: &AdjustmentDocument,
        interactive: bool,
    ) -> Result<(), EngineError> {
        tracing::info!(
            interactive,
            exposure = doc.exposure,
            patches = doc.ai_patches.len(),
            "apply_adjustments",
        );
        Ok(())
    }

    async fn generate_fullscreen_preview(
        &self,
        _doc: &AdjustmentDocument,
    ) -> Result<Vec<u8>, EngineError> {
        tokio::time::sleep(Duration::from_millis(40)).await;
        Ok(b"jpeg".to_vec())
    }

    async fn generate_uncropped_preview(
        &self,
        _doc: &AdjustmentDocument,
    ) -> Result<(), EngineError> {
        Ok(())
    }

    async fn generate_original_transformed_preview(
        &self,
        _doc: &AdjustmentDocument,
    ) -> Result<Vec<u8>, EngineError> {
        Ok(b"jpeg".to_vec())
    }

    async fn generate_mask_overlay(
        &self,
        _mask: &MaskContainer,
        _region: RenderRegion,
    ) -> Result<Option<Vec<u8>>, EngineError> {
        Ok(None)
    }

    async fn generate_ai_subject_mask(
        &self,
        _request: &AiMaskRequest,
    ) -> Result<SubMaskParameters, EngineError> {
        tokio::time::sleep(Duration::from_millis(80)).await;
        Ok(SubMaskParameters {
            mask_data_base64: Some("c3R1Yg==".into()),
            extra: Default::default(),
        })
    }

    async fn generate_ai_foreground_mask(
        &self,
        request: &AiMaskRequest,
    ) -> Result<SubMaskParameters, EngineError> {
        self.generate_ai_subject_mask(request).await
    }

    async fn generate_ai_sky_mask(
        &self,
        request: &AiMaskRequest,
    ) -> Result<SubMaskParameters, EngineError> {
        self.generate_ai_subject_mask(request).await
    }

    async fn invoke_generative_replace(
        &self,
        _doc: &AdjustmentDocument,
        _patch: &AiPatch,
        _image_path: &str,
        _use_fast_inpaint: bool,
    ) -> Result<PatchData, EngineError> {
        tokio::time::sleep(Duration::from_millis(120)).await;
        Ok(PatchData {
            color: "c3R1Yg==".into(),
            mask: "c3R1Yg==".into(),
        })
    }

    async fn load_metadata(&self, _path: &str) -> Result<ImageMetadata, EngineError> {
        Ok(ImageMetadata::default())
    }

    async fn save_metadata_and_update_thumbnail(
        &self,
        path: &str,
        _doc: &AdjustmentDocument,
    ) -> Result<(), EngineError> {
        tracing::info!(path, "metadata saved");
        Ok(())
    }

    async fn reset_adjustments_for_paths(&self, _paths: &[String]) -> Result<(), EngineError> {
        Ok(())
    }

    async fn calculate_auto_adjustments(&self) -> Result<DocumentPatch, EngineError> {
        Ok(DocumentPatch {
            exposure: Some(0.35),
            ..Default::default()
        })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "edit_session=info,darkroom_session=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let bus = Arc::new(EventBus::default());
    let mut rx = bus.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = rx.recv().await {
            tracing::info!(channel = event.channel_name(), "event");
        }
    });

    let session = EditSession::new(Arc::new(StubBackend), bus, SessionConfig::from_env());
    session.select_image("demo.raw").await?;

    // A short slider drag.
    session.set_dragging(true);
    for step in 1..=10 {
        session.edit(DocumentPatch {
            exposure: Some(step as f64 / 10.0),
            ..Default::default()
        });
        tokio::time::sleep(Duration::from_millis(30)).await;
    }
    session.set_dragging(false);
    tokio::time::sleep(Duration::from_millis(500)).await;

    tracing::info!(
        history = session.history_len(),
        can_undo = session.can_undo(),
        "after drag",
    );

    session.undo();
    session.redo();
    session.request_fullscreen_preview();
    tokio::time::sleep(Duration::from_millis(200)).await;

    session.save_metadata().await?;
    session.shutdown();
    Ok(())
}

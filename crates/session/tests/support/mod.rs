//! Scripted in-process render backend for session tests.
#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use darkroom_core::adjustments::{AdjustmentDocument, DocumentPatch};
use darkroom_core::masks::{MaskContainer, SubMaskParameters};
use darkroom_core::metadata::ImageMetadata;
use darkroom_core::patches::{AiPatch, PatchData};
use darkroom_engine::backend::{AiMaskRequest, RenderBackend, RenderRegion};
use darkroom_engine::error::EngineError;
use darkroom_events::bus::EventBus;
use darkroom_session::{EditSession, SessionConfig};

/// Everything the mock records about one backend invocation.
#[derive(Debug, Clone)]
pub enum BackendCall {
    ApplyAdjustments {
        doc: AdjustmentDocument,
        interactive: bool,
    },
    FullscreenPreview {
        doc: AdjustmentDocument,
    },
    UncroppedPreview,
    OriginalPreview,
    MaskOverlay,
    AiMask {
        path: String,
    },
    GenerativeReplace {
        patch_id: uuid::Uuid,
    },
    LoadMetadata {
        path: String,
    },
    SaveMetadata {
        path: String,
    },
    ResetPaths {
        paths: Vec<String>,
    },
    AutoAdjustments,
}

#[derive(Default)]
pub struct MockBackend {
    pub calls: Mutex<Vec<BackendCall>>,
    /// Per-path canned metadata; anything else gets the default.
    pub metadata: Mutex<HashMap<String, ImageMetadata>>,
    /// Per-call artificial latency for fullscreen renders, popped in order.
    pub fullscreen_delays: Mutex<VecDeque<Duration>>,
    /// When set, `apply_adjustments` rejects.
    pub fail_apply: AtomicBool,
    /// When set, `load_metadata` rejects.
    pub fail_metadata: AtomicBool,
}

impl MockBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn recorded(&self) -> Vec<BackendCall> {
        self.calls.lock().unwrap().clone()
    }

    /// All `apply_adjustments` calls, in dispatch order.
    pub fn apply_calls(&self) -> Vec<(AdjustmentDocument, bool)> {
        self.recorded()
            .into_iter()
            .filter_map(|call| match call {
                BackendCall::ApplyAdjustments { doc, interactive } => Some((doc, interactive)),
                _ => None,
            })
            .collect()
    }

    pub fn interactive_render_count(&self) -> usize {
        self.apply_calls()
            .iter()
            .filter(|(_, interactive)| *interactive)
            .count()
    }

    pub fn authoritative_render_count(&self) -> usize {
        self.apply_calls()
            .iter()
            .filter(|(_, interactive)| !*interactive)
            .count()
    }

    fn record(&self, call: BackendCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl RenderBackend for MockBackend {
    async fn apply_adjustments(
        &self,
        doc: &AdjustmentDocument,
        interactive: bool,
    ) -> Result<(), EngineError> {
        self.record(BackendCall::ApplyAdjustments {
            doc: doc.clone(),
            interactive,
        });
        if self.fail_apply.load(Ordering::SeqCst) {
            return Err(EngineError::Backend("render worker unavailable".into()));
        }
        Ok(())
    }

    async fn generate_fullscreen_preview(
        &self,
        doc: &AdjustmentDocument,
    ) -> Result<Vec<u8>, EngineError> {
        self.record(BackendCall::FullscreenPreview { doc: doc.clone() });
        let delay = self.fullscreen_delays.lock().unwrap().pop_front();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        Ok(format!("fullscreen exposure={:.2}", doc.exposure).into_bytes())
    }

    async fn generate_uncropped_preview(
        &self,
        _doc: &AdjustmentDocument,
    ) -> Result<(), EngineError> {
        self.record(BackendCall::UncroppedPreview);
        Ok(())
    }

    async fn generate_original_transformed_preview(
        &self,
        _doc: &AdjustmentDocument,
    ) -> Result<Vec<u8>, EngineError> {
        self.record(BackendCall::OriginalPreview);
        Ok(b"original".to_vec())
    }

    async fn generate_mask_overlay(
        &self,
        _mask: &MaskContainer,
        _region: RenderRegion,
    ) -> Result<Option<Vec<u8>>, EngineError> {
        self.record(BackendCall::MaskOverlay);
        Ok(Some(b"overlay".to_vec()))
    }

    async fn generate_ai_subject_mask(
        &self,
        request: &AiMaskRequest,
    ) -> Result<SubMaskParameters, EngineError> {
        self.record(BackendCall::AiMask {
            path: request.image_path.clone(),
        });
        Ok(SubMaskParameters {
            mask_data_base64: Some("R0VORVJBVEVE".into()),
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
        patch: &AiPatch,
        _image_path: &str,
        _use_fast_inpaint: bool,
    ) -> Result<PatchData, EngineError> {
        self.record(BackendCall::GenerativeReplace { patch_id: patch.id });
        Ok(PatchData {
            color: "R0VOQ09MT1I=".into(),
            mask: "R0VOTUFTSw==".into(),
        })
    }

    async fn load_metadata(&self, path: &str) -> Result<ImageMetadata, EngineError> {
        self.record(BackendCall::LoadMetadata { path: path.into() });
        if self.fail_metadata.load(Ordering::SeqCst) {
            return Err(EngineError::Connection("sidecar store offline".into()));
        }
        Ok(self
            .metadata
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .unwrap_or_default())
    }

    async fn save_metadata_and_update_thumbnail(
        &self,
        path: &str,
        _doc: &AdjustmentDocument,
    ) -> Result<(), EngineError> {
        self.record(BackendCall::SaveMetadata { path: path.into() });
        Ok(())
    }

    async fn reset_adjustments_for_paths(&self, paths: &[String]) -> Result<(), EngineError> {
        self.record(BackendCall::ResetPaths {
            paths: paths.to_vec(),
        });
        Ok(())
    }

    async fn calculate_auto_adjustments(&self) -> Result<DocumentPatch, EngineError> {
        self.record(BackendCall::AutoAdjustments);
        Ok(DocumentPatch {
            exposure: Some(0.25),
            contrast: Some(8.0),
            ..Default::default()
        })
    }
}

/// A session wired to a fresh mock backend, with `"a.raw"` selected.
pub async fn session_with_image(
    config: SessionConfig,
) -> (Arc<EditSession>, Arc<MockBackend>, Arc<EventBus>) {
    let backend = MockBackend::new();
    let bus = Arc::new(EventBus::default());
    let session = EditSession::new(backend.clone(), bus.clone(), config);
    session
        .select_image("a.raw")
        .await
        .expect("image selection should succeed");
    (session, backend, bus)
}

/// A patch setting only the exposure.
pub fn exposure(value: f64) -> DocumentPatch {
    DocumentPatch {
        exposure: Some(value),
        ..Default::default()
    }
}

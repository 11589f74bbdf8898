//! AI patches: generative-inpainting edit regions.
//!
//! An [`AiPatch`] pairs a region (an ordered list of sub-masks) with a prompt
//! and the cached inpainting result. [`PatchData`] holds the two base64
//! planes the generative backend returns -- the replacement color data and the
//! blend mask.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::masks::SubMask;

/// The serialized result of a generative-replace call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatchData {
    /// Base64-encoded PNG of the replacement pixels.
    pub color: String,
    /// Base64-encoded PNG of the blend mask.
    pub mask: String,
}

/// A generative-inpainting edit region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiPatch {
    pub id: Uuid,
    pub name: String,
    pub prompt: String,
    pub visible: bool,
    pub invert: bool,
    /// True while a generation call for this patch is in flight. A loading
    /// patch is never elided from the wire payload.
    pub is_loading: bool,
    /// The cached generation result; `None` until the first generation
    /// completes.
    pub patch_data: Option<PatchData>,
    /// Sub-masks defining the patch region.
    pub sub_masks: Vec<SubMask>,
}

impl AiPatch {
    pub fn new(name: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            prompt: prompt.into(),
            visible: true,
            invert: false,
            is_loading: false,
            patch_data: None,
            sub_masks: Vec::new(),
        }
    }

    pub fn has_payload(&self) -> bool {
        self.patch_data.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_patch_defaults() {
        let patch = AiPatch::new("Remove sign", "clean grass");
        assert!(patch.visible);
        assert!(!patch.is_loading);
        assert!(patch.patch_data.is_none());
        assert!(!patch.has_payload());
    }

    #[test]
    fn serde_roundtrip_with_payload() {
        let mut patch = AiPatch::new("p", "prompt");
        patch.patch_data = Some(PatchData {
            color: "Y29sb3I=".into(),
            mask: "bWFzaw==".into(),
        });

        let value = serde_json::to_value(&patch).unwrap();
        assert_eq!(value["isLoading"], false);
        assert_eq!(value["patchData"]["color"], "Y29sb3I=");

        let back: AiPatch = serde_json::from_value(value).unwrap();
        assert_eq!(back, patch);
    }
}

//! Mask containers and sub-masks.
//!
//! A [`MaskContainer`] is a named region with its own adjustment overrides,
//! built from an ordered list of [`SubMask`]s. AI-generated sub-masks carry
//! their rasterized bitmap as a base64 payload inside
//! [`SubMaskParameters::mask_data_base64`]; that field is the large binary
//! payload the wire encoder elides once the backend has seen it.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How a sub-mask combines with the ones before it in the container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaskMode {
    Additive,
    Subtractive,
}

/// The kind of region a sub-mask describes.
///
/// Wire names match the original frontend (`"ai-subject"`, `"quick-eraser"`,
/// ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SubMaskKind {
    Brush,
    AiSubject,
    AiSky,
    AiForeground,
    QuickEraser,
    Geometric,
}

impl SubMaskKind {
    /// Whether this kind's bitmap is produced by a remote AI generation call.
    pub fn is_ai_generated(&self) -> bool {
        matches!(self, Self::AiSubject | Self::AiSky | Self::AiForeground)
    }
}

/// Parameters of a single sub-mask.
///
/// `mask_data_base64` is the rasterized bitmap for AI-generated kinds; the
/// remaining parameters (brush lines, radial geometry, feather, ...) are
/// kind-specific and kept as free-form JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubMaskParameters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mask_data_base64: Option<String>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// One element of a mask container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubMask {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: SubMaskKind,
    pub visible: bool,
    pub mode: MaskMode,
    pub parameters: SubMaskParameters,
}

impl SubMask {
    /// Create a visible, additive sub-mask with empty parameters.
    pub fn new(kind: SubMaskKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            visible: true,
            mode: MaskMode::Additive,
            parameters: SubMaskParameters::default(),
        }
    }

    /// Whether this sub-mask currently carries a binary payload.
    pub fn has_payload(&self) -> bool {
        self.parameters.mask_data_base64.is_some()
    }
}

/// A named mask region with per-container adjustment overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaskContainer {
    pub id: Uuid,
    pub name: String,
    pub visible: bool,
    pub invert: bool,
    /// Container opacity, `0..=100`.
    pub opacity: f64,
    /// Adjustment overrides applied inside the masked region. Kept as a
    /// free-form object; only the backend interprets it.
    #[serde(default)]
    pub adjustments: serde_json::Value,
    pub sub_masks: Vec<SubMask>,
}

impl MaskContainer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            visible: true,
            invert: false,
            opacity: 100.0,
            adjustments: serde_json::Value::Object(Default::default()),
            sub_masks: Vec::new(),
        }
    }
}

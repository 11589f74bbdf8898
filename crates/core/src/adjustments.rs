//! The adjustment document: the complete non-destructive edit state for one
//! image.
//!
//! An [`AdjustmentDocument`] is always fully defined -- a reset produces the
//! canonical default document, never an absent one. Documents are immutable
//! from the caller's point of view: every change goes through
//! [`AdjustmentDocument::with_patch`], which returns a new document with a
//! bumped revision. Change detection downstream compares revisions, never
//! object identity.

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::CoreError;
use crate::masks::MaskContainer;
use crate::patches::AiPatch;
use crate::types::Revision;

/// A crop rectangle in full-resolution pixel coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Crop {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// A single control point of a tone curve, in `0..=255` space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    pub x: f64,
    pub y: f64,
}

/// Per-channel tone curves. The default is the identity line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToneCurves {
    pub luma: Vec<CurvePoint>,
    pub red: Vec<CurvePoint>,
    pub green: Vec<CurvePoint>,
    pub blue: Vec<CurvePoint>,
}

fn identity_curve() -> Vec<CurvePoint> {
    vec![
        CurvePoint { x: 0.0, y: 0.0 },
        CurvePoint { x: 255.0, y: 255.0 },
    ]
}

impl Default for ToneCurves {
    fn default() -> Self {
        Self {
            luma: identity_curve(),
            red: identity_curve(),
            green: identity_curve(),
            blue: identity_curve(),
        }
    }
}

// ---------------------------------------------------------------------------
// AdjustmentDocument
// ---------------------------------------------------------------------------

/// The versioned, serializable edit state for one image.
///
/// Field names serialize in camelCase -- the wire format shared with the
/// rendering backend and with persisted sidecar metadata. The `revision`
/// field is runtime-only and never serialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AdjustmentDocument {
    /// Runtime change counter. Bumped by [`with_patch`](Self::with_patch);
    /// not part of the wire or persisted form.
    #[serde(skip)]
    pub revision: Revision,

    // White balance
    pub temperature: f64,
    pub tint: f64,

    // Tone
    pub exposure: f64,
    pub contrast: f64,
    pub highlights: f64,
    pub shadows: f64,
    pub whites: f64,
    pub blacks: f64,

    // Presence
    pub saturation: f64,
    pub vibrance: f64,
    pub clarity: f64,
    pub dehaze: f64,

    pub curves: ToneCurves,

    // Orientation and crop
    pub rotation: f64,
    pub orientation_steps: u8,
    pub flip_horizontal: bool,
    pub flip_vertical: bool,
    pub crop: Option<Crop>,
    pub aspect_ratio: Option<f64>,

    // Perspective transform
    pub transform_distortion: f64,
    pub transform_vertical: f64,
    pub transform_horizontal: f64,
    pub transform_rotate: f64,
    pub transform_scale: f64,
    pub transform_x_offset: f64,
    pub transform_y_offset: f64,

    // Lens correction
    pub lens_distortion_amount: f64,
    pub lens_vignette_amount: f64,
    pub lens_tca_amount: f64,
    pub lens_distortion_enabled: bool,
    pub lens_tca_enabled: bool,
    pub lens_vignette_enabled: bool,
    pub lens_maker: Option<String>,
    pub lens_model: Option<String>,

    // LUT
    pub lut_path: Option<String>,
    pub lut_intensity: f64,

    /// Star rating, `0..=5`.
    pub rating: u8,

    pub masks: Vec<MaskContainer>,
    pub ai_patches: Vec<AiPatch>,
}

impl Default for AdjustmentDocument {
    fn default() -> Self {
        Self {
            revision: 0,
            temperature: 0.0,
            tint: 0.0,
            exposure: 0.0,
            contrast: 0.0,
            highlights: 0.0,
            shadows: 0.0,
            whites: 0.0,
            blacks: 0.0,
            saturation: 0.0,
            vibrance: 0.0,
            clarity: 0.0,
            dehaze: 0.0,
            curves: ToneCurves::default(),
            rotation: 0.0,
            orientation_steps: 0,
            flip_horizontal: false,
            flip_vertical: false,
            crop: None,
            aspect_ratio: None,
            transform_distortion: 0.0,
            transform_vertical: 0.0,
            transform_horizontal: 0.0,
            transform_rotate: 0.0,
            transform_scale: 1.0,
            transform_x_offset: 0.0,
            transform_y_offset: 0.0,
            lens_distortion_amount: 0.0,
            lens_vignette_amount: 0.0,
            lens_tca_amount: 0.0,
            lens_distortion_enabled: false,
            lens_tca_enabled: false,
            lens_vignette_enabled: false,
            lens_maker: None,
            lens_model: None,
            lut_path: None,
            lut_intensity: 100.0,
            rating: 0,
            masks: Vec::new(),
            ai_patches: Vec::new(),
        }
    }
}

impl AdjustmentDocument {
    /// Build a document from a raw persisted JSON value.
    ///
    /// Any top-level field absent from `raw` takes its default value, so
    /// documents written by older versions of the application stay loadable.
    /// Unknown keys are dropped. A value that does not parse at all degrades
    /// to the default document -- loading persisted metadata never fails.
    pub fn normalize(raw: &serde_json::Value) -> Self {
        let Some(incoming) = raw.as_object() else {
            if !raw.is_null() {
                tracing::warn!("Persisted adjustments are not a JSON object; using defaults");
            }
            return Self::default();
        };

        let base = match serde_json::to_value(Self::default()) {
            Ok(serde_json::Value::Object(map)) => map,
            _ => return Self::default(),
        };

        let mut merged = base;
        for (key, value) in incoming {
            // Only known keys participate; null means "use the default".
            if merged.contains_key(key) && !value.is_null() {
                merged.insert(key.clone(), value.clone());
            }
        }

        match serde_json::from_value(serde_json::Value::Object(merged)) {
            Ok(doc) => doc,
            Err(e) => {
                tracing::warn!(error = %e, "Persisted adjustments failed to parse; using defaults");
                Self::default()
            }
        }
    }

    /// Apply a shallow top-level merge and return the new document.
    ///
    /// Collections (`masks`, `aiPatches`) are replaced wholesale when present
    /// in the patch, never spliced element-by-element. The returned document
    /// carries `revision + 1`.
    pub fn with_patch(&self, patch: DocumentPatch) -> Self {
        let mut doc = self.clone();
        doc.revision = self.revision + 1;

        macro_rules! merge {
            ($($field:ident),+ $(,)?) => {
                $( if let Some(value) = patch.$field { doc.$field = value; } )+
            };
        }

        merge!(
            temperature,
            tint,
            exposure,
            contrast,
            highlights,
            shadows,
            whites,
            blacks,
            saturation,
            vibrance,
            clarity,
            dehaze,
            curves,
            rotation,
            orientation_steps,
            flip_horizontal,
            flip_vertical,
            crop,
            aspect_ratio,
            transform_distortion,
            transform_vertical,
            transform_horizontal,
            transform_rotate,
            transform_scale,
            transform_x_offset,
            transform_y_offset,
            lens_distortion_amount,
            lens_vignette_amount,
            lens_tca_amount,
            lens_distortion_enabled,
            lens_tca_enabled,
            lens_vignette_enabled,
            lens_maker,
            lens_model,
            lut_path,
            lut_intensity,
            rating,
            masks,
            ai_patches,
        );

        doc
    }
}

// ---------------------------------------------------------------------------
// DocumentPatch
// ---------------------------------------------------------------------------

/// A partial adjustment document: every top-level field as an `Option`.
///
/// Presets and auto-adjustment results deserialize directly into this shape.
/// For nullable document fields (`crop`, `lutPath`, ...) an explicit JSON
/// `null` clears the field while an absent key leaves it untouched.
/// Deserializes a nullable patch field so that a present JSON `null` becomes
/// `Some(None)` (clear the field) while an absent key is left as `None` by the
/// struct-level `default` (leave the field untouched).
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DocumentPatch {
    pub temperature: Option<f64>,
    pub tint: Option<f64>,
    pub exposure: Option<f64>,
    pub contrast: Option<f64>,
    pub highlights: Option<f64>,
    pub shadows: Option<f64>,
    pub whites: Option<f64>,
    pub blacks: Option<f64>,
    pub saturation: Option<f64>,
    pub vibrance: Option<f64>,
    pub clarity: Option<f64>,
    pub dehaze: Option<f64>,
    pub curves: Option<ToneCurves>,
    pub rotation: Option<f64>,
    pub orientation_steps: Option<u8>,
    pub flip_horizontal: Option<bool>,
    pub flip_vertical: Option<bool>,
    #[serde(default, deserialize_with = "double_option")]
    pub crop: Option<Option<Crop>>,
    #[serde(default, deserialize_with = "double_option")]
    pub aspect_ratio: Option<Option<f64>>,
    pub transform_distortion: Option<f64>,
    pub transform_vertical: Option<f64>,
    pub transform_horizontal: Option<f64>,
    pub transform_rotate: Option<f64>,
    pub transform_scale: Option<f64>,
    pub transform_x_offset: Option<f64>,
    pub transform_y_offset: Option<f64>,
    pub lens_distortion_amount: Option<f64>,
    pub lens_vignette_amount: Option<f64>,
    pub lens_tca_amount: Option<f64>,
    pub lens_distortion_enabled: Option<bool>,
    pub lens_tca_enabled: Option<bool>,
    pub lens_vignette_enabled: Option<bool>,
    #[serde(default, deserialize_with = "double_option")]
    pub lens_maker: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub lens_model: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub lut_path: Option<Option<String>>,
    pub lut_intensity: Option<f64>,
    pub rating: Option<u8>,
    pub masks: Option<Vec<MaskContainer>>,
    pub ai_patches: Option<Vec<AiPatch>>,
}

impl DocumentPatch {
    /// A patch that replaces the mask collection wholesale.
    pub fn masks(masks: Vec<MaskContainer>) -> Self {
        Self {
            masks: Some(masks),
            ..Default::default()
        }
    }

    /// A patch that replaces the AI patch collection wholesale.
    pub fn ai_patches(patches: Vec<AiPatch>) -> Self {
        Self {
            ai_patches: Some(patches),
            ..Default::default()
        }
    }

    /// A patch that sets the star rating.
    pub fn rating(rating: u8) -> Self {
        Self {
            rating: Some(rating),
            ..Default::default()
        }
    }
}

/// Validate that a star rating is within `0..=5`.
pub fn validate_rating(rating: u8) -> Result<(), CoreError> {
    if rating <= 5 {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Rating {rating} is out of range (0..=5)"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_document_is_canonical() {
        let doc = AdjustmentDocument::default();
        assert_eq!(doc.revision, 0);
        assert_eq!(doc.exposure, 0.0);
        assert_eq!(doc.transform_scale, 1.0);
        assert_eq!(doc.lut_intensity, 100.0);
        assert!(doc.crop.is_none());
        assert!(doc.masks.is_empty());
        assert!(doc.ai_patches.is_empty());
    }

    #[test]
    fn with_patch_bumps_revision_and_merges_shallowly() {
        let doc = AdjustmentDocument::default();
        let patched = doc.with_patch(DocumentPatch {
            exposure: Some(1.0),
            ..Default::default()
        });

        assert_eq!(patched.revision, 1);
        assert_eq!(patched.exposure, 1.0);
        // Untouched fields survive.
        assert_eq!(patched.contrast, doc.contrast);
        assert_eq!(patched.curves, doc.curves);
    }

    #[test]
    fn with_patch_does_not_mutate_the_source() {
        let doc = AdjustmentDocument::default();
        let _ = doc.with_patch(DocumentPatch {
            exposure: Some(1.0),
            ..Default::default()
        });
        assert_eq!(doc.exposure, 0.0);
        assert_eq!(doc.revision, 0);
    }

    #[test]
    fn patch_can_clear_nullable_fields() {
        let doc = AdjustmentDocument::default().with_patch(DocumentPatch {
            crop: Some(Some(Crop {
                x: 0.0,
                y: 0.0,
                width: 100.0,
                height: 100.0,
            })),
            ..Default::default()
        });
        assert!(doc.crop.is_some());

        let cleared = doc.with_patch(DocumentPatch {
            crop: Some(None),
            ..Default::default()
        });
        assert!(cleared.crop.is_none());
        assert_eq!(cleared.revision, 2);
    }

    #[test]
    fn normalize_fills_missing_fields_with_defaults() {
        let raw = serde_json::json!({ "exposure": 0.5, "rating": 3 });
        let doc = AdjustmentDocument::normalize(&raw);

        assert_eq!(doc.exposure, 0.5);
        assert_eq!(doc.rating, 3);
        // Absent fields take defaults.
        assert_eq!(doc.contrast, 0.0);
        assert_eq!(doc.transform_scale, 1.0);
        assert_eq!(doc.curves, ToneCurves::default());
    }

    #[test]
    fn normalize_drops_unknown_legacy_keys() {
        let raw = serde_json::json!({ "exposure": 0.5, "someLegacyField": true });
        let doc = AdjustmentDocument::normalize(&raw);
        assert_eq!(doc.exposure, 0.5);
    }

    #[test]
    fn normalize_never_fails() {
        assert_eq!(
            AdjustmentDocument::normalize(&serde_json::Value::Null),
            AdjustmentDocument::default()
        );
        assert_eq!(
            AdjustmentDocument::normalize(&serde_json::json!([1, 2, 3])),
            AdjustmentDocument::default()
        );
        assert_eq!(
            AdjustmentDocument::normalize(&serde_json::json!({ "exposure": "not a number" })),
            AdjustmentDocument::default()
        );
    }

    #[test]
    fn normalize_treats_null_fields_as_absent() {
        let raw = serde_json::json!({ "lutIntensity": null });
        let doc = AdjustmentDocument::normalize(&raw);
        assert_eq!(doc.lut_intensity, 100.0);
    }

    #[test]
    fn serializes_camel_case_without_revision() {
        let doc = AdjustmentDocument::default();
        let value = serde_json::to_value(&doc).unwrap();
        let obj = value.as_object().unwrap();

        assert!(obj.contains_key("orientationSteps"));
        assert!(obj.contains_key("aiPatches"));
        assert!(obj.contains_key("lutPath"));
        assert!(!obj.contains_key("revision"));
    }

    #[test]
    fn preset_json_deserializes_into_patch() {
        let json = serde_json::json!({
            "exposure": 0.3,
            "contrast": 12.0,
            "lutPath": null,
        });
        let patch: DocumentPatch = serde_json::from_value(json).unwrap();
        assert_eq!(patch.exposure, Some(0.3));
        assert_eq!(patch.contrast, Some(12.0));
        assert_eq!(patch.lut_path, Some(None));
        assert!(patch.tint.is_none());
    }

    #[test]
    fn rating_validation() {
        assert!(validate_rating(0).is_ok());
        assert!(validate_rating(5).is_ok());
        assert!(validate_rating(6).is_err());
    }
}

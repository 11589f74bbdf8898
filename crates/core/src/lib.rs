//! Core domain model for the darkroom edit pipeline.
//!
//! This crate holds the pure data model: the [`AdjustmentDocument`] and its
//! nested mask/patch collections, the linear [`EditHistory`], sidecar
//! metadata types, and the hashing utilities used for render cache keys.
//! It has zero internal dependencies so it can be used by the engine
//! contract, the session controller, and any future CLI tooling.

pub mod adjustments;
pub mod error;
pub mod hashing;
pub mod history;
pub mod masks;
pub mod metadata;
pub mod patches;
pub mod types;

pub use adjustments::{AdjustmentDocument, Crop, CurvePoint, DocumentPatch, ToneCurves};
pub use error::CoreError;
pub use history::EditHistory;
pub use masks::{MaskContainer, MaskMode, SubMask, SubMaskKind, SubMaskParameters};
pub use metadata::ImageMetadata;
pub use patches::{AiPatch, PatchData};

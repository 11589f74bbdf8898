//! Digest utilities for render cache keys.
//!
//! The full-resolution preview cache is keyed by a digest of the image path
//! plus the pixel-affecting subset of the adjustment document, so zooming
//! back in without changing any pixel-affecting adjustment reuses the cached
//! render instead of re-invoking the backend.

use sha2::{Digest, Sha256};

use crate::adjustments::AdjustmentDocument;

/// Compute a SHA-256 hex digest of the given bytes.
pub fn sha256_hex(data: &[u8]) -> String {
    let hash = Sha256::digest(data);
    format!("{hash:x}")
}

/// Cache key over everything that affects rendered pixels.
///
/// The serialized document is canonical (sorted keys, no runtime revision),
/// so two documents that differ only in `rating` -- or only in revision --
/// produce the same fingerprint.
pub fn visual_fingerprint(path: &str, doc: &AdjustmentDocument) -> String {
    let mut value = serde_json::to_value(doc).unwrap_or(serde_json::Value::Null);
    if let Some(obj) = value.as_object_mut() {
        obj.remove("rating");
    }

    let mut payload = path.as_bytes().to_vec();
    payload.extend_from_slice(value.to_string().as_bytes());
    sha256_hex(&payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adjustments::DocumentPatch;

    #[test]
    fn empty_input_produces_known_hash() {
        assert_eq!(
            sha256_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn fingerprint_is_stable_across_revisions() {
        let doc = AdjustmentDocument::default();
        let bumped = doc.with_patch(DocumentPatch::default());
        assert_eq!(
            visual_fingerprint("/a.raw", &doc),
            visual_fingerprint("/a.raw", &bumped)
        );
    }

    #[test]
    fn rating_does_not_affect_the_fingerprint() {
        let doc = AdjustmentDocument::default();
        let rated = doc.with_patch(DocumentPatch::rating(5));
        assert_eq!(
            visual_fingerprint("/a.raw", &doc),
            visual_fingerprint("/a.raw", &rated)
        );
    }

    #[test]
    fn pixel_affecting_changes_do_change_it() {
        let doc = AdjustmentDocument::default();
        let exposed = doc.with_patch(DocumentPatch {
            exposure: Some(0.7),
            ..Default::default()
        });
        assert_ne!(
            visual_fingerprint("/a.raw", &doc),
            visual_fingerprint("/a.raw", &exposed)
        );
    }

    #[test]
    fn path_is_part_of_the_key() {
        let doc = AdjustmentDocument::default();
        assert_ne!(
            visual_fingerprint("/a.raw", &doc),
            visual_fingerprint("/b.raw", &doc)
        );
    }
}

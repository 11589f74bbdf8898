//! Payload elision for wire documents.
//!
//! Binary mask bitmaps and AI patch results can each be megabytes, while most
//! renders only change scalar fields. The backend caches every binary payload
//! it receives, keyed by entity id, and re-hydrates elided fields from that
//! cache. So the encoder sends each payload once, then replaces it with null
//! on every later transmission -- until the entity is regenerated
//! ([`SentPayloadTracker::invalidate`]) or the selected image changes
//! ([`SentPayloadTracker::clear`]).

use std::collections::HashSet;

use uuid::Uuid;

use darkroom_core::adjustments::AdjustmentDocument;

/// Namespaced id of an entity with a large binary payload.
///
/// Mask sub-masks and AI patches share one tracker; namespacing the key
/// removes any reliance on id uniqueness across the two collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PayloadKey {
    /// A sub-mask's `mask_data_base64`.
    Mask(Uuid),
    /// An AI patch's `patchData`.
    Patch(Uuid),
}

/// Ids whose binary payload the backend already holds for the currently
/// selected image.
///
/// Owned by the session; mutated only through [`encode_for_wire`] and the
/// explicit [`invalidate`](Self::invalidate) / [`clear`](Self::clear) calls.
#[derive(Debug, Default)]
pub struct SentPayloadTracker {
    sent: HashSet<PayloadKey>,
}

impl SentPayloadTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: PayloadKey) -> bool {
        self.sent.contains(&key)
    }

    fn mark_sent(&mut self, key: PayloadKey) {
        self.sent.insert(key);
    }

    /// Force retransmission of one entity's payload on the next encode.
    ///
    /// Must be called whenever a payload is freshly (re)computed -- an AI mask
    /// regenerated, a generative replace completed -- before the next encode.
    pub fn invalidate(&mut self, key: PayloadKey) {
        self.sent.remove(&key);
    }

    /// Forget everything. Called when the selected image changes.
    pub fn clear(&mut self) {
        self.sent.clear();
    }

    pub fn len(&self) -> usize {
        self.sent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sent.is_empty()
    }
}

/// Produce the wire copy of `doc`, eliding already-sent binary payloads.
///
/// For every sub-mask with a bitmap and every patch with result data: if the
/// entity's key is already tracked and the entity is not mid-regeneration,
/// the payload is nulled out in the copy; otherwise it is kept intact and the
/// key is recorded. The input document is never modified.
pub fn encode_for_wire(
    doc: &AdjustmentDocument,
    tracker: &mut SentPayloadTracker,
) -> AdjustmentDocument {
    let mut wire = doc.clone();
    let mut elided = 0usize;
    let mut transmitted = 0usize;

    for container in &mut wire.masks {
        for sub in &mut container.sub_masks {
            if sub.parameters.mask_data_base64.is_none() {
                continue;
            }
            let key = PayloadKey::Mask(sub.id);
            if tracker.contains(key) {
                sub.parameters.mask_data_base64 = None;
                elided += 1;
            } else {
                tracker.mark_sent(key);
                transmitted += 1;
            }
        }
    }

    for patch in &mut wire.ai_patches {
        if patch.patch_data.is_none() {
            continue;
        }
        let key = PayloadKey::Patch(patch.id);
        // A loading patch is being regenerated; its (stale) payload must not
        // be marked as the backend's copy.
        if tracker.contains(key) && !patch.is_loading {
            patch.patch_data = None;
            elided += 1;
        } else if !patch.is_loading {
            tracker.mark_sent(key);
            transmitted += 1;
        } else {
            transmitted += 1;
        }
    }

    if elided > 0 || transmitted > 0 {
        tracing::trace!(elided, transmitted, "Encoded wire document");
    }

    wire
}

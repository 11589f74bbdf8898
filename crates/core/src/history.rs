//! Linear undo/redo history over adjustment documents.
//!
//! [`EditHistory`] holds an ordered sequence of document snapshots plus a
//! current index, with the invariant `0 <= index < entries.len()`. Entries
//! are copies -- mutating the live document can never retroactively alter
//! history. Out-of-range navigation is a silent no-op, never a panic: it is
//! reachable through normal UI interaction (double-clicks, rapid keypresses).

use crate::adjustments::AdjustmentDocument;

/// Append-only, truncate-on-branch undo/redo log.
#[derive(Debug, Clone)]
pub struct EditHistory {
    entries: Vec<AdjustmentDocument>,
    index: usize,
}

impl EditHistory {
    /// Start a history with a single initial entry.
    pub fn new(initial: AdjustmentDocument) -> Self {
        Self {
            entries: vec![initial],
            index: 0,
        }
    }

    /// Snapshot a new state.
    ///
    /// Entries after the current index (redo-able futures) are truncated:
    /// pushing from a point that is not the tail starts a new timeline.
    pub fn push(&mut self, doc: AdjustmentDocument) {
        self.entries.truncate(self.index + 1);
        self.entries.push(doc);
        self.index = self.entries.len() - 1;
    }

    /// Step back one entry. No-op at the first entry.
    pub fn undo(&mut self) -> Option<&AdjustmentDocument> {
        if self.index == 0 {
            return None;
        }
        self.index -= 1;
        Some(&self.entries[self.index])
    }

    /// Step forward one entry. No-op at the tail.
    pub fn redo(&mut self) -> Option<&AdjustmentDocument> {
        if self.index + 1 >= self.entries.len() {
            return None;
        }
        self.index += 1;
        Some(&self.entries[self.index])
    }

    /// Jump directly to entry `i`. Out-of-range is a no-op.
    pub fn go_to(&mut self, i: usize) -> Option<&AdjustmentDocument> {
        if i >= self.entries.len() {
            return None;
        }
        self.index = i;
        Some(&self.entries[self.index])
    }

    /// Replace the whole history with a single entry.
    ///
    /// Used when switching images or explicitly resetting edits -- history is
    /// scoped to one image's editing session.
    pub fn reset(&mut self, doc: AdjustmentDocument) {
        self.entries.clear();
        self.entries.push(doc);
        self.index = 0;
    }

    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.entries.len()
    }

    /// The document at the current index.
    pub fn current(&self) -> &AdjustmentDocument {
        &self.entries[self.index]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn index(&self) -> usize {
        self.index
    }
}

impl Default for EditHistory {
    fn default() -> Self {
        Self::new(AdjustmentDocument::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adjustments::DocumentPatch;

    fn doc_with_exposure(exposure: f64) -> AdjustmentDocument {
        AdjustmentDocument::default().with_patch(DocumentPatch {
            exposure: Some(exposure),
            ..Default::default()
        })
    }

    #[test]
    fn new_history_has_one_entry() {
        let history = EditHistory::default();
        assert_eq!(history.len(), 1);
        assert_eq!(history.index(), 0);
        assert!(!history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn push_appends_and_moves_index() {
        let mut history = EditHistory::default();
        history.push(doc_with_exposure(1.0));

        assert_eq!(history.len(), 2);
        assert_eq!(history.index(), 1);
        assert!(history.can_undo());
        assert!(!history.can_redo());
        assert_eq!(history.current().exposure, 1.0);
    }

    #[test]
    fn undo_on_first_entry_is_a_noop() {
        let mut history = EditHistory::default();
        assert!(history.undo().is_none());
        assert_eq!(history.index(), 0);
    }

    #[test]
    fn redo_on_tail_is_a_noop() {
        let mut history = EditHistory::default();
        history.push(doc_with_exposure(1.0));
        assert!(history.redo().is_none());
        assert_eq!(history.index(), 1);
    }

    #[test]
    fn undo_then_redo_is_identity() {
        let mut history = EditHistory::default();
        history.push(doc_with_exposure(1.0));
        history.push(doc_with_exposure(2.0));

        let before = history.current().clone();
        history.undo();
        let restored = history.redo().unwrap().clone();
        assert_eq!(restored, before);
        assert_eq!(history.index(), 2);
    }

    #[test]
    fn push_after_undo_truncates_redo_branch() {
        let mut history = EditHistory::default();
        history.push(doc_with_exposure(1.0));
        history.push(doc_with_exposure(2.0));
        history.undo();

        history.push(doc_with_exposure(9.0));
        assert_eq!(history.len(), 3);
        assert_eq!(history.index(), 2);
        assert!(!history.can_redo());
        assert_eq!(history.current().exposure, 9.0);
    }

    #[test]
    fn go_to_jumps_anywhere_in_range() {
        let mut history = EditHistory::default();
        history.push(doc_with_exposure(1.0));
        history.push(doc_with_exposure(2.0));

        let doc = history.go_to(0).unwrap();
        assert_eq!(doc.exposure, 0.0);
        assert!(!history.can_undo());
        assert!(history.can_redo());
    }

    #[test]
    fn go_to_out_of_range_is_a_noop() {
        let mut history = EditHistory::default();
        history.push(doc_with_exposure(1.0));

        assert!(history.go_to(5).is_none());
        assert_eq!(history.index(), 1);
    }

    #[test]
    fn reset_yields_single_entry() {
        let mut history = EditHistory::default();
        history.push(doc_with_exposure(1.0));
        history.push(doc_with_exposure(2.0));

        history.reset(doc_with_exposure(7.0));
        assert_eq!(history.len(), 1);
        assert_eq!(history.index(), 0);
        assert!(!history.can_undo());
        assert!(!history.can_redo());
        assert_eq!(history.current().exposure, 7.0);
    }

    #[test]
    fn invariants_hold_under_interleaving() {
        let mut history = EditHistory::default();
        for i in 0..5 {
            history.push(doc_with_exposure(i as f64));
        }
        history.undo();
        history.undo();
        history.redo();
        history.push(doc_with_exposure(100.0));
        history.undo();

        // canUndo == (index > 0), canRedo == (index < len - 1), always.
        assert!(history.index() < history.len());
        assert_eq!(history.can_undo(), history.index() > 0);
        assert_eq!(history.can_redo(), history.index() + 1 < history.len());
    }

    #[test]
    fn entries_are_copies_not_references() {
        let mut live = doc_with_exposure(1.0);
        let mut history = EditHistory::new(live.clone());

        live = live.with_patch(DocumentPatch {
            exposure: Some(42.0),
            ..Default::default()
        });

        assert_eq!(history.current().exposure, 1.0);
        let _ = live;
        history.push(doc_with_exposure(2.0));
        assert_eq!(history.current().exposure, 2.0);
    }
}

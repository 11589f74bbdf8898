//! Render request sequencing: at most one live request per kind, and stale
//! responses are discarded.
//!
//! Each [`RenderKind`] owns an independent slot carrying a monotonically
//! bumped sequence number and a [`CancellationToken`]. Dispatching a request
//! supersedes (cancels) the previous one of the same kind; a response is
//! applied only if its [`RenderTicket`] still matches the slot. Discarding a
//! stale response is a normal, silent outcome of the protocol -- never an
//! error.

use std::collections::HashMap;
use std::sync::Mutex;

use tokio_util::sync::CancellationToken;

/// The independent render request kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderKind {
    /// Final-quality render of the working preview.
    Authoritative,
    /// Low-latency, reduced-quality render streamed while dragging.
    Interactive,
    /// Explicit fullscreen preview.
    Fullscreen,
    /// Zoom-triggered 1:1 render (cached by visual fingerprint).
    FullResolution,
}

impl RenderKind {
    /// Name for logging.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Authoritative => "authoritative",
            Self::Interactive => "interactive",
            Self::Fullscreen => "fullscreen",
            Self::FullResolution => "full-resolution",
        }
    }
}

/// Lifecycle of one request slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotState {
    Idle,
    /// A timer is armed but the request has not been dispatched yet.
    Pending,
    InFlight,
}

#[derive(Debug)]
struct Slot {
    seq: u64,
    state: SlotState,
    token: CancellationToken,
}

impl Default for Slot {
    fn default() -> Self {
        Self {
            seq: 0,
            state: SlotState::Idle,
            token: CancellationToken::new(),
        }
    }
}

/// Handle for one dispatched request.
///
/// Hold it across the backend call and pass it to
/// [`RenderSequencer::complete`] when the response arrives.
#[derive(Debug)]
pub struct RenderTicket {
    kind: RenderKind,
    seq: u64,
    token: CancellationToken,
}

impl RenderTicket {
    pub fn kind(&self) -> RenderKind {
        self.kind
    }

    /// True once a newer request of the same kind superseded this one, or an
    /// explicit cancellation (image/panel switch) happened.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// Per-kind request slots with supersede-and-discard semantics.
#[derive(Debug, Default)]
pub struct RenderSequencer {
    slots: Mutex<HashMap<RenderKind, Slot>>,
}

impl RenderSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that a timer was armed for `kind` (`Idle -> Pending`).
    pub fn mark_pending(&self, kind: RenderKind) {
        let mut slots = self.slots.lock().unwrap();
        let slot = slots.entry(kind).or_default();
        if slot.state == SlotState::Idle {
            slot.state = SlotState::Pending;
        }
    }

    /// Dispatch a request for `kind`, superseding any live one.
    pub fn begin(&self, kind: RenderKind) -> RenderTicket {
        let mut slots = self.slots.lock().unwrap();
        let slot = slots.entry(kind).or_default();

        if slot.state == SlotState::InFlight {
            tracing::trace!(kind = kind.as_str(), seq = slot.seq, "Superseding in-flight request");
        }
        slot.token.cancel();
        slot.token = CancellationToken::new();
        slot.seq += 1;
        slot.state = SlotState::InFlight;

        RenderTicket {
            kind,
            seq: slot.seq,
            token: slot.token.clone(),
        }
    }

    /// Settle a response. Returns `true` when the ticket is still current
    /// and its result may be applied; `false` means the response is stale
    /// and must be discarded without side effects.
    pub fn complete(&self, ticket: &RenderTicket) -> bool {
        let mut slots = self.slots.lock().unwrap();
        let Some(slot) = slots.get_mut(&ticket.kind) else {
            return false;
        };

        if slot.seq == ticket.seq && !ticket.token.is_cancelled() {
            slot.state = SlotState::Idle;
            true
        } else {
            tracing::trace!(
                kind = ticket.kind.as_str(),
                stale_seq = ticket.seq,
                current_seq = slot.seq,
                "Discarding stale render response",
            );
            false
        }
    }

    /// Explicitly cancel one kind's slot.
    pub fn cancel(&self, kind: RenderKind) {
        let mut slots = self.slots.lock().unwrap();
        if let Some(slot) = slots.get_mut(&kind) {
            slot.token.cancel();
            slot.seq += 1;
            slot.state = SlotState::Idle;
        }
    }

    /// Cancel every slot. The image-switch barrier.
    pub fn cancel_all(&self) {
        let mut slots = self.slots.lock().unwrap();
        for slot in slots.values_mut() {
            slot.token.cancel();
            slot.seq += 1;
            slot.state = SlotState::Idle;
        }
    }

    pub fn state(&self, kind: RenderKind) -> SlotState {
        self.slots
            .lock()
            .unwrap()
            .get(&kind)
            .map(|slot| slot.state)
            .unwrap_or(SlotState::Idle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn current_ticket_completes() {
        let sequencer = RenderSequencer::new();
        let ticket = sequencer.begin(RenderKind::Authoritative);
        assert_eq!(sequencer.state(RenderKind::Authoritative), SlotState::InFlight);
        assert!(sequencer.complete(&ticket));
        assert_eq!(sequencer.state(RenderKind::Authoritative), SlotState::Idle);
    }

    #[test]
    fn superseded_ticket_is_stale_even_on_success() {
        let sequencer = RenderSequencer::new();
        let first = sequencer.begin(RenderKind::Fullscreen);
        let second = sequencer.begin(RenderKind::Fullscreen);

        assert!(first.is_cancelled());
        // The slow first response resolves after the second was dispatched.
        assert!(!sequencer.complete(&first));
        assert!(sequencer.complete(&second));
    }

    #[test]
    fn kinds_are_independent() {
        let sequencer = RenderSequencer::new();
        let auth = sequencer.begin(RenderKind::Authoritative);
        let interactive = sequencer.begin(RenderKind::Interactive);

        assert!(!auth.is_cancelled());
        assert!(sequencer.complete(&interactive));
        assert!(sequencer.complete(&auth));
    }

    #[test]
    fn explicit_cancel_invalidates_in_flight() {
        let sequencer = RenderSequencer::new();
        let ticket = sequencer.begin(RenderKind::FullResolution);
        sequencer.cancel(RenderKind::FullResolution);

        assert!(ticket.is_cancelled());
        assert!(!sequencer.complete(&ticket));
    }

    #[test]
    fn cancel_all_is_a_barrier() {
        let sequencer = RenderSequencer::new();
        let a = sequencer.begin(RenderKind::Authoritative);
        let b = sequencer.begin(RenderKind::Interactive);
        sequencer.cancel_all();

        assert!(!sequencer.complete(&a));
        assert!(!sequencer.complete(&b));
        assert_eq!(sequencer.state(RenderKind::Authoritative), SlotState::Idle);
    }

    #[test]
    fn pending_marks_only_from_idle() {
        let sequencer = RenderSequencer::new();
        sequencer.mark_pending(RenderKind::Authoritative);
        assert_eq!(sequencer.state(RenderKind::Authoritative), SlotState::Pending);

        let _ticket = sequencer.begin(RenderKind::Authoritative);
        sequencer.mark_pending(RenderKind::Authoritative);
        assert_eq!(sequencer.state(RenderKind::Authoritative), SlotState::InFlight);
    }
}

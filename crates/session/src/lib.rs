//! The edit session controller: live-preview synchronization between the
//! interactive UI and the asynchronous rendering backend.
//!
//! [`controller::EditSession`] owns the live adjustment document, the undo
//! history, the sent-payload tracker, and the timers that coalesce a
//! high-frequency stream of edits into debounced history snapshots,
//! throttled interactive renders, and debounced authoritative renders.
//! [`sequencer::RenderSequencer`] guarantees that a stale render response
//! can never overwrite a newer one.

pub mod config;
pub mod controller;
pub mod sequencer;
pub mod timer;

pub use config::SessionConfig;
pub use controller::{EditSession, SessionError};
pub use sequencer::{RenderKind, RenderSequencer, RenderTicket, SlotState};
pub use timer::{DelayedTask, Throttle};

//! In-process editor event bus.
//!
//! Carries both the backend's push-channel results (previews, histogram,
//! waveform) and session-produced UI notifications. See [`bus::EventBus`].

pub mod bus;

pub use bus::{EditorEvent, EventBus};

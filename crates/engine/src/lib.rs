//! Contract between the edit session and the native rendering backend.
//!
//! [`backend::RenderBackend`] is the abstract RPC surface the session
//! dispatches to; [`elision`] prepares wire payloads by stripping large
//! binary fields the backend has already seen.

pub mod backend;
pub mod elision;
pub mod error;

pub use backend::{AiMaskRequest, RenderBackend, RenderRegion};
pub use elision::{encode_for_wire, PayloadKey, SentPayloadTracker};
pub use error::EngineError;

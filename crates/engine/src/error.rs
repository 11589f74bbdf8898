/// Errors surfaced by render backend calls.
///
/// All of these are transient from the session's point of view: they are
/// logged, surfaced as a dismissable notice, and never retried
/// automatically.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The backend rejected or failed the call.
    #[error("Backend error: {0}")]
    Backend(String),

    /// The backend process/channel is unreachable.
    #[error("Connection error: {0}")]
    Connection(String),

    /// A payload could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

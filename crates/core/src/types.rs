/// Monotonically increasing document revision, bumped on every patch.
pub type Revision = u64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

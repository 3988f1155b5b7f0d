/// Server-assigned record identifier. Opaque to the client.
pub type EntityId = String;

/// User identifier handed out by the identity provider. Never parsed.
pub type UserId = String;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

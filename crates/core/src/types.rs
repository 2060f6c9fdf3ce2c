/// All database primary keys are PostgreSQL UUIDs (v4, generated in the database).
pub type DbId = uuid::Uuid;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

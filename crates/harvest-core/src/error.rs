use thiserror::Error;

#[derive(Debug, Error)]
pub enum RecordError {
    /// Inserting a row with an empty label is a broken importer, never bad
    /// external data. It must surface instead of being swallowed.
    #[error("cannot insert a row with an empty label")]
    EmptyLabel,
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

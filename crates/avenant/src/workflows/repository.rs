/// Error enumeration for storage failures shared by every workflow.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    /// The record already exists, or no longer holds the state the write was
    /// checked against.
    #[error("record conflicts with its stored version")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

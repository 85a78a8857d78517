use serde::Serialize;

/// One failed field rule, reported as data rather than control flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub field: &'static str,
    pub reason: String,
}

impl Violation {
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("validation failed on {} field(s)", .0.len())]
    Invalid(Vec<Violation>),

    #[error("{field} is already in use")]
    Conflict { field: &'static str },

    #[error("account not found")]
    NotFound,

    #[error("database error")]
    Database(#[from] sqlx::Error),
}

//! The engine's error taxonomy.
//!
//! Every variant is terminal to the originating request; the request layer
//! maps them to user-visible responses. Only `Conflict` is worth a retry,
//! and the engine has already retried it by the time callers see it.

use campus_store::StoreError;

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors surfaced by engine operations.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// An entity id did not resolve.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The entity kind that was looked up.
        entity: &'static str,
        /// The id that did not resolve.
        id: String,
    },

    /// Authenticated but not entitled (ownership or role mismatch).
    #[error("forbidden")]
    Forbidden,

    /// The root course is still in draft.
    #[error("course is not published")]
    NotPublished,

    /// The student holds no paid purchase for the root course.
    #[error("course has not been purchased")]
    NotPurchased,

    /// A purchase row already exists for the (student, course) pair.
    #[error("course already purchased")]
    AlreadyPurchased,

    /// An operation hit a state it does not transition from (double refund,
    /// publish twice).
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// A precondition was not met (publish with zero modules).
    #[error("precondition failed: {0}")]
    PreconditionFailed(String),

    /// The payment gateway returned a fail verdict.
    #[error("payment rejected: {0}")]
    PaymentRejected(String),

    /// A write race exhausted its bounded retries.
    #[error("conflict")]
    Conflict,

    /// The store handle's deadline elapsed; nothing was written.
    #[error("operation timed out")]
    Timeout,

    /// Storage backend failure.
    #[error("storage error: {0}")]
    Storage(String),
}

impl From<StoreError> for EngineError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { entity, id } => Self::NotFound { entity, id },
            StoreError::AlreadyPurchased { .. } => Self::AlreadyPurchased,
            StoreError::AlreadyPublished { course_id } => {
                Self::InvalidState(format!("course already published: {course_id}"))
            }
            StoreError::EmptyCourse { course_id } => {
                Self::PreconditionFailed(format!("course has no modules: {course_id}"))
            }
            StoreError::NotRefundable { purchase_id } => {
                Self::InvalidState(format!("purchase is not refundable: {purchase_id}"))
            }
            StoreError::Conflict => Self::Conflict,
            StoreError::Timeout => Self::Timeout,
            StoreError::Database(msg) | StoreError::Serialization(msg) => Self::Storage(msg),
        }
    }
}

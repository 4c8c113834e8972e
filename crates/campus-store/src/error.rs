//! Error types for campus storage.

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur in storage operations.
///
/// Besides plain database failures, the compound operations surface the
/// invariant checks they perform atomically (unique purchase per pair,
/// publish preconditions, refundability) as their own variants so callers
/// can map them to precise domain errors.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Database operation failed.
    #[error("database error: {0}")]
    Database(String),

    /// Serialization/deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Record not found.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The entity table that was queried.
        entity: &'static str,
        /// The id that did not resolve.
        id: String,
    },

    /// A purchase row already exists for the (student, course) pair.
    #[error("purchase already exists for student {student_id} on course {course_id}")]
    AlreadyPurchased {
        /// The buying student.
        student_id: String,
        /// The course.
        course_id: String,
    },

    /// Publish attempted on a course that is not in draft.
    #[error("course already published: {course_id}")]
    AlreadyPublished {
        /// The course.
        course_id: String,
    },

    /// Publish attempted on a course with zero modules.
    #[error("course has no modules: {course_id}")]
    EmptyCourse {
        /// The course.
        course_id: String,
    },

    /// Refund attempted on a purchase that is not in `Paid` status.
    #[error("purchase is not refundable: {purchase_id}")]
    NotRefundable {
        /// The purchase.
        purchase_id: String,
    },

    /// A write raced another writer on the same key (e.g. a position slot).
    /// Transient: safe to retry with freshly recomputed inputs.
    #[error("write conflict")]
    Conflict,

    /// The operation's deadline elapsed; the transaction was aborted with no
    /// partial write.
    #[error("operation timed out")]
    Timeout,
}

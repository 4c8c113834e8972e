//! Purchase ledger rows and the payment proof shape.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{CourseId, PurchaseId, TransactionId, UserId};

/// Status of a purchase.
///
/// Refund flips `Paid` → `Canceled`; rows are never deleted so the ledger
/// stays a complete audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PurchaseStatus {
    /// Payment settled; the purchase grants content access.
    Paid,

    /// Refunded. Grants no access and blocks repurchase.
    Canceled,
}

/// A row in the purchase ledger.
///
/// At most one row exists per `(student_id, course_id)` pair, enforced by a
/// unique index in the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Purchase {
    /// The purchase id.
    pub id: PurchaseId,

    /// The buying student.
    pub student_id: UserId,

    /// The purchased course.
    pub course_id: CourseId,

    /// Price paid, in integer cents, captured from the course at purchase
    /// time.
    pub price_cents: i64,

    /// Current status.
    pub status: PurchaseStatus,

    /// Payment transaction id, assigned at creation and immutable.
    pub transaction_id: TransactionId,

    /// When the purchase settled.
    pub created_at: DateTime<Utc>,
}

impl Purchase {
    /// Create a settled (`Paid`) purchase with a fresh transaction id.
    #[must_use]
    pub fn new(student_id: UserId, course_id: CourseId, price_cents: i64) -> Self {
        Self {
            id: PurchaseId::generate(),
            student_id,
            course_id,
            price_cents,
            status: PurchaseStatus::Paid,
            transaction_id: TransactionId::generate(),
            created_at: Utc::now(),
        }
    }

    /// Whether this purchase currently grants content access.
    #[must_use]
    pub fn grants_access(&self) -> bool {
        self.status == PurchaseStatus::Paid
    }
}

/// Card details submitted as payment proof.
///
/// The engine never interprets these beyond handing them to a
/// `PaymentGateway` for a pass/fail verdict.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardPayment {
    /// Card number (digits only).
    pub card_number: String,

    /// Name on the card.
    pub holder_name: String,

    /// Two-digit expiry month, `"01"`..`"12"`.
    pub exp_month: String,

    /// Two-digit expiry year, e.g. `"27"` for 2027.
    pub exp_year: String,

    /// Card verification value.
    pub cvv: String,
}

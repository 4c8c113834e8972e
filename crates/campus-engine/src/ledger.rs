//! The purchase ledger: buying courses and refunding purchases.
//!
//! A purchase exists at most once per (student, course) pair — the store's
//! unique index enforces this atomically with the insert, so a duplicate
//! attempt fails with `AlreadyPurchased` even when it races the first one.
//! A refunded purchase blocks repurchase: the uniqueness check is on row
//! existence, not status.
//!
//! Payment is an opaque pass/fail verdict behind [`PaymentGateway`]; the
//! engine never interprets card data itself.

use campus_core::{CardPayment, CourseId, Purchase, PurchaseId, UserId};
use campus_store::Store;

use crate::access::{evaluate_access, Action, Actor, PurchaseTarget, Target};
use crate::error::{EngineError, Result};
use crate::{retry_conflicts, Engine};

/// An external payment authority delivering a pass/fail verdict.
pub trait PaymentGateway: Send + Sync {
    /// Authorize a payment, returning a human-readable decline reason on
    /// failure.
    ///
    /// # Errors
    ///
    /// Returns the decline reason when the payment is rejected.
    fn authorize(&self, payment: &CardPayment) -> std::result::Result<(), String>;
}

/// A test gateway with shallow card checks: 16-digit number, 3-digit CVV,
/// non-expired MM/YY. No money moves.
#[derive(Debug, Clone, Copy, Default)]
pub struct FakeGateway;

impl PaymentGateway for FakeGateway {
    fn authorize(&self, payment: &CardPayment) -> std::result::Result<(), String> {
        if payment.card_number.len() != 16 || !payment.card_number.bytes().all(|b| b.is_ascii_digit())
        {
            return Err("invalid card number".into());
        }
        if payment.cvv.len() != 3 || !payment.cvv.bytes().all(|b| b.is_ascii_digit()) {
            return Err("invalid security code".into());
        }

        let month: u32 = payment
            .exp_month
            .parse()
            .map_err(|_| "invalid expiry month".to_string())?;
        let year: i32 = payment
            .exp_year
            .parse()
            .map_err(|_| "invalid expiry year".to_string())?;
        if !(1..=12).contains(&month) {
            return Err("invalid expiry month".into());
        }

        // The card is valid through the end of its expiry month.
        let expiry = chrono::NaiveDate::from_ymd_opt(2000 + year, month, 1)
            .map(|d| d + chrono::Months::new(1))
            .ok_or_else(|| "invalid expiry date".to_string())?;
        if expiry <= chrono::Utc::now().date_naive() {
            return Err("card expired".into());
        }

        Ok(())
    }
}

impl<S: Store> Engine<S> {
    /// Purchase a published course for a student.
    ///
    /// # Errors
    ///
    /// - [`EngineError::NotFound`] if the course does not exist.
    /// - [`EngineError::NotPublished`] if the course is still in draft.
    /// - [`EngineError::AlreadyPurchased`] if a purchase row exists for the
    ///   pair, regardless of its status.
    /// - [`EngineError::PaymentRejected`] on a gateway fail verdict.
    pub fn purchase(
        &self,
        course_id: &CourseId,
        student_id: &UserId,
        payment: &CardPayment,
    ) -> Result<Purchase> {
        let course = self.course_or_not_found(course_id)?;
        if !course.is_published() {
            return Err(EngineError::NotPublished);
        }
        if self.store().find_purchase(student_id, course_id)?.is_some() {
            return Err(EngineError::AlreadyPurchased);
        }

        self.gateway
            .authorize(payment)
            .map_err(EngineError::PaymentRejected)?;

        // The store re-checks uniqueness atomically with the insert; the
        // early check above only short-circuits before charging the card.
        let purchase = Purchase::new(*student_id, *course_id, course.price_cents);
        retry_conflicts(|| self.store().insert_purchase(&purchase))?;

        tracing::info!(
            purchase_id = %purchase.id,
            course_id = %course_id,
            student_id = %student_id,
            transaction_id = %purchase.transaction_id,
            "course purchased"
        );
        Ok(purchase)
    }

    /// Refund a paid purchase, flipping it to `Canceled`.
    ///
    /// # Errors
    ///
    /// - [`EngineError::NotFound`] if the purchase (or its course) does not
    ///   resolve.
    /// - [`EngineError::Forbidden`] unless the actor is an admin or the
    ///   course's owning teacher.
    /// - [`EngineError::InvalidState`] if the purchase is not in `Paid`.
    pub fn refund(&self, actor: &Actor, purchase_id: &PurchaseId) -> Result<Purchase> {
        let purchase =
            self.store()
                .get_purchase(purchase_id)?
                .ok_or_else(|| EngineError::NotFound {
                    entity: "purchase",
                    id: purchase_id.to_string(),
                })?;
        let course = self.course_or_not_found(&purchase.course_id)?;

        let target = Target::Purchase(PurchaseTarget {
            status: purchase.status,
            teacher_id: course.teacher_id,
        });
        evaluate_access(Some(actor), Action::Refund, &target).require()?;

        // The store re-checks refundability atomically with the write.
        let refunded = self.store().refund_purchase(purchase_id)?;
        tracing::info!(purchase_id = %refunded.id, actor_id = %actor.id, "purchase refunded");
        Ok(refunded)
    }

    /// A student's purchases, newest first. Self or admin only.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Forbidden`] unless the actor is the student
    /// themselves or an admin.
    pub fn purchases_of_student(
        &self,
        actor: &Actor,
        student_id: &UserId,
    ) -> Result<Vec<Purchase>> {
        if actor.role != campus_core::Role::Admin && actor.id != *student_id {
            return Err(EngineError::Forbidden);
        }
        Ok(self.store().list_purchases_by_student(student_id)?)
    }

    /// The whole ledger, paginated. Admin only.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Forbidden`] for non-admin actors.
    pub fn list_purchases(
        &self,
        actor: &Actor,
        page: campus_core::PageRequest,
    ) -> Result<campus_core::Paginated<Purchase>> {
        if actor.role != campus_core::Role::Admin {
            return Err(EngineError::Forbidden);
        }

        let (page, limit, skip, take) = crate::resolve_window(page);
        let (total, rows) = self.store().list_purchases_page(skip, take)?;
        Ok(campus_core::Paginated::new(page, limit, total, rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card() -> CardPayment {
        CardPayment {
            card_number: "4242424242424242".into(),
            holder_name: "ANA SILVA".into(),
            exp_month: "12".into(),
            exp_year: "99".into(),
            cvv: "123".into(),
        }
    }

    #[test]
    fn valid_card_passes() {
        assert!(FakeGateway.authorize(&card()).is_ok());
    }

    #[test]
    fn short_card_number_is_rejected() {
        let mut payment = card();
        payment.card_number = "4242".into();
        assert_eq!(
            FakeGateway.authorize(&payment),
            Err("invalid card number".to_string())
        );
    }

    #[test]
    fn non_numeric_card_number_is_rejected() {
        let mut payment = card();
        payment.card_number = "42424242424242xx".into();
        assert!(FakeGateway.authorize(&payment).is_err());
    }

    #[test]
    fn bad_cvv_is_rejected() {
        let mut payment = card();
        payment.cvv = "12".into();
        assert_eq!(
            FakeGateway.authorize(&payment),
            Err("invalid security code".to_string())
        );
    }

    #[test]
    fn expired_card_is_rejected() {
        let mut payment = card();
        payment.exp_month = "01".into();
        payment.exp_year = "20".into();
        assert_eq!(FakeGateway.authorize(&payment), Err("card expired".to_string()));
    }

    #[test]
    fn nonsense_expiry_is_rejected() {
        let mut payment = card();
        payment.exp_month = "13".into();
        assert_eq!(
            FakeGateway.authorize(&payment),
            Err("invalid expiry month".to_string())
        );
    }
}

//! Purchase ledger integration tests.

mod common;

use common::{valid_card, TestHarness};

use campus_core::{PageRequest, PurchaseStatus};
use campus_engine::EngineError;

#[test]
fn purchase_records_a_paid_row_at_the_course_price() {
    let harness = TestHarness::new();
    let teacher = harness.teacher();
    let course = harness.published_course(&teacher);
    let student = harness.student();

    let purchase = harness
        .engine
        .purchase(&course.id, &student.id, &valid_card())
        .unwrap();
    assert_eq!(purchase.status, PurchaseStatus::Paid);
    assert_eq!(purchase.student_id, student.id);
    assert_eq!(purchase.course_id, course.id);
    // Price is snapshotted at purchase time.
    assert_eq!(purchase.price_cents, course.price_cents);
    assert!(purchase.grants_access());
}

#[test]
fn draft_courses_cannot_be_purchased() {
    let harness = TestHarness::new();
    let teacher = harness.teacher();
    let course = harness.draft_course(&teacher);
    let student = harness.student();

    assert!(matches!(
        harness.engine.purchase(&course.id, &student.id, &valid_card()),
        Err(EngineError::NotPublished)
    ));
}

#[test]
fn duplicate_purchase_is_rejected() {
    let harness = TestHarness::new();
    let teacher = harness.teacher();
    let course = harness.published_course(&teacher);
    let student = harness.student();

    harness
        .engine
        .purchase(&course.id, &student.id, &valid_card())
        .unwrap();
    assert!(matches!(
        harness.engine.purchase(&course.id, &student.id, &valid_card()),
        Err(EngineError::AlreadyPurchased)
    ));
}

#[test]
fn refunded_purchase_still_blocks_repurchase() {
    let harness = TestHarness::new();
    let teacher = harness.teacher();
    let course = harness.published_course(&teacher);
    let student = harness.student();
    let admin = harness.admin();

    let purchase = harness
        .engine
        .purchase(&course.id, &student.id, &valid_card())
        .unwrap();
    harness.engine.refund(&admin, &purchase.id).unwrap();

    // The uniqueness check is on row existence, not status.
    assert!(matches!(
        harness.engine.purchase(&course.id, &student.id, &valid_card()),
        Err(EngineError::AlreadyPurchased)
    ));
}

#[test]
fn declined_payment_leaves_no_ledger_row() {
    let harness = TestHarness::new();
    let teacher = harness.teacher();
    let course = harness.published_course(&teacher);
    let student = harness.student();

    let mut card = valid_card();
    card.cvv = "12".into();
    assert!(matches!(
        harness.engine.purchase(&course.id, &student.id, &card),
        Err(EngineError::PaymentRejected(_))
    ));

    assert!(harness
        .engine
        .purchases_of_student(&student, &student.id)
        .unwrap()
        .is_empty());

    // A later valid attempt goes through.
    assert!(harness
        .engine
        .purchase(&course.id, &student.id, &valid_card())
        .is_ok());
}

// ============================================================================
// Refunds
// ============================================================================

#[test]
fn refund_flips_paid_to_canceled_once() {
    let harness = TestHarness::new();
    let teacher = harness.teacher();
    let course = harness.published_course(&teacher);
    let student = harness.student();

    let purchase = harness
        .engine
        .purchase(&course.id, &student.id, &valid_card())
        .unwrap();

    // The owning teacher can refund their own course's purchases.
    let refunded = harness.engine.refund(&teacher, &purchase.id).unwrap();
    assert_eq!(refunded.status, PurchaseStatus::Canceled);
    assert!(!refunded.grants_access());

    assert!(matches!(
        harness.engine.refund(&teacher, &purchase.id),
        Err(EngineError::InvalidState(_))
    ));
}

#[test]
fn refund_is_admin_or_owner_only() {
    let harness = TestHarness::new();
    let teacher = harness.teacher();
    let course = harness.published_course(&teacher);
    let student = harness.student();

    let purchase = harness
        .engine
        .purchase(&course.id, &student.id, &valid_card())
        .unwrap();

    let other_teacher = harness.teacher();
    assert!(matches!(
        harness.engine.refund(&other_teacher, &purchase.id),
        Err(EngineError::Forbidden)
    ));
    // Not even the buying student.
    assert!(matches!(
        harness.engine.refund(&student, &purchase.id),
        Err(EngineError::Forbidden)
    ));

    let admin = harness.admin();
    let refunded = harness.engine.refund(&admin, &purchase.id).unwrap();
    assert_eq!(refunded.status, PurchaseStatus::Canceled);
}

#[test]
fn refund_of_unknown_purchase_is_not_found() {
    let harness = TestHarness::new();
    let admin = harness.admin();
    assert!(matches!(
        harness
            .engine
            .refund(&admin, &campus_core::PurchaseId::generate()),
        Err(EngineError::NotFound { .. })
    ));
}

// ============================================================================
// Listings
// ============================================================================

#[test]
fn student_history_is_newest_first() {
    let harness = TestHarness::new();
    let teacher = harness.teacher();
    let student = harness.student();

    let first = harness.published_course(&teacher);
    let second = harness.published_course(&teacher);
    harness
        .engine
        .purchase(&first.id, &student.id, &valid_card())
        .unwrap();
    harness
        .engine
        .purchase(&second.id, &student.id, &valid_card())
        .unwrap();

    let history = harness
        .engine
        .purchases_of_student(&student, &student.id)
        .unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].course_id, second.id);
    assert_eq!(history[1].course_id, first.id);
}

#[test]
fn purchase_history_is_self_or_admin_only() {
    let harness = TestHarness::new();
    let teacher = harness.teacher();
    let course = harness.published_course(&teacher);
    let student = harness.student();
    harness
        .engine
        .purchase(&course.id, &student.id, &valid_card())
        .unwrap();

    let other_student = harness.student();
    assert!(matches!(
        harness.engine.purchases_of_student(&other_student, &student.id),
        Err(EngineError::Forbidden)
    ));
    assert!(matches!(
        harness.engine.purchases_of_student(&teacher, &student.id),
        Err(EngineError::Forbidden)
    ));

    let admin = harness.admin();
    assert_eq!(
        harness
            .engine
            .purchases_of_student(&admin, &student.id)
            .unwrap()
            .len(),
        1
    );
}

#[test]
fn full_ledger_is_admin_only() {
    let harness = TestHarness::new();
    let teacher = harness.teacher();
    let course = harness.published_course(&teacher);
    let student = harness.student();
    harness
        .engine
        .purchase(&course.id, &student.id, &valid_card())
        .unwrap();

    assert!(matches!(
        harness.engine.list_purchases(&teacher, PageRequest::default()),
        Err(EngineError::Forbidden)
    ));
    assert!(matches!(
        harness.engine.list_purchases(&student, PageRequest::default()),
        Err(EngineError::Forbidden)
    ));

    let admin = harness.admin();
    let ledger = harness
        .engine
        .list_purchases(&admin, PageRequest::default())
        .unwrap();
    assert_eq!(ledger.total, 1);
    assert_eq!(ledger.total_pages, 1);
    assert_eq!(ledger.data.len(), 1);
}

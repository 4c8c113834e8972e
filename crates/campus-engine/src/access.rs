//! Entitlement evaluation.
//!
//! `evaluate_access` is a pure function over a resolved target snapshot, so
//! every rule is testable without a store or a request framework. The
//! `Engine` resolution helpers build the snapshot from stored records — the
//! ownership chain (lesson → module → course → teacher) is always re-derived
//! from the store, never trusted from the caller.
//!
//! Ownership and purchase are the only two entitlement sources; the course
//! publish state is the single global visibility gate.

use campus_core::{Course, CourseId, CourseStatus, PurchaseStatus, Role, UserId};
use campus_store::Store;

use crate::error::{EngineError, Result};
use crate::Engine;

/// An authenticated caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    /// The caller's user id.
    pub id: UserId,

    /// The caller's role.
    pub role: Role,
}

impl Actor {
    /// Create an actor.
    #[must_use]
    pub const fn new(id: UserId, role: Role) -> Self {
        Self { id, role }
    }
}

/// The intended operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Read content or records.
    Read,
    /// Create a course, module, or lesson.
    Create,
    /// Update an existing record.
    Update,
    /// Delete an existing record.
    Delete,
    /// Transition a course from draft to published.
    Publish,
    /// Refund a purchase.
    Refund,
}

/// Which level of the content tree a target sits at. Course-level reads are
/// catalog metadata; module and lesson reads are paid content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentLevel {
    /// The course record itself.
    Course,
    /// A module under the course.
    Module,
    /// A lesson under a module.
    Lesson,
}

/// A resolved content node: the root course's ownership and publish state,
/// plus whether the acting student holds a paid purchase on it.
#[derive(Debug, Clone, Copy)]
pub struct ContentTarget {
    /// Where in the tree the target sits.
    pub level: ContentLevel,

    /// The root course.
    pub course_id: CourseId,

    /// The owning teacher, re-derived from the stored chain.
    pub teacher_id: UserId,

    /// The root course's publish state.
    pub status: CourseStatus,

    /// Whether the actor holds a `Paid` purchase on the root course.
    pub paid_purchase: bool,
}

/// A resolved purchase row: its status and its course's owner.
#[derive(Debug, Clone, Copy)]
pub struct PurchaseTarget {
    /// Current purchase status.
    pub status: PurchaseStatus,

    /// The teacher owning the purchased course.
    pub teacher_id: UserId,
}

/// What an access evaluation is about.
#[derive(Debug, Clone, Copy)]
pub enum Target {
    /// A course, module, or lesson with its resolved root course.
    Content(ContentTarget),

    /// A purchase ledger row.
    Purchase(PurchaseTarget),
}

/// Why access was denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// Not the owner / not an entitled role.
    Forbidden,

    /// The root course is still in draft.
    NotPublished,

    /// No paid purchase for the root course.
    NotPurchased,

    /// The target's state does not admit the action (e.g. refunding a
    /// canceled purchase).
    InvalidState,
}

/// The outcome of an entitlement evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// The action is permitted.
    Allow,

    /// The action is denied for the given reason.
    Deny(DenyReason),
}

impl Decision {
    /// Whether the decision permits the action.
    #[must_use]
    pub fn is_allow(&self) -> bool {
        matches!(self, Self::Allow)
    }

    /// Turn a denial into the corresponding engine error.
    ///
    /// # Errors
    ///
    /// Returns the mapped [`EngineError`] when the decision is a denial.
    pub fn require(self) -> Result<()> {
        match self {
            Self::Allow => Ok(()),
            Self::Deny(DenyReason::Forbidden) => Err(EngineError::Forbidden),
            Self::Deny(DenyReason::NotPublished) => Err(EngineError::NotPublished),
            Self::Deny(DenyReason::NotPurchased) => Err(EngineError::NotPurchased),
            Self::Deny(DenyReason::InvalidState) => {
                Err(EngineError::InvalidState("purchase is not refundable".into()))
            }
        }
    }
}

/// Evaluate whether `actor` may perform `action` on `target`.
///
/// `actor` is `None` for unauthenticated callers. Rules apply in precedence
/// order; the first match wins:
///
/// 1. Admins read anything and refund purchases, but never author content.
/// 2. Create/Update/Delete/Publish on content requires the owning teacher.
/// 3. Owners read their own content regardless of publish state.
/// 4. Non-owners read content only once the root course is published; the
///    course record itself is public catalog metadata, while module and
///    lesson content additionally requires a paid purchase (which only
///    students can hold).
/// 5. Refund requires admin or the purchase's course owner, and a `Paid`
///    purchase.
#[must_use]
pub fn evaluate_access(actor: Option<&Actor>, action: Action, target: &Target) -> Decision {
    match target {
        Target::Content(content) => evaluate_content(actor, action, content),
        Target::Purchase(purchase) => evaluate_purchase(actor, action, purchase),
    }
}

fn evaluate_content(actor: Option<&Actor>, action: Action, target: &ContentTarget) -> Decision {
    // Rule 1: admins observe everything but own nothing.
    if actor.is_some_and(|a| a.role == Role::Admin) {
        return match action {
            Action::Read => Decision::Allow,
            _ => Decision::Deny(DenyReason::Forbidden),
        };
    }

    let is_owner = actor.is_some_and(|a| a.role == Role::Teacher && a.id == target.teacher_id);

    match action {
        // Rule 2.
        Action::Create | Action::Update | Action::Delete | Action::Publish => {
            if is_owner {
                Decision::Allow
            } else {
                Decision::Deny(DenyReason::Forbidden)
            }
        }
        Action::Read => {
            // Rule 3: a teacher always sees their own content, drafts
            // included.
            if is_owner {
                return Decision::Allow;
            }
            // Rule 4a: the publish state is the global visibility gate.
            if target.status != CourseStatus::Published {
                return Decision::Deny(DenyReason::NotPublished);
            }
            // Rule 4: the published course record is catalog metadata,
            // readable by anyone; module and lesson content takes a paid
            // purchase.
            match target.level {
                ContentLevel::Course => Decision::Allow,
                ContentLevel::Module | ContentLevel::Lesson => {
                    if target.paid_purchase {
                        Decision::Allow
                    } else {
                        Decision::Deny(DenyReason::NotPurchased)
                    }
                }
            }
        }
        // Refund is defined on purchases only.
        Action::Refund => Decision::Deny(DenyReason::Forbidden),
    }
}

fn evaluate_purchase(actor: Option<&Actor>, action: Action, target: &PurchaseTarget) -> Decision {
    match action {
        // Rule 5.
        Action::Refund => {
            let entitled =
                actor.is_some_and(|a| a.role == Role::Admin || a.id == target.teacher_id);
            if !entitled {
                return Decision::Deny(DenyReason::Forbidden);
            }
            if target.status != PurchaseStatus::Paid {
                return Decision::Deny(DenyReason::InvalidState);
            }
            Decision::Allow
        }
        // Rule 1 covers admin reads of the ledger; nobody else reads
        // arbitrary purchase rows through the engine.
        Action::Read => {
            if actor.is_some_and(|a| a.role == Role::Admin) {
                Decision::Allow
            } else {
                Decision::Deny(DenyReason::Forbidden)
            }
        }
        _ => Decision::Deny(DenyReason::Forbidden),
    }
}

impl<S: Store> Engine<S> {
    /// Load a course or fail with `NotFound`.
    pub(crate) fn course_or_not_found(&self, id: &CourseId) -> Result<Course> {
        self.store()
            .get_course(id)?
            .ok_or_else(|| EngineError::NotFound {
                entity: "course",
                id: id.to_string(),
            })
    }

    /// Build a resolved content target for `course`, looking up the actor's
    /// purchase when the decision can depend on it.
    pub(crate) fn content_target(
        &self,
        actor: Option<&Actor>,
        level: ContentLevel,
        course: &Course,
    ) -> Result<Target> {
        let paid_purchase = match actor {
            Some(a) if a.role == Role::Student && a.id != course.teacher_id => self
                .store()
                .find_purchase(&a.id, &course.id)?
                .is_some_and(|p| p.grants_access()),
            _ => false,
        };

        Ok(Target::Content(ContentTarget {
            level,
            course_id: course.id,
            teacher_id: course.teacher_id,
            status: course.status,
            paid_purchase,
        }))
    }

    /// Resolve, evaluate, and enforce in one step.
    pub(crate) fn check_content(
        &self,
        actor: Option<&Actor>,
        action: Action,
        level: ContentLevel,
        course: &Course,
    ) -> Result<()> {
        let target = self.content_target(actor, level, course)?;
        evaluate_access(actor, action, &target).require()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn content(
        level: ContentLevel,
        teacher_id: UserId,
        status: CourseStatus,
        paid_purchase: bool,
    ) -> Target {
        Target::Content(ContentTarget {
            level,
            course_id: CourseId::generate(),
            teacher_id,
            status,
            paid_purchase,
        })
    }

    #[test]
    fn admin_reads_anything() {
        let admin = Actor::new(UserId::generate(), Role::Admin);
        let target = content(
            ContentLevel::Lesson,
            UserId::generate(),
            CourseStatus::Draft,
            false,
        );
        assert!(evaluate_access(Some(&admin), Action::Read, &target).is_allow());
    }

    #[test]
    fn admin_never_authors_content() {
        let admin = Actor::new(UserId::generate(), Role::Admin);
        let target = content(
            ContentLevel::Course,
            admin.id,
            CourseStatus::Published,
            false,
        );
        for action in [Action::Create, Action::Update, Action::Delete, Action::Publish] {
            assert_eq!(
                evaluate_access(Some(&admin), action, &target),
                Decision::Deny(DenyReason::Forbidden)
            );
        }
    }

    #[test]
    fn owner_mutates_and_publishes() {
        let teacher = Actor::new(UserId::generate(), Role::Teacher);
        let target = content(ContentLevel::Module, teacher.id, CourseStatus::Draft, false);
        for action in [Action::Create, Action::Update, Action::Delete, Action::Publish] {
            assert!(evaluate_access(Some(&teacher), action, &target).is_allow());
        }
    }

    #[test]
    fn non_owner_teacher_cannot_mutate() {
        let teacher = Actor::new(UserId::generate(), Role::Teacher);
        let target = content(
            ContentLevel::Module,
            UserId::generate(),
            CourseStatus::Published,
            false,
        );
        assert_eq!(
            evaluate_access(Some(&teacher), Action::Update, &target),
            Decision::Deny(DenyReason::Forbidden)
        );
    }

    #[test]
    fn student_never_mutates_content() {
        let student = Actor::new(UserId::generate(), Role::Student);
        let target = content(
            ContentLevel::Course,
            UserId::generate(),
            CourseStatus::Published,
            true,
        );
        assert_eq!(
            evaluate_access(Some(&student), Action::Create, &target),
            Decision::Deny(DenyReason::Forbidden)
        );
    }

    #[test]
    fn owner_reads_own_draft() {
        let teacher = Actor::new(UserId::generate(), Role::Teacher);
        let target = content(ContentLevel::Lesson, teacher.id, CourseStatus::Draft, false);
        assert!(evaluate_access(Some(&teacher), Action::Read, &target).is_allow());
    }

    #[test]
    fn draft_is_invisible_to_non_owners() {
        let target = content(
            ContentLevel::Course,
            UserId::generate(),
            CourseStatus::Draft,
            true,
        );
        let student = Actor::new(UserId::generate(), Role::Student);
        assert_eq!(
            evaluate_access(Some(&student), Action::Read, &target),
            Decision::Deny(DenyReason::NotPublished)
        );
        assert_eq!(
            evaluate_access(None, Action::Read, &target),
            Decision::Deny(DenyReason::NotPublished)
        );
    }

    #[test]
    fn paid_student_reads_content() {
        let student = Actor::new(UserId::generate(), Role::Student);
        for level in [ContentLevel::Course, ContentLevel::Module, ContentLevel::Lesson] {
            let target = content(level, UserId::generate(), CourseStatus::Published, true);
            assert!(evaluate_access(Some(&student), Action::Read, &target).is_allow());
        }
    }

    #[test]
    fn unpaid_student_is_denied_content() {
        let student = Actor::new(UserId::generate(), Role::Student);
        for level in [ContentLevel::Module, ContentLevel::Lesson] {
            let target = content(level, UserId::generate(), CourseStatus::Published, false);
            assert_eq!(
                evaluate_access(Some(&student), Action::Read, &target),
                Decision::Deny(DenyReason::NotPurchased)
            );
        }
    }

    #[test]
    fn unpaid_student_reads_published_course_record() {
        // The course record is catalog metadata: browsing the catalog never
        // requires a purchase.
        let student = Actor::new(UserId::generate(), Role::Student);
        let target = content(
            ContentLevel::Course,
            UserId::generate(),
            CourseStatus::Published,
            false,
        );
        assert!(evaluate_access(Some(&student), Action::Read, &target).is_allow());
    }

    #[test]
    fn anonymous_reads_catalog_but_not_content() {
        let owner = UserId::generate();
        let course = content(ContentLevel::Course, owner, CourseStatus::Published, false);
        assert!(evaluate_access(None, Action::Read, &course).is_allow());

        let lesson = content(ContentLevel::Lesson, owner, CourseStatus::Published, false);
        assert_eq!(
            evaluate_access(None, Action::Read, &lesson),
            Decision::Deny(DenyReason::NotPurchased)
        );
    }

    #[test]
    fn anonymous_never_mutates() {
        let target = content(
            ContentLevel::Course,
            UserId::generate(),
            CourseStatus::Published,
            false,
        );
        assert_eq!(
            evaluate_access(None, Action::Delete, &target),
            Decision::Deny(DenyReason::Forbidden)
        );
    }

    #[test]
    fn refund_requires_admin_or_owner() {
        let teacher_id = UserId::generate();
        let target = Target::Purchase(PurchaseTarget {
            status: PurchaseStatus::Paid,
            teacher_id,
        });

        let admin = Actor::new(UserId::generate(), Role::Admin);
        assert!(evaluate_access(Some(&admin), Action::Refund, &target).is_allow());

        let owner = Actor::new(teacher_id, Role::Teacher);
        assert!(evaluate_access(Some(&owner), Action::Refund, &target).is_allow());

        let other = Actor::new(UserId::generate(), Role::Teacher);
        assert_eq!(
            evaluate_access(Some(&other), Action::Refund, &target),
            Decision::Deny(DenyReason::Forbidden)
        );

        let student = Actor::new(UserId::generate(), Role::Student);
        assert_eq!(
            evaluate_access(Some(&student), Action::Refund, &target),
            Decision::Deny(DenyReason::Forbidden)
        );
    }

    #[test]
    fn refunding_canceled_purchase_is_invalid_state() {
        let admin = Actor::new(UserId::generate(), Role::Admin);
        let target = Target::Purchase(PurchaseTarget {
            status: PurchaseStatus::Canceled,
            teacher_id: UserId::generate(),
        });
        assert_eq!(
            evaluate_access(Some(&admin), Action::Refund, &target),
            Decision::Deny(DenyReason::InvalidState)
        );
    }

    #[test]
    fn permission_outranks_state_on_refund() {
        // A non-entitled caller on a canceled purchase sees Forbidden, not
        // InvalidState.
        let student = Actor::new(UserId::generate(), Role::Student);
        let target = Target::Purchase(PurchaseTarget {
            status: PurchaseStatus::Canceled,
            teacher_id: UserId::generate(),
        });
        assert_eq!(
            evaluate_access(Some(&student), Action::Refund, &target),
            Decision::Deny(DenyReason::Forbidden)
        );
    }

    #[test]
    fn only_admin_reads_ledger_rows() {
        let target = Target::Purchase(PurchaseTarget {
            status: PurchaseStatus::Paid,
            teacher_id: UserId::generate(),
        });
        let admin = Actor::new(UserId::generate(), Role::Admin);
        assert!(evaluate_access(Some(&admin), Action::Read, &target).is_allow());
        assert_eq!(
            evaluate_access(None, Action::Read, &target),
            Decision::Deny(DenyReason::Forbidden)
        );
    }
}

//! Entitlement and content-access engine for campus.
//!
//! This crate is the decision core behind the course marketplace API:
//!
//! - **Entitlement evaluation** ([`access`]): a pure
//!   `evaluate_access(actor, action, target)` function returning
//!   `Allow`/`Deny(reason)`, called before every mutating or content-read
//!   operation.
//! - **Publish state machine** ([`publish`]): the one-way `Draft` →
//!   `Published` transition, gated on ownership and a non-empty course.
//! - **Purchase ledger** ([`ledger`]): one purchase per (student, course),
//!   payment gated by an opaque [`PaymentGateway`] verdict, refund as a
//!   status flip.
//! - **Catalog operations** ([`courses`], [`content`], [`users`]):
//!   entitlement-gated CRUD with append-at-end position allocation and
//!   atomic count-then-list pagination.
//!
//! The engine holds no mutable state of its own; everything lives in the
//! [`Store`]. Entitlement failures are permanent for a given input and are
//! never retried; transient store conflicts on inserts are retried a bounded
//! number of times.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod access;
pub mod content;
pub mod courses;
pub mod error;
pub mod ledger;
pub mod publish;
pub mod users;

use std::sync::Arc;

use campus_store::Store;

pub use access::{evaluate_access, Action, Actor, ContentLevel, Decision, DenyReason, Target};
pub use content::{CreateLesson, CreateModule, UpdateLesson, UpdateModule};
pub use courses::{CourseStatsView, CreateCourse, PublicCourse, UpdateCourse};
pub use error::{EngineError, Result};
pub use ledger::{FakeGateway, PaymentGateway};
pub use users::CreateUser;

/// Bounded attempts for inserts that can lose a transient position or
/// uniqueness race before the engine surfaces `Conflict`.
const CONFLICT_RETRIES: u32 = 3;

/// The engine: entitlement checks plus store-backed operations.
///
/// Cloning is cheap; the store and gateway are shared.
pub struct Engine<S> {
    store: Arc<S>,
    gateway: Arc<dyn PaymentGateway>,
}

impl<S> Clone for Engine<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            gateway: Arc::clone(&self.gateway),
        }
    }
}

impl<S: Store> Engine<S> {
    /// Create an engine over a store and a payment gateway.
    pub fn new(store: Arc<S>, gateway: Arc<dyn PaymentGateway>) -> Self {
        Self { store, gateway }
    }

    /// The underlying store.
    #[must_use]
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }
}

/// Resolve a page request into `(page, limit, skip, take)`. The page count
/// is computed after the store returns the atomic total.
pub(crate) fn resolve_window(req: campus_core::PageRequest) -> (u32, u32, usize, usize) {
    let (page, limit) = req.resolve();
    let window = campus_core::paginate(page, limit, 0);
    (page, limit, window.skip, window.take)
}

/// Run a store insert, retrying transient conflicts a bounded number of
/// times. Anything other than `Conflict` propagates immediately.
pub(crate) fn retry_conflicts<T>(
    mut op: impl FnMut() -> campus_store::Result<T>,
) -> campus_store::Result<T> {
    let mut attempt = 1;
    loop {
        match op() {
            Err(campus_store::StoreError::Conflict) if attempt < CONFLICT_RETRIES => {
                tracing::warn!(attempt, "insert lost a write race, retrying");
                attempt += 1;
            }
            other => return other,
        }
    }
}

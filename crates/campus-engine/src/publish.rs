//! The publish state machine.
//!
//! `Draft` is the initial state, `Published` the terminal one; no other
//! transition exists. The entitlement check runs first (a denial is
//! permanent), then the status check and the non-empty-course precondition
//! run atomically with the write inside the store, so two concurrent
//! publishes cannot both pass.

use campus_core::{Course, CourseId};
use campus_store::Store;

use crate::access::{Action, Actor, ContentLevel};
use crate::error::Result;
use crate::Engine;

impl<S: Store> Engine<S> {
    /// Publish a draft course.
    ///
    /// # Errors
    ///
    /// - [`EngineError::NotFound`](crate::EngineError::NotFound) if the
    ///   course does not exist.
    /// - [`EngineError::Forbidden`](crate::EngineError::Forbidden) if the
    ///   actor is not the owning teacher.
    /// - [`EngineError::InvalidState`](crate::EngineError::InvalidState) if
    ///   the course is already published.
    /// - [`EngineError::PreconditionFailed`](crate::EngineError::PreconditionFailed)
    ///   if the course has zero modules.
    pub fn publish(&self, actor: &Actor, course_id: &CourseId) -> Result<Course> {
        let course = self.course_or_not_found(course_id)?;
        self.check_content(Some(actor), Action::Publish, ContentLevel::Course, &course)?;

        let published = self.store().publish_course(course_id)?;
        tracing::info!(course_id = %published.id, teacher_id = %actor.id, "course published");
        Ok(published)
    }
}

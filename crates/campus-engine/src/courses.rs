//! Course catalog operations.
//!
//! Creation is teacher-only; updates and deletion go through the
//! entitlement engine (owner only, `teacher_id` and `status` are never
//! writable through update). The public catalog lists published courses
//! only; a teacher's own listing includes drafts.

use campus_core::{Course, CourseId, CourseStatus, PageRequest, Paginated, Role, UserId};
use campus_store::Store;
use serde::{Deserialize, Serialize};

use crate::access::{Action, Actor, ContentLevel};
use crate::error::{EngineError, Result};
use crate::Engine;

/// Fields for creating a course.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCourse {
    /// Course title.
    pub title: String,

    /// Catalog description.
    pub description: String,

    /// Price in integer cents.
    pub price_cents: i64,
}

/// Partial update of a course; `None` fields keep their current value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCourse {
    /// New title.
    pub title: Option<String>,

    /// New description.
    pub description: Option<String>,

    /// New price in integer cents.
    pub price_cents: Option<i64>,
}

/// Aggregate stats shown on a public course page.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct CourseStatsView {
    /// Number of modules.
    pub modules: u64,

    /// Number of lessons.
    pub lessons: u64,

    /// Total lesson duration in seconds.
    pub duration_secs: u64,
}

/// Catalog-level metadata of a published course: everything a caller
/// without a purchase may see.
#[derive(Debug, Clone, Serialize)]
pub struct PublicCourse {
    /// The course id.
    pub id: CourseId,

    /// Course title.
    pub title: String,

    /// Catalog description.
    pub description: String,

    /// Price in integer cents.
    pub price_cents: i64,

    /// The owning teacher.
    pub teacher_id: UserId,

    /// Content statistics.
    pub stats: CourseStatsView,
}

impl<S: Store> Engine<S> {
    /// Create a draft course owned by the acting teacher.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Forbidden`] unless the actor is a teacher.
    pub fn create_course(&self, actor: &Actor, input: CreateCourse) -> Result<Course> {
        // Creation has no existing owner to resolve; the role check is the
        // whole of rule 2 here.
        if actor.role != Role::Teacher {
            return Err(EngineError::Forbidden);
        }

        let course = Course::new(actor.id, input.title, input.description, input.price_cents);
        self.store().put_course(&course)?;

        tracing::info!(course_id = %course.id, teacher_id = %actor.id, "course created");
        Ok(course)
    }

    /// Read one course record, entitlement-gated.
    ///
    /// Course-level reads are catalog metadata, so any caller can read a
    /// published course; drafts resolve for their owner (and admins) only.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotFound`], or an entitlement denial.
    pub fn course(&self, actor: Option<&Actor>, id: &CourseId) -> Result<Course> {
        let course = self.course_or_not_found(id)?;
        self.check_content(actor, Action::Read, ContentLevel::Course, &course)?;
        Ok(course)
    }

    /// Public course page: catalog metadata plus content stats.
    ///
    /// A draft course is indistinguishable from a missing one here.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotFound`] for missing or draft courses.
    pub fn public_course(&self, id: &CourseId) -> Result<PublicCourse> {
        let course = self.course_or_not_found(id)?;
        if !course.is_published() {
            return Err(EngineError::NotFound {
                entity: "course",
                id: id.to_string(),
            });
        }

        let stats = self.store().course_stats(id)?;
        Ok(PublicCourse {
            id: course.id,
            title: course.title,
            description: course.description,
            price_cents: course.price_cents,
            teacher_id: course.teacher_id,
            stats: CourseStatsView {
                modules: stats.modules,
                lessons: stats.lessons,
                duration_secs: stats.duration_secs,
            },
        })
    }

    /// The public catalog: published courses only, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the store read fails.
    pub fn list_courses(&self, page: PageRequest) -> Result<Paginated<Course>> {
        let (page, limit, skip, take) = crate::resolve_window(page);
        let (total, rows) =
            self.store()
                .list_courses_page(Some(CourseStatus::Published), skip, take)?;
        Ok(Paginated::new(page, limit, total, rows))
    }

    /// The acting teacher's own courses, drafts included, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Forbidden`] unless the actor is a teacher.
    pub fn courses_of_teacher(
        &self,
        actor: &Actor,
        page: PageRequest,
    ) -> Result<Paginated<Course>> {
        if actor.role != Role::Teacher {
            return Err(EngineError::Forbidden);
        }

        let (page, limit, skip, take) = crate::resolve_window(page);
        let (total, rows) = self
            .store()
            .list_courses_by_teacher_page(&actor.id, skip, take)?;
        Ok(Paginated::new(page, limit, total, rows))
    }

    /// Update a course's editable fields. Ownership and publish state are
    /// not writable here.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotFound`] or an entitlement denial.
    pub fn update_course(
        &self,
        actor: &Actor,
        id: &CourseId,
        input: UpdateCourse,
    ) -> Result<Course> {
        let mut course = self.course_or_not_found(id)?;
        self.check_content(Some(actor), Action::Update, ContentLevel::Course, &course)?;

        if let Some(title) = input.title {
            course.title = title;
        }
        if let Some(description) = input.description {
            course.description = description;
        }
        if let Some(price_cents) = input.price_cents {
            course.price_cents = price_cents;
        }
        course.updated_at = chrono::Utc::now();

        self.store().put_course(&course)?;
        Ok(course)
    }

    /// Delete a course; the store cascades to modules and lessons.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotFound`] or an entitlement denial.
    pub fn delete_course(&self, actor: &Actor, id: &CourseId) -> Result<()> {
        let course = self.course_or_not_found(id)?;
        self.check_content(Some(actor), Action::Delete, ContentLevel::Course, &course)?;

        self.store().delete_course(id)?;
        tracing::info!(course_id = %id, teacher_id = %actor.id, "course deleted");
        Ok(())
    }
}

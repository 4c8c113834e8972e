//! Module and lesson operations.
//!
//! Authoring (create/update/delete) is owner-only; reads go through the
//! entitlement engine at `Module`/`Lesson` level, so they require a paid
//! purchase unless the caller owns the course. Creation appends at the end
//! of the parent's ordering — positions come from the store's allocator,
//! never from the caller, and reordering is unsupported.

use campus_core::{
    CourseId, Lesson, LessonId, Module, ModuleId, NewLesson, NewModule, PageRequest, Paginated,
};
use campus_store::Store;
use serde::Deserialize;

use crate::access::{Action, Actor, ContentLevel};
use crate::error::{EngineError, Result};
use crate::{retry_conflicts, Engine};

/// Fields for creating a module.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateModule {
    /// Module title.
    pub title: String,
}

/// Partial update of a module.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateModule {
    /// New title.
    pub title: Option<String>,
}

/// Fields for creating a lesson.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateLesson {
    /// Lesson title.
    pub title: String,

    /// Where the lesson video is hosted.
    pub video_url: String,

    /// Video length in seconds.
    pub duration_secs: u32,
}

/// Partial update of a lesson.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateLesson {
    /// New title.
    pub title: Option<String>,

    /// New video URL.
    pub video_url: Option<String>,

    /// New duration in seconds.
    pub duration_secs: Option<u32>,
}

impl<S: Store> Engine<S> {
    /// Load a module, insisting it belongs to the given course.
    fn module_in_course(&self, course_id: &CourseId, module_id: &ModuleId) -> Result<Module> {
        let module = self
            .store()
            .get_module(module_id)?
            .filter(|m| m.course_id == *course_id)
            .ok_or_else(|| EngineError::NotFound {
                entity: "module",
                id: module_id.to_string(),
            })?;
        Ok(module)
    }

    /// Load a lesson, insisting it belongs to the given module.
    fn lesson_in_module(&self, module_id: &ModuleId, lesson_id: &LessonId) -> Result<Lesson> {
        let lesson = self
            .store()
            .get_lesson(lesson_id)?
            .filter(|l| l.module_id == *module_id)
            .ok_or_else(|| EngineError::NotFound {
                entity: "lesson",
                id: lesson_id.to_string(),
            })?;
        Ok(lesson)
    }

    // =========================================================================
    // Modules
    // =========================================================================

    /// Append a module at the end of a course's ordering.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotFound`], an entitlement denial, or
    /// [`EngineError::Conflict`] when a position race exhausts its retries.
    pub fn create_module(
        &self,
        actor: &Actor,
        course_id: &CourseId,
        input: CreateModule,
    ) -> Result<Module> {
        let course = self.course_or_not_found(course_id)?;
        self.check_content(Some(actor), Action::Create, ContentLevel::Module, &course)?;

        let module = retry_conflicts(|| {
            self.store().insert_module(NewModule {
                course_id: *course_id,
                title: input.title.clone(),
            })
        })?;

        tracing::debug!(module_id = %module.id, course_id = %course_id, position = module.position, "module created");
        Ok(module)
    }

    /// Read one module, entitlement-gated at module level.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotFound`] (including a module under a
    /// different course) or an entitlement denial.
    pub fn module(
        &self,
        actor: Option<&Actor>,
        course_id: &CourseId,
        module_id: &ModuleId,
    ) -> Result<Module> {
        let course = self.course_or_not_found(course_id)?;
        self.check_content(actor, Action::Read, ContentLevel::Module, &course)?;
        self.module_in_course(course_id, module_id)
    }

    /// One page of a course's modules in position order.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotFound`] or an entitlement denial.
    pub fn modules_page(
        &self,
        actor: Option<&Actor>,
        course_id: &CourseId,
        page: PageRequest,
    ) -> Result<Paginated<Module>> {
        let course = self.course_or_not_found(course_id)?;
        self.check_content(actor, Action::Read, ContentLevel::Module, &course)?;

        let (page, limit, skip, take) = crate::resolve_window(page);
        let (total, rows) = self.store().list_modules_page(course_id, skip, take)?;
        Ok(Paginated::new(page, limit, total, rows))
    }

    /// Update a module's title. Positions are allocator-owned and cannot be
    /// changed.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotFound`] or an entitlement denial.
    pub fn update_module(
        &self,
        actor: &Actor,
        course_id: &CourseId,
        module_id: &ModuleId,
        input: UpdateModule,
    ) -> Result<Module> {
        let course = self.course_or_not_found(course_id)?;
        self.check_content(Some(actor), Action::Update, ContentLevel::Module, &course)?;

        let mut module = self.module_in_course(course_id, module_id)?;
        if let Some(title) = input.title {
            module.title = title;
        }
        self.store().put_module(&module)?;
        Ok(module)
    }

    /// Delete a module; the store cascades to its lessons.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotFound`] or an entitlement denial.
    pub fn delete_module(
        &self,
        actor: &Actor,
        course_id: &CourseId,
        module_id: &ModuleId,
    ) -> Result<()> {
        let course = self.course_or_not_found(course_id)?;
        self.check_content(Some(actor), Action::Delete, ContentLevel::Module, &course)?;

        self.module_in_course(course_id, module_id)?;
        self.store().delete_module(module_id)?;
        Ok(())
    }

    // =========================================================================
    // Lessons
    // =========================================================================

    /// Append a lesson at the end of a module's ordering.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotFound`], an entitlement denial, or
    /// [`EngineError::Conflict`] when a position race exhausts its retries.
    pub fn create_lesson(
        &self,
        actor: &Actor,
        course_id: &CourseId,
        module_id: &ModuleId,
        input: CreateLesson,
    ) -> Result<Lesson> {
        let course = self.course_or_not_found(course_id)?;
        self.check_content(Some(actor), Action::Create, ContentLevel::Lesson, &course)?;
        let module = self.module_in_course(course_id, module_id)?;

        let lesson = retry_conflicts(|| {
            self.store().insert_lesson(NewLesson {
                module_id: module.id,
                title: input.title.clone(),
                video_url: input.video_url.clone(),
                duration_secs: input.duration_secs,
            })
        })?;

        tracing::debug!(lesson_id = %lesson.id, module_id = %module_id, position = lesson.position, "lesson created");
        Ok(lesson)
    }

    /// Read one lesson, entitlement-gated at lesson level.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotFound`] or an entitlement denial.
    pub fn lesson(
        &self,
        actor: Option<&Actor>,
        course_id: &CourseId,
        module_id: &ModuleId,
        lesson_id: &LessonId,
    ) -> Result<Lesson> {
        let course = self.course_or_not_found(course_id)?;
        self.check_content(actor, Action::Read, ContentLevel::Lesson, &course)?;

        let module = self.module_in_course(course_id, module_id)?;
        self.lesson_in_module(&module.id, lesson_id)
    }

    /// One page of a module's lessons in position order.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotFound`] or an entitlement denial.
    pub fn lessons_page(
        &self,
        actor: Option<&Actor>,
        course_id: &CourseId,
        module_id: &ModuleId,
        page: PageRequest,
    ) -> Result<Paginated<Lesson>> {
        let course = self.course_or_not_found(course_id)?;
        self.check_content(actor, Action::Read, ContentLevel::Lesson, &course)?;
        let module = self.module_in_course(course_id, module_id)?;

        let (page, limit, skip, take) = crate::resolve_window(page);
        let (total, rows) = self.store().list_lessons_page(&module.id, skip, take)?;
        Ok(Paginated::new(page, limit, total, rows))
    }

    /// Update a lesson's editable fields.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotFound`] or an entitlement denial.
    pub fn update_lesson(
        &self,
        actor: &Actor,
        course_id: &CourseId,
        module_id: &ModuleId,
        lesson_id: &LessonId,
        input: UpdateLesson,
    ) -> Result<Lesson> {
        let course = self.course_or_not_found(course_id)?;
        self.check_content(Some(actor), Action::Update, ContentLevel::Lesson, &course)?;

        let module = self.module_in_course(course_id, module_id)?;
        let mut lesson = self.lesson_in_module(&module.id, lesson_id)?;
        if let Some(title) = input.title {
            lesson.title = title;
        }
        if let Some(video_url) = input.video_url {
            lesson.video_url = video_url;
        }
        if let Some(duration_secs) = input.duration_secs {
            lesson.duration_secs = duration_secs;
        }
        self.store().put_lesson(&lesson)?;
        Ok(lesson)
    }

    /// Delete a lesson.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotFound`] or an entitlement denial.
    pub fn delete_lesson(
        &self,
        actor: &Actor,
        course_id: &CourseId,
        module_id: &ModuleId,
        lesson_id: &LessonId,
    ) -> Result<()> {
        let course = self.course_or_not_found(course_id)?;
        self.check_content(Some(actor), Action::Delete, ContentLevel::Lesson, &course)?;

        let module = self.module_in_course(course_id, module_id)?;
        self.lesson_in_module(&module.id, lesson_id)?;
        self.store().delete_lesson(lesson_id)?;
        Ok(())
    }
}

//! Modules and lessons: the ordered content tree under a course.
//!
//! Positions are positive, dense, and unique within the parent; they are
//! assigned by the storage layer at insert time (append at end), never by
//! callers. `NewModule` / `NewLesson` are the pre-insert shapes without an
//! id or position.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{CourseId, LessonId, ModuleId};

/// A module: an ordered chapter within a course.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Module {
    /// The module id.
    pub id: ModuleId,

    /// The owning course.
    pub course_id: CourseId,

    /// Module title.
    pub title: String,

    /// 1-based position within the course. Unique per course.
    pub position: u32,

    /// When the module was created.
    pub created_at: DateTime<Utc>,
}

/// A module awaiting insertion; the store assigns id and position.
#[derive(Debug, Clone)]
pub struct NewModule {
    /// The course to append to.
    pub course_id: CourseId,

    /// Module title.
    pub title: String,
}

/// A lesson: an ordered unit of content within a module.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lesson {
    /// The lesson id.
    pub id: LessonId,

    /// The owning module.
    pub module_id: ModuleId,

    /// Lesson title.
    pub title: String,

    /// Where the lesson video is hosted.
    pub video_url: String,

    /// Video length in seconds.
    pub duration_secs: u32,

    /// 1-based position within the module. Unique per module.
    pub position: u32,

    /// When the lesson was created.
    pub created_at: DateTime<Utc>,
}

/// A lesson awaiting insertion; the store assigns id and position.
#[derive(Debug, Clone)]
pub struct NewLesson {
    /// The module to append to.
    pub module_id: ModuleId,

    /// Lesson title.
    pub title: String,

    /// Where the lesson video is hosted.
    pub video_url: String,

    /// Video length in seconds.
    pub duration_secs: u32,
}

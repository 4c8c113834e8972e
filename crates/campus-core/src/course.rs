//! Course records and the publish lifecycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{CourseId, UserId};

/// Publish state of a course.
///
/// The only defined transition is `Draft` → `Published`; `Published` is
/// terminal. A draft course is visible to its owning teacher only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CourseStatus {
    /// Being authored; invisible to everyone but the owner.
    Draft,

    /// Live in the catalog and purchasable.
    Published,
}

/// A course authored by a teacher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    /// The course id.
    pub id: CourseId,

    /// The owning teacher. Immutable after creation; every ownership check
    /// re-derives from this field, never from caller input.
    pub teacher_id: UserId,

    /// Course title.
    pub title: String,

    /// Catalog description.
    pub description: String,

    /// Price in integer cents.
    pub price_cents: i64,

    /// Publish state.
    pub status: CourseStatus,

    /// When the course was created.
    pub created_at: DateTime<Utc>,

    /// When the course was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Course {
    /// Create a new draft course owned by `teacher_id`.
    #[must_use]
    pub fn new(
        teacher_id: UserId,
        title: impl Into<String>,
        description: impl Into<String>,
        price_cents: i64,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: CourseId::generate(),
            teacher_id,
            title: title.into(),
            description: description.into(),
            price_cents,
            status: CourseStatus::Draft,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the course is live in the catalog.
    #[must_use]
    pub fn is_published(&self) -> bool {
        self.status == CourseStatus::Published
    }

    /// Whether `user_id` owns this course.
    #[must_use]
    pub fn is_owned_by(&self, user_id: &UserId) -> bool {
        self.teacher_id == *user_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_course_starts_as_draft() {
        let teacher = UserId::generate();
        let course = Course::new(teacher, "Rust 101", "intro", 4990);
        assert_eq!(course.status, CourseStatus::Draft);
        assert!(!course.is_published());
        assert!(course.is_owned_by(&teacher));
    }

    #[test]
    fn status_wire_values() {
        assert_eq!(
            serde_json::to_string(&CourseStatus::Draft).unwrap(),
            "\"DRAFT\""
        );
        assert_eq!(
            serde_json::to_string(&CourseStatus::Published).unwrap(),
            "\"PUBLISHED\""
        );
    }
}

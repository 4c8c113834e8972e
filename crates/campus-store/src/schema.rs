//! Database schema definitions and column families.

/// Column family names for the `RocksDB` database.
pub mod cf {
    /// User records, keyed by `user_id`.
    pub const USERS: &str = "users";

    /// Course records, keyed by `course_id`.
    pub const COURSES: &str = "courses";

    /// Module records, keyed by `module_id`.
    pub const MODULES: &str = "modules";

    /// Index: modules by course, keyed by `course_id || position (u32 BE)`.
    /// Value is the module id. Big-endian positions keep prefix iteration in
    /// course order; one key per position slot enforces uniqueness.
    pub const MODULES_BY_COURSE: &str = "modules_by_course";

    /// Lesson records, keyed by `lesson_id`.
    pub const LESSONS: &str = "lessons";

    /// Index: lessons by module, keyed by `module_id || position (u32 BE)`.
    /// Value is the lesson id.
    pub const LESSONS_BY_MODULE: &str = "lessons_by_module";

    /// Purchase ledger rows, keyed by `purchase_id`.
    pub const PURCHASES: &str = "purchases";

    /// Unique index: purchases by `(student, course)`, keyed by
    /// `student_id || course_id`. Value is the purchase id. One key per pair
    /// is the one-active-purchase constraint.
    pub const PURCHASES_BY_PAIR: &str = "purchases_by_pair";
}

/// Returns all column family names for database initialization.
#[must_use]
pub fn all_column_families() -> Vec<&'static str> {
    vec![
        cf::USERS,
        cf::COURSES,
        cf::MODULES,
        cf::MODULES_BY_COURSE,
        cf::LESSONS,
        cf::LESSONS_BY_MODULE,
        cf::PURCHASES,
        cf::PURCHASES_BY_PAIR,
    ]
}

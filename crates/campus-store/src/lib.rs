//! `RocksDB` storage layer for campus.
//!
//! This crate provides persistent storage for users, courses, modules,
//! lessons, and the purchase ledger using `RocksDB` with column families for
//! ordering and uniqueness indexes.
//!
//! # Atomicity
//!
//! The [`Store`] trait exposes compound operations for every
//! read-check-write sequence the engine must run atomically: position
//! allocation (`insert_module` / `insert_lesson`), purchase creation
//! (`insert_purchase`), the publish transition (`publish_course`), refund
//! (`refund_purchase`), and count-then-list page reads (`*_page`). The
//! `RocksDB` implementation serializes these through a store-level lock; a
//! relational backend would use serializable transactions or unique
//! constraints instead, surfacing [`StoreError::Conflict`] when a retryable
//! race loses.
//!
//! # Example
//!
//! ```no_run
//! use campus_store::{RocksStore, Store};
//! use campus_core::{Course, UserId};
//!
//! let store = RocksStore::open("/tmp/campus-db").unwrap();
//!
//! let teacher = UserId::generate();
//! let course = Course::new(teacher, "Rust 101", "intro", 4990);
//! store.put_course(&course).unwrap();
//!
//! let found = store.get_course(&course.id).unwrap();
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod keys;
pub mod rocks;
pub mod schema;

pub use error::{Result, StoreError};
pub use rocks::RocksStore;

use campus_core::{
    Course, CourseId, CourseStatus, Lesson, LessonId, Module, ModuleId, NewLesson, NewModule,
    Purchase, PurchaseId, User, UserId,
};

/// Aggregate content statistics of one course, computed in a single read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CourseStats {
    /// Number of modules.
    pub modules: u64,

    /// Number of lessons across all modules.
    pub lessons: u64,

    /// Total lesson duration in seconds.
    pub duration_secs: u64,
}

/// The storage trait defining all database operations.
///
/// This abstracts the storage layer, allowing different implementations
/// (`RocksDB` here; any store with atomic transactions and unique
/// constraints qualifies).
pub trait Store: Send + Sync {
    // =========================================================================
    // User Operations
    // =========================================================================

    /// Insert or update a user record.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn put_user(&self, user: &User) -> Result<()>;

    /// Get a user by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_user(&self, id: &UserId) -> Result<Option<User>>;

    /// Delete a user by id.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the user doesn't exist.
    fn delete_user(&self, id: &UserId) -> Result<()>;

    /// Count all users and return one page, in a single atomic read.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn list_users_page(&self, skip: usize, take: usize) -> Result<(u64, Vec<User>)>;

    // =========================================================================
    // Course Operations
    // =========================================================================

    /// Insert or update a course record.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn put_course(&self, course: &Course) -> Result<()>;

    /// Get a course by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_course(&self, id: &CourseId) -> Result<Option<Course>>;

    /// Delete a course and cascade to its modules, lessons, and position
    /// indexes in one atomic write. Purchase rows survive (audit trail).
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the course doesn't exist.
    fn delete_course(&self, id: &CourseId) -> Result<()>;

    /// Count and page courses, optionally filtered by status, ordered by
    /// creation time (newest first), in a single atomic read.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn list_courses_page(
        &self,
        status: Option<CourseStatus>,
        skip: usize,
        take: usize,
    ) -> Result<(u64, Vec<Course>)>;

    /// Count and page one teacher's courses (all statuses), newest first, in
    /// a single atomic read.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn list_courses_by_teacher_page(
        &self,
        teacher_id: &UserId,
        skip: usize,
        take: usize,
    ) -> Result<(u64, Vec<Course>)>;

    /// Transition a course from `Draft` to `Published`.
    ///
    /// The status check and the module-count precondition run atomically
    /// with the write, so two concurrent publishes cannot both pass.
    /// Returns the updated course.
    ///
    /// # Errors
    ///
    /// - `StoreError::NotFound` if the course doesn't exist.
    /// - `StoreError::AlreadyPublished` if the course is not in draft.
    /// - `StoreError::EmptyCourse` if the course has zero modules.
    fn publish_course(&self, id: &CourseId) -> Result<Course>;

    /// Aggregate module/lesson counts and total duration for one course.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn course_stats(&self, id: &CourseId) -> Result<CourseStats>;

    // =========================================================================
    // Module Operations
    // =========================================================================

    /// Next free module position under a course: max sibling position + 1,
    /// or 1 when the course has no modules. Inserts recompute this under the
    /// store lock; this read is for display only.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn next_module_position(&self, course_id: &CourseId) -> Result<u32>;

    /// Insert a module at the end of its course's ordering.
    ///
    /// Position allocation and the insert are one atomic step; two
    /// concurrent inserts under the same course never share a position.
    /// Returns the stored module with its assigned id and position.
    ///
    /// # Errors
    ///
    /// - `StoreError::Conflict` if the position slot was taken by a
    ///   concurrent writer (retryable).
    /// - `StoreError::Database` on backend failure.
    fn insert_module(&self, new: NewModule) -> Result<Module>;

    /// Get a module by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_module(&self, id: &ModuleId) -> Result<Option<Module>>;

    /// Update a module record in place. The position must be unchanged;
    /// reordering is not supported.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn put_module(&self, module: &Module) -> Result<()>;

    /// Delete a module and cascade to its lessons and indexes.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the module doesn't exist.
    fn delete_module(&self, id: &ModuleId) -> Result<()>;

    /// Count and page a course's modules in position order, in a single
    /// atomic read.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn list_modules_page(
        &self,
        course_id: &CourseId,
        skip: usize,
        take: usize,
    ) -> Result<(u64, Vec<Module>)>;

    // =========================================================================
    // Lesson Operations
    // =========================================================================

    /// Next free lesson position under a module. See
    /// [`Store::next_module_position`].
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn next_lesson_position(&self, module_id: &ModuleId) -> Result<u32>;

    /// Insert a lesson at the end of its module's ordering. See
    /// [`Store::insert_module`] for the atomicity contract.
    ///
    /// # Errors
    ///
    /// - `StoreError::Conflict` if the position slot was taken (retryable).
    /// - `StoreError::Database` on backend failure.
    fn insert_lesson(&self, new: NewLesson) -> Result<Lesson>;

    /// Get a lesson by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_lesson(&self, id: &LessonId) -> Result<Option<Lesson>>;

    /// Update a lesson record in place. The position must be unchanged.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn put_lesson(&self, lesson: &Lesson) -> Result<()>;

    /// Delete a lesson and its index entry.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the lesson doesn't exist.
    fn delete_lesson(&self, id: &LessonId) -> Result<()>;

    /// Count and page a module's lessons in position order, in a single
    /// atomic read.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn list_lessons_page(
        &self,
        module_id: &ModuleId,
        skip: usize,
        take: usize,
    ) -> Result<(u64, Vec<Lesson>)>;

    // =========================================================================
    // Purchase Ledger Operations
    // =========================================================================

    /// Insert a purchase row, enforcing the unique `(student, course)`
    /// constraint atomically with the insert.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::AlreadyPurchased` if a row for the pair exists,
    /// regardless of its status.
    fn insert_purchase(&self, purchase: &Purchase) -> Result<()>;

    /// Get a purchase by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_purchase(&self, id: &PurchaseId) -> Result<Option<Purchase>>;

    /// Look up the purchase for a `(student, course)` pair, any status.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn find_purchase(
        &self,
        student_id: &UserId,
        course_id: &CourseId,
    ) -> Result<Option<Purchase>>;

    /// Flip a purchase from `Paid` to `Canceled`, checking refundability
    /// atomically with the write. The row is never deleted. Returns the
    /// updated purchase.
    ///
    /// # Errors
    ///
    /// - `StoreError::NotFound` if the purchase doesn't exist.
    /// - `StoreError::NotRefundable` if the purchase is not in `Paid`.
    fn refund_purchase(&self, id: &PurchaseId) -> Result<Purchase>;

    /// All purchases of one student, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn list_purchases_by_student(&self, student_id: &UserId) -> Result<Vec<Purchase>>;

    /// Count and page the whole ledger, newest first, in a single atomic
    /// read.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn list_purchases_page(&self, skip: usize, take: usize) -> Result<(u64, Vec<Purchase>)>;
}

//! Core types for the campus course marketplace.
//!
//! This crate provides the foundational types shared by the storage layer and
//! the entitlement engine:
//!
//! - **Identifiers**: `UserId`, `CourseId`, `ModuleId`, `LessonId`,
//!   `PurchaseId`, `TransactionId`
//! - **Users**: `User`, `Role`
//! - **Courses**: `Course`, `CourseStatus`
//! - **Content**: `Module`, `Lesson` (position-ordered within their parent)
//! - **Purchases**: `Purchase`, `PurchaseStatus`, `CardPayment`
//! - **Pagination**: `PageRequest`, `Window`, `Paginated`
//!
//! # Money
//!
//! Prices are stored as `i64` integer cents to avoid floating point
//! precision issues. A course priced at $49.90 carries `price_cents: 4990`.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod content;
pub mod course;
pub mod ids;
pub mod page;
pub mod purchase;
pub mod user;

pub use content::{Lesson, Module, NewLesson, NewModule};
pub use course::{Course, CourseStatus};
pub use ids::{CourseId, IdError, LessonId, ModuleId, PurchaseId, TransactionId, UserId};
pub use page::{paginate, PageRequest, Paginated, Window, DEFAULT_LIMIT, DEFAULT_PAGE};
pub use purchase::{CardPayment, Purchase, PurchaseStatus};
pub use user::{Role, User};

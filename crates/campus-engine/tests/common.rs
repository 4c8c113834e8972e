//! Common test utilities for campus-engine integration tests.

#![allow(dead_code)] // Some utilities are used by different test files

use std::sync::Arc;

use tempfile::TempDir;

use campus_core::{CardPayment, Course, Role, User};
use campus_engine::{Actor, CreateCourse, CreateModule, Engine, FakeGateway};
use campus_store::RocksStore;

/// Test harness containing a fresh engine over a temporary database.
pub struct TestHarness {
    /// The engine under test.
    pub engine: Engine<RocksStore>,
    /// Temporary directory for the database (kept alive for test duration).
    pub _temp_dir: TempDir,
}

impl TestHarness {
    /// Create a new harness with a fresh database and the fake gateway.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = RocksStore::open(temp_dir.path()).expect("Failed to open store");
        let engine = Engine::new(Arc::new(store), Arc::new(FakeGateway));

        Self {
            engine,
            _temp_dir: temp_dir,
        }
    }

    /// Register a user and return it as an actor with the given role.
    pub fn actor(&self, role: Role) -> Actor {
        let user: User = self
            .engine
            .create_user(campus_engine::CreateUser {
                name: "Test User".into(),
                email: "user@example.com".into(),
            })
            .expect("Failed to create user");
        Actor::new(user.id, role)
    }

    /// A teacher actor.
    pub fn teacher(&self) -> Actor {
        self.actor(Role::Teacher)
    }

    /// A student actor.
    pub fn student(&self) -> Actor {
        self.actor(Role::Student)
    }

    /// An admin actor.
    pub fn admin(&self) -> Actor {
        self.actor(Role::Admin)
    }

    /// A draft course owned by `teacher`.
    pub fn draft_course(&self, teacher: &Actor) -> Course {
        self.engine
            .create_course(
                teacher,
                CreateCourse {
                    title: "Rust from Scratch".into(),
                    description: "Ownership, borrowing, and friends".into(),
                    price_cents: 4990,
                },
            )
            .expect("Failed to create course")
    }

    /// A published course (one module) owned by `teacher`.
    pub fn published_course(&self, teacher: &Actor) -> Course {
        let course = self.draft_course(teacher);
        self.engine
            .create_module(
                teacher,
                &course.id,
                CreateModule {
                    title: "Getting Started".into(),
                },
            )
            .expect("Failed to create module");
        self.engine
            .publish(teacher, &course.id)
            .expect("Failed to publish course")
    }
}

/// A card the fake gateway accepts.
pub fn valid_card() -> CardPayment {
    CardPayment {
        card_number: "4242424242424242".into(),
        holder_name: "ANA SILVA".into(),
        exp_month: "12".into(),
        exp_year: "99".into(),
        cvv: "123".into(),
    }
}

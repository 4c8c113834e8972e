//! User administration.
//!
//! Registration is open (credential handling lives in the external identity
//! service); listing, deletion, and promotion are admin operations. Roles
//! move in exactly one direction: `Student` → `Teacher`. Admins are
//! assigned out of band and are never promoted or demoted.

use campus_core::{PageRequest, Paginated, Role, User, UserId};
use campus_store::Store;
use serde::Deserialize;

use crate::access::Actor;
use crate::error::{EngineError, Result};
use crate::Engine;

/// Fields for registering a user.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUser {
    /// Display name.
    pub name: String,

    /// Contact email.
    pub email: String,
}

fn require_admin(actor: &Actor) -> Result<()> {
    if actor.role == Role::Admin {
        Ok(())
    } else {
        Err(EngineError::Forbidden)
    }
}

impl<S: Store> Engine<S> {
    /// Register a new user with the default `Student` role.
    ///
    /// # Errors
    ///
    /// Returns an error if the store write fails.
    pub fn create_user(&self, input: CreateUser) -> Result<User> {
        let user = User::new(input.name, input.email);
        self.store().put_user(&user)?;
        tracing::debug!(user_id = %user.id, "user registered");
        Ok(user)
    }

    /// Read one user record.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotFound`] if the id does not resolve.
    pub fn user(&self, id: &UserId) -> Result<User> {
        self.store()
            .get_user(id)?
            .ok_or_else(|| EngineError::NotFound {
                entity: "user",
                id: id.to_string(),
            })
    }

    /// One page of all users. Admin only.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Forbidden`] for non-admin actors.
    pub fn list_users(&self, actor: &Actor, page: PageRequest) -> Result<Paginated<User>> {
        require_admin(actor)?;

        let (page, limit, skip, take) = crate::resolve_window(page);
        let (total, rows) = self.store().list_users_page(skip, take)?;
        Ok(Paginated::new(page, limit, total, rows))
    }

    /// Delete a user. Admin only.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Forbidden`] or [`EngineError::NotFound`].
    pub fn delete_user(&self, actor: &Actor, id: &UserId) -> Result<()> {
        require_admin(actor)?;
        self.store().delete_user(id)?;
        tracing::info!(user_id = %id, actor_id = %actor.id, "user deleted");
        Ok(())
    }

    /// Promote a student to teacher. Admin only.
    ///
    /// # Errors
    ///
    /// - [`EngineError::Forbidden`] for non-admin actors.
    /// - [`EngineError::NotFound`] if the user does not resolve.
    /// - [`EngineError::InvalidState`] if the user is already a teacher, or
    ///   is an admin (admin roles never change).
    pub fn promote_to_teacher(&self, actor: &Actor, id: &UserId) -> Result<User> {
        require_admin(actor)?;

        let mut user = self.user(id)?;
        match user.role {
            Role::Teacher => {
                return Err(EngineError::InvalidState("user is already a teacher".into()))
            }
            Role::Admin => {
                return Err(EngineError::InvalidState(
                    "admin role cannot be changed".into(),
                ))
            }
            Role::Student => {}
        }

        user.role = Role::Teacher;
        self.store().put_user(&user)?;
        tracing::info!(user_id = %user.id, actor_id = %actor.id, "user promoted to teacher");
        Ok(user)
    }
}

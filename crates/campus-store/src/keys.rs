//! Key encoding utilities for `RocksDB`.
//!
//! Entity rows are keyed by their raw UUID bytes. Position indexes append a
//! big-endian `u32` so lexicographic key order equals position order within
//! a parent.

use campus_core::{CourseId, ModuleId, UserId};

/// Byte length of a position index key: parent id (16) + position (4).
pub const POSITION_KEY_LEN: usize = 20;

/// Encode a position index key: `parent_id || position (u32 BE)`.
#[must_use]
pub fn position_key(parent_id: &[u8; 16], position: u32) -> Vec<u8> {
    let mut key = Vec::with_capacity(POSITION_KEY_LEN);
    key.extend_from_slice(parent_id);
    key.extend_from_slice(&position.to_be_bytes());
    key
}

/// Create a module index key under a course.
#[must_use]
pub fn module_position_key(course_id: &CourseId, position: u32) -> Vec<u8> {
    position_key(course_id.as_bytes(), position)
}

/// Create a lesson index key under a module.
#[must_use]
pub fn lesson_position_key(module_id: &ModuleId, position: u32) -> Vec<u8> {
    position_key(module_id.as_bytes(), position)
}

/// Decode the position from a position index key.
///
/// Returns `None` when the key is not a well-formed position key.
#[must_use]
pub fn extract_position(key: &[u8]) -> Option<u32> {
    if key.len() != POSITION_KEY_LEN {
        return None;
    }
    let mut bytes = [0u8; 4];
    bytes.copy_from_slice(&key[16..]);
    Some(u32::from_be_bytes(bytes))
}

/// Create the unique purchase index key: `student_id || course_id`.
#[must_use]
pub fn purchase_pair_key(student_id: &UserId, course_id: &CourseId) -> Vec<u8> {
    let mut key = Vec::with_capacity(32);
    key.extend_from_slice(student_id.as_bytes());
    key.extend_from_slice(course_id.as_bytes());
    key
}

/// Prefix matching every purchase index key of one student.
#[must_use]
pub fn purchases_of_student_prefix(student_id: &UserId) -> Vec<u8> {
    student_id.as_bytes().to_vec()
}

/// Decode a module id stored as an index value.
#[must_use]
pub fn module_id_from_value(value: &[u8]) -> Option<ModuleId> {
    let bytes: [u8; 16] = value.try_into().ok()?;
    Some(ModuleId::from_uuid(uuid::Uuid::from_bytes(bytes)))
}

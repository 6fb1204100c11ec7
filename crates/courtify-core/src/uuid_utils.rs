//! UUID v7 utilities for time-ordered identifiers.
//!
//! Documents and messages use UUIDv7 so ids sort by creation time and are
//! never reused within a process.

use uuid::Uuid;

/// Generate a new UUIDv7 identifier.
///
/// # Example
///
/// ```
/// use courtify_core::uuid_utils::new_v7;
///
/// let id = new_v7();
/// assert_eq!(id.get_version_num(), 7);
/// ```
#[inline]
pub fn new_v7() -> Uuid {
    Uuid::now_v7()
}

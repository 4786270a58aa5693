//! SQLite-backed storage for the sharing subsystem

use thiserror::Error;

use super::group::StudyGroup;
use super::ledger::MembershipLedger;
use super::registry::ResourceRegistry;
use super::tutor::TutorConfig;
use super::types::{GroupId, TutorId, UserId};

mod migrations;
mod sql_store;

pub use migrations::{migrate, CURRENT_SHARE_SCHEMA_VERSION};
pub use sql_store::ShareSqlStore;

/// Errors surfaced by the sharing store
#[derive(Debug, Error)]
pub enum StorageError {
    /// The connection pool was exhausted or unavailable
    #[error("connection pool error: {0}")]
    Pool(String),

    /// Underlying SQLite failure
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// A unique passcode index rejected the insert; retry with a fresh code
    #[error("passcode already in use for this resource kind")]
    DuplicatePasscode,
}

/// Everything the sharing manager needs from a storage backend
///
/// Code lookup and membership come from the supertraits; this adds resource
/// persistence and the dashboard queries. Implementations map a unique
/// passcode violation on insert to [`StorageError::DuplicatePasscode`] so
/// creation flows can retry.
pub trait ShareStore: ResourceRegistry + MembershipLedger {
    /// Persist a new tutor
    fn insert_tutor(&self, tutor: &TutorConfig) -> Result<(), StorageError>;

    /// Persist a new group together with its creator's admin membership,
    /// atomically
    fn insert_group(&self, group: &StudyGroup) -> Result<(), StorageError>;

    /// Fetch a tutor by id
    fn get_tutor(&self, id: &TutorId) -> Result<Option<TutorConfig>, StorageError>;

    /// Fetch a group by id
    fn get_group(&self, id: &GroupId) -> Result<Option<StudyGroup>, StorageError>;

    /// Tutors the user owns, has joined, or that are public, newest first
    fn list_tutors_visible_to(&self, user_id: &UserId) -> Result<Vec<TutorConfig>, StorageError>;

    /// Groups the user is a member of, most recently joined first
    fn list_groups_for_member(&self, user_id: &UserId) -> Result<Vec<StudyGroup>, StorageError>;
}

//! Manager trait for sharing operations

use super::coordinator::{JoinError, JoinOutcome};
use super::group::{NewGroup, StudyGroup};
use super::membership::{AddMemberOutcome, MembershipRecord, ResourceKind};
use super::storage::StorageError;
use super::tutor::{NewTutor, TutorConfig};
use super::types::{GroupId, TutorId, UserId};

/// Creation and membership operations for shared tutors and study groups
pub trait SharingManager {
    /// Create a tutor; restricted sharing assigns a fresh passcode
    fn create_tutor(&mut self, owner_id: UserId, new: NewTutor)
        -> Result<TutorConfig, CreateError>;

    /// Create a group; always assigns a passcode and makes the creator a
    /// member and admin
    fn create_group(&mut self, owner_id: UserId, new: NewGroup)
        -> Result<StudyGroup, CreateError>;

    /// Join whatever resource the typed-in code belongs to
    fn join_by_code(&self, user_id: &UserId, raw_code: &str) -> Result<JoinOutcome, JoinError>;

    /// Directly add a member, bypassing the passcode
    ///
    /// Tutors: owner only. Groups: owner or a group admin. Idempotent like
    /// a join.
    fn grant_member(
        &mut self,
        granter_id: &UserId,
        kind: ResourceKind,
        resource_id: &str,
        user_id: &UserId,
    ) -> Result<AddMemberOutcome, MembershipError>;

    /// Leave a group; the owner cannot leave their own group
    fn leave_group(&mut self, user_id: &UserId, group_id: &GroupId)
        -> Result<(), MembershipError>;

    /// Fetch a tutor by id
    fn get_tutor(&self, id: &TutorId) -> Result<Option<TutorConfig>, StorageError>;

    /// Fetch a group by id
    fn get_group(&self, id: &GroupId) -> Result<Option<StudyGroup>, StorageError>;

    /// Tutors visible on the user's dashboard: own, joined, and public
    fn list_tutors_visible_to(&self, user_id: &UserId) -> Result<Vec<TutorConfig>, StorageError>;

    /// Groups the user belongs to
    fn list_groups_for_member(&self, user_id: &UserId) -> Result<Vec<StudyGroup>, StorageError>;

    /// Roster of a resource
    fn list_members(
        &self,
        kind: ResourceKind,
        resource_id: &str,
    ) -> Result<Vec<MembershipRecord>, StorageError>;
}

/// Errors from resource creation
#[derive(Debug, thiserror::Error)]
pub enum CreateError {
    #[error("invalid name: {0}")]
    InvalidName(&'static str),

    /// Every generated passcode collided; practically unreachable until the
    /// code space is nearly full
    #[error("could not find an unused passcode")]
    PasscodeSpaceExhausted,

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Errors from grant/leave operations
#[derive(Debug, thiserror::Error)]
pub enum MembershipError {
    #[error("tutor not found")]
    TutorNotFound,

    #[error("group not found")]
    GroupNotFound,

    #[error("permission denied")]
    PermissionDenied,

    #[error("user is not a member")]
    NotMember,

    #[error("the owner cannot leave their own group")]
    OwnerCannotLeave,

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

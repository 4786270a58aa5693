//! The membership ledger trait

use super::membership::{AddMemberOutcome, MemberRole, MembershipRecord, ResourceKind};
use super::storage::StorageError;
use super::types::UserId;

/// Authoritative record of user-to-resource membership
///
/// Implementations must back `add_member_if_absent` with a uniqueness
/// constraint at the storage layer. The insert itself is the idempotence
/// check: a read-then-write pair would let two concurrent joins both
/// observe "not a member" and both insert.
pub trait MembershipLedger {
    /// Fetch the membership record for a (kind, resource, user) triple
    fn membership(
        &self,
        kind: ResourceKind,
        resource_id: &str,
        user_id: &UserId,
    ) -> Result<Option<MembershipRecord>, StorageError>;

    /// Whether the user belongs to the resource
    fn is_member(
        &self,
        kind: ResourceKind,
        resource_id: &str,
        user_id: &UserId,
    ) -> Result<bool, StorageError> {
        Ok(self.membership(kind, resource_id, user_id)?.is_some())
    }

    /// Insert at most one record per triple
    ///
    /// Returns `AlreadyMember` without mutating anything when the triple
    /// exists, including when a concurrent insert won the race.
    fn add_member_if_absent(
        &self,
        kind: ResourceKind,
        resource_id: &str,
        user_id: &UserId,
        role: MemberRole,
    ) -> Result<AddMemberOutcome, StorageError>;

    /// All members of a resource, oldest join first
    fn list_members(
        &self,
        kind: ResourceKind,
        resource_id: &str,
    ) -> Result<Vec<MembershipRecord>, StorageError>;

    /// Remove a membership record; returns whether one existed
    fn remove_member(
        &self,
        kind: ResourceKind,
        resource_id: &str,
        user_id: &UserId,
    ) -> Result<bool, StorageError>;
}

//! Membership records
//!
//! The ledger is the single source of truth for who belongs to which
//! resource. Resource structs deliberately carry no member collections;
//! every "contains user" question is answered here, which keeps membership
//! writes on one path.

use super::types::{Timestamp, UserId};
use serde::{Deserialize, Serialize};

/// The two joinable resource kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Tutor,
    Group,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Tutor => "Tutor",
            ResourceKind::Group => "Group",
        }
    }
}

/// Role a user holds within a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemberRole {
    /// Default role for every join
    Member,
    /// Granted only to a group's creator at creation time
    Admin,
}

impl MemberRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberRole::Member => "Member",
            MemberRole::Admin => "Admin",
        }
    }
}

/// One row of the membership relation
///
/// At most one record exists per (kind, resource, user) triple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembershipRecord {
    pub resource_kind: ResourceKind,
    pub resource_id: String,
    pub user_id: UserId,
    pub role: MemberRole,
    pub joined_at: Timestamp,
}

impl MembershipRecord {
    /// Whether this member can administer the resource
    pub fn is_admin(&self) -> bool {
        self.role == MemberRole::Admin
    }
}

/// Result of an idempotent membership insert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddMemberOutcome {
    /// A new record was created
    Inserted,
    /// The triple already existed; nothing changed
    AlreadyMember,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_labels() {
        assert_eq!(ResourceKind::Tutor.as_str(), "Tutor");
        assert_eq!(ResourceKind::Group.as_str(), "Group");
    }

    #[test]
    fn test_admin_check() {
        let record = MembershipRecord {
            resource_kind: ResourceKind::Group,
            resource_id: "g1".to_string(),
            user_id: UserId::new("u1".to_string()),
            role: MemberRole::Admin,
            joined_at: Timestamp::from_millis(0),
        };
        assert!(record.is_admin());
    }

    #[test]
    fn test_kind_serializes_lowercase() {
        let json = serde_json::to_string(&ResourceKind::Tutor).unwrap();
        assert_eq!(json, "\"tutor\"");
    }
}

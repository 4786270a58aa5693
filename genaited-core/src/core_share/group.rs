//! Study groups

use super::passcode::Passcode;
use super::types::{GroupId, Timestamp, UserId};
use serde::{Deserialize, Serialize};

/// A student study group tied to an institution and programme
///
/// Membership is not stored on this struct; the membership ledger owns
/// that relation. The creator is recorded as a member and admin there at
/// creation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudyGroup {
    /// Unique identifier
    pub id: GroupId,

    /// Creating user
    pub owner_id: UserId,

    /// Display name
    pub name: String,

    /// Short blurb shown on the groups page
    pub description: Option<String>,

    /// Institution the group belongs to
    pub institution: String,

    /// Programme of study, if the group is programme-scoped
    pub program: Option<String>,

    /// Year of study
    pub year: Option<u8>,

    /// Semester within the year
    pub semester: Option<u8>,

    /// Join passcode; always present for groups
    pub passcode: Passcode,

    /// When the group was created
    pub created_at: Timestamp,

    /// Last time the group metadata was updated
    pub updated_at: Timestamp,
}

/// Creation parameters for a study group
#[derive(Debug, Clone)]
pub struct NewGroup {
    pub name: String,
    pub description: Option<String>,
    pub institution: String,
    pub program: Option<String>,
    pub year: Option<u8>,
    pub semester: Option<u8>,
}

impl StudyGroup {
    /// Create a new group record with the given passcode
    pub fn new(owner_id: UserId, new: NewGroup, passcode: Passcode) -> Self {
        let now = Timestamp::now();

        StudyGroup {
            id: GroupId::generate(),
            owner_id,
            name: new.name,
            description: new.description,
            institution: new.institution,
            program: new.program,
            year: new.year,
            semester: new.semester,
            passcode,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_group() {
        let owner = UserId::new("student-1".to_string());
        let code = Passcode::generate();
        let group = StudyGroup::new(
            owner.clone(),
            NewGroup {
                name: "Year 2 Maths".to_string(),
                description: None,
                institution: "Wesley College of Education".to_string(),
                program: Some("B.Ed Primary".to_string()),
                year: Some(2),
                semester: Some(1),
            },
            code.clone(),
        );

        assert_eq!(group.owner_id, owner);
        assert_eq!(group.passcode, code);
        assert_eq!(group.year, Some(2));
    }
}

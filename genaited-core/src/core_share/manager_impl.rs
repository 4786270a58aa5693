//! Manager implementation over the join coordinator and a share store

use tracing::{info, warn};

use super::coordinator::{JoinCoordinator, JoinError, JoinOutcome};
use super::group::{NewGroup, StudyGroup};
use super::manager::{CreateError, MembershipError, SharingManager};
use super::membership::{AddMemberOutcome, MemberRole, MembershipRecord, ResourceKind};
use super::passcode::Passcode;
use super::storage::{ShareStore, StorageError};
use super::tutor::{NewTutor, TutorConfig, TutorSharing};
use super::types::{GroupId, TutorId, UserId};
use crate::metrics::{record_passcode_collision, record_resource_created};

/// Default bound on passcode collision retries at creation time
pub const DEFAULT_MAX_CODE_ATTEMPTS: u32 = 8;

/// Sharing manager backed by a [`ShareStore`]
pub struct SharingManagerImpl<S> {
    coordinator: JoinCoordinator<S>,
    max_code_attempts: u32,
}

impl<S: ShareStore> SharingManagerImpl<S> {
    /// Create a manager with the default collision-retry bound
    pub fn new(store: S) -> Self {
        Self::with_max_code_attempts(store, DEFAULT_MAX_CODE_ATTEMPTS)
    }

    /// Create a manager with an explicit collision-retry bound
    pub fn with_max_code_attempts(store: S, max_code_attempts: u32) -> Self {
        Self {
            coordinator: JoinCoordinator::new(store),
            max_code_attempts: max_code_attempts.max(1),
        }
    }

    fn store(&self) -> &S {
        self.coordinator.store()
    }

    /// Validate a resource display name
    fn validate_name(name: &str) -> Result<(), CreateError> {
        if name.trim().is_empty() {
            return Err(CreateError::InvalidName("name must not be empty"));
        }
        if name.len() > 100 {
            return Err(CreateError::InvalidName("name must be at most 100 characters"));
        }
        Ok(())
    }
}

impl<S: ShareStore> SharingManager for SharingManagerImpl<S> {
    fn create_tutor(
        &mut self,
        owner_id: UserId,
        new: NewTutor,
    ) -> Result<TutorConfig, CreateError> {
        Self::validate_name(&new.name)?;

        let restricted = new.sharing == TutorSharing::Restricted;

        for _ in 0..self.max_code_attempts {
            let passcode = restricted.then(Passcode::generate);
            let tutor = TutorConfig::new(owner_id.clone(), new.clone(), passcode);

            match self.store().insert_tutor(&tutor) {
                Ok(()) => {
                    info!(tutor_id = %tutor.id, owner = %owner_id, restricted, "created tutor");
                    record_resource_created("tutor");
                    return Ok(tutor);
                }
                Err(StorageError::DuplicatePasscode) if restricted => {
                    warn!(owner = %owner_id, "tutor passcode collision, retrying");
                    record_passcode_collision();
                }
                Err(err) => return Err(err.into()),
            }
        }

        Err(CreateError::PasscodeSpaceExhausted)
    }

    fn create_group(
        &mut self,
        owner_id: UserId,
        new: NewGroup,
    ) -> Result<StudyGroup, CreateError> {
        Self::validate_name(&new.name)?;

        for _ in 0..self.max_code_attempts {
            let group = StudyGroup::new(owner_id.clone(), new.clone(), Passcode::generate());

            match self.store().insert_group(&group) {
                Ok(()) => {
                    info!(group_id = %group.id, owner = %owner_id, "created study group");
                    record_resource_created("group");
                    return Ok(group);
                }
                Err(StorageError::DuplicatePasscode) => {
                    warn!(owner = %owner_id, "group passcode collision, retrying");
                    record_passcode_collision();
                }
                Err(err) => return Err(err.into()),
            }
        }

        Err(CreateError::PasscodeSpaceExhausted)
    }

    fn join_by_code(&self, user_id: &UserId, raw_code: &str) -> Result<JoinOutcome, JoinError> {
        self.coordinator.join_by_code(user_id, raw_code)
    }

    fn grant_member(
        &mut self,
        granter_id: &UserId,
        kind: ResourceKind,
        resource_id: &str,
        user_id: &UserId,
    ) -> Result<AddMemberOutcome, MembershipError> {
        // Permission check first: tutors take an owner grant only; groups
        // accept the owner or any group admin.
        match kind {
            ResourceKind::Tutor => {
                let tutor = self
                    .store()
                    .get_tutor(&TutorId::new(resource_id.to_string()))?
                    .ok_or(MembershipError::TutorNotFound)?;
                if &tutor.owner_id != granter_id {
                    return Err(MembershipError::PermissionDenied);
                }
            }
            ResourceKind::Group => {
                let group = self
                    .store()
                    .get_group(&GroupId::new(resource_id.to_string()))?
                    .ok_or(MembershipError::GroupNotFound)?;
                let is_admin = self
                    .store()
                    .membership(kind, resource_id, granter_id)?
                    .is_some_and(|m| m.is_admin());
                if &group.owner_id != granter_id && !is_admin {
                    return Err(MembershipError::PermissionDenied);
                }
            }
        }

        let outcome =
            self.store()
                .add_member_if_absent(kind, resource_id, user_id, MemberRole::Member)?;

        if outcome == AddMemberOutcome::Inserted {
            info!(granter = %granter_id, member = %user_id, kind = kind.as_str(), resource_id,
                  "member granted directly");
        }

        Ok(outcome)
    }

    fn leave_group(
        &mut self,
        user_id: &UserId,
        group_id: &GroupId,
    ) -> Result<(), MembershipError> {
        let group = self
            .store()
            .get_group(group_id)?
            .ok_or(MembershipError::GroupNotFound)?;

        if &group.owner_id == user_id {
            return Err(MembershipError::OwnerCannotLeave);
        }

        let removed =
            self.store()
                .remove_member(ResourceKind::Group, group_id.as_str(), user_id)?;
        if !removed {
            return Err(MembershipError::NotMember);
        }

        info!(user = %user_id, group = %group_id, "left study group");
        Ok(())
    }

    fn get_tutor(&self, id: &TutorId) -> Result<Option<TutorConfig>, StorageError> {
        self.store().get_tutor(id)
    }

    fn get_group(&self, id: &GroupId) -> Result<Option<StudyGroup>, StorageError> {
        self.store().get_group(id)
    }

    fn list_tutors_visible_to(&self, user_id: &UserId) -> Result<Vec<TutorConfig>, StorageError> {
        self.store().list_tutors_visible_to(user_id)
    }

    fn list_groups_for_member(&self, user_id: &UserId) -> Result<Vec<StudyGroup>, StorageError> {
        self.store().list_groups_for_member(user_id)
    }

    fn list_members(
        &self,
        kind: ResourceKind,
        resource_id: &str,
    ) -> Result<Vec<MembershipRecord>, StorageError> {
        self.store().list_members(kind, resource_id)
    }
}

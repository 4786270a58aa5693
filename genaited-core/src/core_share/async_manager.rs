//! Async facade over the sharing manager
//!
//! Wraps the synchronous manager for request/response callers (the web API
//! handlers await these to completion). Joins and reads take the read lock;
//! creation and grants take the write lock. Concurrent joins are safe under
//! the read lock because the membership insert is atomic at the store.

use std::sync::Arc;

use tokio::sync::RwLock;

use super::coordinator::{JoinError, JoinOutcome};
use super::group::{NewGroup, StudyGroup};
use super::manager::{CreateError, MembershipError, SharingManager};
use super::manager_impl::SharingManagerImpl;
use super::membership::{AddMemberOutcome, MembershipRecord, ResourceKind};
use super::storage::{ShareSqlStore, StorageError};
use super::tutor::{NewTutor, TutorConfig};
use super::types::{GroupId, TutorId, UserId};

/// Async sharing API over the SQLite store
#[derive(Clone)]
pub struct AsyncSharing {
    manager: Arc<RwLock<SharingManagerImpl<ShareSqlStore>>>,
}

impl AsyncSharing {
    /// Create a facade over a store
    pub fn new(store: ShareSqlStore) -> Self {
        Self {
            manager: Arc::new(RwLock::new(SharingManagerImpl::new(store))),
        }
    }

    /// Create a facade with an explicit passcode collision-retry bound
    pub fn with_max_code_attempts(store: ShareSqlStore, max_code_attempts: u32) -> Self {
        Self {
            manager: Arc::new(RwLock::new(SharingManagerImpl::with_max_code_attempts(
                store,
                max_code_attempts,
            ))),
        }
    }

    /// Create a tutor
    pub async fn create_tutor(
        &self,
        owner_id: UserId,
        new: NewTutor,
    ) -> Result<TutorConfig, CreateError> {
        let mut manager = self.manager.write().await;
        manager.create_tutor(owner_id, new)
    }

    /// Create a study group
    pub async fn create_group(
        &self,
        owner_id: UserId,
        new: NewGroup,
    ) -> Result<StudyGroup, CreateError> {
        let mut manager = self.manager.write().await;
        manager.create_group(owner_id, new)
    }

    /// Join whatever resource the typed-in code belongs to
    pub async fn join_by_code(
        &self,
        user_id: &UserId,
        raw_code: &str,
    ) -> Result<JoinOutcome, JoinError> {
        let manager = self.manager.read().await;
        manager.join_by_code(user_id, raw_code)
    }

    /// Directly add a member, bypassing the passcode
    pub async fn grant_member(
        &self,
        granter_id: &UserId,
        kind: ResourceKind,
        resource_id: &str,
        user_id: &UserId,
    ) -> Result<AddMemberOutcome, MembershipError> {
        let mut manager = self.manager.write().await;
        manager.grant_member(granter_id, kind, resource_id, user_id)
    }

    /// Leave a group
    pub async fn leave_group(
        &self,
        user_id: &UserId,
        group_id: &GroupId,
    ) -> Result<(), MembershipError> {
        let mut manager = self.manager.write().await;
        manager.leave_group(user_id, group_id)
    }

    /// Fetch a tutor by id
    pub async fn get_tutor(&self, id: &TutorId) -> Result<Option<TutorConfig>, StorageError> {
        let manager = self.manager.read().await;
        manager.get_tutor(id)
    }

    /// Fetch a group by id
    pub async fn get_group(&self, id: &GroupId) -> Result<Option<StudyGroup>, StorageError> {
        let manager = self.manager.read().await;
        manager.get_group(id)
    }

    /// Tutors visible on the user's dashboard
    pub async fn list_tutors_visible_to(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<TutorConfig>, StorageError> {
        let manager = self.manager.read().await;
        manager.list_tutors_visible_to(user_id)
    }

    /// Groups the user belongs to
    pub async fn list_groups_for_member(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<StudyGroup>, StorageError> {
        let manager = self.manager.read().await;
        manager.list_groups_for_member(user_id)
    }

    /// Roster of a resource
    pub async fn list_members(
        &self,
        kind: ResourceKind,
        resource_id: &str,
    ) -> Result<Vec<MembershipRecord>, StorageError> {
        let manager = self.manager.read().await;
        manager.list_members(kind, resource_id)
    }
}

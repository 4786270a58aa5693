//! Join coordination
//!
//! `JoinCoordinator` turns a raw typed-in code into a membership change:
//! normalize, resolve against both resource kinds, then apply an idempotent
//! insert. Rejections are ordinary outcomes; only storage faults surface as
//! errors.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::ledger::MembershipLedger;
use super::membership::{AddMemberOutcome, MemberRole, ResourceKind};
use super::passcode::Passcode;
use super::registry::{CodeTarget, ResourceRegistry};
use super::storage::StorageError;
use super::types::UserId;
use crate::metrics::{record_join_attempt, record_join_result};

/// Result of a join attempt
///
/// Serialized in the tagged shape the web dashboard consumes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum JoinOutcome {
    /// The user is now a member
    #[serde(rename_all = "camelCase")]
    Accepted {
        resource_kind: ResourceKind,
        resource_id: String,
        resource_name: String,
    },

    /// The user was a member before this call; nothing changed
    #[serde(rename_all = "camelCase")]
    AlreadyJoined {
        resource_kind: ResourceKind,
        resource_name: String,
    },

    /// The input did not have passcode shape; the registry was not queried
    InvalidFormat,

    /// Well-formed code matching neither resource kind
    InvalidCode,
}

/// Faults during a join attempt
///
/// Rejections are not errors; they come back as [`JoinOutcome`] variants.
/// Storage faults are transient; the caller may retry with the same code.
#[derive(Debug, thiserror::Error)]
pub enum JoinError {
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Orchestrates join-by-code against a registry and ledger
pub struct JoinCoordinator<S> {
    store: S,
}

impl<S: ResourceRegistry + MembershipLedger> JoinCoordinator<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// The underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Join whatever resource the code belongs to
    ///
    /// The role is always `Member`; admin is granted only at group-creation
    /// time to the creator. Tutor codes take precedence over group codes
    /// (see [`ResourceRegistry::resolve_code`]).
    pub fn join_by_code(&self, user_id: &UserId, raw_code: &str) -> Result<JoinOutcome, JoinError> {
        record_join_attempt();

        let code = match Passcode::normalize(raw_code) {
            Ok(code) => code,
            Err(err) => {
                debug!(%user_id, %err, "join code failed validation");
                record_join_result("invalid_format");
                return Ok(JoinOutcome::InvalidFormat);
            }
        };

        match self.store.resolve_code(&code)? {
            CodeTarget::Tutor(tutor) => {
                self.apply(user_id, ResourceKind::Tutor, tutor.id.as_str(), &tutor.name)
            }
            CodeTarget::Group(group) => {
                self.apply(user_id, ResourceKind::Group, group.id.as_str(), &group.name)
            }
            CodeTarget::NotFound => {
                debug!(%user_id, %code, "join code matched no resource");
                record_join_result("invalid_code");
                Ok(JoinOutcome::InvalidCode)
            }
        }
    }

    fn apply(
        &self,
        user_id: &UserId,
        kind: ResourceKind,
        resource_id: &str,
        resource_name: &str,
    ) -> Result<JoinOutcome, JoinError> {
        // The insert is the idempotence check; a concurrent duplicate join
        // loses the race inside the store and reports AlreadyJoined here.
        let outcome =
            self.store
                .add_member_if_absent(kind, resource_id, user_id, MemberRole::Member)?;

        match outcome {
            AddMemberOutcome::Inserted => {
                info!(%user_id, kind = kind.as_str(), resource_id, "joined via passcode");
                record_join_result("accepted");
                Ok(JoinOutcome::Accepted {
                    resource_kind: kind,
                    resource_id: resource_id.to_string(),
                    resource_name: resource_name.to_string(),
                })
            }
            AddMemberOutcome::AlreadyMember => {
                debug!(%user_id, kind = kind.as_str(), resource_id, "already a member");
                record_join_result("already_member");
                Ok(JoinOutcome::AlreadyJoined {
                    resource_kind: kind,
                    resource_name: resource_name.to_string(),
                })
            }
        }
    }
}

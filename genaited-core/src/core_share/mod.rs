//! Passcode sharing & membership
//!
//! This module implements the join-by-code mechanism for the two shareable
//! resource kinds: custom tutor configurations and study groups.
//!
//! ## Architecture
//!
//! - **Passcode**: 6-character `[A-Z0-9]` shared secret, unique per kind
//! - **ResourceRegistry**: code lookup with fixed tutor-before-group precedence
//! - **MembershipLedger**: the one authoritative membership relation
//! - **JoinCoordinator**: normalize → resolve → idempotent insert
//! - **SharingManager**: creation flows, owner grants, dashboard queries
//!
//! ## Key Design Principles
//!
//! 1. Membership mutates through the ledger's atomic insert only, never
//!    through read-modify-write on a cached member list
//! 2. One precedence order for code resolution, applied in one place
//! 3. Rejected joins are outcomes, not errors; storage faults are errors
//! 4. A tutor without a passcode cannot be joined by code

pub mod async_manager;
pub mod coordinator;
pub mod group;
pub mod ledger;
pub mod manager;
pub mod manager_impl;
pub mod membership;
pub mod passcode;
pub mod registry;
pub mod storage;
pub mod tutor;
pub mod types;

#[cfg(test)]
pub mod tests;

pub use async_manager::AsyncSharing;
pub use coordinator::{JoinCoordinator, JoinError, JoinOutcome};
pub use group::{NewGroup, StudyGroup};
pub use ledger::MembershipLedger;
pub use manager::{CreateError, MembershipError, SharingManager};
pub use manager_impl::SharingManagerImpl;
pub use membership::{AddMemberOutcome, MemberRole, MembershipRecord, ResourceKind};
pub use passcode::{Passcode, PasscodeError, PASSCODE_LEN};
pub use registry::{CodeTarget, ResourceRegistry};
pub use storage::{ShareSqlStore, ShareStore, StorageError};
pub use tutor::{NewTutor, TutorCategory, TutorConfig, TutorSharing};
pub use types::{GroupId, Timestamp, TutorId, UserId};

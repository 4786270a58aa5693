//! GenAITEd sharing core
//!
//! Passcode-based sharing for the GenAITEd teacher-education platform:
//! teachers share custom AI tutors, students form study groups, and anyone
//! with the 6-character code can join the matching resource. This crate
//! owns code generation, code resolution, and the membership ledger; the
//! web, chat, and voice layers sit on top of it.

pub mod config;
pub mod core_share;
pub mod logging;
pub mod metrics;

pub use config::Config;
pub use core_share::{
    AsyncSharing, JoinOutcome, Passcode, ShareSqlStore, SharingManager, SharingManagerImpl,
};
pub use logging::{init as init_logging, LogLevel};

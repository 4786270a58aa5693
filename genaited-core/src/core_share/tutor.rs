//! Shared tutor configurations

use super::passcode::Passcode;
use super::types::{Timestamp, TutorId, UserId};
use serde::{Deserialize, Serialize};

/// How a tutor is shared at creation time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TutorSharing {
    /// Listed for everyone at the institution, no passcode
    Public,
    /// Joinable only with the generated passcode
    Restricted,
}

/// Subject category, mirroring the dashboard filter chips
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TutorCategory {
    Curriculum,
    Teaching,
    Research,
    General,
}

impl TutorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            TutorCategory::Curriculum => "Curriculum",
            TutorCategory::Teaching => "Teaching",
            TutorCategory::Research => "Research",
            TutorCategory::General => "General",
        }
    }
}

impl Default for TutorCategory {
    fn default() -> Self {
        TutorCategory::General
    }
}

/// A configured AI-tutor persona
///
/// The `instructions` field is opaque data here; prompt assembly happens in
/// the chat layer. Membership is not stored on this struct; the membership
/// ledger owns that relation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TutorConfig {
    /// Unique identifier
    pub id: TutorId,

    /// Creating teacher or admin
    pub owner_id: UserId,

    /// Display name
    pub name: String,

    /// Short blurb shown on the dashboard card
    pub description: Option<String>,

    /// System instructions handed to the chat layer verbatim
    pub instructions: Option<String>,

    /// Subject category
    pub category: TutorCategory,

    /// Emoji or icon key for the dashboard card
    pub icon: Option<String>,

    /// Whether the tutor is listed publicly
    pub is_public: bool,

    /// Join passcode; `None` means the tutor cannot be joined by code
    pub passcode: Option<Passcode>,

    /// When the tutor was created
    pub created_at: Timestamp,

    /// Last time the tutor was updated
    pub updated_at: Timestamp,
}

/// Creation parameters for a tutor
#[derive(Debug, Clone)]
pub struct NewTutor {
    pub name: String,
    pub description: Option<String>,
    pub instructions: Option<String>,
    pub category: TutorCategory,
    pub icon: Option<String>,
    pub sharing: TutorSharing,
}

impl TutorConfig {
    /// Create a new tutor record
    ///
    /// `passcode` must be `Some` exactly when the sharing mode is
    /// `Restricted`; the manager's creation flow upholds that pairing.
    pub fn new(owner_id: UserId, new: NewTutor, passcode: Option<Passcode>) -> Self {
        let now = Timestamp::now();

        TutorConfig {
            id: TutorId::generate(),
            owner_id,
            name: new.name,
            description: new.description,
            instructions: new.instructions,
            category: new.category,
            icon: new.icon,
            is_public: new.sharing == TutorSharing::Public,
            passcode,
            created_at: now,
            updated_at: now,
        }
    }

    /// The code this tutor can be joined with, if any
    pub fn join_code(&self) -> Option<&Passcode> {
        self.passcode.as_ref()
    }
}

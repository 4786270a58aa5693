//! Code lookup across the two joinable resource kinds

use super::group::StudyGroup;
use super::passcode::Passcode;
use super::storage::StorageError;
use super::tutor::TutorConfig;

/// What a passcode resolved to
#[derive(Debug, Clone)]
pub enum CodeTarget {
    Tutor(TutorConfig),
    Group(StudyGroup),
    NotFound,
}

/// Lookup of joinable resources by passcode
///
/// Nothing enforces code uniqueness *across* the two kinds, so resolution
/// order matters: tutor passcodes are checked before group passcodes and
/// the first match wins. `resolve_code` is the only code path that performs
/// this lookup, which keeps the precedence uniform.
pub trait ResourceRegistry {
    /// Find a tutor carrying this passcode
    fn find_tutor_by_code(&self, code: &Passcode) -> Result<Option<TutorConfig>, StorageError>;

    /// Find a study group carrying this passcode
    fn find_group_by_code(&self, code: &Passcode) -> Result<Option<StudyGroup>, StorageError>;

    /// Resolve a passcode to its target resource, tutor first
    ///
    /// `NotFound` is a normal outcome, not an error; the coordinator maps
    /// it to a user-visible rejection.
    fn resolve_code(&self, code: &Passcode) -> Result<CodeTarget, StorageError> {
        if let Some(tutor) = self.find_tutor_by_code(code)? {
            return Ok(CodeTarget::Tutor(tutor));
        }
        if let Some(group) = self.find_group_by_code(code)? {
            return Ok(CodeTarget::Group(group));
        }
        Ok(CodeTarget::NotFound)
    }
}

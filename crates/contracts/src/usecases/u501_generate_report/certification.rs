use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Certification of a generated report
///
/// `Requested` is entered by switching the certify flag on. Switching it
/// off discards any confirmation. Only an explicit confirm moves
/// `Requested` to `Certified`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CertificationState {
    #[default]
    NotRequested,
    Requested,
    Certified,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CertificationError {
    #[error("Certification was not requested")]
    NotRequested,
}

impl CertificationState {
    pub fn set_requested(&mut self, on: bool) {
        *self = match (on, *self) {
            (false, _) => CertificationState::NotRequested,
            (true, CertificationState::NotRequested) => CertificationState::Requested,
            (true, current) => current,
        };
    }

    /// Confirming an already certified report is a no-op
    pub fn confirm(&mut self) -> Result<(), CertificationError> {
        match *self {
            CertificationState::NotRequested => Err(CertificationError::NotRequested),
            CertificationState::Requested | CertificationState::Certified => {
                *self = CertificationState::Certified;
                Ok(())
            }
        }
    }

    /// The certify flag as shown to the user
    pub fn is_requested(&self) -> bool {
        !matches!(self, CertificationState::NotRequested)
    }

    pub fn is_certified(&self) -> bool {
        matches!(self, CertificationState::Certified)
    }

    /// Nothing left to confirm
    pub fn is_settled(&self) -> bool {
        !matches!(self, CertificationState::Requested)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_then_confirm() {
        let mut state = CertificationState::default();
        state.set_requested(true);
        assert_eq!(state, CertificationState::Requested);
        assert!(!state.is_settled());

        state.confirm().unwrap();
        assert!(state.is_certified());
        assert!(state.is_settled());
    }

    #[test]
    fn test_toggle_off_resets() {
        let mut state = CertificationState::default();
        state.set_requested(true);
        state.set_requested(false);
        assert_eq!(state, CertificationState::NotRequested);

        state.set_requested(true);
        state.confirm().unwrap();
        state.set_requested(false);
        assert_eq!(state, CertificationState::NotRequested);
    }

    #[test]
    fn test_toggle_on_keeps_confirmation() {
        let mut state = CertificationState::Certified;
        state.set_requested(true);
        assert_eq!(state, CertificationState::Certified);
    }

    #[test]
    fn test_confirm_requires_request() {
        let mut state = CertificationState::NotRequested;
        assert_eq!(state.confirm(), Err(CertificationError::NotRequested));
        assert_eq!(state, CertificationState::NotRequested);
    }
}

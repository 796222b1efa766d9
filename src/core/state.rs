//! Promise lifecycle states.
//!
//! A promise moves from `Pending` to exactly one terminal state, or to
//! `Adopting` when it delegates its outcome to another promise. The
//! `Adopting` state is transparent: readers follow the chain of adopted
//! promises to the real terminal state.

use serde::{Deserialize, Serialize};

/// The four lifecycle states of a promise.
///
/// Transitions happen at most once: `Pending` to a terminal state
/// (`Fulfilled`/`Rejected`), or `Pending` to `Adopting` and from there,
/// through the adopted promise, to a terminal state. No transition is
/// ever reversed or repeated.
///
/// # Example
///
/// ```rust
/// use eventual::PromiseState;
///
/// assert!(!PromiseState::Pending.is_settled());
/// assert!(PromiseState::Fulfilled.is_settled());
/// assert!(PromiseState::Rejected.is_error());
/// assert!(!PromiseState::Adopting.is_settled());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromiseState {
    /// Not yet settled; observers accumulate until settlement.
    Pending,
    /// Settled with a fulfillment value.
    Fulfilled,
    /// Settled with a rejection reason.
    Rejected,
    /// Settled to another promise, pending its resolution.
    Adopting,
}

impl PromiseState {
    /// Get the state's name for display/diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Fulfilled => "fulfilled",
            Self::Rejected => "rejected",
            Self::Adopting => "adopting",
        }
    }

    /// Check if this is a terminal state.
    ///
    /// `Adopting` is not terminal: the outcome is owned by the adopted
    /// promise until that one settles.
    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Fulfilled | Self::Rejected)
    }

    /// Check if this is the failure outcome.
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Rejected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_name_returns_correct_value() {
        assert_eq!(PromiseState::Pending.name(), "pending");
        assert_eq!(PromiseState::Fulfilled.name(), "fulfilled");
        assert_eq!(PromiseState::Rejected.name(), "rejected");
        assert_eq!(PromiseState::Adopting.name(), "adopting");
    }

    #[test]
    fn is_settled_identifies_terminal_states() {
        assert!(!PromiseState::Pending.is_settled());
        assert!(PromiseState::Fulfilled.is_settled());
        assert!(PromiseState::Rejected.is_settled());
        assert!(!PromiseState::Adopting.is_settled());
    }

    #[test]
    fn is_error_identifies_rejection_only() {
        assert!(!PromiseState::Pending.is_error());
        assert!(!PromiseState::Fulfilled.is_error());
        assert!(PromiseState::Rejected.is_error());
        assert!(!PromiseState::Adopting.is_error());
    }

    #[test]
    fn state_serializes_correctly() {
        let json = serde_json::to_string(&PromiseState::Adopting).unwrap();
        assert_eq!(json, "\"adopting\"");
        let state: PromiseState = serde_json::from_str(&json).unwrap();
        assert_eq!(state, PromiseState::Adopting);
    }
}

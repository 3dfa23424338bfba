use crate::wager::WagerError;
use thiserror::Error;

/// Bet rejected before anything leaves the client.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("Invalid bet input")]
    InvalidStake,
    #[error("Invalid target multiplier")]
    InvalidMultiplier,
    #[error("Insufficient balance")]
    InsufficientBalance { stake: f64, balance: f64 },
    #[error("A round is already in progress")]
    RoundInProgress,
}

/// The wager service refused or failed the bet. The stake has been refunded
/// by the time this is returned.
#[derive(Debug, Error)]
pub enum SubmissionError {
    #[error("Could not place bet{}", reason_suffix(.reason))]
    NotAccepted { reason: Option<String> },
    #[error("An error occurred")]
    Service(#[from] WagerError),
}

#[derive(Debug, Error)]
pub enum RoundError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Submission(#[from] SubmissionError),
}

fn reason_suffix(reason: &Option<String>) -> String {
    reason
        .as_deref()
        .map(|r| format!(": {r}"))
        .unwrap_or_default()
}

impl RoundError {
    pub fn is_validation(&self) -> bool {
        matches!(self, RoundError::Validation(_))
    }
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]
    use super::*;

    #[test]
    fn not_accepted__message_includes_reason_when_present() {
        let with_reason = SubmissionError::NotAccepted {
            reason: Some("bet exceeds table limit".into()),
        };
        let without = SubmissionError::NotAccepted { reason: None };

        assert_eq!(
            with_reason.to_string(),
            "Could not place bet: bet exceeds table limit"
        );
        assert_eq!(without.to_string(), "Could not place bet");
    }

    #[test]
    fn round_error__validation_message_is_transparent() {
        let err: RoundError = ValidationError::InsufficientBalance {
            stake: 10.0,
            balance: 5.0,
        }
        .into();

        assert!(err.is_validation());
        assert_eq!(err.to_string(), "Insufficient balance");
    }
}

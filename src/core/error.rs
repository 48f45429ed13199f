use thiserror::Error;

/// Errors arising from analysis operations.
///
/// All variants except [`AnalysisError::InvariantViolation`] are recoverable
/// conditions the caller is expected to handle (show "no data" instead of
/// crashing). `InvariantViolation` signals a broken precondition — a ledger
/// that was handed to the engine in an invalid state — and is deliberately
/// distinguishable from the recoverable kinds.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    #[error("dataset is empty: {operation} requires at least one record")]
    EmptyDataset { operation: &'static str },

    #[error("invalid parameter '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("no scenarios have been simulated yet")]
    NoScenarios,

    #[error("ledger invariant violated: {0}")]
    InvariantViolation(String),
}

impl AnalysisError {
    /// Whether the caller can reasonably recover from this error.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, AnalysisError::InvariantViolation(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoverable_classification() {
        assert!(AnalysisError::EmptyDataset {
            operation: "summary_statistics"
        }
        .is_recoverable());
        assert!(AnalysisError::NoScenarios.is_recoverable());
        assert!(!AnalysisError::InvariantViolation("unsorted".into()).is_recoverable());
    }

    #[test]
    fn test_display_messages() {
        let err = AnalysisError::InvalidParameter {
            name: "window",
            reason: "must be at least 1".into(),
        };
        assert_eq!(
            err.to_string(),
            "invalid parameter 'window': must be at least 1"
        );
    }
}

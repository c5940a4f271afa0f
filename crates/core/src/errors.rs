use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("domain invariant violation: {0}")]
    InvariantViolation(String),
}

impl DomainError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Reserved for conditions the pricing algorithms make unreachable
    /// (cap or monotonicity breaches). Surfacing one is a defect.
    pub fn invariant(message: impl Into<String>) -> Self {
        Self::InvariantViolation(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::DomainError;

    #[test]
    fn invalid_input_renders_message() {
        let error = DomainError::invalid_input("round must be at least 1");
        assert_eq!(error.to_string(), "invalid input: round must be at least 1");
    }

    #[test]
    fn invariant_violation_is_distinguishable() {
        let error = DomainError::invariant("next offer exceeded cap");
        assert!(matches!(error, DomainError::InvariantViolation(_)));
    }
}

use freightdesk_core::DomainError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("registry web key is not configured")]
    MissingWebKey,
    #[error("registry rejected credentials (401 unauthorized)")]
    Authentication,
    #[error("registry request failed with status {status}")]
    UpstreamStatus { status: u16 },
    #[error("registry request failed: {source}")]
    Transport {
        #[source]
        source: reqwest::Error,
    },
    #[error("registry response could not be decoded: {0}")]
    Decode(String),
    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl RegistryError {
    /// Typed transient classification driving the retry loop. Only
    /// gateway-class statuses and transport-level timeouts/connect
    /// failures are worth retrying; everything else fails as-is.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::UpstreamStatus { status } => matches!(status, 502 | 503 | 504),
            Self::Transport { source } => source.is_timeout() || source.is_connect(),
            Self::MissingWebKey | Self::Authentication | Self::Decode(_) | Self::Domain(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use freightdesk_core::DomainError;

    use super::RegistryError;

    #[test]
    fn gateway_statuses_are_transient() {
        for status in [502, 503, 504] {
            assert!(RegistryError::UpstreamStatus { status }.is_transient());
        }
    }

    #[test]
    fn client_errors_and_auth_failures_are_not_transient() {
        assert!(!RegistryError::UpstreamStatus { status: 400 }.is_transient());
        assert!(!RegistryError::UpstreamStatus { status: 404 }.is_transient());
        assert!(!RegistryError::UpstreamStatus { status: 500 }.is_transient());
        assert!(!RegistryError::Authentication.is_transient());
        assert!(!RegistryError::MissingWebKey.is_transient());
        assert!(!RegistryError::Decode("truncated body".to_string()).is_transient());
        assert!(!RegistryError::Domain(DomainError::invalid_input("empty mc")).is_transient());
    }
}

use mbot_core::BotError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("{provider} request failed: {source}")]
    Request {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{provider} returned HTTP {status}")]
    Status { provider: &'static str, status: u16 },

    #[error("{provider} response not understood: {reason}")]
    Decode {
        provider: &'static str,
        reason: String,
    },
}

impl ProviderError {
    pub fn provider(&self) -> &'static str {
        match self {
            ProviderError::Request { provider, .. }
            | ProviderError::Status { provider, .. }
            | ProviderError::Decode { provider, .. } => provider,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ProviderError::Request { source, .. } if source.is_timeout())
    }
}

impl From<ProviderError> for BotError {
    fn from(err: ProviderError) -> Self {
        BotError::provider(err.provider(), err.to_string())
    }
}

pub type ProviderResult<T> = std::result::Result<T, ProviderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_converts_into_provider_unavailable() {
        let err = ProviderError::Status {
            provider: "weather",
            status: 503,
        };
        assert!(!err.is_timeout());
        match BotError::from(err) {
            BotError::ProviderUnavailable { provider, reason } => {
                assert_eq!(provider, "weather");
                assert!(reason.contains("503"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}

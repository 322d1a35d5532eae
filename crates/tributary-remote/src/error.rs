//! Error types for remote providers.

use crate::remote::RemoteKind;

/// Errors returned by a [`Remote`](crate::Remote) call.
///
/// These are recoverable at the call site; none of them should take the
/// process down.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RemoteError {
    /// The credentials were missing, expired or rejected.
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The repository, user or file does not exist (or is hidden).
    #[error("not found: {0}")]
    NotFound(String),

    /// The credentials are valid but lack access.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// The provider throttled the request.
    #[error("rate limited by provider{}", .retry_after.map(|s| format!(", retry after {}s", s)).unwrap_or_default())]
    RateLimited {
        /// Seconds until the limit resets, when the provider says.
        retry_after: Option<u64>,
    },

    /// A network, TLS or protocol failure talking to the provider.
    #[error("provider unavailable: {0}")]
    TransportUnavailable(String),

    /// The provider has no way to perform this action.
    #[error("{provider} does not support {operation}")]
    UnsupportedOperation {
        /// Provider kind
        provider: RemoteKind,
        /// What was attempted
        operation: &'static str,
    },
}

impl RemoteError {
    /// Creates an AuthenticationFailed error.
    pub fn authentication(msg: impl Into<String>) -> Self {
        Self::AuthenticationFailed(msg.into())
    }

    /// Creates a NotFound error.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Creates a PermissionDenied error.
    pub fn permission_denied(msg: impl Into<String>) -> Self {
        Self::PermissionDenied(msg.into())
    }

    /// Creates a TransportUnavailable error.
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::TransportUnavailable(msg.into())
    }

    /// Creates an UnsupportedOperation error.
    pub fn unsupported(provider: RemoteKind, operation: &'static str) -> Self {
        Self::UnsupportedOperation {
            provider,
            operation,
        }
    }

    /// Returns true if this is a transient error that might succeed on retry.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::RateLimited { .. } | Self::TransportUnavailable(_)
        )
    }
}

impl From<reqwest::Error> for RemoteError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::TransportUnavailable(format!("invalid response body: {}", err))
        } else {
            Self::TransportUnavailable(err.to_string())
        }
    }
}

/// Errors raised while choosing and constructing the active remote.
///
/// Both variants are fatal: the server must not start serving.
#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    /// No provider flag is set.
    #[error("version control system not configured")]
    NoProviderConfigured,

    /// The selected provider rejected its settings.
    #[error("failed to initialize {kind} remote: {reason}")]
    ProviderConstructionFailed {
        /// Provider that was being built
        kind: RemoteKind,
        /// What was wrong
        reason: String,
    },
}

impl SetupError {
    /// Creates a ProviderConstructionFailed error.
    pub fn construction(kind: RemoteKind, reason: impl Into<String>) -> Self {
        Self::ProviderConstructionFailed {
            kind,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            RemoteError::not_found("octocat/hello").to_string(),
            "not found: octocat/hello"
        );
        assert_eq!(
            RemoteError::RateLimited {
                retry_after: Some(30)
            }
            .to_string(),
            "rate limited by provider, retry after 30s"
        );
        assert_eq!(
            RemoteError::RateLimited { retry_after: None }.to_string(),
            "rate limited by provider"
        );
        assert_eq!(
            RemoteError::unsupported(RemoteKind::Gogs, "oauth login").to_string(),
            "self-hosted-git does not support oauth login"
        );
    }

    #[test]
    fn test_is_transient() {
        assert!(RemoteError::unavailable("connection reset").is_transient());
        assert!(RemoteError::RateLimited { retry_after: None }.is_transient());
        assert!(!RemoteError::authentication("bad token").is_transient());
        assert!(!RemoteError::not_found("repo").is_transient());
    }

    #[test]
    fn test_setup_error_display() {
        assert_eq!(
            SetupError::NoProviderConfigured.to_string(),
            "version control system not configured"
        );
        assert_eq!(
            SetupError::construction(RemoteKind::BitbucketServer, "consumer key is required")
                .to_string(),
            "failed to initialize bitbucket-server remote: consumer key is required"
        );
    }
}

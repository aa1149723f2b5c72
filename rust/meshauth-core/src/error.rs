use http::StatusCode;
use thiserror::Error;

/// The message every failed credential check produces externally, regardless
/// of whether the credential referred to nothing or to the wrong thing
pub const REJECTED_CREDENTIAL_MESSAGE: &str = "Invalid credential";

#[derive(Error, Debug)]
pub enum PeerError {
    #[error("{0}")]
    Other(anyhow::Error),

    /// The credential does not have a recognizable shape; caused by the
    /// client and never worth retrying
    #[error("Malformed credential: {0}")]
    MalformedCredential(&'static str),

    #[error("No session matches the presented credential")]
    UnknownSession,

    #[error("No access token matches the presented key material")]
    UnknownToken,

    #[error("Presented key material does not match the access token")]
    InvalidCredential,

    #[error("Service name and signature do not match a registered service")]
    UnknownService,

    /// The credential checked out but the identity behind it could not be
    /// loaded; a data integrity fault on the server side
    #[error("Unable to resolve identity: {0}")]
    UnresolvedIdentity(String),

    #[error("Timed out waiting for the {0}")]
    IdentityResolutionTimeout(&'static str),

    #[error("Client used before it was configured: {0}")]
    UnconfiguredClient(&'static str),
}

impl PeerError {
    /// True for every failure that means "this caller is not who they claim
    /// to be". These must be indistinguishable from the outside.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            PeerError::UnknownSession
                | PeerError::UnknownToken
                | PeerError::InvalidCredential
                | PeerError::UnknownService
        )
    }

    /// True if the caller may try again later (with backoff)
    pub fn is_retryable(&self) -> bool {
        matches!(self, PeerError::IdentityResolutionTimeout(_))
    }

    /// The message that may be shown to the caller. Rejections collapse to a
    /// single message and server-side faults reveal nothing about their cause.
    pub fn public_message(&self) -> String {
        match self {
            error if error.is_rejection() => REJECTED_CREDENTIAL_MESSAGE.to_owned(),
            PeerError::MalformedCredential(_) => self.to_string(),
            PeerError::IdentityResolutionTimeout(_) => {
                "Identity resolution is temporarily unavailable".to_owned()
            }
            _ => "Internal error".to_owned(),
        }
    }
}

impl From<anyhow::Error> for PeerError {
    fn from(error: anyhow::Error) -> Self {
        PeerError::Other(error)
    }
}

impl From<&PeerError> for StatusCode {
    fn from(value: &PeerError) -> Self {
        match value {
            PeerError::MalformedCredential(_) => StatusCode::BAD_REQUEST,
            PeerError::UnknownSession
            | PeerError::UnknownToken
            | PeerError::InvalidCredential
            | PeerError::UnknownService => StatusCode::UNAUTHORIZED,
            PeerError::IdentityResolutionTimeout(_) => StatusCode::SERVICE_UNAVAILABLE,
            PeerError::UnresolvedIdentity(_)
            | PeerError::UnconfiguredClient(_)
            | PeerError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use http::StatusCode;

    use super::PeerError;

    #[test]
    fn it_reports_unknown_and_invalid_credentials_identically() {
        let unknown = PeerError::UnknownToken;
        let invalid = PeerError::InvalidCredential;

        assert_eq!(unknown.public_message(), invalid.public_message());
        assert_eq!(StatusCode::from(&unknown), StatusCode::from(&invalid));
        assert_ne!(unknown.to_string(), invalid.to_string());
    }

    #[test]
    fn it_keeps_integrity_faults_apart_from_rejections() {
        let fault = PeerError::UnresolvedIdentity("owner u-1 has no profile".into());

        assert!(!fault.is_rejection());
        assert_eq!(StatusCode::from(&fault), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!fault.public_message().contains("u-1"));
    }

    #[test]
    fn it_only_marks_timeouts_as_retryable() {
        assert!(PeerError::IdentityResolutionTimeout("token store").is_retryable());
        assert!(!PeerError::InvalidCredential.is_retryable());
        assert!(!PeerError::MalformedCredential("Missing key separator").is_retryable());
        assert_eq!(
            StatusCode::from(&PeerError::IdentityResolutionTimeout("token store")),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}

use thiserror::Error;

use super::dto::Alert;
use crate::backend::BackendError;

/// How a failed submission is presented to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignUpFailure {
    EmailInUse,
    Unexpected,
}

impl SignUpFailure {
    pub fn alert(self) -> Alert {
        match self {
            SignUpFailure::EmailInUse => Alert::EMAIL_IN_USE,
            SignUpFailure::Unexpected => Alert::UNEXPECTED,
        }
    }
}

#[derive(Debug, Error)]
pub enum SignUpError {
    #[error("account creation failed: {0}")]
    Backend(#[from] BackendError),
    #[error("account created but profile document write failed")]
    ProfileWrite(#[source] anyhow::Error),
    #[error("account created but session flags could not be stored")]
    SessionWrite(#[source] anyhow::Error),
}

impl SignUpError {
    pub fn classify(&self) -> SignUpFailure {
        match self {
            SignUpError::Backend(BackendError::EmailAlreadyInUse) => SignUpFailure::EmailInUse,
            SignUpError::Backend(_) | SignUpError::ProfileWrite(_) | SignUpError::SessionWrite(_) => {
                SignUpFailure::Unexpected
            }
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            SignUpError::Backend(b) => b.code(),
            SignUpError::ProfileWrite(_) => "profile-write-failed",
            SignUpError::SessionWrite(_) => "session-write-failed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_email_in_use_gets_specific_alert() {
        let in_use = SignUpError::from(BackendError::EmailAlreadyInUse);
        assert_eq!(in_use.classify(), SignUpFailure::EmailInUse);
        assert_eq!(in_use.classify().alert(), Alert::EMAIL_IN_USE);

        let others = [
            SignUpError::from(BackendError::Network("connection reset".into())),
            SignUpError::from(BackendError::RateLimited),
            SignUpError::from(BackendError::Unexpected(anyhow::anyhow!("boom"))),
            SignUpError::ProfileWrite(anyhow::anyhow!("document store down")),
            SignUpError::SessionWrite(anyhow::anyhow!("disk full")),
        ];
        for err in others {
            assert_eq!(err.classify(), SignUpFailure::Unexpected, "{err}");
            assert_eq!(err.classify().alert(), Alert::UNEXPECTED);
        }
    }

    #[test]
    fn codes_distinguish_post_creation_failures() {
        assert_eq!(
            SignUpError::from(BackendError::EmailAlreadyInUse).code(),
            "auth/email-already-in-use"
        );
        assert_eq!(
            SignUpError::SessionWrite(anyhow::anyhow!("disk full")).code(),
            "session-write-failed"
        );
    }
}

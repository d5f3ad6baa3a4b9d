use crate::domain::{Credential, CredentialError, Identity};
use chrono::{Duration, Utc};

/// Derives signed broker credentials for a device identity
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait CredentialProvider: Send + Sync {
    /// Issue a fresh credential. Never retries; every failure is a distinct `CredentialError`.
    fn issue(&self, identity: &Identity) -> Result<Credential, CredentialError>;

    /// Keep `credential` unless it expires within `margin`, otherwise issue a replacement
    fn renew(
        &self,
        identity: &Identity,
        credential: Credential,
        margin: Duration,
    ) -> Result<Credential, CredentialError> {
        if credential.needs_renewal(Utc::now(), margin) {
            self.issue(identity)
        } else {
            Ok(credential)
        }
    }
}

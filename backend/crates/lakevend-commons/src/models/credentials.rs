use std::fmt;

use chrono::{DateTime, Duration, Utc};

use crate::errors::{ModelError, Result};

/// Short-lived access key / secret / session token triple with its expiry.
///
/// Held only for the duration of a read; it is deliberately not
/// `Serialize`, and `Debug` never prints the secret or the token.
#[derive(Clone, PartialEq, Eq)]
pub struct TemporaryCredentialBundle {
    access_key_id: String,
    secret_access_key: String,
    session_token: String,
    expiration: DateTime<Utc>,
}

impl TemporaryCredentialBundle {
    pub fn try_new(
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        session_token: impl Into<String>,
        expiration: DateTime<Utc>,
    ) -> Result<Self> {
        let access_key_id = access_key_id.into();
        let secret_access_key = secret_access_key.into();
        let session_token = session_token.into();

        if access_key_id.is_empty() {
            return Err(ModelError::Empty { field: "access_key_id" });
        }
        if secret_access_key.is_empty() {
            return Err(ModelError::Empty { field: "secret_access_key" });
        }
        if session_token.is_empty() {
            return Err(ModelError::Empty { field: "session_token" });
        }

        Ok(Self {
            access_key_id,
            secret_access_key,
            session_token,
            expiration,
        })
    }

    pub fn access_key_id(&self) -> &str {
        &self.access_key_id
    }

    pub fn secret_access_key(&self) -> &str {
        &self.secret_access_key
    }

    pub fn session_token(&self) -> &str {
        &self.session_token
    }

    pub fn expiration(&self) -> DateTime<Utc> {
        self.expiration
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expiration
    }

    /// Time left before expiry; zero once expired.
    pub fn remaining(&self, now: DateTime<Utc>) -> Duration {
        (self.expiration - now).max(Duration::zero())
    }
}

impl fmt::Debug for TemporaryCredentialBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemporaryCredentialBundle")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"[REDACTED]")
            .field("session_token", &"[REDACTED]")
            .field("expiration", &self.expiration)
            .finish()
    }
}

//! Claims carried in every identity token.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use pulse_core::types::UserId;

/// JWT claims payload. Immutable once signed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user identity.
    pub sub: UserId,
    /// Account e-mail address.
    pub email: String,
    /// Subscription plan.
    pub plan: String,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
}

impl Claims {
    /// Returns the Identity from the subject claim.
    pub fn user_id(&self) -> UserId {
        self.sub
    }

    /// Returns the expiration as a `DateTime<Utc>`.
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// Whether the token is expired at `now` (unix seconds).
    pub fn is_expired_at(&self, now: i64) -> bool {
        now >= self.exp
    }

    /// Remaining lifetime in seconds at `now` (0 if expired).
    pub fn remaining_ttl_seconds(&self, now: i64) -> u64 {
        u64::try_from(self.exp - now).unwrap_or(0)
    }
}

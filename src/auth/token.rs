//! Opaque bearer tokens for the JSON API.
//!
//! Format: `{mac}:{user_id}:{username}:{company_id}:{issued_at_ms}` where `mac`
//! is hex HMAC-SHA256 over everything after the first colon. Tokens carry their
//! own expiry; there is no revocation list.

use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

pub const TOKEN_TTL_SECS: i64 = 3600;

/// Identity carried by a valid token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    pub user_id: i64,
    pub username: String,
    pub company_id: i64,
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("malformed token")]
    Malformed,
    #[error("signature mismatch")]
    BadSignature,
    #[error("token expired")]
    Expired,
}

#[derive(Clone)]
pub struct TokenSigner {
    key: Vec<u8>,
    ttl: Duration,
}

impl TokenSigner {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self {
            key: secret.as_ref().to_vec(),
            ttl: Duration::seconds(TOKEN_TTL_SECS),
        }
    }

    /// Signer with a random 32-byte secret; tokens die with the process.
    pub fn random() -> Self {
        let bytes: [u8; 32] = rand::rng().random();
        Self::new(hex::encode(bytes))
    }

    fn mac(&self) -> HmacSha256 {
        HmacSha256::new_from_slice(&self.key).expect("HMAC takes keys of any size")
    }

    pub fn create_token(&self, user_id: i64, username: &str, company_id: i64) -> String {
        self.create_token_at(user_id, username, company_id, Utc::now())
    }

    pub fn create_token_at(
        &self,
        user_id: i64,
        username: &str,
        company_id: i64,
        issued_at: DateTime<Utc>,
    ) -> String {
        let data = format!(
            "{user_id}:{username}:{company_id}:{}",
            issued_at.timestamp_millis()
        );
        let mut mac = self.mac();
        mac.update(data.as_bytes());
        let sig = hex::encode(mac.finalize().into_bytes());
        format!("{sig}:{data}")
    }

    /// Verify against the current time. Failures are logged at debug level.
    pub fn verify_token(&self, token: &str) -> Option<TokenClaims> {
        match self.verify_at(token, Utc::now()) {
            Ok(claims) => Some(claims),
            Err(e) => {
                log::debug!("Rejected token: {e}");
                None
            }
        }
    }

    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<TokenClaims, TokenError> {
        let (sig_hex, data) = token.split_once(':').ok_or(TokenError::Malformed)?;
        let sig = hex::decode(sig_hex).map_err(|_| TokenError::Malformed)?;

        let mut mac = self.mac();
        mac.update(data.as_bytes());
        mac.verify_slice(&sig).map_err(|_| TokenError::BadSignature)?;

        // user_id first, then username, company_id and timestamp taken from the right.
        let (user_id, rest) = data.split_once(':').ok_or(TokenError::Malformed)?;
        let (rest, issued_ms) = rest.rsplit_once(':').ok_or(TokenError::Malformed)?;
        let (username, company_id) = rest.rsplit_once(':').ok_or(TokenError::Malformed)?;

        let user_id: i64 = user_id.parse().map_err(|_| TokenError::Malformed)?;
        let company_id: i64 = company_id.parse().map_err(|_| TokenError::Malformed)?;
        let issued_ms: i64 = issued_ms.parse().map_err(|_| TokenError::Malformed)?;

        // Issue time is stored in whole milliseconds; compare at that precision.
        if now.timestamp_millis().saturating_sub(issued_ms) > self.ttl.num_milliseconds() {
            return Err(TokenError::Expired);
        }

        Ok(TokenClaims {
            user_id,
            username: username.to_string(),
            company_id,
        })
    }
}

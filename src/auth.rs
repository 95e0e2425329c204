//! Admin session context.
//!
//! A session is an ordinary value: it is created by [`AdminSession::login`] or
//! [`AdminSession::restore`], handed to whatever needs it, and ended with
//! [`AdminSession::logout`]. Token checks are pure functions over the token
//! string so they can run without touching any storage.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use tracing::{info, instrument, warn};

use crate::client::ApiClient;
use crate::error::{Result, TicketdeskError};
use crate::model::{AdminUser, TokenClaims};

const ADMIN_ROLE: &str = "admin";

/// Decode the claims segment of a JWT.
///
/// The signature is not verified here; the backend does that on every request.
pub fn decode_claims(token: &str) -> Result<TokenClaims> {
    let mut segments = token.trim().split('.');
    let payload = match (segments.next(), segments.next(), segments.next(), segments.next()) {
        (Some(_), Some(payload), Some(_), None) => payload,
        _ => {
            return Err(TicketdeskError::InvalidToken(
                "expected three dot-separated segments".to_string(),
            ))
        }
    };
    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| TicketdeskError::InvalidToken(e.to_string()))?;
    serde_json::from_slice(&bytes).map_err(|e| TicketdeskError::InvalidToken(e.to_string()))
}

/// Whether the claims grant admin access at `now`.
pub fn claims_grant_admin(claims: &TokenClaims, now: DateTime<Utc>) -> bool {
    let unexpired = claims.exp.map_or(true, |exp| exp > now.timestamp());
    claims.role.eq_ignore_ascii_case(ADMIN_ROLE) && unexpired
}

/// Whether `token` is a well-formed, unexpired admin token.
pub fn is_admin_token(token: &str, now: DateTime<Utc>) -> bool {
    decode_claims(token)
        .map(|claims| claims_grant_admin(&claims, now))
        .unwrap_or(false)
}

/// An authenticated back-office session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminSession {
    token: String,
    user: AdminUser,
}

impl AdminSession {
    /// Sign in with email and password. Non-admin accounts are rejected.
    #[instrument(skip(client, password))]
    pub async fn login(client: &ApiClient, email: &str, password: &str) -> Result<Self> {
        let response = client.login(email, password).await?;
        let session = Self::from_token(response.token, response.user, Utc::now())?;
        info!(user = %session.user.email, "admin signed in");
        Ok(session)
    }

    /// Rebuild a session from a previously stored token.
    pub fn restore(token: impl Into<String>, now: DateTime<Utc>) -> Result<Self> {
        Self::from_token(token.into(), None, now)
    }

    fn from_token(token: String, user: Option<AdminUser>, now: DateTime<Utc>) -> Result<Self> {
        let claims = decode_claims(&token)?;
        if !claims_grant_admin(&claims, now) {
            warn!(role = %claims.role, exp = ?claims.exp, "token does not grant admin access");
            return Err(TicketdeskError::NotAdmin);
        }
        let user = user.unwrap_or_else(|| claims.into());
        Ok(Self { token, user })
    }

    /// End the session. The token is dropped with it.
    pub fn logout(self) {
        info!(user = %self.user.email, "admin signed out");
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn user(&self) -> &AdminUser {
        &self.user
    }

    /// Value for an `Authorization` header.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

use serde::{Deserialize, Serialize};

/// The signed-in back-office user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminUser {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: String,
}

/// Claims carried in the payload segment of an auth token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    #[serde(default, alias = "_id", alias = "userId")]
    pub id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: String,
    /// Expiry as unix seconds.
    #[serde(default)]
    pub exp: Option<i64>,
}

impl From<TokenClaims> for AdminUser {
    fn from(claims: TokenClaims) -> Self {
        Self {
            id: claims.id,
            email: claims.email,
            role: claims.role,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct LoginResponse {
    pub token: String,
    #[serde(default)]
    pub user: Option<AdminUser>,
}

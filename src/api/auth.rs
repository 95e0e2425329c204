use tracing::{debug, instrument};

use super::Api;
use crate::error::Result;
use crate::model::{LoginRequest, LoginResponse};

#[instrument(skip(api, password))]
pub(crate) async fn login(api: &Api<'_>, email: &str, password: &str) -> Result<LoginResponse> {
    let response: LoginResponse = api
        .post_json("auth/login", &LoginRequest { email, password })
        .await?;
    debug!(has_user = response.user.is_some(), "login accepted");
    Ok(response)
}

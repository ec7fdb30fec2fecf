use axum::extract::State;
use axum::http::StatusCode;
use axum::Form;
use serde::Deserialize;
use serde::Serialize;

use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::handlers::ApiSuccess;
use crate::inbound::http::router::AppState;
use crate::user::ports::UserServicePort;

/// OAuth2 password form; `username` carries the email address
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    username: String,
    password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessTokenData {
    pub access_token: String,
    pub token_type: String,
}

pub async fn login_access_token<US: UserServicePort>(
    State(state): State<AppState<US>>,
    Form(form): Form<LoginForm>,
) -> Result<ApiSuccess<AccessTokenData>, ApiError> {
    let token = state
        .user_service
        .login(&form.username, &form.password)
        .await?;

    Ok(ApiSuccess::new(
        StatusCode::OK,
        AccessTokenData {
            access_token: token.access_token,
            token_type: token.token_type.to_string(),
        },
    ))
}

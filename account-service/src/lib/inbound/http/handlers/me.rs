use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use axum::Json;
use serde::Deserialize;

use crate::domain::user::models::UpdateUserCommand;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::handlers::ApiSuccess;
use crate::inbound::http::handlers::UserData;
use crate::inbound::http::middleware::AuthenticatedUser;
use crate::inbound::http::router::AppState;
use crate::user::ports::UserServicePort;

/// HTTP request body for updating the caller's own account (raw JSON)
#[derive(Debug, Deserialize)]
pub struct UpdateMeRequest {
    pub password: Option<String>,
    pub name: Option<String>,
    pub major: Option<String>,
    #[serde(alias = "class_")]
    pub class: Option<String>,
}

impl From<UpdateMeRequest> for UpdateUserCommand {
    fn from(req: UpdateMeRequest) -> Self {
        Self {
            password: req.password,
            name: req.name,
            major: req.major,
            class: req.class,
        }
    }
}

pub async fn read_me(
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
) -> ApiSuccess<UserData> {
    ApiSuccess::new(StatusCode::OK, user.into())
}

pub async fn update_me<US: UserServicePort>(
    State(state): State<AppState<US>>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    Json(req): Json<UpdateMeRequest>,
) -> Result<ApiSuccess<UserData>, ApiError> {
    state
        .user_service
        .update_user(&user.id, req.into())
        .await
        .map_err(ApiError::from)
        .map(|user| ApiSuccess::new(StatusCode::OK, user.into()))
}

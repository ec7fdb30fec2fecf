//! Administrative endpoints, mounted behind the `admin2` gate.

use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use crate::domain::user::models::Permissions;
use crate::domain::user::models::Role;
use crate::domain::user::models::UpdateAccessCommand;
use crate::domain::user::models::UserId;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::handlers::ApiSuccess;
use crate::inbound::http::handlers::UserData;
use crate::inbound::http::router::AppState;
use crate::user::errors::UserError;
use crate::user::ports::UserServicePort;

/// HTTP request body for changing role and/or permissions (raw JSON)
#[derive(Debug, Deserialize)]
pub struct UpdateAccessRequest {
    pub role: Option<String>,
    pub permissions: Option<Vec<String>>,
}

impl UpdateAccessRequest {
    fn try_into_command(self) -> Result<UpdateAccessCommand, UserError> {
        let role = self.role.map(|r| r.parse::<Role>()).transpose()?;

        Ok(UpdateAccessCommand {
            role,
            permissions: self.permissions.map(|p| p.into_iter().collect::<Permissions>()),
        })
    }
}

pub async fn users_count<US: UserServicePort>(
    State(state): State<AppState<US>>,
) -> Result<ApiSuccess<i64>, ApiError> {
    let count = state.user_service.count_users().await?;

    Ok(ApiSuccess::new(StatusCode::OK, count))
}

pub async fn get_user<US: UserServicePort>(
    State(state): State<AppState<US>>,
    Path(id): Path<String>,
) -> Result<ApiSuccess<UserData>, ApiError> {
    let user_id = UserId::from_string(&id).map_err(UserError::from)?;

    state
        .user_service
        .get_user(&user_id)
        .await
        .map_err(ApiError::from)
        .map(|user| ApiSuccess::new(StatusCode::OK, user.into()))
}

pub async fn update_access<US: UserServicePort>(
    State(state): State<AppState<US>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateAccessRequest>,
) -> Result<ApiSuccess<UserData>, ApiError> {
    let user_id = UserId::from_string(&id).map_err(UserError::from)?;
    let command = req.try_into_command()?;

    state
        .user_service
        .update_access(&user_id, command)
        .await
        .map_err(ApiError::from)
        .map(|user| ApiSuccess::new(StatusCode::OK, user.into()))
}

use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;

use crate::domain::user::models::SecondaryId;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::handlers::ApiSuccess;
use crate::inbound::http::handlers::UserData;
use crate::inbound::http::router::AppState;
use crate::user::errors::UserError;
use crate::user::ports::UserServicePort;

pub async fn get_user_by_secondary_id<US: UserServicePort>(
    State(state): State<AppState<US>>,
    Path(id_troy): Path<String>,
) -> Result<ApiSuccess<UserData>, ApiError> {
    let id_troy = SecondaryId::new(id_troy).map_err(UserError::from)?;

    state
        .user_service
        .get_user_by_secondary_id(&id_troy)
        .await
        .map_err(ApiError::from)
        .map(|user| ApiSuccess::new(StatusCode::OK, user.into()))
}

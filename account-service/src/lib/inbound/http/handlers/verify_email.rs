use axum::extract::Query;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;

use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::handlers::ApiSuccess;
use crate::inbound::http::handlers::MessageData;
use crate::inbound::http::router::AppState;
use crate::user::ports::UserServicePort;

#[derive(Debug, Deserialize)]
pub struct VerifyEmailQuery {
    token: String,
}

pub async fn verify_email<US: UserServicePort>(
    State(state): State<AppState<US>>,
    Query(query): Query<VerifyEmailQuery>,
) -> Result<ApiSuccess<MessageData>, ApiError> {
    state.user_service.verify_email(&query.token).await?;

    Ok(ApiSuccess::new(
        StatusCode::OK,
        MessageData::new("Email verified successfully. You can now log in."),
    ))
}

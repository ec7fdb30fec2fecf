use axum::extract::Query;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;

use crate::domain::user::models::EmailAddress;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::handlers::ApiSuccess;
use crate::inbound::http::handlers::MessageData;
use crate::inbound::http::router::AppState;
use crate::user::errors::UserError;
use crate::user::ports::UserServicePort;

#[derive(Debug, Deserialize)]
pub struct TestEmailQuery {
    email_to: String,
}

/// Send a test message through the configured mail provider.
pub async fn test_email<US: UserServicePort>(
    State(state): State<AppState<US>>,
    Query(query): Query<TestEmailQuery>,
) -> Result<ApiSuccess<MessageData>, ApiError> {
    let email_to = EmailAddress::new(query.email_to).map_err(UserError::from)?;

    state.user_service.send_test_email(&email_to).await?;

    Ok(ApiSuccess::new(
        StatusCode::CREATED,
        MessageData::new("Test email sent"),
    ))
}

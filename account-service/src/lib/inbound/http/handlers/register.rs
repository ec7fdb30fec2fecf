use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::RegisterUserCommand;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::handlers::ApiSuccess;
use crate::inbound::http::handlers::MessageData;
use crate::inbound::http::router::AppState;
use crate::user::errors::UserError;
use crate::user::ports::UserServicePort;

/// HTTP request body for self-registration (raw JSON)
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    pub major: Option<String>,
    #[serde(alias = "class_")]
    pub class: Option<String>,
}

impl RegisterRequest {
    fn try_into_command(self) -> Result<RegisterUserCommand, UserError> {
        Ok(RegisterUserCommand {
            email: EmailAddress::new(self.email)?,
            password: self.password,
            name: self.name,
            major: self.major,
            class: self.class,
        })
    }
}

pub async fn register<US: UserServicePort>(
    State(state): State<AppState<US>>,
    Json(req): Json<RegisterRequest>,
) -> Result<ApiSuccess<MessageData>, ApiError> {
    let command = req.try_into_command()?;

    state.user_service.register(command).await?;

    Ok(ApiSuccess::new(
        StatusCode::CREATED,
        MessageData::new(
            "Registration successful. Please check your email for a verification link.",
        ),
    ))
}

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use chrono::DateTime;
use chrono::Utc;
use serde::Serialize;

use crate::access::AccessError;
use crate::user::errors::MailError;
use crate::user::errors::UserError;
use crate::user::models::User;

pub mod health;
pub mod login;
pub mod me;
pub mod private;
pub mod register;
pub mod users;
pub mod utils;
pub mod verify_email;

#[derive(Debug, Clone)]
pub struct ApiSuccess<T: Serialize + PartialEq>(StatusCode, Json<ApiResponseBody<T>>);

impl<T> PartialEq for ApiSuccess<T>
where
    T: Serialize + PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0 && self.1 .0 == other.1 .0
    }
}

impl<T: Serialize + PartialEq> ApiSuccess<T> {
    pub fn new(status: StatusCode, data: T) -> Self {
        ApiSuccess(status, Json(ApiResponseBody::new(status, data)))
    }
}

impl<T: Serialize + PartialEq> IntoResponse for ApiSuccess<T> {
    fn into_response(self) -> Response {
        (self.0, self.1).into_response()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    InternalServerError(String),
    UnprocessableEntity(String),
    BadRequest(String),
    NotFound(String),
    Unauthorized(String),
    Forbidden(String),
    BadGateway(String),
    ServiceUnavailable(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::InternalServerError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            ApiError::UnprocessableEntity(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            ApiError::BadGateway(msg) => (StatusCode::BAD_GATEWAY, msg),
            ApiError::ServiceUnavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
        };

        (status, Json(ApiResponseBody::new_error(status, message))).into_response()
    }
}

impl From<UserError> for ApiError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::NotFound(_) => ApiError::NotFound(err.to_string()),
            UserError::DomainRejected(_)
            | UserError::EmailAlreadyExists(_)
            | UserError::SecondaryIdAlreadyExists(_)
            | UserError::InvalidCredentials
            | UserError::Inactive
            | UserError::InvalidOrExpiredToken
            | UserError::AlreadyVerified => ApiError::BadRequest(err.to_string()),
            UserError::Unverified => ApiError::Unauthorized(err.to_string()),
            UserError::InvalidUserId(_)
            | UserError::InvalidEmail(_)
            | UserError::InvalidSecondaryId(_)
            | UserError::InvalidRole(_) => ApiError::UnprocessableEntity(err.to_string()),
            UserError::MailDelivery(MailError::Disabled) => {
                ApiError::ServiceUnavailable(err.to_string())
            }
            UserError::MailDelivery(_) => {
                tracing::warn!(error = %err, "Mail delivery failed");
                ApiError::BadGateway(err.to_string())
            }
            UserError::PasswordHashing(_)
            | UserError::TokenIssuance(_)
            | UserError::DatabaseError(_) => {
                tracing::error!(error = %err, "Request failed");
                ApiError::InternalServerError("Internal server error".to_string())
            }
        }
    }
}

impl From<AccessError> for ApiError {
    fn from(err: AccessError) -> Self {
        match err {
            AccessError::Unauthenticated | AccessError::Forbidden => {
                ApiError::Forbidden(err.to_string())
            }
            AccessError::UserNotFound => ApiError::NotFound(err.to_string()),
            AccessError::Inactive | AccessError::Unverified => {
                ApiError::BadRequest(err.to_string())
            }
            AccessError::Internal(_) => {
                ApiError::InternalServerError("Internal server error".to_string())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiResponseBody<T: Serialize + PartialEq> {
    status_code: u16,
    data: T,
}

impl<T: Serialize + PartialEq> ApiResponseBody<T> {
    pub fn new(status_code: StatusCode, data: T) -> Self {
        Self {
            status_code: status_code.as_u16(),
            data,
        }
    }
}

impl ApiResponseBody<ApiErrorData> {
    pub fn new_error(status_code: StatusCode, message: String) -> Self {
        Self {
            status_code: status_code.as_u16(),
            data: ApiErrorData { message },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiErrorData {
    pub message: String,
}

/// Plain confirmation payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageData {
    pub message: String,
}

impl MessageData {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Public view of an account; never includes the password hash
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserData {
    pub id: String,
    pub id_troy: String,
    pub name: String,
    pub email: String,
    pub major: Option<String>,
    pub class: Option<String>,
    pub role: String,
    pub permissions: Vec<String>,
    pub is_active: bool,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserData {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            id_troy: user.id_troy.to_string(),
            name: user.name.clone(),
            email: user.email.to_string(),
            major: user.major.clone(),
            class: user.class.clone(),
            role: user.role.to_string(),
            permissions: user.permissions.to_vec(),
            is_active: user.is_active,
            is_verified: user.is_verified,
            created_at: user.created_at,
        }
    }
}

impl From<User> for UserData {
    fn from(user: User) -> Self {
        (&user).into()
    }
}

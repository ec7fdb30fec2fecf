use std::sync::Arc;

use axum::extract::Request;
use axum::extract::State;
use axum::http;
use axum::middleware::Next;
use axum::response::Response;

use crate::access::AccessError;
use crate::access::AccessGate;
use crate::access::Authorizer;
use crate::domain::user::models::User;
use crate::inbound::http::handlers::ApiError;
use crate::user::ports::UserServicePort;

/// Account that passed the route's gate, stored in request extensions
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub User);

/// Middleware state: who resolves the token and what the route requires.
pub struct GateState<US>
where
    US: UserServicePort,
{
    authorizer: Authorizer<US>,
    gate: Arc<AccessGate>,
}

impl<US> GateState<US>
where
    US: UserServicePort,
{
    pub fn new(authorizer: Authorizer<US>, gate: AccessGate) -> Self {
        Self {
            authorizer,
            gate: Arc::new(gate),
        }
    }
}

impl<US> Clone for GateState<US>
where
    US: UserServicePort,
{
    fn clone(&self) -> Self {
        Self {
            authorizer: self.authorizer.clone(),
            gate: Arc::clone(&self.gate),
        }
    }
}

/// Middleware that resolves the bearer token and enforces the gate
pub async fn require_access<US: UserServicePort>(
    State(state): State<GateState<US>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_token_from_header(&req).ok_or(AccessError::Unauthenticated)?;

    let user = state.authorizer.authorize(&token, &state.gate).await?;

    req.extensions_mut().insert(AuthenticatedUser(user));

    Ok(next.run(req).await)
}

fn extract_token_from_header(req: &Request) -> Option<String> {
    let auth_str = req
        .headers()
        .get(http::header::AUTHORIZATION)?
        .to_str()
        .ok()?;

    let (scheme, token) = auth_str.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") || token.trim().is_empty() {
        return None;
    }

    Some(token.trim().to_string())
}

use std::sync::Arc;
use std::time::Duration;

use auth::Authenticator;
use axum::body::Body;
use axum::http::Request;
use axum::http::Response;
use axum::middleware;
use axum::routing::get;
use axum::routing::patch;
use axum::routing::post;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::handlers::health::health_check;
use super::handlers::login::login_access_token;
use super::handlers::me::read_me;
use super::handlers::me::update_me;
use super::handlers::private;
use super::handlers::register::register;
use super::handlers::users::get_user_by_secondary_id;
use super::handlers::utils::test_email;
use super::handlers::verify_email::verify_email;
use super::middleware::require_access;
use super::middleware::GateState;
use crate::access::AccessGate;
use crate::access::Authorizer;
use crate::domain::user::models::Permissions;
use crate::user::ports::UserServicePort;

/// Permission needed to look other accounts up by secondary id
pub const USER_READ_PERMISSION: &str = "user:read";

pub struct AppState<US>
where
    US: UserServicePort,
{
    pub user_service: Arc<US>,
    pub authorizer: Authorizer<US>,
}

impl<US> Clone for AppState<US>
where
    US: UserServicePort,
{
    fn clone(&self) -> Self {
        Self {
            user_service: Arc::clone(&self.user_service),
            authorizer: self.authorizer.clone(),
        }
    }
}

pub fn create_router<US: UserServicePort>(
    user_service: Arc<US>,
    authenticator: Arc<Authenticator>,
) -> Router {
    let authorizer = Authorizer::new(Arc::clone(&user_service), authenticator);
    let state = AppState {
        user_service,
        authorizer: authorizer.clone(),
    };

    let gate = |gate: AccessGate| GateState::new(authorizer.clone(), gate);

    let public_routes = Router::new()
        .route("/login/access-token", post(login_access_token::<US>))
        .route("/register", post(register::<US>))
        .route("/verify-email", get(verify_email::<US>))
        .route("/health-check", get(health_check));

    let me_routes = Router::new().route(
        "/users/me",
        get(read_me)
            .route_layer(middleware::from_fn_with_state(
                gate(AccessGate::active()),
                require_access::<US>,
            ))
            .merge(patch(update_me::<US>).route_layer(middleware::from_fn_with_state(
                gate(AccessGate::active_verified()),
                require_access::<US>,
            ))),
    );

    let lookup_routes = Router::new()
        .route(
            "/users/by-secondary-id/:id_troy",
            get(get_user_by_secondary_id::<US>),
        )
        .route_layer(middleware::from_fn_with_state(
            gate(AccessGate::require_permissions(Permissions::from_iter([
                USER_READ_PERMISSION,
            ]))),
            require_access::<US>,
        ));

    let private_routes = Router::new()
        .route("/private/users-count", get(private::users_count::<US>))
        .route("/private/users/:user_id", get(private::get_user::<US>))
        .route(
            "/private/users/:user_id/access",
            patch(private::update_access::<US>),
        )
        .route("/utils/test-email", post(test_email::<US>))
        .route_layer(middleware::from_fn_with_state(
            gate(AccessGate::admin2_only()),
            require_access::<US>,
        ));

    let api_routes = Router::new()
        .merge(public_routes)
        .merge(me_routes)
        .merge(lookup_routes)
        .merge(private_routes);

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri().path(),
                version = ?request.version(),
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::info!(
                method = %request.method(),
                path = %request.uri().path(),
                "Request started"
            );
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _span: &Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis(),
                    "Request completed"
                );
            },
        );

    Router::new()
        .nest("/api/v1", api_routes)
        .layer(trace_layer)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

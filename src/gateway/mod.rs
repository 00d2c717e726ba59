//! Axum-based HTTP gateway for the session/auth surface.
//!
//! Exposes the four auth endpoints plus a health probe, with the gateway
//! hardening the rest of the backend relies on:
//! - Proper HTTP/1.1 parsing and compliance (hyper)
//! - Request body size limits (64KB max)
//! - Request timeouts (30s) to prevent slow-loris abuse
//!
//! Downstream Q&A routes do not live here; they consume the auth core
//! through the [`CurrentUser`] extractor.

pub mod cookie;

use crate::auth::{AuthError, AuthService, AuthStore, Identity};
use crate::config::Config;
use anyhow::Result;
use axum::{
    extract::rejection::JsonRejection,
    extract::{FromRef, FromRequestParts, State},
    http::{header, request::Parts, HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use self::cookie::CookieConfig;
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;

/// Maximum request body size (64KB); auth bodies are tiny.
pub const MAX_BODY_SIZE: usize = 65_536;
/// Request timeout in seconds.
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Shared state for all axum handlers.
#[derive(Clone)]
pub struct AppState {
    pub auth: AuthService,
    pub cookie: CookieConfig,
    /// Whether new account signup is allowed.
    pub allow_registration: bool,
}

/// Auth routes without state or middleware applied. Kept separate so tests
/// (and a future Q&A router) can mount them alongside their own routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handle_health))
        .route("/auth/signup", post(handle_signup))
        .route("/auth/login", post(handle_login))
        .route("/auth/logout", post(handle_logout))
        .route("/auth/check-auth", get(handle_check_auth))
}

/// Full gateway router with hardening layers and state.
pub fn router(state: AppState) -> Router {
    routes()
        .layer(RequestBodyLimitLayer::new(MAX_BODY_SIZE))
        .layer(TimeoutLayer::new(Duration::from_secs(REQUEST_TIMEOUT_SECS)))
        .with_state(state)
}

/// Run the HTTP gateway until shutdown.
pub async fn run_gateway(host: &str, port: u16, config: Config) -> Result<()> {
    let addr: SocketAddr = format!("{host}:{port}").parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    let db_path = config.resolve_db_path()?;
    let store = Arc::new(AuthStore::open(&db_path)?);
    tracing::info!("auth store initialized at {}", db_path.display());

    let auth = AuthService::new(
        store,
        config.auth.session_ttl_secs,
        config.auth.bcrypt_cost,
    );
    let state = AppState {
        auth,
        cookie: CookieConfig {
            secure: config.auth.cookie_secure,
            ..Default::default()
        },
        allow_registration: config.auth.allow_registration,
    };

    let display_addr = listener.local_addr()?;
    println!("TutorHub auth gateway on http://{display_addr}");
    println!("  POST /auth/signup      — create a new account");
    println!("  POST /auth/login       — authenticate and set session cookie");
    println!("  POST /auth/logout      — delete session and clear cookie");
    println!("  GET  /auth/check-auth  — session status probe");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}

// ══════════════════════════════════════════════════════════════════════════
// HANDLERS
// ══════════════════════════════════════════════════════════════════════════

/// Request body for signup.
#[derive(Deserialize)]
struct SignupBody {
    username: String,
    password: String,
    role: Option<String>,
}

/// Request body for login.
#[derive(Deserialize)]
struct LoginBody {
    username: String,
    password: String,
}

/// Map an auth error to its response. Internal faults log the detail and
/// return a generic 500; everything else is a 4xx with a stable kind.
fn error_response(err: &AuthError) -> Response {
    if err.is_internal() {
        tracing::error!("auth request failed: {err}");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({
                "error": "internal_error",
                "message": "Internal server error",
            })),
        )
            .into_response();
    }

    let status = match err {
        AuthError::DuplicateUsername => StatusCode::CONFLICT,
        AuthError::InvalidCredentials
        | AuthError::Unauthenticated
        | AuthError::InvalidSession => StatusCode::UNAUTHORIZED,
        _ => StatusCode::BAD_REQUEST,
    };
    (
        status,
        Json(serde_json::json!({
            "error": err.kind(),
            "message": err.to_string(),
        })),
    )
        .into_response()
}

fn bad_request(rejection: &JsonRejection) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(serde_json::json!({
            "error": "invalid_request",
            "message": format!("Invalid request: {rejection}"),
        })),
    )
        .into_response()
}

async fn handle_health() -> impl IntoResponse {
    Json(serde_json::json!({"status": "ok"}))
}

/// POST /auth/signup
async fn handle_signup(
    State(state): State<AppState>,
    body: Result<Json<SignupBody>, JsonRejection>,
) -> Response {
    if !state.allow_registration {
        return (
            StatusCode::FORBIDDEN,
            Json(serde_json::json!({
                "error": "registration_disabled",
                "message": "Registration is disabled",
            })),
        )
            .into_response();
    }

    let body = match body {
        Ok(Json(b)) => b,
        Err(e) => return bad_request(&e),
    };

    match state
        .auth
        .signup(&body.username, &body.password, body.role.as_deref())
        .await
    {
        Ok(()) => (
            StatusCode::CREATED,
            Json(serde_json::json!({"message": "User created successfully"})),
        )
            .into_response(),
        Err(e) => error_response(&e),
    }
}

/// POST /auth/login
async fn handle_login(
    State(state): State<AppState>,
    body: Result<Json<LoginBody>, JsonRejection>,
) -> Response {
    let body = match body {
        Ok(Json(b)) => b,
        Err(e) => return bad_request(&e),
    };

    let (sid, identity) = match state.auth.login(&body.username, &body.password).await {
        Ok(result) => result,
        Err(e) => return error_response(&e),
    };

    let session_cookie =
        cookie::create_session_cookie(&sid, state.auth.session_ttl_secs(), &state.cookie);
    (
        StatusCode::OK,
        [(header::SET_COOKIE, session_cookie.to_string())],
        Json(serde_json::json!({
            "message": "Login successful",
            "role": identity.role,
        })),
    )
        .into_response()
}

/// POST /auth/logout
///
/// Always succeeds for missing or stale sessions; only a storage fault is an
/// error. The cookie is cleared either way.
async fn handle_logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let sid = cookie::extract_session_id(&headers);
    if let Err(e) = state.auth.logout(sid.as_deref()) {
        return error_response(&e);
    }

    let clear = cookie::create_clear_cookie(&state.cookie);
    (
        StatusCode::OK,
        [(header::SET_COOKIE, clear.to_string())],
        Json(serde_json::json!({"message": "Logged out successfully"})),
    )
        .into_response()
}

/// GET /auth/check-auth
///
/// Non-failing status probe for the UI; never returns an error status.
async fn handle_check_auth(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let sid = cookie::extract_session_id(&headers);
    let status = state.auth.check_status(sid.as_deref());

    let body = match status.identity {
        Some(identity) => serde_json::json!({
            "isAuthenticated": true,
            "user": {
                "username": identity.username,
                "role": identity.role,
            },
        }),
        None => serde_json::json!({"isAuthenticated": false}),
    };
    Json(body).into_response()
}

// ══════════════════════════════════════════════════════════════════════════
// EXTRACTOR
// ══════════════════════════════════════════════════════════════════════════

/// Identity of the requesting user, resolved from the session cookie.
///
/// The internal dependency surface for every protected route: add
/// `CurrentUser(identity): CurrentUser` to a handler and the request is
/// rejected with a 401 (`unauthenticated` or `invalid_session`) before the
/// handler body runs.
pub struct CurrentUser(pub Identity);

impl<S> FromRequestParts<S> for CurrentUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app = AppState::from_ref(state);
        let sid = cookie::extract_session_id(&parts.headers);
        app.auth
            .authenticate(sid.as_deref())
            .map(CurrentUser)
            .map_err(|e| error_response(&e))
    }
}

//! Dispatcher service routes

use std::any::Any;

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde_json::json;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::{
    AppState,
    error::{DispatchError, DispatchResult, failure_body},
    handlers::{self, Operation},
    session::{SessionContext, SessionResult, SessionStore},
    store::GameStore,
    validation::RequestBody,
};

/// Create the router for the dispatcher service
pub fn create_router<S: GameStore>(state: AppState<S>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api", post(dispatch::<S>).fallback(reject_method))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "dispatcher-service"
    }))
}

/// Answer any non-POST request on the dispatch endpoint
pub async fn reject_method() -> DispatchError {
    warn!("Rejected request with non-POST method");
    DispatchError::InvalidRequestMethod
}

/// Dispatch endpoint
///
/// The body is read as raw bytes so that malformed JSON is reported the same
/// way as a missing `method` field.
pub async fn dispatch<S: GameStore>(
    State(state): State<AppState<S>>,
    jar: CookieJar,
    body: Bytes,
) -> DispatchResult<(CookieJar, Response)> {
    let request = RequestBody::parse(&body).ok_or(DispatchError::MissingMethod)?;
    let method = request.method().ok_or(DispatchError::MissingMethod)?;
    let operation = Operation::resolve(method, state.settings.debug_session).inspect_err(|_| {
        warn!("Unknown method requested: {}", method);
    })?;

    info!("Dispatching method: {}", method);

    if !operation.uses_session() {
        let handled =
            handlers::handle(operation, &state.store, &request, SessionContext::default()).await?;
        return Ok((jar, handled.response));
    }

    let cookie_name = state.settings.session_cookie_name.as_str();
    let (known_id, before) = load_session(&state.sessions, &jar, cookie_name).await?;

    let handled = handlers::handle(operation, &state.store, &request, before.clone()).await?;

    if handled.session == before {
        return Ok((jar, handled.response));
    }

    // A new player identity always gets a new id.
    let session_id = match known_id {
        Some(id) if handled.session.player_id == before.player_id => id,
        _ => Uuid::new_v4().to_string(),
    };
    state.sessions.save(&session_id, &handled.session).await?;

    let cookie = Cookie::build((cookie_name.to_string(), session_id))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax);

    Ok((jar.add(cookie), handled.response))
}

/// Look up the caller's session. The cookie id is returned only when the
/// store knows it, so a client cannot choose its own session id.
async fn load_session(
    sessions: &SessionStore,
    jar: &CookieJar,
    cookie_name: &str,
) -> SessionResult<(Option<String>, SessionContext)> {
    let Some(id) = jar
        .get(cookie_name)
        .map(|cookie| cookie.value().to_string())
        .filter(|id| Uuid::parse_str(id).is_ok())
    else {
        return Ok((None, SessionContext::default()));
    };

    match sessions.load(&id).await? {
        Some(context) => Ok((Some(id), context)),
        None => {
            debug!("Ignoring unknown session id: {}", id);
            Ok((None, SessionContext::default()))
        }
    }
}

/// Render a handler panic in the standard failure envelope
fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unexpected failure".to_string()
    };

    error!("Request handler panicked: {}", detail);

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        failure_body(format!("Error: {}", detail)),
    )
        .into_response()
}

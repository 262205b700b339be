use axum::{
    Router,
    extract::{OriginalUri, Request, State},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, put},
};
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use std::any::Any;

use crate::{
    auth::require_auth,
    error::{AppError, ErrorReport, error_response},
    handlers::rest,
    state::AppState,
};

pub fn router(state: AppState) -> Router {
    // Unknown methods on known paths get the same 404 as unknown paths.
    let notes_router = Router::new()
        .route(
            "/",
            get(rest::get_notes)
                .post(rest::create_note)
                .fallback(not_found),
        )
        .route(
            "/{id}",
            put(rest::update_note)
                .delete(rest::delete_note)
                .fallback(not_found),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .route("/", get(rest::root))
        .nest("/api/notes", notes_router)
        .merge(
            SwaggerUi::new("/api-docs").url("/api-docs/openapi.json", rest::ApiDoc::openapi()),
        )
        .fallback(not_found)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            normalize_errors,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn not_found(OriginalUri(uri): OriginalUri) -> AppError {
    AppError::RouteNotFound(uri.path().to_string())
}

fn panic_response(payload: Box<dyn Any + Send + 'static>) -> Response {
    let detail = payload
        .downcast_ref::<String>()
        .cloned()
        .or_else(|| payload.downcast_ref::<&str>().map(|s| (*s).to_string()))
        .unwrap_or_else(|| "unknown panic payload".to_string());

    AppError::Panic(detail).into_response()
}

/// Gives every error response the `{ message, stack? }` shape. The stack is
/// only exposed outside production.
pub async fn normalize_errors(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let response = next.run(request).await;
    let status = response.status();

    if !status.is_client_error() && !status.is_server_error() {
        return response;
    }

    let production = state.environment.is_production();

    let report = response.extensions().get::<ErrorReport>().cloned();

    match report {
        Some(_) if production => response,
        Some(report) => error_response(status, report.message, Some(report.stack)),
        None => {
            let reason = status.canonical_reason().unwrap_or("Error").to_string();
            let stack = (!production).then(|| format!("{status}"));
            error_response(status, reason, stack)
        }
    }
}

pub mod auth;
pub mod cars;
pub mod roles;

use axum::{
    body::Bytes,
    http::{header, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{de::DeserializeOwned, Serialize};
use tower_http::{
    cors::CorsLayer,
    trace::{TraceLayer, DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, DefaultOnFailure},
};
use tracing::Level;
use utoipa::OpenApi;

use common::types::Health;

use crate::errors::JsonApiError;
use crate::openapi::ApiDoc;
use self::auth::ServerState;

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "OK", body = crate::openapi::HealthResponse)))]
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// `302 Found` to `location`, with the affected record as JSON body.
pub struct Redirect<T> {
    location: &'static str,
    body: T,
}

pub fn redirect_to<T: Serialize>(location: &'static str, body: T) -> Redirect<T> {
    Redirect { location, body }
}

impl<T: Serialize> IntoResponse for Redirect<T> {
    fn into_response(self) -> Response {
        (StatusCode::FOUND, [(header::LOCATION, self.location)], Json(self.body)).into_response()
    }
}

/// Path ids are parsed leniently: anything that is not an integer is
/// treated as an id that does not resolve.
pub fn parse_id(raw: &str) -> Option<i32> {
    raw.trim().parse::<i32>().ok()
}

/// Decode a submitted form body. Callers authorize first; a body that does
/// not fit `T` is a validation failure echoing what was sent.
pub fn decode_form<T: DeserializeOwned>(body: &Bytes) -> Result<T, JsonApiError> {
    serde_json::from_slice(body).map_err(|e| {
        let input = serde_json::from_slice::<serde_json::Value>(body)
            .unwrap_or_else(|_| serde_json::Value::String(String::from_utf8_lossy(body).into_owned()));
        JsonApiError::new(StatusCode::BAD_REQUEST, "Validation Error", Some(e.to_string())).with_input(&input)
    })
}

/// Build the full application router.
///
/// Catalog writes and role routes run behind the caller-resolution
/// middleware. Health, auth, the OpenAPI document and the catalog reads do
/// not, so a stale auth cookie never blocks browsing.
pub fn build_router(cors: CorsLayer, state: ServerState) -> Router {
    let public = Router::new()
        .route("/health", get(health))
        .route("/api-docs/openapi.json", get(openapi_json))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/cars", get(cars::list))
        .route("/cars/:id", get(cars::get));

    let app = Router::new()
        .route("/auth/me", get(auth::me))
        .route("/cars/create", get(cars::create_form).post(cars::create))
        .route("/cars/:id/edit", get(cars::edit_form).post(cars::update))
        .route("/cars/:id/delete", get(cars::delete_form).post(cars::delete))
        .route("/roles", get(roles::list))
        .route("/roles/create", get(roles::create_form).post(roles::create))
        .route("/roles/assign", get(roles::assign_form).post(roles::assign))
        .route("/users", get(roles::users))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::resolve_caller));

    public
        .merge(app)
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::Deserialize;
use tracing::info;
use utoipa::IntoParams;

use models::car::{self, CarInput};
use service::catalog::domain::{CarQuery, CarUpdate, UpdateOutcome};
use service::Caller;

use super::{decode_form, parse_id, redirect_to, Redirect};
use crate::errors::JsonApiError;
use crate::routes::auth::ServerState;

/// `?search=&sort=`; `searchString`/`sortOrder` are accepted as well.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    /// Case-sensitive substring of make or model
    #[serde(default, alias = "searchString")]
    pub search: Option<String>,
    /// price_desc | year_asc | year_desc; anything else sorts by price ascending
    #[serde(default, alias = "sortOrder")]
    pub sort: Option<String>,
}

#[utoipa::path(
    get, path = "/cars", tag = "cars",
    params(ListQuery),
    responses((status = 200, description = "List OK"))
)]
pub async fn list(State(state): State<ServerState>, Query(q): Query<ListQuery>) -> Result<Json<Vec<car::Model>>, JsonApiError> {
    let query = CarQuery::new(q.search, q.sort.as_deref());
    Ok(Json(state.catalog.list(&query).await?))
}

#[utoipa::path(
    get, path = "/cars/{id}", tag = "cars",
    params(("id" = i32, Path, description = "Car ID")),
    responses((status = 200, description = "OK"), (status = 404, description = "Not Found"))
)]
pub async fn get(State(state): State<ServerState>, Path(id): Path<String>) -> Result<Json<car::Model>, JsonApiError> {
    Ok(Json(state.catalog.get(parse_id(&id)).await?))
}

#[utoipa::path(
    get, path = "/cars/create", tag = "cars",
    responses((status = 200, description = "Empty form"), (status = 403, description = "Forbidden"))
)]
pub async fn create_form(State(state): State<ServerState>, Extension(caller): Extension<Caller>) -> Result<Json<CarInput>, JsonApiError> {
    Ok(Json(state.catalog.create_form(&caller)?))
}

#[utoipa::path(
    post, path = "/cars/create", tag = "cars",
    request_body = crate::openapi::CarInputDoc,
    responses(
        (status = 302, description = "Created; Location /cars"),
        (status = 400, description = "Validation Error"),
        (status = 403, description = "Forbidden")
    )
)]
pub async fn create(
    State(state): State<ServerState>,
    Extension(caller): Extension<Caller>,
    body: Bytes,
) -> Result<Redirect<car::Model>, JsonApiError> {
    caller.require_admin()?;
    let input: CarInput = decode_form(&body)?;
    match state.catalog.create(&caller, input.clone()).await {
        Ok(created) => Ok(redirect_to("/cars", created)),
        Err(e) => Err(JsonApiError::from(e).with_input(&input)),
    }
}

#[utoipa::path(
    get, path = "/cars/{id}/edit", tag = "cars",
    params(("id" = i32, Path, description = "Car ID")),
    responses((status = 200, description = "Record with version"), (status = 403, description = "Forbidden"), (status = 404, description = "Not Found"))
)]
pub async fn edit_form(
    State(state): State<ServerState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<String>,
) -> Result<Json<CarUpdate>, JsonApiError> {
    Ok(Json(state.catalog.edit_form(&caller, parse_id(&id)).await?))
}

#[utoipa::path(
    post, path = "/cars/{id}/edit", tag = "cars",
    params(("id" = i32, Path, description = "Car ID")),
    request_body = crate::openapi::CarUpdateDoc,
    responses(
        (status = 302, description = "Updated; Location /cars"),
        (status = 400, description = "Validation Error"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found or id mismatch"),
        (status = 500, description = "Concurrency Conflict")
    )
)]
pub async fn update(
    State(state): State<ServerState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Redirect<car::Model>, JsonApiError> {
    caller.require_admin()?;
    let Some(id) = parse_id(&id) else {
        return Err(JsonApiError::not_found());
    };
    let payload: CarUpdate = decode_form(&body)?;
    match state.catalog.update(&caller, id, payload.clone()).await {
        Ok(UpdateOutcome::Updated(car)) => Ok(redirect_to("/cars", car)),
        Ok(UpdateOutcome::NotFound) => Err(JsonApiError::not_found()),
        Ok(UpdateOutcome::Conflict) => Err(JsonApiError::conflict()),
        Err(e) => Err(JsonApiError::from(e).with_input(&payload)),
    }
}

#[utoipa::path(
    get, path = "/cars/{id}/delete", tag = "cars",
    params(("id" = i32, Path, description = "Car ID")),
    responses((status = 200, description = "Record to confirm"), (status = 403, description = "Forbidden"), (status = 404, description = "Not Found"))
)]
pub async fn delete_form(
    State(state): State<ServerState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<String>,
) -> Result<Json<car::Model>, JsonApiError> {
    Ok(Json(state.catalog.delete_form(&caller, parse_id(&id)).await?))
}

#[utoipa::path(
    post, path = "/cars/{id}/delete", tag = "cars",
    params(("id" = i32, Path, description = "Car ID")),
    responses((status = 302, description = "Deleted or already absent; Location /cars"), (status = 403, description = "Forbidden"))
)]
pub async fn delete(
    State(state): State<ServerState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<String>,
) -> Result<Redirect<serde_json::Value>, JsonApiError> {
    let removed = match parse_id(&id) {
        Some(id) => state.catalog.delete(&caller, id).await?,
        None => {
            caller.require_admin()?;
            info!(id = %id, "delete of non-numeric id ignored");
            false
        }
    };
    Ok(redirect_to("/cars", serde_json::json!({ "deleted": removed })))
}

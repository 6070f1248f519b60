use axum::{
    body::Bytes,
    extract::{Query, State},
    Extension, Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

use service::access::domain::{AssignRoleInput, AssignableRoles, Role, RoleInput, UserWithRoles};
use service::Caller;

use super::{decode_form, redirect_to, Redirect};
use crate::errors::JsonApiError;
use crate::routes::auth::ServerState;

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AssignQuery {
    /// User ID
    #[serde(default, alias = "user_id", rename = "userId")]
    pub user_id: Option<String>,
}

#[utoipa::path(get, path = "/roles", tag = "roles", responses((status = 200, description = "All roles"), (status = 403, description = "Forbidden")))]
pub async fn list(State(state): State<ServerState>, Extension(caller): Extension<Caller>) -> Result<Json<Vec<Role>>, JsonApiError> {
    let scope = state.access.authorize(&caller)?;
    Ok(Json(scope.list_roles().await?))
}

#[utoipa::path(get, path = "/roles/create", tag = "roles", responses((status = 200, description = "Empty form"), (status = 403, description = "Forbidden")))]
pub async fn create_form(State(state): State<ServerState>, Extension(caller): Extension<Caller>) -> Result<Json<RoleInput>, JsonApiError> {
    let scope = state.access.authorize(&caller)?;
    Ok(Json(scope.create_form()))
}

#[utoipa::path(
    post, path = "/roles/create", tag = "roles",
    request_body = crate::openapi::RoleInputDoc,
    responses((status = 302, description = "Created; Location /roles"), (status = 400, description = "Validation Error"), (status = 403, description = "Forbidden"))
)]
pub async fn create(
    State(state): State<ServerState>,
    Extension(caller): Extension<Caller>,
    body: Bytes,
) -> Result<Redirect<Role>, JsonApiError> {
    let scope = state.access.authorize(&caller)?;
    let input: RoleInput = decode_form(&body)?;
    match scope.create_role(input.name.as_deref()).await {
        Ok(role) => Ok(redirect_to("/roles", role)),
        Err(e) => Err(JsonApiError::from(e).with_input(&input)),
    }
}

#[utoipa::path(
    get, path = "/roles/assign", tag = "roles",
    params(AssignQuery),
    responses((status = 200, description = "User with all and held roles"), (status = 403, description = "Forbidden"), (status = 404, description = "Not Found"))
)]
pub async fn assign_form(
    State(state): State<ServerState>,
    Extension(caller): Extension<Caller>,
    Query(q): Query<AssignQuery>,
) -> Result<Json<AssignableRoles>, JsonApiError> {
    let scope = state.access.authorize(&caller)?;
    let user_id = q.user_id.as_deref().and_then(|s| uuid::Uuid::parse_str(s.trim()).ok());
    Ok(Json(scope.assignable_roles(user_id).await?))
}

#[utoipa::path(
    post, path = "/roles/assign", tag = "roles",
    request_body = crate::openapi::AssignRoleDoc,
    responses(
        (status = 302, description = "Assigned; Location /users"),
        (status = 400, description = "Validation Error"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "User Not Found")
    )
)]
pub async fn assign(
    State(state): State<ServerState>,
    Extension(caller): Extension<Caller>,
    body: Bytes,
) -> Result<Redirect<AssignRoleInput>, JsonApiError> {
    let scope = state.access.authorize(&caller)?;
    let input: AssignRoleInput = decode_form(&body)?;
    match scope.assign_role(input.user_id, &input.role_name).await {
        Ok(()) => Ok(redirect_to("/users", input)),
        Err(e) => Err(JsonApiError::from(e).with_input(&input)),
    }
}

#[utoipa::path(get, path = "/users", tag = "roles", responses((status = 200, description = "Users with their roles"), (status = 403, description = "Forbidden")))]
pub async fn users(State(state): State<ServerState>, Extension(caller): Extension<Caller>) -> Result<Json<Vec<UserWithRoles>>, JsonApiError> {
    let scope = state.access.authorize(&caller)?;
    Ok(Json(scope.list_users().await?))
}

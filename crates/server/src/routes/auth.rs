use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::Response,
    Extension, Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Serialize;
use tracing::warn;
use uuid::Uuid;

use service::access::{repository::IdentityRepository, AccessControlService};
use service::auth::domain::{LoginInput, RegisterInput};
use service::auth::repository::AuthRepository;
use service::auth::service::{AuthConfig, AuthService};
use service::catalog::{repository::CarRepository, CatalogService};
use service::Caller;

use crate::errors::JsonApiError;

pub const AUTH_COOKIE: &str = "auth_token";

#[derive(Clone)]
pub struct ServerState {
    pub catalog: Arc<CatalogService>,
    pub access: Arc<AccessControlService>,
    pub auth_svc: Arc<AuthService>,
}

impl ServerState {
    pub fn new(
        cars: Arc<dyn CarRepository>,
        identity: Arc<dyn IdentityRepository>,
        credentials: Arc<dyn AuthRepository>,
        auth: AuthConfig,
    ) -> Self {
        Self {
            catalog: Arc::new(CatalogService::new(cars)),
            access: Arc::new(AccessControlService::new(identity)),
            auth_svc: Arc::new(AuthService::new(credentials, auth)),
        }
    }
}

#[derive(Serialize)]
pub struct RegisterOutput { pub user_id: Uuid }

#[derive(Serialize)]
pub struct LoginOutput { pub user_id: Uuid, pub email: String, pub name: String, pub token: String }

#[derive(Serialize)]
pub struct MeOutput { pub user_id: Option<Uuid>, pub roles: Vec<String> }

#[utoipa::path(post, path = "/auth/register", tag = "auth", request_body = crate::openapi::RegisterRequest, responses((status = 200, description = "Registered"), (status = 400, description = "Bad Request"), (status = 409, description = "Conflict")))]
pub async fn register(State(state): State<ServerState>, Json(input): Json<RegisterInput>) -> Result<Json<RegisterOutput>, JsonApiError> {
    let user = state.auth_svc.register(input).await?;
    Ok(Json(RegisterOutput { user_id: user.id }))
}

#[utoipa::path(post, path = "/auth/login", tag = "auth", request_body = crate::openapi::LoginRequest, responses((status = 200, description = "Logged In"), (status = 401, description = "Unauthorized")))]
pub async fn login(State(state): State<ServerState>, jar: CookieJar, Json(input): Json<LoginInput>) -> Result<(CookieJar, Json<LoginOutput>), JsonApiError> {
    let session = state.auth_svc.login(input).await?;
    let user = session.user;
    let Some(token) = session.token else {
        return Err(JsonApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Token Error", Some("token generation failed".into())));
    };
    let mut cookie = Cookie::new(AUTH_COOKIE, token.clone());
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_secure(false);
    cookie.set_same_site(SameSite::Lax);
    let jar = jar.add(cookie);
    Ok((jar, Json(LoginOutput { user_id: user.id, email: user.email, name: user.name, token })))
}

#[utoipa::path(post, path = "/auth/logout", tag = "auth", responses((status = 204, description = "Logged Out")))]
pub async fn logout(jar: CookieJar) -> (CookieJar, StatusCode) {
    let mut gone = Cookie::from(AUTH_COOKIE);
    gone.set_path("/");
    (jar.remove(gone), StatusCode::NO_CONTENT)
}

/// The caller resolved for this request.
pub async fn me(Extension(caller): Extension<Caller>) -> Json<MeOutput> {
    Json(MeOutput { user_id: caller.user_id, roles: caller.roles })
}

/// Token from `Authorization: Bearer ...`, else from the auth cookie.
/// `Err` when an Authorization header is present but not a bearer token.
fn extract_token(req: &Request) -> Result<Option<String>, ()> {
    if let Some(h) = req.headers().get(header::AUTHORIZATION) {
        let h = h.to_str().map_err(|_| ())?;
        return match h.strip_prefix("Bearer ") {
            Some(t) if !t.trim().is_empty() => Ok(Some(t.trim().to_string())),
            _ => Err(()),
        };
    }
    let jar = CookieJar::from_headers(req.headers());
    Ok(jar.get(AUTH_COOKIE).map(|c| c.value().to_string()).filter(|v| !v.is_empty()))
}

/// Resolve the request's [`Caller`] and expose it as an extension.
///
/// No token gives an anonymous caller. A token that fails verification, or
/// names a user that no longer exists, is rejected with 401. Roles are read
/// from the identity store on every request.
pub async fn resolve_caller(State(state): State<ServerState>, mut req: Request, next: Next) -> Result<Response, StatusCode> {
    let path = req.uri().path().to_string();
    let token = extract_token(&req).map_err(|_| {
        warn!(path = %path, "invalid Authorization format (expect Bearer)");
        StatusCode::UNAUTHORIZED
    })?;

    let caller = match token {
        None => Caller::anonymous(),
        Some(token) => {
            let claims = state.auth_svc.verify_token(&token).map_err(|e| {
                warn!(path = %path, err = %e, "token validation failed");
                StatusCode::UNAUTHORIZED
            })?;
            let uid = claims.user_id().ok_or(StatusCode::UNAUTHORIZED)?;
            match state.access.resolve_caller(uid).await {
                Ok(Some(caller)) => caller,
                Ok(None) => {
                    warn!(path = %path, user_id = %uid, "token for unknown user");
                    return Err(StatusCode::UNAUTHORIZED);
                }
                Err(e) => {
                    tracing::error!(path = %path, err = %e, "caller resolution failed");
                    return Err(StatusCode::INTERNAL_SERVER_ERROR);
                }
            }
        }
    };

    req.extensions_mut().insert(caller);
    Ok(next.run(req).await)
}

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, HeaderMap, Method, Request, StatusCode};
use axum::Router;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::Value;
use tower::Service;
use tower_http::cors::CorsLayer;
use uuid::Uuid;

use server::routes::{self, auth::ServerState};
use service::access::repository::mock::MockIdentityRepository;
use service::auth::domain::Claims;
use service::auth::service::AuthConfig;
use service::catalog::repository::mock::MockCarRepository;

pub const SECRET: &str = "test-secret";

pub struct TestApp {
    pub router: Router,
    pub cars: Arc<MockCarRepository>,
    pub identity: Arc<MockIdentityRepository>,
}

pub struct Reply {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl Reply {
    pub fn location(&self) -> Option<&str> {
        self.headers.get(header::LOCATION).and_then(|v| v.to_str().ok())
    }
}

pub fn auth_config() -> AuthConfig {
    AuthConfig { jwt_secret: Some(SECRET.into()), ..AuthConfig::default() }
}

pub fn state(cars: Arc<MockCarRepository>, identity: Arc<MockIdentityRepository>) -> ServerState {
    ServerState::new(cars, identity.clone(), identity, auth_config())
}

pub fn app() -> TestApp {
    let cars = Arc::new(MockCarRepository::default());
    let identity = Arc::new(MockIdentityRepository::default());
    let router = routes::build_router(CorsLayer::very_permissive(), state(cars.clone(), identity.clone()));
    TestApp { router, cars, identity }
}

pub fn token_for(user_id: Uuid, email: &str) -> String {
    let exp = (std::time::SystemTime::now().duration_since(std::time::UNIX_EPOCH).unwrap().as_secs() + 3600) as usize;
    let claims = Claims { sub: email.into(), uid: user_id.to_string(), exp };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET.as_bytes())).unwrap()
}

impl TestApp {
    /// Register a user holding `roles` and return a bearer token for them.
    pub fn user_with_roles(&self, email: &str, roles: &[&str]) -> (Uuid, String) {
        let user = self.identity.add_user(email, "Test User");
        for r in roles {
            self.identity.grant(user.id, r);
        }
        (user.id, token_for(user.id, email))
    }

    pub fn admin_token(&self) -> String {
        self.user_with_roles("admin@example.com", &["Admin"]).1
    }

    pub async fn send(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Reply {
        let mut req = Request::builder().method(method).uri(uri);
        if let Some(t) = token {
            req = req.header(header::AUTHORIZATION, format!("Bearer {t}"));
        }
        let req = match body {
            Some(v) => req
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&v).unwrap()))
                .unwrap(),
            None => req.body(Body::empty()).unwrap(),
        };
        let resp = self.router.clone().call(req).await.unwrap();
        let status = resp.status();
        let headers = resp.headers().clone();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
        Reply { status, headers, body }
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> Reply {
        self.send(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> Reply {
        self.send(Method::POST, uri, token, Some(body)).await
    }
}

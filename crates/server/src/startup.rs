use std::{net::SocketAddr, sync::Arc};

use axum::Router;
use common::utils::logging::init_logging_from_env;
use dotenvy::dotenv;
use migration::MigratorTrait;
use tower_http::cors::CorsLayer;
use tracing::info;

use configs::AppConfig;
use service::access::{repo::seaorm::SeaOrmIdentityRepository, seed::seed_admin};
use service::auth::{repo::seaorm::SeaOrmAuthRepository, service::AuthConfig};
use service::catalog::repo::seaorm::SeaOrmCarRepository;

use crate::errors::StartupError;
use crate::routes::{self, auth::ServerState};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

fn bind_addr(cfg: &AppConfig) -> Result<SocketAddr, StartupError> {
    format!("{}:{}", cfg.server.host, cfg.server.port)
        .parse()
        .map_err(|e| StartupError::InvalidConfig(format!("server address: {e}")))
}

/// Public entry: build the app and run the HTTP server
pub async fn run() -> anyhow::Result<()> {
    dotenv().ok();
    init_logging_from_env();

    let cfg = AppConfig::load_or_env()?;
    let addr = bind_addr(&cfg)?;

    let db = models::db::connect_with_config(&cfg.database).await?;
    if cfg.database.auto_migrate {
        migration::Migrator::up(&db, None).await?;
        info!("migrations applied");
    }

    let identity = Arc::new(SeaOrmIdentityRepository { db: db.clone() });
    seed_admin(identity.as_ref(), cfg.auth.bootstrap_admin_email.as_deref())
        .await
        .map_err(StartupError::Seed)?;

    let auth_cfg = AuthConfig {
        jwt_secret: Some(cfg.auth.jwt_secret.clone()),
        password_algorithm: "argon2".into(),
        token_ttl_hours: cfg.auth.token_ttl_hours,
    };
    let state = ServerState::new(
        Arc::new(SeaOrmCarRepository { db: db.clone() }),
        identity,
        Arc::new(SeaOrmAuthRepository { db }),
        auth_cfg,
    );

    let app: Router = routes::build_router(build_cors(), state);

    info!(%addr, "starting server crate");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

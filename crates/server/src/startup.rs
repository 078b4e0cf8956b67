use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use common::utils::logging::init_logging_from_env;
use dotenvy::dotenv;
use migration::MigratorTrait;
use tower_http::cors::CorsLayer;
use tracing::info;

use service::auth::{
    repo::seaorm::SeaOrmAuthRepository,
    service::{AuthConfig, AuthService},
};

use crate::routes::{self, auth::{ServerAuthConfig, ServerState}};

/// Initialize logging via shared common utils
fn init_logging() {
    init_logging_from_env();
}

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Public entry: build the app and run the HTTP server
pub async fn run() -> anyhow::Result<()> {
    dotenv().ok();
    init_logging();

    let cfg = configs::AppConfig::load_and_validate()?;

    // DB connection + schema
    let db = models::db::connect_with_config(&cfg.database).await?;
    migration::Migrator::up(&db, None).await?;
    info!("migrations applied");

    let jwt_secret = if cfg.auth.jwt_secret.trim().is_empty() {
        "dev-secret-change-me".to_string()
    } else {
        cfg.auth.jwt_secret.clone()
    };

    // Bootstrap admin account, when configured
    if let (Some(email), Some(password)) = (&cfg.auth.admin_email, &cfg.auth.admin_password) {
        let repo = Arc::new(SeaOrmAuthRepository { db: db.clone() });
        let svc = AuthService::new(
            repo,
            AuthConfig {
                jwt_secret: Some(jwt_secret.clone()),
                token_ttl_hours: cfg.auth.token_ttl_hours,
                password_algorithm: "argon2".into(),
            },
        );
        let admin = svc
            .seed_admin(email, password)
            .await
            .map_err(|e| anyhow::anyhow!("admin seed failed: {e}"))?;
        info!(user_id = %admin.id, "admin account ensured");
    }

    let state = ServerState {
        db,
        auth: ServerAuthConfig { jwt_secret, token_ttl_hours: cfg.auth.token_ttl_hours },
    };

    // Build router
    let app: Router = routes::build_router(build_cors(), state);

    // Bind and serve
    let addr: SocketAddr = format!("{}:{}", cfg.server.host, cfg.server.port).parse()?;
    info!(%addr, "starting company registry server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

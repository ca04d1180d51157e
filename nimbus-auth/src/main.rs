use axum::{routing::{get, post}, Router};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

mod config;
mod models;
mod routes;
mod schema;
mod services;
mod store;

use config::AppConfig;
use nimbus_shared::clients::db;
use nimbus_shared::clients::email::EmailClient;
use services::account_service::{AccountService, TokenPolicy};
use services::session_service::JwtSessions;
use store::PgUserStore;

pub struct AppState {
    pub accounts: AccountService,
    pub config: AppConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    nimbus_shared::middleware::init_tracing("nimbus-auth");

    let config = AppConfig::load()?;
    let port = config.port;

    let pool = db::create_pool(&config.database_url)?;
    let store = Arc::new(PgUserStore::new(pool));
    let mailer = Arc::new(EmailClient::new(
        &config.resend_api_key,
        &config.from_email,
        &config.from_name,
        &config.app_url,
    ));
    let sessions = Arc::new(JwtSessions::new(&config.jwt_secret, config.jwt_access_ttl));
    let accounts = AccountService::new(
        store,
        mailer,
        sessions,
        TokenPolicy::from_config(&config),
    );

    let state = Arc::new(AppState { accounts, config });

    // Expired tokens are already treated as absent on every read; this sweep
    // just keeps stale columns from accumulating.
    let sweep_state = state.clone();
    tokio::spawn(async move {
        let mut ticker =
            tokio::time::interval(Duration::from_secs(sweep_state.config.token_sweep_interval_secs));
        loop {
            ticker.tick().await;
            match sweep_state.accounts.purge_expired_tokens().await {
                Ok(0) => {}
                Ok(cleared) => tracing::debug!(cleared, "expired token fields cleared"),
                Err(e) => tracing::error!(error = %e, "token sweep failed"),
            }
        }
    });

    let app = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/signup", post(routes::register::register))
        .route("/login", post(routes::login::login))
        .route("/verify-email", post(routes::verify_email::verify_email))
        .route(
            "/resend-verification",
            post(routes::resend_verification::resend_verification),
        )
        .route(
            "/forgot-password",
            post(routes::forgot_password::forgot_password),
        )
        .route(
            "/reset-password",
            get(routes::reset_password::verify_reset_token)
                .post(routes::reset_password::reset_password),
        )
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("0.0.0.0:{port}");
    tracing::info!(addr = %addr, "nimbus-auth starting");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

use std::sync::Arc;

use auth::JwtSigner;
use auth::PasswordHasher;
use auth_service::config::Config;
use auth_service::domain::auth::guard::AuthRegistry;
use auth_service::domain::auth::guard::GuardOption;
use auth_service::domain::auth::jwt_driver::JwtDriver;
use auth_service::domain::auth::providers::PasswordProvider;
use auth_service::domain::auth::service::AuthService;
use auth_service::domain::auth::token_service::TokenService;
use auth_service::domain::user::service::UserService;
use auth_service::inbound::http::router::create_router;
use auth_service::outbound::repositories::PostgresRefreshSessionStore;
use auth_service::outbound::repositories::PostgresUserRepository;
use chrono::Duration;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "auth_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "auth-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        http_port = config.server.http_port,
        jwt = ?config.jwt,
        hashing = ?config.hashing,
        default_guard = %config.auth.default_guard,
        "Configuration loaded"
    );

    let pg_pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database.url)
        .await?;
    tracing::info!(
        max_connections = 5,
        database = "postgresql",
        "Database connection pool created"
    );

    sqlx::migrate!("./migrations").run(&pg_pool).await?;
    tracing::info!(database = "postgresql", "Database migrations completed");

    let hasher = PasswordHasher::with_params(
        config.hashing.memory_kib,
        config.hashing.iterations,
        config.hashing.parallelism,
    )?;
    let signer = JwtSigner::new(
        config.jwt.secret.as_bytes(),
        config.jwt.issuer.clone(),
        config.jwt.audience.clone(),
        Duration::minutes(config.jwt.access_ttl_minutes),
    );

    let user_repository = Arc::new(PostgresUserRepository::new(pg_pool.clone()));
    let refresh_store = Arc::new(PostgresRefreshSessionStore::new(pg_pool));

    let user_service = Arc::new(UserService::new(user_repository));
    let token_service = Arc::new(TokenService::new(
        signer,
        refresh_store,
        Duration::days(config.jwt.refresh_ttl_days),
    ));

    let registry = Arc::new(AuthRegistry::new());
    registry.extend(
        "jwt",
        GuardOption::new(
            Arc::new(JwtDriver::new(token_service)),
            Arc::new(PasswordProvider::new(Arc::clone(&user_service), hasher)),
        ),
    )?;
    registry.set_default_guard(&config.auth.default_guard)?;
    tracing::info!(default_guard = %config.auth.default_guard, "Guards registered");

    let auth_service = Arc::new(AuthService::new(registry));

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    let http_application = create_router(auth_service, user_service);

    axum::serve(http_listener, http_application)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server exited successfully");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

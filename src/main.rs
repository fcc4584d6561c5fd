use anyhow::Context;
use tracing_subscriber::EnvFilter;

use genders_api::auth::JwtKeys;
use genders_api::handlers::AppState;
use genders_api::i18n::Translator;
use genders_api::services::GenderService;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Initialize configuration (this loads the config singleton)
    let config = genders_api::config::config();
    tracing::info!("Starting Genders API in {:?} mode", config.environment);

    if genders_api::is_production!() && config.database.url.is_none() {
        anyhow::bail!("DATABASE_URL is required in production");
    }

    let jwt = JwtKeys::new(&config.security.jwt_secret, config.security.jwt_expiry_hours)
        .context("JWT_SECRET must be set")?;
    let store = genders_api::build_store(&config.database)
        .await
        .context("failed to initialize storage")?;
    let translator = Translator::new(&config.locale.default_locale);
    tracing::info!("Default locale: {}", translator.default_locale());
    let genders = GenderService::new(store, translator);

    let app = genders_api::app(AppState::new(genders, jwt), config.security.enable_cors);

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Genders API listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutting down");
}

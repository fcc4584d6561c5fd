pub mod auth;
pub mod cli;
pub mod collation;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod i18n;
pub mod middleware;
pub mod services;

use axum::{
    middleware::from_fn_with_state,
    routing::{delete, get, put},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::database::{DatabaseError, DatabaseManager, GenderStore, MemoryGenderStore, PgGenderStore};
use crate::handlers::AppState;

/// Full router: public routes plus the JWT-protected settings routes
pub fn app(state: AppState, enable_cors: bool) -> Router {
    let router = Router::new()
        // Public
        .route("/", get(handlers::public::root))
        .route("/health", get(handlers::public::health))
        // Protected
        .merge(genders_routes(state.clone()))
        .with_state(state);

    let router = router.layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()));
    if enable_cors {
        router.layer(CorsLayer::permissive())
    } else {
        router
    }
}

fn genders_routes(state: AppState) -> Router<AppState> {
    use handlers::protected::settings;

    Router::new()
        .route(
            "/settings/personalization/genders",
            get(settings::genders_index).post(settings::genders_store),
        )
        .route(
            "/settings/personalization/genders/types",
            get(settings::genders_types),
        )
        .route(
            "/settings/personalization/genders/:gender",
            put(settings::genders_update)
                .patch(settings::genders_update)
                .delete(settings::genders_destroy),
        )
        .route(
            "/settings/personalization/genders/:gender/replaceby/:gender_id",
            delete(settings::genders_destroy_and_replace),
        )
        .route_layer(from_fn_with_state(state, middleware::jwt_auth_middleware))
}

/// Pick the store from configuration: Postgres when a URL is set, otherwise in-process
pub async fn build_store(
    config: &config::DatabaseConfig,
) -> Result<Arc<dyn GenderStore>, DatabaseError> {
    if config.url.is_none() {
        tracing::warn!("DATABASE_URL not set, using the in-process store; data will not persist");
        return Ok(Arc::new(MemoryGenderStore::new()));
    }

    let pool = DatabaseManager::connect(config).await?;
    if config.run_migrations {
        DatabaseManager::migrate(&pool).await?;
    }
    Ok(Arc::new(PgGenderStore::new(pool)))
}

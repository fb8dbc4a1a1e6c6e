use axum::{
    Router,
    routing::{delete, get},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{handlers, state::AppState};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::healthcheck))
        .route(
            "/coins",
            get(handlers::list_coins).post(handlers::add_coin),
        )
        .route("/coins/{id}", delete(handlers::delete_coin))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

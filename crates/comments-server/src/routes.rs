use axum::{
    middleware,
    routing::{get, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::auth::{require_admin, AccessGuard};
use crate::handlers::comments as comment_handlers;
use crate::{CommentStore, Config};

#[derive(Clone)]
pub struct AppState {
    pub store: CommentStore,
    pub guard: AccessGuard,
}

pub fn create_router(store: CommentStore, config: Config) -> Router {
    let state = AppState {
        store,
        guard: AccessGuard::new(config.admin_token),
    };

    // Mutations of existing comments need the admin token
    let admin_routes = Router::new()
        .route(
            "/:id",
            put(comment_handlers::update_comment).delete(comment_handlers::delete_comment),
        )
        .layer(middleware::from_fn_with_state(state.clone(), require_admin));

    // Reading and posting stay open
    let comment_routes = Router::new()
        .route(
            "/",
            get(comment_handlers::list_comments).post(comment_handlers::create_comment),
        )
        .merge(admin_routes);

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/comments", comment_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}

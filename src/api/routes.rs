//! API Routes
//!
//! Configures the Axum router with all catalog endpoints.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    add_company_game_handler, cache_stats_handler, company_games_handler,
    create_companies_handler, create_company_handler, create_game_handler, create_games_handler,
    create_review_handler, delete_company_handler, delete_game_handler, delete_review_handler,
    games_by_rating_handler, get_company_handler, get_game_handler, get_review_handler,
    health_handler, link_company_handler, list_companies_handler, list_games_handler,
    list_reviews_handler, patch_game_handler, remove_company_game_handler,
    unlink_company_handler, update_company_handler, update_game_handler, update_review_handler,
    AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /games`, `POST /games` - List (optionally by `?title=`) or create games
/// - `POST /games/bulk` - Create several games at once
/// - `GET /games/by-rating` - Cached rating queries
/// - `GET|PUT|PATCH|DELETE /games/:game_id` - Single game
/// - `GET /games/:game_id/reviews`, `POST /games/:game_id/reviews` - List or create reviews
/// - `GET|PUT|DELETE /games/:game_id/reviews/:review_id` - Single review
/// - `POST|DELETE /games/:game_id/companies/:company_id` - Link or unlink a company
/// - `GET /companies`, `POST /companies` - List (optionally by `?name=`) or create companies
/// - `POST /companies/bulk` - Create several companies at once
/// - `GET|PUT|DELETE /companies/:company_id` - Single company
/// - `GET /companies/:company_id/games` - Games of a company
/// - `POST|DELETE /companies/:company_id/games/:game_id` - Link or unlink a game
/// - `GET /cache/stats` - Statistics of both caches
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    // Configure CORS middleware
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/games", get(list_games_handler).post(create_game_handler))
        .route("/games/bulk", post(create_games_handler))
        .route("/games/by-rating", get(games_by_rating_handler))
        .route(
            "/games/:game_id",
            get(get_game_handler)
                .put(update_game_handler)
                .patch(patch_game_handler)
                .delete(delete_game_handler),
        )
        .route(
            "/games/:game_id/reviews",
            post(create_review_handler).get(list_reviews_handler),
        )
        .route(
            "/games/:game_id/reviews/:review_id",
            get(get_review_handler)
                .put(update_review_handler)
                .delete(delete_review_handler),
        )
        .route(
            "/games/:game_id/companies/:company_id",
            post(link_company_handler).delete(unlink_company_handler),
        )
        .route(
            "/companies",
            get(list_companies_handler).post(create_company_handler),
        )
        .route("/companies/bulk", post(create_companies_handler))
        .route(
            "/companies/:company_id",
            get(get_company_handler)
                .put(update_company_handler)
                .delete(delete_company_handler),
        )
        .route("/companies/:company_id/games", get(company_games_handler))
        .route(
            "/companies/:company_id/games/:game_id",
            post(add_company_game_handler).delete(remove_company_game_handler),
        )
        .route("/cache/stats", get(cache_stats_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

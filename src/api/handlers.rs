//! API Handlers
//!
//! HTTP request handlers for each catalog endpoint.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use tokio::sync::RwLock;
use tracing::info;

use crate::catalog::{
    CatalogRepository, CompanyService, CompanyWithGames, Game, GameService, Review,
    ReviewService, SharedRepository,
};
use crate::config::Config;
use crate::error::{CatalogError, Result};
use crate::models::{
    CacheStatsResponse, CompanyRequest, CreateGameRequest, DeleteResponse, HealthResponse,
    NameQuery, PatchGameRequest, RatingQuery, ReviewRequest, TitleQuery,
};

/// Application state shared across all handlers.
///
/// Owns the services, and through them the caches, for the life of the server.
#[derive(Clone)]
pub struct AppState {
    /// Catalog store shared by the services
    pub repo: SharedRepository,
    /// Game operations and the rating query cache
    pub games: Arc<GameService>,
    /// Review operations and the review cache
    pub reviews: Arc<ReviewService>,
    /// Company operations
    pub companies: Arc<CompanyService>,
}

impl AppState {
    /// Creates a new AppState around an existing repository.
    pub fn new(repo: CatalogRepository, config: &Config) -> Result<Self> {
        let repo = Arc::new(RwLock::new(repo));
        let games = Arc::new(GameService::new(Arc::clone(&repo), config.game_cache())?);
        let reviews = Arc::new(ReviewService::new(
            Arc::clone(&repo),
            Arc::clone(&games),
            config.review_cache(),
        )?);
        let companies = Arc::new(CompanyService::new(Arc::clone(&repo), Arc::clone(&games)));
        Ok(Self {
            repo,
            games,
            reviews,
            companies,
        })
    }

    /// Creates a new AppState with an empty catalog.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(CatalogRepository::new(), config)
    }

    /// Stops the caches' background schedulers.
    pub fn shutdown(&self) {
        info!("Shutting down caches");
        self.games.shutdown();
        self.reviews.shutdown();
    }
}

/// Handler for GET /games
///
/// With `?title=` only the game carrying that title, ignoring case.
pub async fn list_games_handler(
    State(state): State<AppState>,
    Query(query): Query<TitleQuery>,
) -> Result<Json<Vec<Game>>> {
    match query.title {
        Some(title) => Ok(Json(state.games.games_by_title(&title).await?)),
        None => Ok(Json(state.games.all_games().await)),
    }
}

/// Handler for POST /games
pub async fn create_game_handler(
    State(state): State<AppState>,
    Json(req): Json<CreateGameRequest>,
) -> Result<(StatusCode, Json<Game>)> {
    if let Some(error_msg) = req.validate() {
        return Err(CatalogError::InvalidRequest(error_msg));
    }

    let game = state.games.create_game(req.into_new_game()).await?;
    Ok((StatusCode::CREATED, Json(game)))
}

/// Handler for POST /games/bulk
///
/// Either every game is created or, if any title is taken, none is.
pub async fn create_games_handler(
    State(state): State<AppState>,
    Json(reqs): Json<Vec<CreateGameRequest>>,
) -> Result<(StatusCode, Json<Vec<Game>>)> {
    if let Some(error_msg) = reqs.iter().find_map(|req| req.validate()) {
        return Err(CatalogError::InvalidRequest(error_msg));
    }

    let games = state
        .games
        .create_games(reqs.into_iter().map(|req| req.into_new_game()).collect())
        .await?;
    Ok((StatusCode::CREATED, Json(games)))
}

/// Handler for GET /games/:game_id
pub async fn get_game_handler(
    State(state): State<AppState>,
    Path(game_id): Path<u64>,
) -> Result<Json<Game>> {
    Ok(Json(state.games.game(game_id).await?))
}

/// Handler for PUT /games/:game_id
pub async fn update_game_handler(
    State(state): State<AppState>,
    Path(game_id): Path<u64>,
    Json(req): Json<CreateGameRequest>,
) -> Result<Json<Game>> {
    if let Some(error_msg) = req.validate() {
        return Err(CatalogError::InvalidRequest(error_msg));
    }

    Ok(Json(state.games.update_game(game_id, req.into_new_game()).await?))
}

/// Handler for PATCH /games/:game_id
pub async fn patch_game_handler(
    State(state): State<AppState>,
    Path(game_id): Path<u64>,
    Json(req): Json<PatchGameRequest>,
) -> Result<Json<Game>> {
    if let Some(error_msg) = req.validate() {
        return Err(CatalogError::InvalidRequest(error_msg));
    }

    Ok(Json(state.games.patch_game(game_id, req.into_patch()).await?))
}

/// Handler for DELETE /games/:game_id
///
/// Also drops the deleted reviews from the review cache.
pub async fn delete_game_handler(
    State(state): State<AppState>,
    Path(game_id): Path<u64>,
) -> Result<Json<DeleteResponse>> {
    let reviews = &state.reviews;
    state
        .games
        .delete_game(game_id, |ids| reviews.forget_reviews(ids))
        .await?;

    Ok(Json(DeleteResponse::new(format!("Game {}", game_id))))
}

/// Handler for GET /games/by-rating
///
/// Both bounds query the rating range and a lone minimum the minimum-rating
/// lookup. Any other combination returns every game uncached.
pub async fn games_by_rating_handler(
    State(state): State<AppState>,
    Query(query): Query<RatingQuery>,
) -> Result<Json<Vec<Game>>> {
    if let Some(error_msg) = query.validate() {
        return Err(CatalogError::InvalidRequest(error_msg));
    }

    let games = match query.bounds() {
        (Some(min), Some(max)) => state.games.games_by_rating_range(min, max).await,
        (Some(min), None) => state.games.games_by_minimum_rating(min).await,
        (None, _) => return Ok(Json(state.games.all_games().await)),
    };

    Ok(Json(games.as_ref().clone()))
}

/// Handler for POST /games/:game_id/reviews
pub async fn create_review_handler(
    State(state): State<AppState>,
    Path(game_id): Path<u64>,
    Json(req): Json<ReviewRequest>,
) -> Result<(StatusCode, Json<Review>)> {
    if let Some(error_msg) = req.validate() {
        return Err(CatalogError::InvalidRequest(error_msg));
    }

    let review = state
        .reviews
        .create_review(game_id, req.into_new_review())
        .await?;
    Ok((StatusCode::CREATED, Json(review)))
}

/// Handler for GET /games/:game_id/reviews
pub async fn list_reviews_handler(
    State(state): State<AppState>,
    Path(game_id): Path<u64>,
) -> Result<Json<Vec<Review>>> {
    Ok(Json(state.reviews.reviews_for_game(game_id).await?))
}

/// Handler for GET /games/:game_id/reviews/:review_id
pub async fn get_review_handler(
    State(state): State<AppState>,
    Path((game_id, review_id)): Path<(u64, u64)>,
) -> Result<Json<Review>> {
    Ok(Json(state.reviews.review(game_id, review_id).await?))
}

/// Handler for PUT /games/:game_id/reviews/:review_id
pub async fn update_review_handler(
    State(state): State<AppState>,
    Path((game_id, review_id)): Path<(u64, u64)>,
    Json(req): Json<ReviewRequest>,
) -> Result<Json<Review>> {
    if let Some(error_msg) = req.validate() {
        return Err(CatalogError::InvalidRequest(error_msg));
    }

    let review = state
        .reviews
        .update_review(game_id, review_id, req.into_new_review())
        .await?;
    Ok(Json(review))
}

/// Handler for DELETE /games/:game_id/reviews/:review_id
pub async fn delete_review_handler(
    State(state): State<AppState>,
    Path((game_id, review_id)): Path<(u64, u64)>,
) -> Result<Json<DeleteResponse>> {
    state.reviews.delete_review(game_id, review_id).await?;
    Ok(Json(DeleteResponse::new(format!("Review {}", review_id))))
}

/// Handler for POST /games/:game_id/companies/:company_id
pub async fn link_company_handler(
    State(state): State<AppState>,
    Path((game_id, company_id)): Path<(u64, u64)>,
) -> Result<Json<Game>> {
    Ok(Json(state.games.add_company(game_id, company_id).await?))
}

/// Handler for DELETE /games/:game_id/companies/:company_id
pub async fn unlink_company_handler(
    State(state): State<AppState>,
    Path((game_id, company_id)): Path<(u64, u64)>,
) -> Result<Json<DeleteResponse>> {
    state.games.remove_company(game_id, company_id).await?;
    Ok(Json(DeleteResponse::new(format!(
        "Link between game {} and company {}",
        game_id, company_id
    ))))
}

/// Handler for GET /companies
pub async fn list_companies_handler(
    State(state): State<AppState>,
    Query(query): Query<NameQuery>,
) -> Json<Vec<CompanyWithGames>> {
    Json(state.companies.companies(query.name.as_deref()).await)
}

/// Handler for POST /companies
pub async fn create_company_handler(
    State(state): State<AppState>,
    Json(req): Json<CompanyRequest>,
) -> Result<(StatusCode, Json<CompanyWithGames>)> {
    if let Some(error_msg) = req.validate() {
        return Err(CatalogError::InvalidRequest(error_msg));
    }

    let company = state.companies.create_company(req.into_new_company()).await?;
    Ok((StatusCode::CREATED, Json(company)))
}

/// Handler for POST /companies/bulk
pub async fn create_companies_handler(
    State(state): State<AppState>,
    Json(reqs): Json<Vec<CompanyRequest>>,
) -> Result<(StatusCode, Json<Vec<CompanyWithGames>>)> {
    if let Some(error_msg) = reqs.iter().find_map(|req| req.validate()) {
        return Err(CatalogError::InvalidRequest(error_msg));
    }

    let companies = state
        .companies
        .create_companies(reqs.into_iter().map(|req| req.into_new_company()).collect())
        .await?;
    Ok((StatusCode::CREATED, Json(companies)))
}

/// Handler for GET /companies/:company_id
pub async fn get_company_handler(
    State(state): State<AppState>,
    Path(company_id): Path<u64>,
) -> Result<Json<CompanyWithGames>> {
    Ok(Json(state.companies.company(company_id).await?))
}

/// Handler for PUT /companies/:company_id
pub async fn update_company_handler(
    State(state): State<AppState>,
    Path(company_id): Path<u64>,
    Json(req): Json<CompanyRequest>,
) -> Result<Json<CompanyWithGames>> {
    if let Some(error_msg) = req.validate() {
        return Err(CatalogError::InvalidRequest(error_msg));
    }

    let company = state
        .companies
        .update_company(company_id, req.into_new_company())
        .await?;
    Ok(Json(company))
}

/// Handler for DELETE /companies/:company_id
pub async fn delete_company_handler(
    State(state): State<AppState>,
    Path(company_id): Path<u64>,
) -> Result<Json<DeleteResponse>> {
    state.companies.delete_company(company_id).await?;
    Ok(Json(DeleteResponse::new(format!("Company {}", company_id))))
}

/// Handler for GET /companies/:company_id/games
pub async fn company_games_handler(
    State(state): State<AppState>,
    Path(company_id): Path<u64>,
) -> Result<Json<Vec<Game>>> {
    Ok(Json(state.companies.games_of_company(company_id).await?))
}

/// Handler for POST /companies/:company_id/games/:game_id
pub async fn add_company_game_handler(
    State(state): State<AppState>,
    Path((company_id, game_id)): Path<(u64, u64)>,
) -> Result<Json<CompanyWithGames>> {
    Ok(Json(state.companies.add_game(company_id, game_id).await?))
}

/// Handler for DELETE /companies/:company_id/games/:game_id
pub async fn remove_company_game_handler(
    State(state): State<AppState>,
    Path((company_id, game_id)): Path<(u64, u64)>,
) -> Result<Json<DeleteResponse>> {
    state.companies.remove_game(company_id, game_id).await?;
    Ok(Json(DeleteResponse::new(format!(
        "Link between company {} and game {}",
        company_id, game_id
    ))))
}

/// Handler for GET /cache/stats
pub async fn cache_stats_handler(State(state): State<AppState>) -> Json<CacheStatsResponse> {
    Json(CacheStatsResponse {
        caches: vec![state.games.cache_stats(), state.reviews.cache_stats()],
    })
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

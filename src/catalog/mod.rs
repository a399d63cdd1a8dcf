//! Catalog Module
//!
//! Games, reviews and publishing companies, their in-memory store, and the
//! services that put the query caches in front of it.

pub mod companies;
pub mod games;
pub mod models;
pub mod repository;
pub mod reviews;

use std::sync::Arc;

use tokio::sync::RwLock;

pub use companies::CompanyService;
pub use games::GameService;
pub use models::{
    Company, CompanyWithGames, Game, GamePatch, NewCompany, NewGame, NewReview, Review,
    MAX_RATING, MIN_RATING,
};
pub use repository::CatalogRepository;
pub use reviews::ReviewService;

/// Repository handle shared by the services.
pub type SharedRepository = Arc<RwLock<CatalogRepository>>;

//! Review operations with a per-id lookup cache.

use std::sync::Arc;

use crate::cache::{BoundedExpiringCache, CacheStatsSnapshot};
use crate::catalog::games::GameService;
use crate::catalog::models::{NewReview, Review};
use crate::catalog::SharedRepository;
use crate::config::CacheConfig;
use crate::error::{CatalogError, Result};

const CACHE_REVIEW_PREFIX: &str = "review:id:";

/// Review operations.
///
/// Any review write changes a game's average rating, so it also clears the
/// game rating cache.
#[derive(Debug)]
pub struct ReviewService {
    repo: SharedRepository,
    games: Arc<GameService>,
    cache: BoundedExpiringCache<String, Review>,
}

impl ReviewService {
    pub fn new(
        repo: SharedRepository,
        games: Arc<GameService>,
        cache_config: CacheConfig,
    ) -> Result<Self> {
        Ok(Self {
            repo,
            games,
            cache: BoundedExpiringCache::with_config(cache_config)?,
        })
    }

    pub async fn create_review(&self, game_id: u64, review: NewReview) -> Result<Review> {
        let mut repo = self.repo.write().await;
        if !repo.game_exists(game_id) {
            return Err(game_not_found(game_id));
        }
        let created = repo.insert_review(game_id, review);
        self.games.clear_cache();
        Ok(created)
    }

    pub async fn reviews_for_game(&self, game_id: u64) -> Result<Vec<Review>> {
        let repo = self.repo.read().await;
        if !repo.game_exists(game_id) {
            return Err(game_not_found(game_id));
        }
        Ok(repo.reviews_for_game(game_id))
    }

    /// Looks up a review of `game_id`, served from the cache when possible.
    pub async fn review(&self, game_id: u64, id: u64) -> Result<Review> {
        let key = cache_key(id);
        let review = match self.cache.get(&key) {
            Some(review) => review,
            None => {
                let repo = self.repo.read().await;
                let review = repo
                    .find_review(id)
                    .cloned()
                    .ok_or_else(|| review_not_found(id))?;
                self.cache.put(key, review.clone());
                review
            }
        };

        if review.game_id != game_id {
            return Err(review_not_in_game(id, game_id));
        }
        Ok(review)
    }

    /// Replaces a review and refreshes its cache entry.
    pub async fn update_review(&self, game_id: u64, id: u64, update: NewReview) -> Result<Review> {
        let mut repo = self.repo.write().await;
        let existing = repo.find_review(id).ok_or_else(|| review_not_found(id))?;
        if existing.game_id != game_id {
            return Err(review_not_in_game(id, game_id));
        }

        let updated = repo
            .update_review(id, update)
            .ok_or_else(|| review_not_found(id))?;
        self.cache.put(cache_key(id), updated.clone());
        self.games.clear_cache();
        Ok(updated)
    }

    pub async fn delete_review(&self, game_id: u64, id: u64) -> Result<()> {
        let mut repo = self.repo.write().await;
        if !repo.game_exists(game_id) {
            return Err(game_not_found(game_id));
        }
        match repo.find_review(id) {
            Some(review) if review.game_id == game_id => {}
            Some(_) => return Err(review_not_in_game(id, game_id)),
            None => return Err(review_not_found(id)),
        }

        repo.delete_review(id);
        self.cache.remove(&cache_key(id));
        self.games.clear_cache();
        Ok(())
    }

    /// Drops cache entries of reviews deleted along with their game.
    ///
    /// Passed to `GameService::delete_game`, which calls it under the
    /// repository write lock.
    pub fn forget_reviews(&self, ids: &[u64]) {
        for id in ids {
            self.cache.remove(&cache_key(*id));
        }
    }

    pub fn cache_stats(&self) -> CacheStatsSnapshot {
        self.cache.stats()
    }

    pub fn shutdown(&self) {
        self.cache.shutdown();
    }
}

fn cache_key(id: u64) -> String {
    format!("{}{}", CACHE_REVIEW_PREFIX, id)
}

fn game_not_found(id: u64) -> CatalogError {
    CatalogError::NotFound(format!("Game not found with id: {}", id))
}

fn review_not_found(id: u64) -> CatalogError {
    CatalogError::NotFound(format!("Review not found with id: {}", id))
}

fn review_not_in_game(id: u64, game_id: u64) -> CatalogError {
    CatalogError::NotFound(format!(
        "Review with id {} does not belong to game with id {}",
        id, game_id
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::models::NewGame;
    use crate::catalog::CatalogRepository;
    use tokio::sync::RwLock;

    struct Fixture {
        games: Arc<GameService>,
        reviews: ReviewService,
    }

    fn fixture() -> Fixture {
        let repo = Arc::new(RwLock::new(CatalogRepository::new()));
        let games = Arc::new(
            GameService::new(Arc::clone(&repo), CacheConfig::new("GameCache", 60_000, 100))
                .unwrap(),
        );
        let reviews = ReviewService::new(
            repo,
            Arc::clone(&games),
            CacheConfig::new("ReviewCache", 60_000, 100),
        )
        .unwrap();
        Fixture { games, reviews }
    }

    fn new_review(rating: u8) -> NewReview {
        NewReview {
            author: Some("critic".to_string()),
            content: "solid".to_string(),
            rating,
        }
    }

    #[tokio::test]
    async fn test_review_lookup_is_cached() {
        let f = fixture();
        let game = f.games.create_game(NewGame::titled("Tetris")).await.unwrap();
        let created = f.reviews.create_review(game.id, new_review(9)).await.unwrap();

        assert_eq!(f.reviews.review(game.id, created.id).await.unwrap(), created);
        assert_eq!(f.reviews.review(game.id, created.id).await.unwrap(), created);

        let stats = f.reviews.cache_stats();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.puts, 1);
    }

    #[tokio::test]
    async fn test_review_of_other_game_is_not_found() {
        let f = fixture();
        let game = f.games.create_game(NewGame::titled("Doom")).await.unwrap();
        let other = f.games.create_game(NewGame::titled("Quake")).await.unwrap();
        let created = f.reviews.create_review(game.id, new_review(7)).await.unwrap();

        let result = f.reviews.review(other.id, created.id).await;
        assert!(matches!(result, Err(CatalogError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_create_for_unknown_game() {
        let f = fixture();

        let result = f.reviews.create_review(42, new_review(5)).await;
        assert!(matches!(result, Err(CatalogError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_update_refreshes_cache_and_ratings() {
        let f = fixture();
        let game = f.games.create_game(NewGame::titled("Myst")).await.unwrap();
        let created = f.reviews.create_review(game.id, new_review(3)).await.unwrap();
        f.reviews.review(game.id, created.id).await.unwrap();
        assert!(f.games.games_by_minimum_rating(8).await.is_empty());

        let updated = f
            .reviews
            .update_review(game.id, created.id, new_review(9))
            .await
            .unwrap();

        assert_eq!(f.reviews.review(game.id, created.id).await.unwrap(), updated);
        assert_eq!(f.games.games_by_minimum_rating(8).await.len(), 1);
    }

    #[tokio::test]
    async fn test_delete_removes_cache_entry() {
        let f = fixture();
        let game = f.games.create_game(NewGame::titled("Oxenfree")).await.unwrap();
        let created = f.reviews.create_review(game.id, new_review(6)).await.unwrap();
        f.reviews.review(game.id, created.id).await.unwrap();

        f.reviews.delete_review(game.id, created.id).await.unwrap();

        assert_eq!(f.reviews.cache_stats().size, 0);
        assert_eq!(f.reviews.cache_stats().removals, 1);
        let result = f.reviews.review(game.id, created.id).await;
        assert!(matches!(result, Err(CatalogError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_forget_reviews_after_game_delete() {
        let f = fixture();
        let game = f.games.create_game(NewGame::titled("Firewatch")).await.unwrap();
        let created = f.reviews.create_review(game.id, new_review(8)).await.unwrap();
        f.reviews.review(game.id, created.id).await.unwrap();

        let removed = f
            .games
            .delete_game(game.id, |ids| f.reviews.forget_reviews(ids))
            .await
            .unwrap();

        assert_eq!(removed, vec![created.id]);
        assert_eq!(f.reviews.cache_stats().size, 0);
        assert_eq!(f.reviews.cache_stats().removals, 1);
        let result = f.reviews.review(game.id, created.id).await;
        assert!(matches!(result, Err(CatalogError::NotFound(_))));
    }
}

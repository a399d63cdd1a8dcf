//! Game queries and the cache in front of the rating lookups.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::debug;

use crate::cache::{BoundedExpiringCache, CacheStatsSnapshot};
use crate::catalog::models::{Game, GamePatch, NewGame};
use crate::catalog::{CatalogRepository, SharedRepository};
use crate::config::CacheConfig;
use crate::error::{CatalogError, Result};

const CACHE_MIN_RATING_PREFIX: &str = "games:min_rating:";
const CACHE_RATING_RANGE_PREFIX: &str = "games:rating_range:";

/// Game operations. Rating queries are memoized; every write that can
/// change their results clears the cache.
///
/// Cache writes happen under the repository read lock and invalidations
/// under its write lock, so a query result computed before a write is never
/// stored after that write's invalidation.
#[derive(Debug)]
pub struct GameService {
    repo: SharedRepository,
    cache: BoundedExpiringCache<String, Arc<Vec<Game>>>,
}

impl GameService {
    pub fn new(repo: SharedRepository, cache_config: CacheConfig) -> Result<Self> {
        Ok(Self {
            repo,
            cache: BoundedExpiringCache::with_config(cache_config)?,
        })
    }

    pub async fn all_games(&self) -> Vec<Game> {
        self.repo.read().await.all_games()
    }

    pub async fn game(&self, id: u64) -> Result<Game> {
        self.repo
            .read()
            .await
            .find_game(id)
            .cloned()
            .ok_or_else(|| game_not_found(id))
    }

    /// Games titled `title`, ignoring case.
    ///
    /// # Errors
    /// `InvalidRequest` when no game carries the title.
    pub async fn games_by_title(&self, title: &str) -> Result<Vec<Game>> {
        let repo = self.repo.read().await;
        match repo.find_game_by_title(title) {
            Some(game) => Ok(vec![game.clone()]),
            None => Err(CatalogError::InvalidRequest("Title not found".to_string())),
        }
    }

    /// Stores a new game; titles are unique ignoring case.
    pub async fn create_game(&self, game: NewGame) -> Result<Game> {
        let mut repo = self.repo.write().await;
        if repo.find_game_by_title(&game.title).is_some() {
            return Err(CatalogError::AlreadyExists(format!(
                "Game with title '{}' already exists",
                game.title
            )));
        }
        let created = repo.insert_game(game);
        self.cache.clear();
        Ok(created)
    }

    /// Stores several games at once, or none of them if any title is taken.
    pub async fn create_games(&self, games: Vec<NewGame>) -> Result<Vec<Game>> {
        let mut seen = HashSet::new();
        if let Some(duplicate) = games
            .iter()
            .find(|game| !seen.insert(game.title.to_lowercase()))
        {
            return Err(CatalogError::InvalidRequest(format!(
                "Title '{}' appears more than once",
                duplicate.title
            )));
        }

        let mut repo = self.repo.write().await;
        let taken = repo.taken_titles(games.iter().map(|game| game.title.as_str()));
        if !taken.is_empty() {
            return Err(CatalogError::AlreadyExists(format!(
                "Games with titles {} already exist",
                taken.join(", ")
            )));
        }

        let created: Vec<Game> = games
            .into_iter()
            .map(|game| repo.insert_game(game))
            .collect();
        self.cache.clear();
        debug!("Created {} games", created.len());
        Ok(created)
    }

    /// Replaces every field of a game.
    pub async fn update_game(&self, id: u64, update: NewGame) -> Result<Game> {
        let mut repo = self.repo.write().await;
        if !repo.game_exists(id) {
            return Err(game_not_found(id));
        }
        ensure_title_free(&repo, id, &update.title)?;

        let updated = repo
            .replace_game(id, update)
            .ok_or_else(|| game_not_found(id))?;
        self.cache.clear();
        Ok(updated)
    }

    /// Applies the fields present in `patch`.
    pub async fn patch_game(&self, id: u64, patch: GamePatch) -> Result<Game> {
        let mut repo = self.repo.write().await;
        if !repo.game_exists(id) {
            return Err(game_not_found(id));
        }
        if let Some(title) = &patch.title {
            ensure_title_free(&repo, id, title)?;
        }

        let patched = repo
            .patch_game(id, patch)
            .ok_or_else(|| game_not_found(id))?;
        self.cache.clear();
        Ok(patched)
    }

    /// Deletes a game and its reviews.
    ///
    /// `forget_reviews` receives the deleted review ids while the repository
    /// is still locked, so no reader sees them cached after the delete.
    pub async fn delete_game<F>(&self, id: u64, forget_reviews: F) -> Result<Vec<u64>>
    where
        F: FnOnce(&[u64]),
    {
        let mut repo = self.repo.write().await;
        let review_ids = repo.delete_game(id).ok_or_else(|| game_not_found(id))?;
        forget_reviews(&review_ids);
        self.cache.clear();
        Ok(review_ids)
    }

    // == Companies ==

    /// Links a company to a game; linking twice is a no-op.
    pub async fn add_company(&self, game_id: u64, company_id: u64) -> Result<Game> {
        let mut repo = self.repo.write().await;
        ensure_link_ends(&repo, game_id, company_id)?;

        if repo.link_company(game_id, company_id) {
            self.cache.clear();
        }
        repo.find_game(game_id)
            .cloned()
            .ok_or_else(|| game_not_found(game_id))
    }

    /// Unlinks a company from a game.
    ///
    /// # Errors
    /// `NotFound` when either side is missing or they were not linked.
    pub async fn remove_company(&self, game_id: u64, company_id: u64) -> Result<()> {
        let mut repo = self.repo.write().await;
        ensure_link_ends(&repo, game_id, company_id)?;

        if !repo.unlink_company(game_id, company_id) {
            return Err(CatalogError::NotFound(format!(
                "Company {} is not linked to game {}",
                company_id, game_id
            )));
        }
        self.cache.clear();
        Ok(())
    }

    /// Games whose average rating is at least `min_rating`.
    pub async fn games_by_minimum_rating(&self, min_rating: u8) -> Arc<Vec<Game>> {
        let key = format!("{}{}", CACHE_MIN_RATING_PREFIX, min_rating);
        if let Some(games) = self.cache.get(&key) {
            return games;
        }

        let repo = self.repo.read().await;
        let games = Arc::new(repo.games_by_minimum_rating(min_rating));
        debug!("Loaded {} games with rating >= {}", games.len(), min_rating);
        self.cache.put(key, Arc::clone(&games));
        games
    }

    /// Games whose average rating lies in `min_rating..=max_rating`.
    pub async fn games_by_rating_range(&self, min_rating: u8, max_rating: u8) -> Arc<Vec<Game>> {
        let key = format!("{}{}:{}", CACHE_RATING_RANGE_PREFIX, min_rating, max_rating);
        if let Some(games) = self.cache.get(&key) {
            return games;
        }

        let repo = self.repo.read().await;
        let games = Arc::new(repo.games_by_rating_range(min_rating, max_rating));
        debug!(
            "Loaded {} games with rating in {}..={}",
            games.len(),
            min_rating,
            max_rating
        );
        self.cache.put(key, Arc::clone(&games));
        games
    }

    /// Drops every cached rating query.
    ///
    /// Callers that change ratings invoke this while holding the repository
    /// write lock.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    pub fn cache_stats(&self) -> CacheStatsSnapshot {
        self.cache.stats()
    }

    pub fn shutdown(&self) {
        self.cache.shutdown();
    }
}

fn ensure_title_free(repo: &CatalogRepository, id: u64, title: &str) -> Result<()> {
    match repo.find_game_by_title(title) {
        Some(other) if other.id != id => Err(CatalogError::AlreadyExists(format!(
            "Game with title '{}' already exists",
            title
        ))),
        _ => Ok(()),
    }
}

fn ensure_link_ends(repo: &CatalogRepository, game_id: u64, company_id: u64) -> Result<()> {
    if !repo.game_exists(game_id) {
        return Err(game_not_found(game_id));
    }
    if !repo.company_exists(company_id) {
        return Err(company_not_found(company_id));
    }
    Ok(())
}

fn game_not_found(id: u64) -> CatalogError {
    CatalogError::NotFound(format!("Game not found with id: {}", id))
}

pub(crate) fn company_not_found(id: u64) -> CatalogError {
    CatalogError::NotFound(format!("Company not found with id: {}", id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::models::{NewCompany, NewReview};
    use tokio::sync::RwLock;

    fn service() -> (SharedRepository, GameService) {
        let repo = Arc::new(RwLock::new(CatalogRepository::new()));
        let service =
            GameService::new(Arc::clone(&repo), CacheConfig::new("GameCache", 60_000, 100))
                .unwrap();
        (repo, service)
    }

    async fn rate(repo: &SharedRepository, game_id: u64, rating: u8) {
        repo.write().await.insert_review(
            game_id,
            NewReview {
                author: None,
                content: "review".to_string(),
                rating,
            },
        );
    }

    #[tokio::test]
    async fn test_create_and_fetch() {
        let (_, service) = service();

        let game = service.create_game(NewGame::titled("Hollow Knight")).await.unwrap();

        assert_eq!(service.game(game.id).await.unwrap(), game);
        assert_eq!(service.all_games().await, vec![game]);
    }

    #[tokio::test]
    async fn test_duplicate_title_conflicts() {
        let (_, service) = service();
        service.create_game(NewGame::titled("Portal")).await.unwrap();

        let result = service.create_game(NewGame::titled("PORTAL")).await;
        assert!(matches!(result, Err(CatalogError::AlreadyExists(_))));
    }

    #[tokio::test]
    async fn test_unknown_game() {
        let (_, service) = service();

        assert!(matches!(service.game(9).await, Err(CatalogError::NotFound(_))));
        assert!(matches!(
            service.delete_game(9, |_| {}).await,
            Err(CatalogError::NotFound(_))
        ));
        assert!(matches!(
            service.update_game(9, NewGame::titled("Nope")).await,
            Err(CatalogError::NotFound(_))
        ));
        assert!(matches!(
            service.patch_game(9, GamePatch::default()).await,
            Err(CatalogError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_rating_query_is_cached() {
        let (repo, service) = service();
        let game = service.create_game(NewGame::titled("Braid")).await.unwrap();
        rate(&repo, game.id, 8).await;

        let first = service.games_by_minimum_rating(7).await;
        let second = service.games_by_minimum_rating(7).await;

        assert_eq!(first.len(), 1);
        assert!(Arc::ptr_eq(&first, &second));
        let stats = service.cache_stats();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.size, 1);
    }

    #[tokio::test]
    async fn test_range_and_minimum_use_distinct_keys() {
        let (repo, service) = service();
        let game = service.create_game(NewGame::titled("Limbo")).await.unwrap();
        rate(&repo, game.id, 5).await;

        assert_eq!(service.games_by_minimum_rating(5).await.len(), 1);
        assert_eq!(service.games_by_rating_range(6, 10).await.len(), 0);
        assert_eq!(service.cache_stats().size, 2);
    }

    #[tokio::test]
    async fn test_writes_invalidate_cache() {
        let (repo, service) = service();
        let game = service.create_game(NewGame::titled("Inside")).await.unwrap();
        rate(&repo, game.id, 9).await;

        assert_eq!(service.games_by_rating_range(8, 10).await.len(), 1);

        service.delete_game(game.id, |_| {}).await.unwrap();

        assert_eq!(service.cache_stats().size, 0);
        assert!(service.games_by_rating_range(8, 10).await.is_empty());
    }

    #[tokio::test]
    async fn test_games_by_title() {
        let (_, service) = service();
        let game = service.create_game(NewGame::titled("Stray")).await.unwrap();

        assert_eq!(service.games_by_title("STRAY").await.unwrap(), vec![game]);
        assert!(matches!(
            service.games_by_title("Stra").await,
            Err(CatalogError::InvalidRequest(_))
        ));
    }

    #[tokio::test]
    async fn test_create_games_is_all_or_nothing() {
        let (_, service) = service();
        service.create_game(NewGame::titled("Fez")).await.unwrap();

        let result = service
            .create_games(vec![NewGame::titled("Braid"), NewGame::titled("FEZ")])
            .await;
        match result {
            Err(CatalogError::AlreadyExists(message)) => assert!(message.contains("Fez")),
            other => panic!("unexpected result: {:?}", other),
        }
        assert_eq!(service.all_games().await.len(), 1);

        let duplicate = service
            .create_games(vec![NewGame::titled("Braid"), NewGame::titled("braid")])
            .await;
        assert!(matches!(duplicate, Err(CatalogError::InvalidRequest(_))));

        let created = service
            .create_games(vec![NewGame::titled("Braid"), NewGame::titled("Limbo")])
            .await
            .unwrap();
        assert_eq!(created.len(), 2);
        assert_eq!(service.all_games().await.len(), 3);
    }

    #[tokio::test]
    async fn test_update_and_patch_clear_cache() {
        let (repo, service) = service();
        let game = service.create_game(NewGame::titled("Tunic")).await.unwrap();
        let other = service.create_game(NewGame::titled("Noita")).await.unwrap();
        rate(&repo, game.id, 8).await;
        service.games_by_minimum_rating(5).await;
        assert_eq!(service.cache_stats().size, 1);

        let mut update = NewGame::titled("Tunic DX");
        update.genre = Some("Adventure".to_string());
        let updated = service.update_game(game.id, update).await.unwrap();
        assert_eq!(updated.genre.as_deref(), Some("Adventure"));
        assert_eq!(service.cache_stats().size, 0);
        assert_eq!(service.games_by_minimum_rating(5).await[0].title, "Tunic DX");

        let patched = service
            .patch_game(
                game.id,
                GamePatch {
                    title: Some("Tunic".to_string()),
                    ..GamePatch::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(patched.genre.as_deref(), Some("Adventure"));
        assert_eq!(service.cache_stats().size, 0);

        let taken = service.update_game(game.id, NewGame::titled("noita")).await;
        assert!(matches!(taken, Err(CatalogError::AlreadyExists(_))));
        let own_title = service.update_game(other.id, NewGame::titled("NOITA")).await;
        assert!(own_title.is_ok());
    }

    #[tokio::test]
    async fn test_delete_forgets_reviews_under_lock() {
        let (repo, service) = service();
        let game = service.create_game(NewGame::titled("Gris")).await.unwrap();
        rate(&repo, game.id, 7).await;
        rate(&repo, game.id, 9).await;

        let mut forgotten = Vec::new();
        let removed = service
            .delete_game(game.id, |ids| {
                // Holding the write lock: readers cannot get in
                assert!(repo.try_read().is_err());
                forgotten.extend_from_slice(ids);
            })
            .await
            .unwrap();

        assert_eq!(removed, forgotten);
        assert_eq!(removed.len(), 2);
    }

    #[tokio::test]
    async fn test_company_links_clear_cache() {
        let (repo, service) = service();
        let game = service.create_game(NewGame::titled("Ori")).await.unwrap();
        let studio = repo.write().await.insert_company(NewCompany::named("Moon Studios"));
        rate(&repo, game.id, 9).await;
        service.games_by_minimum_rating(5).await;

        let linked = service.add_company(game.id, studio.id).await.unwrap();
        assert!(linked.company_ids.contains(&studio.id));
        assert_eq!(service.cache_stats().size, 0);
        assert!(service.games_by_minimum_rating(5).await[0]
            .company_ids
            .contains(&studio.id));

        service.remove_company(game.id, studio.id).await.unwrap();
        assert!(matches!(
            service.remove_company(game.id, studio.id).await,
            Err(CatalogError::NotFound(_))
        ));
        assert!(matches!(
            service.add_company(game.id, 404).await,
            Err(CatalogError::NotFound(_))
        ));
    }
}

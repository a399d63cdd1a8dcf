//! In-memory catalog store.
//!
//! Stands in for the relational store behind the services. Ids are assigned
//! sequentially starting at 1 and every listing is ordered by id.

use std::collections::{BTreeMap, BTreeSet};

use crate::catalog::models::{
    Company, CompanyWithGames, Game, GamePatch, NewCompany, NewGame, NewReview, Review,
};

/// Games, their reviews and the publishing companies.
#[derive(Debug, Default)]
pub struct CatalogRepository {
    games: BTreeMap<u64, Game>,
    reviews: BTreeMap<u64, Review>,
    companies: BTreeMap<u64, Company>,
    next_game_id: u64,
    next_review_id: u64,
    next_company_id: u64,
}

impl CatalogRepository {
    pub fn new() -> Self {
        Self::default()
    }

    // == Games ==

    pub fn insert_game(&mut self, game: NewGame) -> Game {
        self.next_game_id += 1;
        let game = Game {
            id: self.next_game_id,
            company_ids: self.company_ids_by_names(&game.companies),
            title: game.title,
            description: game.description,
            genre: game.genre,
            release_date: game.release_date,
        };
        self.games.insert(game.id, game.clone());
        game
    }

    pub fn find_game(&self, id: u64) -> Option<&Game> {
        self.games.get(&id)
    }

    pub fn game_exists(&self, id: u64) -> bool {
        self.games.contains_key(&id)
    }

    /// Case-insensitive title lookup.
    pub fn find_game_by_title(&self, title: &str) -> Option<&Game> {
        let title = title.to_lowercase();
        self.games
            .values()
            .find(|game| game.title.to_lowercase() == title)
    }

    /// Titles already taken, ignoring case, out of `titles`.
    pub fn taken_titles<'a>(&self, titles: impl IntoIterator<Item = &'a str>) -> Vec<String> {
        titles
            .into_iter()
            .filter_map(|title| self.find_game_by_title(title))
            .map(|game| game.title.clone())
            .collect()
    }

    pub fn all_games(&self) -> Vec<Game> {
        self.games.values().cloned().collect()
    }

    /// Replaces every editable field of a game.
    ///
    /// Linked companies are only replaced when the update names some.
    pub fn replace_game(&mut self, id: u64, update: NewGame) -> Option<Game> {
        let company_ids = self.company_ids_by_names(&update.companies);
        let game = self.games.get_mut(&id)?;
        game.title = update.title;
        game.description = update.description;
        game.genre = update.genre;
        game.release_date = update.release_date;
        if !company_ids.is_empty() {
            game.company_ids = company_ids;
        }
        Some(game.clone())
    }

    /// Applies the fields present in `patch`.
    pub fn patch_game(&mut self, id: u64, patch: GamePatch) -> Option<Game> {
        let company_ids = self.company_ids_by_names(&patch.companies);
        let game = self.games.get_mut(&id)?;
        if let Some(title) = patch.title {
            game.title = title;
        }
        if let Some(description) = patch.description {
            game.description = Some(description);
        }
        if let Some(genre) = patch.genre {
            game.genre = Some(genre);
        }
        if let Some(release_date) = patch.release_date {
            game.release_date = Some(release_date);
        }
        if !company_ids.is_empty() {
            game.company_ids = company_ids;
        }
        Some(game.clone())
    }

    /// Deletes a game together with its reviews.
    ///
    /// Returns the ids of the deleted reviews, or None if the game does not exist.
    pub fn delete_game(&mut self, id: u64) -> Option<Vec<u64>> {
        self.games.remove(&id)?;
        let review_ids: Vec<u64> = self
            .reviews
            .values()
            .filter(|review| review.game_id == id)
            .map(|review| review.id)
            .collect();
        for review_id in &review_ids {
            self.reviews.remove(review_id);
        }
        Some(review_ids)
    }

    // == Ratings ==

    /// Average review rating of a game, None if it has no reviews.
    pub fn average_rating(&self, game_id: u64) -> Option<f64> {
        let (sum, count) = self
            .reviews
            .values()
            .filter(|review| review.game_id == game_id)
            .fold((0u64, 0u64), |(sum, count), review| {
                (sum + review.rating as u64, count + 1)
            });
        (count > 0).then(|| sum as f64 / count as f64)
    }

    /// Games whose average rating is at least `min_rating`.
    pub fn games_by_minimum_rating(&self, min_rating: u8) -> Vec<Game> {
        self.games_where_rating(|rating| rating >= min_rating as f64)
    }

    /// Games whose average rating lies in `min_rating..=max_rating`.
    pub fn games_by_rating_range(&self, min_rating: u8, max_rating: u8) -> Vec<Game> {
        self.games_where_rating(|rating| rating >= min_rating as f64 && rating <= max_rating as f64)
    }

    fn games_where_rating(&self, matches: impl Fn(f64) -> bool) -> Vec<Game> {
        self.games
            .values()
            .filter(|game| self.average_rating(game.id).is_some_and(&matches))
            .cloned()
            .collect()
    }

    // == Reviews ==

    /// Stores a review; the caller has checked that the game exists.
    pub fn insert_review(&mut self, game_id: u64, review: NewReview) -> Review {
        self.next_review_id += 1;
        let review = Review {
            id: self.next_review_id,
            game_id,
            author: review.author,
            content: review.content,
            rating: review.rating,
        };
        self.reviews.insert(review.id, review.clone());
        review
    }

    pub fn find_review(&self, id: u64) -> Option<&Review> {
        self.reviews.get(&id)
    }

    pub fn reviews_for_game(&self, game_id: u64) -> Vec<Review> {
        self.reviews
            .values()
            .filter(|review| review.game_id == game_id)
            .cloned()
            .collect()
    }

    /// Replaces the editable fields of a review.
    pub fn update_review(&mut self, id: u64, update: NewReview) -> Option<Review> {
        let review = self.reviews.get_mut(&id)?;
        review.author = update.author;
        review.content = update.content;
        review.rating = update.rating;
        Some(review.clone())
    }

    pub fn delete_review(&mut self, id: u64) -> Option<Review> {
        self.reviews.remove(&id)
    }

    // == Companies ==

    pub fn insert_company(&mut self, company: NewCompany) -> Company {
        self.next_company_id += 1;
        let company = Company {
            id: self.next_company_id,
            name: company.name,
            description: company.description,
            founded_year: company.founded_year,
            website: company.website,
        };
        self.companies.insert(company.id, company.clone());
        company
    }

    pub fn find_company(&self, id: u64) -> Option<&Company> {
        self.companies.get(&id)
    }

    pub fn company_exists(&self, id: u64) -> bool {
        self.companies.contains_key(&id)
    }

    /// Case-insensitive name lookup.
    pub fn find_company_by_name(&self, name: &str) -> Option<&Company> {
        let name = name.to_lowercase();
        self.companies
            .values()
            .find(|company| company.name.to_lowercase() == name)
    }

    /// Companies whose name contains `fragment`, ignoring case.
    pub fn companies_by_name_fragment(&self, fragment: &str) -> Vec<Company> {
        let fragment = fragment.to_lowercase();
        self.companies
            .values()
            .filter(|company| company.name.to_lowercase().contains(&fragment))
            .cloned()
            .collect()
    }

    /// Names already taken, ignoring case, out of `names`.
    pub fn taken_names<'a>(&self, names: impl IntoIterator<Item = &'a str>) -> Vec<String> {
        names
            .into_iter()
            .filter_map(|name| self.find_company_by_name(name))
            .map(|company| company.name.clone())
            .collect()
    }

    pub fn all_companies(&self) -> Vec<Company> {
        self.companies.values().cloned().collect()
    }

    /// Replaces every editable field of a company; its game links stay.
    pub fn update_company(&mut self, id: u64, update: NewCompany) -> Option<Company> {
        let company = self.companies.get_mut(&id)?;
        company.name = update.name;
        company.description = update.description;
        company.founded_year = update.founded_year;
        company.website = update.website;
        Some(company.clone())
    }

    /// Deletes a company and unlinks it from every game.
    ///
    /// Returns the ids of the games it was linked to, or None if it does not exist.
    pub fn delete_company(&mut self, id: u64) -> Option<Vec<u64>> {
        self.companies.remove(&id)?;
        let mut unlinked = Vec::new();
        for game in self.games.values_mut() {
            if game.company_ids.remove(&id) {
                unlinked.push(game.id);
            }
        }
        Some(unlinked)
    }

    /// Links a company to a game; the caller has checked both exist.
    ///
    /// Returns false if they were already linked.
    pub fn link_company(&mut self, game_id: u64, company_id: u64) -> bool {
        self.games
            .get_mut(&game_id)
            .is_some_and(|game| game.company_ids.insert(company_id))
    }

    /// Returns false if the two were not linked.
    pub fn unlink_company(&mut self, game_id: u64, company_id: u64) -> bool {
        self.games
            .get_mut(&game_id)
            .is_some_and(|game| game.company_ids.remove(&company_id))
    }

    pub fn games_of_company(&self, company_id: u64) -> Vec<Game> {
        self.games
            .values()
            .filter(|game| game.company_ids.contains(&company_id))
            .cloned()
            .collect()
    }

    /// A company along with its game titles.
    pub fn company_with_games(&self, company: Company) -> CompanyWithGames {
        let games = self
            .games_of_company(company.id)
            .into_iter()
            .map(|game| game.title)
            .collect();
        CompanyWithGames { company, games }
    }

    fn company_ids_by_names(&self, names: &[String]) -> BTreeSet<u64> {
        names
            .iter()
            .filter_map(|name| self.find_company_by_name(name))
            .map(|company| company.id)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn review(rating: u8) -> NewReview {
        NewReview {
            author: None,
            content: format!("rated {}", rating),
            rating,
        }
    }

    #[test]
    fn test_ids_are_sequential() {
        let mut repo = CatalogRepository::new();

        let first = repo.insert_game(NewGame::titled("The Witcher 3"));
        let second = repo.insert_game(NewGame::titled("Cyberpunk 2077"));

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(repo.all_games().len(), 2);
    }

    #[test]
    fn test_find_by_title_ignores_case() {
        let mut repo = CatalogRepository::new();
        repo.insert_game(NewGame::titled("God of War"));

        assert!(repo.find_game_by_title("god OF war").is_some());
        assert!(repo.find_game_by_title("God of War II").is_none());
        assert_eq!(
            repo.taken_titles(["GOD OF WAR", "Hades"]),
            vec!["God of War".to_string()]
        );
    }

    #[test]
    fn test_replace_and_patch_game() {
        let mut repo = CatalogRepository::new();
        let studio = repo.insert_company(NewCompany::named("Supergiant"));
        let mut new_game = NewGame::titled("Bastion");
        new_game.companies = vec!["supergiant".to_string(), "Unknown".to_string()];
        let game = repo.insert_game(new_game);
        assert_eq!(game.company_ids, BTreeSet::from([studio.id]));

        let mut replacement = NewGame::titled("Transistor");
        replacement.genre = Some("Action RPG".to_string());
        let replaced = repo.replace_game(game.id, replacement).unwrap();
        assert_eq!(replaced.title, "Transistor");
        assert_eq!(replaced.genre.as_deref(), Some("Action RPG"));
        // No companies named, links stay
        assert_eq!(replaced.company_ids, BTreeSet::from([studio.id]));

        let patched = repo
            .patch_game(
                game.id,
                GamePatch {
                    description: Some("Cyberpunk action".to_string()),
                    ..GamePatch::default()
                },
            )
            .unwrap();
        assert_eq!(patched.title, "Transistor");
        assert_eq!(patched.genre.as_deref(), Some("Action RPG"));
        assert_eq!(patched.description.as_deref(), Some("Cyberpunk action"));

        assert!(repo.replace_game(99, NewGame::titled("Ghost")).is_none());
        assert!(repo.patch_game(99, GamePatch::default()).is_none());
    }

    #[test]
    fn test_average_rating() {
        let mut repo = CatalogRepository::new();
        let game = repo.insert_game(NewGame::titled("Hades"));

        assert_eq!(repo.average_rating(game.id), None);

        repo.insert_review(game.id, review(8));
        repo.insert_review(game.id, review(5));

        assert_eq!(repo.average_rating(game.id), Some(6.5));
    }

    #[test]
    fn test_rating_queries() {
        let mut repo = CatalogRepository::new();
        let low = repo.insert_game(NewGame::titled("Low"));
        let mid = repo.insert_game(NewGame::titled("Mid"));
        let high = repo.insert_game(NewGame::titled("High"));
        repo.insert_game(NewGame::titled("Unrated"));
        repo.insert_review(low.id, review(2));
        repo.insert_review(mid.id, review(6));
        repo.insert_review(high.id, review(9));

        let ids = |games: Vec<Game>| games.into_iter().map(|g| g.id).collect::<Vec<_>>();

        assert_eq!(ids(repo.games_by_minimum_rating(6)), vec![mid.id, high.id]);
        assert_eq!(ids(repo.games_by_minimum_rating(0)), vec![low.id, mid.id, high.id]);
        assert_eq!(ids(repo.games_by_rating_range(2, 6)), vec![low.id, mid.id]);
        assert!(repo.games_by_rating_range(7, 8).is_empty());
    }

    #[test]
    fn test_delete_game_cascades_reviews() {
        let mut repo = CatalogRepository::new();
        let game = repo.insert_game(NewGame::titled("Doomed"));
        let other = repo.insert_game(NewGame::titled("Survivor"));
        let r1 = repo.insert_review(game.id, review(3));
        let r2 = repo.insert_review(other.id, review(4));

        assert_eq!(repo.delete_game(game.id), Some(vec![r1.id]));
        assert!(repo.find_review(r1.id).is_none());
        assert!(repo.find_review(r2.id).is_some());
        assert_eq!(repo.delete_game(game.id), None);
    }

    #[test]
    fn test_update_and_delete_review() {
        let mut repo = CatalogRepository::new();
        let game = repo.insert_game(NewGame::titled("Celeste"));
        let stored = repo.insert_review(game.id, review(7));

        let updated = repo.update_review(stored.id, review(10)).unwrap();
        assert_eq!(updated.rating, 10);
        assert_eq!(updated.game_id, game.id);

        assert!(repo.delete_review(stored.id).is_some());
        assert!(repo.update_review(stored.id, review(1)).is_none());
        assert!(repo.reviews_for_game(game.id).is_empty());
    }

    #[test]
    fn test_company_lookup() {
        let mut repo = CatalogRepository::new();
        repo.insert_company(NewCompany::named("CD Projekt Red"));
        repo.insert_company(NewCompany::named("Red Hook Studios"));
        repo.insert_company(NewCompany::named("Valve"));

        assert!(repo.find_company_by_name("valve").is_some());
        let reds: Vec<String> = repo
            .companies_by_name_fragment("RED")
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(reds, vec!["CD Projekt Red", "Red Hook Studios"]);
        assert_eq!(repo.taken_names(["VALVE", "Bungie"]), vec!["Valve".to_string()]);
    }

    #[test]
    fn test_company_links() {
        let mut repo = CatalogRepository::new();
        let valve = repo.insert_company(NewCompany::named("Valve"));
        let portal = repo.insert_game(NewGame::titled("Portal"));
        let dota = repo.insert_game(NewGame::titled("Dota 2"));

        assert!(repo.link_company(portal.id, valve.id));
        assert!(!repo.link_company(portal.id, valve.id));
        assert!(repo.link_company(dota.id, valve.id));

        let details = repo.company_with_games(valve.clone());
        assert_eq!(details.games, vec!["Portal", "Dota 2"]);

        assert!(repo.unlink_company(dota.id, valve.id));
        assert!(!repo.unlink_company(dota.id, valve.id));
        assert_eq!(repo.games_of_company(valve.id).len(), 1);
    }

    #[test]
    fn test_update_and_delete_company() {
        let mut repo = CatalogRepository::new();
        let studio = repo.insert_company(NewCompany::named("Team Cherry"));
        let game = repo.insert_game(NewGame::titled("Hollow Knight"));
        repo.link_company(game.id, studio.id);

        let mut update = NewCompany::named("Team Cherry Pty");
        update.founded_year = Some(2014);
        let updated = repo.update_company(studio.id, update).unwrap();
        assert_eq!(updated.founded_year, Some(2014));
        assert_eq!(repo.games_of_company(studio.id).len(), 1);

        assert_eq!(repo.delete_company(studio.id), Some(vec![game.id]));
        assert!(repo.find_game(game.id).unwrap().company_ids.is_empty());
        assert!(!repo.company_exists(studio.id));
        assert_eq!(repo.delete_company(studio.id), None);
    }
}

//! Publishing companies and their links to games.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::debug;

use crate::catalog::games::{company_not_found, GameService};
use crate::catalog::models::{CompanyWithGames, Game, NewCompany};
use crate::catalog::SharedRepository;
use crate::error::{CatalogError, Result};

/// Company operations.
///
/// Company names are unique ignoring case. Changing links changes the games
/// returned by rating queries, so every link change clears the game cache.
#[derive(Debug)]
pub struct CompanyService {
    repo: SharedRepository,
    games: Arc<GameService>,
}

impl CompanyService {
    pub fn new(repo: SharedRepository, games: Arc<GameService>) -> Self {
        Self { repo, games }
    }

    /// All companies, or those whose name contains `name` ignoring case.
    pub async fn companies(&self, name: Option<&str>) -> Vec<CompanyWithGames> {
        let repo = self.repo.read().await;
        let companies = match name {
            Some(fragment) => repo.companies_by_name_fragment(fragment),
            None => repo.all_companies(),
        };
        companies
            .into_iter()
            .map(|company| repo.company_with_games(company))
            .collect()
    }

    pub async fn company(&self, id: u64) -> Result<CompanyWithGames> {
        let repo = self.repo.read().await;
        let company = repo
            .find_company(id)
            .cloned()
            .ok_or_else(|| company_not_found(id))?;
        Ok(repo.company_with_games(company))
    }

    pub async fn create_company(&self, company: NewCompany) -> Result<CompanyWithGames> {
        let mut repo = self.repo.write().await;
        if repo.find_company_by_name(&company.name).is_some() {
            return Err(CatalogError::AlreadyExists(format!(
                "Company with name '{}' already exists",
                company.name
            )));
        }
        let created = repo.insert_company(company);
        Ok(repo.company_with_games(created))
    }

    /// Stores several companies at once, or none of them if any name is taken.
    pub async fn create_companies(
        &self,
        companies: Vec<NewCompany>,
    ) -> Result<Vec<CompanyWithGames>> {
        let mut seen = HashSet::new();
        if let Some(duplicate) = companies
            .iter()
            .find(|company| !seen.insert(company.name.to_lowercase()))
        {
            return Err(CatalogError::InvalidRequest(format!(
                "Name '{}' appears more than once",
                duplicate.name
            )));
        }

        let mut repo = self.repo.write().await;
        let taken = repo.taken_names(companies.iter().map(|company| company.name.as_str()));
        if !taken.is_empty() {
            return Err(CatalogError::AlreadyExists(format!(
                "Companies with names {} already exist",
                taken.join(", ")
            )));
        }

        let created: Vec<CompanyWithGames> = companies
            .into_iter()
            .map(|company| {
                let company = repo.insert_company(company);
                repo.company_with_games(company)
            })
            .collect();
        debug!("Created {} companies", created.len());
        Ok(created)
    }

    /// Replaces every field of a company; its game links stay.
    pub async fn update_company(&self, id: u64, update: NewCompany) -> Result<CompanyWithGames> {
        let mut repo = self.repo.write().await;
        if !repo.company_exists(id) {
            return Err(company_not_found(id));
        }
        if let Some(other) = repo.find_company_by_name(&update.name) {
            if other.id != id {
                return Err(CatalogError::AlreadyExists(format!(
                    "Company with name '{}' already exists",
                    update.name
                )));
            }
        }

        let updated = repo
            .update_company(id, update)
            .ok_or_else(|| company_not_found(id))?;
        Ok(repo.company_with_games(updated))
    }

    /// Deletes a company and unlinks it from its games.
    pub async fn delete_company(&self, id: u64) -> Result<()> {
        let mut repo = self.repo.write().await;
        let unlinked = repo.delete_company(id).ok_or_else(|| company_not_found(id))?;
        if !unlinked.is_empty() {
            self.games.clear_cache();
        }
        debug!("Deleted company {} linked to {} games", id, unlinked.len());
        Ok(())
    }

    pub async fn games_of_company(&self, id: u64) -> Result<Vec<Game>> {
        let repo = self.repo.read().await;
        if !repo.company_exists(id) {
            return Err(company_not_found(id));
        }
        Ok(repo.games_of_company(id))
    }

    /// Links a game to a company; linking twice is a no-op.
    pub async fn add_game(&self, company_id: u64, game_id: u64) -> Result<CompanyWithGames> {
        self.games.add_company(game_id, company_id).await?;
        self.company(company_id).await
    }

    pub async fn remove_game(&self, company_id: u64, game_id: u64) -> Result<()> {
        self.games.remove_company(game_id, company_id).await
    }
}

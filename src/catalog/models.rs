//! Catalog domain entities.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::Serialize;

/// Lowest rating a review may give
pub const MIN_RATING: u8 = 0;
/// Highest rating a review may give
pub const MAX_RATING: u8 = 10;

/// A game in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Game {
    pub id: u64,
    pub title: String,
    pub description: Option<String>,
    pub genre: Option<String>,
    pub release_date: Option<NaiveDate>,
    /// Publishing companies linked to the game
    pub company_ids: BTreeSet<u64>,
}

/// Fields of a game before it is stored, also used for full replacement.
#[derive(Debug, Clone, PartialEq)]
pub struct NewGame {
    pub title: String,
    pub description: Option<String>,
    pub genre: Option<String>,
    pub release_date: Option<NaiveDate>,
    /// Names of existing companies to link; unknown names are ignored
    pub companies: Vec<String>,
}

impl NewGame {
    /// A game with only a title.
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            genre: None,
            release_date: None,
            companies: Vec::new(),
        }
    }
}

/// Partial update of a game. Absent fields keep their value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GamePatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub genre: Option<String>,
    pub release_date: Option<NaiveDate>,
    pub companies: Vec<String>,
}

/// A review of a game.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Review {
    pub id: u64,
    pub game_id: u64,
    pub author: Option<String>,
    pub content: String,
    pub rating: u8,
}

/// Fields of a review before it is stored.
#[derive(Debug, Clone, PartialEq)]
pub struct NewReview {
    pub author: Option<String>,
    pub content: String,
    pub rating: u8,
}

/// A publishing company.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Company {
    pub id: u64,
    pub name: String,
    pub description: Option<String>,
    pub founded_year: Option<i32>,
    pub website: Option<String>,
}

/// Fields of a company before it is stored, also used for full replacement.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCompany {
    pub name: String,
    pub description: Option<String>,
    pub founded_year: Option<i32>,
    pub website: Option<String>,
}

impl NewCompany {
    /// A company with only a name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            founded_year: None,
            website: None,
        }
    }
}

/// A company together with the titles of its games.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanyWithGames {
    #[serde(flatten)]
    pub company: Company,
    pub games: Vec<String>,
}

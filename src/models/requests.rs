//! Request DTOs for the catalog API
//!
//! Defines the structure of incoming HTTP request bodies and query strings.

use chrono::NaiveDate;
use serde::Deserialize;

use crate::catalog::{GamePatch, NewCompany, NewGame, NewReview, MAX_RATING, MIN_RATING};

/// Maximum review length in characters
pub const MAX_REVIEW_LENGTH: usize = 500;
/// Maximum game description length in characters
pub const MAX_DESCRIPTION_LENGTH: usize = 2000;

/// Request body for POST /games, POST /games/bulk and PUT /games/:id
#[derive(Debug, Clone, Deserialize)]
pub struct CreateGameRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub genre: Option<String>,
    /// ISO 8601 date, e.g. `2015-05-19`
    #[serde(default, rename = "releaseDate")]
    pub release_date: Option<NaiveDate>,
    /// Names of existing companies to link
    #[serde(default)]
    pub companies: Vec<String>,
}

impl CreateGameRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.title.trim().is_empty() {
            return Some("Title cannot be empty".to_string());
        }
        description_too_long(self.description.as_deref())
    }

    pub fn into_new_game(self) -> NewGame {
        NewGame {
            title: self.title.trim().to_string(),
            description: self.description,
            genre: self.genre,
            release_date: self.release_date,
            companies: self.companies,
        }
    }
}

/// Request body for PATCH /games/:id; absent fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PatchGameRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default, rename = "releaseDate")]
    pub release_date: Option<NaiveDate>,
    #[serde(default)]
    pub companies: Vec<String>,
}

impl PatchGameRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.title.as_ref().is_some_and(|t| t.trim().is_empty()) {
            return Some("Title cannot be empty".to_string());
        }
        description_too_long(self.description.as_deref())
    }

    pub fn into_patch(self) -> GamePatch {
        GamePatch {
            title: self.title.map(|t| t.trim().to_string()),
            description: self.description,
            genre: self.genre,
            release_date: self.release_date,
            companies: self.companies,
        }
    }
}

/// Request body for creating or replacing a company
#[derive(Debug, Clone, Deserialize)]
pub struct CompanyRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, rename = "foundedYear")]
    pub founded_year: Option<i32>,
    #[serde(default)]
    pub website: Option<String>,
}

impl CompanyRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.name.trim().is_empty() {
            return Some("Company name cannot be empty".to_string());
        }
        description_too_long(self.description.as_deref())
    }

    pub fn into_new_company(self) -> NewCompany {
        NewCompany {
            name: self.name.trim().to_string(),
            description: self.description,
            founded_year: self.founded_year,
            website: self.website,
        }
    }
}

/// Query string of GET /games
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TitleQuery {
    #[serde(default)]
    pub title: Option<String>,
}

/// Query string of GET /companies
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NameQuery {
    #[serde(default)]
    pub name: Option<String>,
}

/// Request body for creating or replacing a review
#[derive(Debug, Clone, Deserialize)]
pub struct ReviewRequest {
    #[serde(default)]
    pub author: Option<String>,
    pub content: String,
    pub rating: i64,
}

impl ReviewRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.content.trim().is_empty() {
            return Some("Review content cannot be empty".to_string());
        }
        if self.content.chars().count() > MAX_REVIEW_LENGTH {
            return Some(format!(
                "Review content exceeds maximum length of {} characters",
                MAX_REVIEW_LENGTH
            ));
        }
        if !rating_in_bounds(self.rating) {
            return Some(format!(
                "Rating must be between {} and {}",
                MIN_RATING, MAX_RATING
            ));
        }
        None
    }

    /// Converts a validated request.
    pub fn into_new_review(self) -> NewReview {
        NewReview {
            author: self.author,
            content: self.content,
            rating: self.rating.clamp(MIN_RATING as i64, MAX_RATING as i64) as u8,
        }
    }
}

/// Query string of GET /games/by-rating
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RatingQuery {
    #[serde(default, rename = "minRating")]
    pub min_rating: Option<i64>,
    #[serde(default, rename = "maxRating")]
    pub max_rating: Option<i64>,
}

impl RatingQuery {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.min_rating.is_some_and(|min| !rating_in_bounds(min)) {
            return Some(format!(
                "Minimum rating must be between {} and {}",
                MIN_RATING, MAX_RATING
            ));
        }
        if self.max_rating.is_some_and(|max| !rating_in_bounds(max)) {
            return Some(format!(
                "Maximum rating must be between {} and {}",
                MIN_RATING, MAX_RATING
            ));
        }
        if let (Some(min), Some(max)) = (self.min_rating, self.max_rating) {
            if min > max {
                return Some("Minimum rating cannot be greater than maximum rating".to_string());
            }
        }
        None
    }

    /// Bounds of a validated query.
    pub fn bounds(&self) -> (Option<u8>, Option<u8>) {
        (
            self.min_rating.map(|r| r as u8),
            self.max_rating.map(|r| r as u8),
        )
    }
}

fn description_too_long(description: Option<&str>) -> Option<String> {
    if description.is_some_and(|d| d.chars().count() > MAX_DESCRIPTION_LENGTH) {
        return Some(format!(
            "Description exceeds maximum length of {} characters",
            MAX_DESCRIPTION_LENGTH
        ));
    }
    None
}

fn rating_in_bounds(rating: i64) -> bool {
    (MIN_RATING as i64..=MAX_RATING as i64).contains(&rating)
}

//! Catalog records and request bodies

use serde::{Deserialize, Serialize};

pub use crate::auth::models::FieldErrors;
use crate::auth::models::check_len;

pub const GENRE_NAME_MAX: usize = 50;
pub const MOVIE_TITLE_MAX: usize = 250;
pub const MOVIE_STORYLINE_MAX: usize = 2500;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Genre {
    pub id: i64,
    pub name: String,
}

/// Body of genre create / rename
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GenreRequest {
    pub name: String,
}

impl GenreRequest {
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        check_len(&mut errors, "name", &self.name, GENRE_NAME_MAX);
        errors
    }
}

/// Movie as returned by the API, with its genre name joined in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct MovieDetails {
    pub id: i64,
    pub title: String,
    pub story_line: String,
    pub year: i32,
    pub rate: f64,
    #[serde(with = "common::serde_helpers::base64_bytes")]
    pub poster: Vec<u8>,
    pub genre_id: i64,
    pub genre_name: String,
}

/// Text fields shared by movie create and update
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MovieFields {
    pub title: String,
    pub story_line: String,
    pub year: i32,
    pub rate: f64,
    pub genre_id: i64,
}

impl MovieFields {
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        check_len(&mut errors, "title", &self.title, MOVIE_TITLE_MAX);
        check_len(&mut errors, "storyLine", &self.story_line, MOVIE_STORYLINE_MAX);
        errors
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewMovie {
    pub fields: MovieFields,
    pub poster: Vec<u8>,
}

/// Movie update; the stored poster is kept when `poster` is `None`
#[derive(Debug, Clone, PartialEq)]
pub struct MovieUpdate {
    pub fields: MovieFields,
    pub poster: Option<Vec<u8>>,
}

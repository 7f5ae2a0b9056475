//! Movie API Handlers
//!
//! Create and update take `multipart/form-data` with the text fields
//! `title`, `storyLine`, `year`, `rate`, `genreId` and a `poster` file part.

use std::collections::HashMap;
use std::path::Path as FsPath;
use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, Query, State},
    response::Json,
};
use common::{AppError, SuccessResponse};
use serde::Deserialize;

use crate::app_state::AppState;
use crate::catalog::models::FieldErrors;
use crate::catalog::{MovieDetails, MovieFields, MovieUpdate, NewMovie};
use crate::config::UploadConfig;

pub const MSG_INVALID_FILE_TYPE: &str = "Invalid file type";
pub const MSG_FILE_TOO_LARGE: &str = "File size exceeds the limit";

fn movie_not_found(id: i64) -> AppError {
    AppError::not_found(format!("No Movie was found with the id {} ", id))
}

/// Uploaded poster part
#[derive(Debug)]
pub struct PosterUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl PosterUpload {
    /// Check extension (case-insensitive) then size
    pub fn check(&self, upload: &UploadConfig) -> Result<(), AppError> {
        let extension = FsPath::new(&self.file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{}", e.to_lowercase()));

        let allowed = extension.is_some_and(|ext| {
            upload
                .allowed_extensions
                .iter()
                .any(|a| a.eq_ignore_ascii_case(&ext))
        });
        if !allowed {
            return Err(AppError::bad_request(MSG_INVALID_FILE_TYPE));
        }
        if self.bytes.len() > upload.max_poster_bytes {
            return Err(AppError::bad_request(MSG_FILE_TOO_LARGE));
        }
        Ok(())
    }
}

/// Raw movie form
#[derive(Debug, Default)]
pub struct MovieForm {
    text: HashMap<String, String>,
    pub poster: Option<PosterUpload>,
}

impl MovieForm {
    pub async fn read(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form = MovieForm::default();
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::bad_request(e.body_text()))?
        {
            let name = field.name().unwrap_or_default().to_string();
            if name.eq_ignore_ascii_case("poster") {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::bad_request(e.body_text()))?;
                // Browsers send an empty part when no file is chosen
                if !file_name.is_empty() || !bytes.is_empty() {
                    form.poster = Some(PosterUpload {
                        file_name,
                        bytes: bytes.to_vec(),
                    });
                }
            } else {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::bad_request(e.body_text()))?;
                form.text.insert(name, value);
            }
        }
        Ok(form)
    }

    fn text(&self, key: &str) -> String {
        self.text
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.trim().to_string())
            .unwrap_or_default()
    }

    fn number<T: std::str::FromStr + Default>(&self, key: &str, errors: &mut FieldErrors) -> T {
        let raw = self.text(key);
        if raw.is_empty() {
            errors
                .entry(key.to_string())
                .or_default()
                .push(format!("The {} field is required.", key));
            return T::default();
        }
        raw.parse().unwrap_or_else(|_| {
            errors
                .entry(key.to_string())
                .or_default()
                .push(format!("The value '{}' is not valid for {}.", raw, key));
            T::default()
        })
    }

    /// Parse and validate the text fields
    pub fn fields(&self) -> Result<MovieFields, AppError> {
        let mut errors = FieldErrors::new();
        let year = self.number::<i32>("year", &mut errors);
        let rate = self.number::<f64>("rate", &mut errors);
        let genre_id = self.number::<i64>("genreId", &mut errors);

        let fields = MovieFields {
            title: self.text("title"),
            story_line: self.text("storyLine"),
            year,
            rate,
            genre_id,
        };
        for (field, messages) in fields.validate() {
            errors.entry(field).or_default().extend(messages);
        }

        if errors.is_empty() {
            Ok(fields)
        } else {
            Err(AppError::validation_error(errors))
        }
    }
}

/// List all movies, highest rated first
///
/// @route GET /api/movies
pub async fn list_movies(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SuccessResponse<Vec<MovieDetails>>>, AppError> {
    let movies = state.movies.list(0).await?;
    Ok(Json(SuccessResponse::new(movies)))
}

#[derive(Debug, Deserialize)]
pub struct GenreFilter {
    #[serde(default)]
    pub id: i64,
}

/// List movies of one genre; `id=0` or no id lists all
///
/// @route GET /api/movies/genre?id={genre_id}
pub async fn list_movies_by_genre(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<GenreFilter>,
) -> Result<Json<SuccessResponse<Vec<MovieDetails>>>, AppError> {
    let movies = state.movies.list(filter.id).await?;
    Ok(Json(SuccessResponse::new(movies)))
}

/// @route GET /api/movies/{id}
pub async fn get_movie(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<SuccessResponse<MovieDetails>>, AppError> {
    let movie = state
        .movies
        .get(id)
        .await?
        .ok_or_else(|| movie_not_found(id))?;
    Ok(Json(SuccessResponse::new(movie)))
}

/// Create a movie; the poster part is required
///
/// @route POST /api/movies
/// @input multipart/form-data
pub async fn create_movie(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<SuccessResponse<MovieDetails>>, AppError> {
    let form = MovieForm::read(multipart).await?;
    let fields = form.fields()?;

    let Some(poster) = form.poster else {
        let mut errors = FieldErrors::new();
        errors.insert(
            "poster".to_string(),
            vec!["The poster field is required.".to_string()],
        );
        return Err(AppError::validation_error(errors));
    };
    poster.check(&state.config.upload)?;

    let movie = state
        .movies
        .create(NewMovie {
            fields,
            poster: poster.bytes,
        })
        .await?;
    Ok(Json(SuccessResponse::new(movie)))
}

/// Update a movie; the stored poster is kept when no poster part is sent
///
/// @route PUT /api/movies/{id}
/// @input multipart/form-data
pub async fn update_movie(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> Result<Json<SuccessResponse<MovieDetails>>, AppError> {
    let form = MovieForm::read(multipart).await?;
    let fields = form.fields()?;

    if state.movies.get(id).await?.is_none() {
        return Err(movie_not_found(id));
    }
    if let Some(poster) = &form.poster {
        poster.check(&state.config.upload)?;
    }

    let movie = state
        .movies
        .update(
            id,
            MovieUpdate {
                fields,
                poster: form.poster.map(|p| p.bytes),
            },
        )
        .await?
        .ok_or_else(|| movie_not_found(id))?;
    Ok(Json(SuccessResponse::new(movie)))
}

/// Delete a movie, returning the deleted record
///
/// @route DELETE /api/movies/{id}
pub async fn delete_movie(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<SuccessResponse<MovieDetails>>, AppError> {
    let movie = state
        .movies
        .delete(id)
        .await?
        .ok_or_else(|| movie_not_found(id))?;
    Ok(Json(SuccessResponse::new(movie)))
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;

    fn poster(name: &str, size: usize) -> PosterUpload {
        PosterUpload {
            file_name: name.to_string(),
            bytes: vec![0u8; size],
        }
    }

    #[test]
    fn test_poster_extension_case_insensitive() {
        let upload = UploadConfig::default();
        assert!(poster("cover.JPG", 10).check(&upload).is_ok());
        assert!(poster("cover.jpeg", 10).check(&upload).is_ok());
        assert!(poster("cover.png", 10).check(&upload).is_ok());

        let err = poster("cover.gif", 10).check(&upload).unwrap_err();
        assert_eq!(err.error.message, MSG_INVALID_FILE_TYPE);
        assert!(poster("cover", 10).check(&upload).is_err());
    }

    #[test]
    fn test_poster_size_limit() {
        let upload = UploadConfig::default();
        assert!(poster("a.png", upload.max_poster_bytes).check(&upload).is_ok());

        let err = poster("a.png", upload.max_poster_bytes + 1)
            .check(&upload)
            .unwrap_err();
        assert_eq!(err.error.message, MSG_FILE_TOO_LARGE);
    }

    #[test]
    fn test_form_fields_parse_errors() {
        let mut form = MovieForm::default();
        form.text.insert("title".into(), "Alien".into());
        form.text.insert("storyLine".into(), "In space.".into());
        form.text.insert("year".into(), "nineteen".into());
        form.text.insert("rate".into(), "8.5".into());

        let err = form.fields().unwrap_err();
        assert!(err.error.field_errors.contains_key("year"));
        assert!(err.error.field_errors.contains_key("genreId"));
        assert!(!err.error.field_errors.contains_key("rate"));

        form.text.insert("year".into(), "1979".into());
        form.text.insert("genreid".into(), "4".into());
        let fields = form.fields().unwrap();
        assert_eq!(fields.year, 1979);
        assert_eq!(fields.genre_id, 4);
    }
}

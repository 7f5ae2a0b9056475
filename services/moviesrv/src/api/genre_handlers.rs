//! Genre API Handlers

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    response::Json,
};
use common::{AppError, SuccessResponse};

use crate::app_state::AppState;
use crate::catalog::{Genre, GenreRequest};

fn genre_not_found(id: i64) -> AppError {
    AppError::not_found(format!("No genre was found with ID: {}", id))
}

/// List all genres ordered by name
///
/// @route GET /api/genres
pub async fn list_genres(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SuccessResponse<Vec<Genre>>>, AppError> {
    let genres = state.genres.list().await?;
    Ok(Json(SuccessResponse::new(genres)))
}

/// @route POST /api/genres
pub async fn create_genre(
    State(state): State<Arc<AppState>>,
    Json(request): Json<GenreRequest>,
) -> Result<Json<SuccessResponse<Genre>>, AppError> {
    let field_errors = request.validate();
    if !field_errors.is_empty() {
        return Err(AppError::validation_error(field_errors));
    }

    let genre = state.genres.create(&request.name).await?;
    Ok(Json(SuccessResponse::new(genre)))
}

/// @route PUT /api/genres/{id}
pub async fn update_genre(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(request): Json<GenreRequest>,
) -> Result<Json<SuccessResponse<Genre>>, AppError> {
    let field_errors = request.validate();
    if !field_errors.is_empty() {
        return Err(AppError::validation_error(field_errors));
    }

    let genre = state
        .genres
        .update(id, &request.name)
        .await?
        .ok_or_else(|| genre_not_found(id))?;
    Ok(Json(SuccessResponse::new(genre)))
}

/// Delete a genre (and its movies), returning the deleted genre
///
/// @route DELETE /api/genres/{id}
pub async fn delete_genre(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<SuccessResponse<Genre>>, AppError> {
    let genre = state
        .genres
        .delete(id)
        .await?
        .ok_or_else(|| genre_not_found(id))?;
    Ok(Json(SuccessResponse::new(genre)))
}

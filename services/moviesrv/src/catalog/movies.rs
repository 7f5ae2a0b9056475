//! Movie persistence

use sqlx::SqlitePool;
use tracing::info;

use super::models::{MovieDetails, MovieFields, MovieUpdate, NewMovie};
use crate::error::{MovieSrvError, Result};

pub const MSG_INVALID_GENRE: &str = "Invalid Genre";

const SELECT_MOVIE: &str = "SELECT m.id, m.title, m.story_line, m.year, m.rate, m.poster, \
     m.genre_id, g.name AS genre_name \
     FROM movies m JOIN genres g ON g.id = m.genre_id";

pub struct MovieService {
    pool: SqlitePool,
}

impl MovieService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn ensure_genre(&self, genre_id: i64) -> Result<()> {
        let found =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM genres WHERE id = ?)")
                .bind(genre_id)
                .fetch_one(&self.pool)
                .await?;
        if found {
            Ok(())
        } else {
            Err(MovieSrvError::bad_request(MSG_INVALID_GENRE))
        }
    }

    /// Movies ordered by rate, highest first; `genre_id == 0` lists all genres
    pub async fn list(&self, genre_id: i64) -> Result<Vec<MovieDetails>> {
        let movies = if genre_id == 0 {
            let sql = format!("{} ORDER BY m.rate DESC, m.id", SELECT_MOVIE);
            sqlx::query_as::<_, MovieDetails>(&sql)
                .fetch_all(&self.pool)
                .await?
        } else {
            let sql = format!(
                "{} WHERE m.genre_id = ? ORDER BY m.rate DESC, m.id",
                SELECT_MOVIE
            );
            sqlx::query_as::<_, MovieDetails>(&sql)
                .bind(genre_id)
                .fetch_all(&self.pool)
                .await?
        };
        Ok(movies)
    }

    pub async fn get(&self, id: i64) -> Result<Option<MovieDetails>> {
        let sql = format!("{} WHERE m.id = ?", SELECT_MOVIE);
        let movie = sqlx::query_as::<_, MovieDetails>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(movie)
    }

    /// Insert a movie; `BadRequest("Invalid Genre")` when the genre is unknown
    pub async fn create(&self, movie: NewMovie) -> Result<MovieDetails> {
        let NewMovie { fields, poster } = movie;
        self.ensure_genre(fields.genre_id).await?;

        let id = sqlx::query(
            "INSERT INTO movies (title, story_line, year, rate, poster, genre_id) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(fields.title.trim())
        .bind(fields.story_line.trim())
        .bind(fields.year)
        .bind(fields.rate)
        .bind(&poster)
        .bind(fields.genre_id)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        info!("Movie created: {} ({})", fields.title.trim(), id);
        self.get(id)
            .await?
            .ok_or_else(|| MovieSrvError::internal(format!("Movie {} vanished after insert", id)))
    }

    /// Update a movie; `None` when it does not exist
    pub async fn update(&self, id: i64, update: MovieUpdate) -> Result<Option<MovieDetails>> {
        if self.get(id).await?.is_none() {
            return Ok(None);
        }
        let MovieUpdate { fields, poster } = update;
        self.ensure_genre(fields.genre_id).await?;

        let MovieFields {
            title,
            story_line,
            year,
            rate,
            genre_id,
        } = fields;

        match poster {
            Some(poster) => {
                sqlx::query(
                    "UPDATE movies SET title = ?, story_line = ?, year = ?, rate = ?, \
                     genre_id = ?, poster = ? WHERE id = ?",
                )
                .bind(title.trim())
                .bind(story_line.trim())
                .bind(year)
                .bind(rate)
                .bind(genre_id)
                .bind(poster)
                .bind(id)
                .execute(&self.pool)
                .await?;
            },
            None => {
                sqlx::query(
                    "UPDATE movies SET title = ?, story_line = ?, year = ?, rate = ?, \
                     genre_id = ? WHERE id = ?",
                )
                .bind(title.trim())
                .bind(story_line.trim())
                .bind(year)
                .bind(rate)
                .bind(genre_id)
                .bind(id)
                .execute(&self.pool)
                .await?;
            },
        }

        info!("Movie updated: {}", id);
        self.get(id).await
    }

    /// Delete and return the removed movie
    pub async fn delete(&self, id: i64) -> Result<Option<MovieDetails>> {
        let Some(movie) = self.get(id).await? else {
            return Ok(None);
        };

        sqlx::query("DELETE FROM movies WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        info!("Movie deleted: {} ({})", movie.title, movie.id);
        Ok(Some(movie))
    }
}

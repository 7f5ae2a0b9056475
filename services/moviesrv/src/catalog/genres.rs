//! Genre persistence

use sqlx::SqlitePool;
use tracing::info;

use super::models::Genre;
use crate::error::Result;

pub struct GenreService {
    pool: SqlitePool,
}

impl GenreService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// All genres ordered by name
    pub async fn list(&self) -> Result<Vec<Genre>> {
        let genres = sqlx::query_as::<_, Genre>("SELECT id, name FROM genres ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(genres)
    }

    pub async fn get(&self, id: i64) -> Result<Option<Genre>> {
        let genre = sqlx::query_as::<_, Genre>("SELECT id, name FROM genres WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(genre)
    }

    pub async fn create(&self, name: &str) -> Result<Genre> {
        let name = name.trim();
        let id = sqlx::query("INSERT INTO genres (name) VALUES (?)")
            .bind(name)
            .execute(&self.pool)
            .await?
            .last_insert_rowid();

        info!("Genre created: {} ({})", name, id);
        Ok(Genre {
            id,
            name: name.to_string(),
        })
    }

    /// Rename; `None` when the genre does not exist
    pub async fn update(&self, id: i64, name: &str) -> Result<Option<Genre>> {
        let name = name.trim();
        let updated = sqlx::query("UPDATE genres SET name = ? WHERE id = ?")
            .bind(name)
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if updated == 0 {
            return Ok(None);
        }
        info!("Genre {} renamed to {}", id, name);
        Ok(Some(Genre {
            id,
            name: name.to_string(),
        }))
    }

    /// Delete and return the removed genre. Its movies go with it.
    pub async fn delete(&self, id: i64) -> Result<Option<Genre>> {
        let Some(genre) = self.get(id).await? else {
            return Ok(None);
        };

        sqlx::query("DELETE FROM genres WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        info!("Genre deleted: {} ({})", genre.name, genre.id);
        Ok(Some(genre))
    }
}

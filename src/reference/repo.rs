use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

use crate::error::{is_unique_violation, ApiError};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TherapeuticArea {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Region {
    pub id: i32,
    pub name: String,
}

pub async fn list_therapeutic_areas(db: &PgPool) -> Result<Vec<TherapeuticArea>, sqlx::Error> {
    sqlx::query_as::<_, TherapeuticArea>(
        "SELECT id, name FROM therapeutic_areas ORDER BY id",
    )
    .fetch_all(db)
    .await
}

pub async fn create_therapeutic_area(
    db: &PgPool,
    name: &str,
) -> Result<TherapeuticArea, ApiError> {
    sqlx::query_as::<_, TherapeuticArea>(
        "INSERT INTO therapeutic_areas (name) VALUES ($1) RETURNING id, name",
    )
    .bind(name)
    .fetch_one(db)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            ApiError::Conflict(format!("Therapeutic area '{name}' already exists"))
        } else {
            ApiError::from(e)
        }
    })
}

pub async fn list_regions(db: &PgPool) -> Result<Vec<Region>, sqlx::Error> {
    sqlx::query_as::<_, Region>("SELECT id, name FROM regions ORDER BY id")
        .fetch_all(db)
        .await
}

pub async fn create_region(db: &PgPool, name: &str) -> Result<Region, ApiError> {
    sqlx::query_as::<_, Region>("INSERT INTO regions (name) VALUES ($1) RETURNING id, name")
        .bind(name)
        .fetch_one(db)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                ApiError::Conflict(format!("Region '{name}' already exists"))
            } else {
                ApiError::from(e)
            }
        })
}

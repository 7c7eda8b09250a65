/*
 * Responsibility
 * - drinks テーブル向け SQLx 操作 (list / create / update / delete / seed)
 * - DrinkRepo trait の裏に置き、handler からは AppState 経由でのみ触る
 * - unique 違反 (title) は RepoError::Conflict に変換
 */
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, types::Json};

use crate::repos::error::RepoError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
    pub color: String,
    pub parts: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct DrinkRow {
    pub id: i32,
    pub title: String,
    pub recipe: Json<Vec<Ingredient>>,
}

#[async_trait]
pub trait DrinkRepo: Send + Sync + 'static {
    async fn list(&self) -> Result<Vec<DrinkRow>, RepoError>;

    async fn create(&self, title: &str, recipe: &[Ingredient]) -> Result<DrinkRow, RepoError>;

    // `None` fields are left untouched. Returns `None` when the id does not exist.
    async fn update(
        &self,
        id: i32,
        title: Option<&str>,
        recipe: Option<&[Ingredient]>,
    ) -> Result<Option<DrinkRow>, RepoError>;

    async fn delete(&self, id: i32) -> Result<bool, RepoError>;
}

#[derive(Debug, Clone)]
pub struct PgDrinkRepo {
    db: PgPool,
}

impl PgDrinkRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Insert a sample drink when the table is empty (local development).
    pub async fn seed(&self) -> Result<(), RepoError> {
        let recipe = vec![Ingredient {
            name: "water".into(),
            color: "blue".into(),
            parts: 1,
        }];

        sqlx::query(
            r#"
            INSERT INTO drinks (title, recipe)
            SELECT $1, $2
            WHERE NOT EXISTS (SELECT 1 FROM drinks)
            "#,
        )
        .bind("water")
        .bind(Json(recipe))
        .execute(&self.db)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl DrinkRepo for PgDrinkRepo {
    async fn list(&self) -> Result<Vec<DrinkRow>, RepoError> {
        let rows = sqlx::query_as::<_, DrinkRow>(
            r#"
            SELECT id, title, recipe
            FROM drinks
            ORDER BY id
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows)
    }

    async fn create(&self, title: &str, recipe: &[Ingredient]) -> Result<DrinkRow, RepoError> {
        let row = sqlx::query_as::<_, DrinkRow>(
            r#"
            INSERT INTO drinks (title, recipe)
            VALUES ($1, $2)
            RETURNING id, title, recipe
            "#,
        )
        .bind(title)
        .bind(Json(recipe))
        .fetch_one(&self.db)
        .await
        .map_err(RepoError::from_sqlx)?;

        Ok(row)
    }

    async fn update(
        &self,
        id: i32,
        title: Option<&str>,
        recipe: Option<&[Ingredient]>,
    ) -> Result<Option<DrinkRow>, RepoError> {
        let row = sqlx::query_as::<_, DrinkRow>(
            r#"
            UPDATE drinks
            SET
                title = COALESCE($2, title),
                recipe = COALESCE($3, recipe)
            WHERE id = $1
            RETURNING id, title, recipe
            "#,
        )
        .bind(id)
        .bind(title)
        .bind(recipe.map(Json))
        .fetch_optional(&self.db)
        .await
        .map_err(RepoError::from_sqlx)?;

        Ok(row)
    }

    async fn delete(&self, id: i32) -> Result<bool, RepoError> {
        let result = sqlx::query(
            r#"
            DELETE FROM drinks
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.db)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

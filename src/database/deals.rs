use sqlx::PgPool;

use super::manager::DatabaseError;
use super::models::deal::DealRow;
use super::models::{Deal, NewDeal, Owner, Stage};

/// Deal pipeline, always filtered by `user_id` in SQL
pub struct DealRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> DealRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, owner: Owner) -> Result<Vec<Deal>, DatabaseError> {
        let rows = sqlx::query_as::<_, DealRow>(
            "SELECT id, title, amount, stage FROM deals WHERE user_id = $1 ORDER BY id DESC",
        )
        .bind(owner.id())
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Deal::try_from).collect()
    }

    pub async fn insert(&self, owner: Owner, deal: &NewDeal) -> Result<i64, DatabaseError> {
        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO deals (user_id, title, amount, stage) VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(owner.id())
        .bind(&deal.title)
        .bind(deal.amount.unwrap_or(0.0))
        .bind(deal.stage.unwrap_or_default().as_str())
        .fetch_one(self.pool)
        .await?;

        Ok(id)
    }

    /// Returns the number of rows touched; zero when the id is missing or not owned.
    pub async fn update_stage(&self, owner: Owner, id: i64, stage: Stage) -> Result<u64, DatabaseError> {
        let result = sqlx::query("UPDATE deals SET stage = $1 WHERE id = $2 AND user_id = $3")
            .bind(stage.as_str())
            .bind(id)
            .bind(owner.id())
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

use async_trait::async_trait;
use sqlx::SqlitePool;
use tracing::debug;

use crate::{
    error::{AppError, AppResult},
    migrations,
    models::{AddOutcome, Coin, NewCoin, RemoveOutcome},
};

#[async_trait]
pub trait CoinRepository: Send + Sync {
    /// Creates or migrates the schema. Must succeed before anything else is called.
    async fn init(&self) -> AppResult<()>;
    /// All coins, newest year first, then by country.
    async fn list(&self) -> AppResult<Vec<Coin>>;
    async fn get_by_id(&self, id: i64) -> AppResult<Option<Coin>>;
    /// Inserts the coin with quantity 1, or adds one copy if the triple is already stored.
    async fn add(&self, coin: NewCoin) -> AppResult<AddOutcome>;
    /// Removes one copy; the record goes away with its last copy.
    /// Fails with [`AppError::NotFound`] when no record has this id.
    async fn remove(&self, id: i64) -> AppResult<RemoveOutcome>;
}

#[derive(Clone)]
pub struct SqliteCoinRepository {
    pool: SqlitePool,
}

impl SqliteCoinRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl CoinRepository for SqliteCoinRepository {
    async fn init(&self) -> AppResult<()> {
        migrations::run(&self.pool).await?;
        Ok(())
    }

    async fn list(&self) -> AppResult<Vec<Coin>> {
        let coins = sqlx::query_as::<_, Coin>(
            r#"
            SELECT id, country, denomination, year, exists_count
            FROM coins
            ORDER BY year DESC, country ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(coins)
    }

    async fn get_by_id(&self, id: i64) -> AppResult<Option<Coin>> {
        let coin = sqlx::query_as::<_, Coin>(
            r#"
            SELECT id, country, denomination, year, exists_count
            FROM coins
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(coin)
    }

    async fn add(&self, coin: NewCoin) -> AppResult<AddOutcome> {
        let mut tx = self.pool.begin().await?;

        // A concurrent insert of the same triple lands in the DO UPDATE arm
        // through the identity constraint, so it never surfaces as an error.
        let (id, quantity): (i64, i64) = sqlx::query_as(
            r#"
            INSERT INTO coins (country, denomination, year, exists_count)
            VALUES (?1, ?2, ?3, 1)
            ON CONFLICT (country, denomination, year)
            DO UPDATE SET exists_count = coins.exists_count + 1
            RETURNING id, exists_count
            "#,
        )
        .bind(&coin.country)
        .bind(&coin.denomination)
        .bind(coin.year)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        // Stored quantities are >= 1, so an increment always yields >= 2.
        let outcome = if quantity == 1 {
            AddOutcome::Added
        } else {
            AddOutcome::Incremented
        };

        debug!(
            id,
            quantity,
            country = %coin.country,
            denomination = %coin.denomination,
            year = coin.year,
            %outcome,
            "coin added"
        );

        Ok(outcome)
    }

    async fn remove(&self, id: i64) -> AppResult<RemoveOutcome> {
        let mut tx = self.pool.begin().await?;

        // The first write takes SQLite's write lock, so the delete below sees
        // the same row state. Each statement carries its own quantity guard.
        let decremented: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE coins
            SET exists_count = exists_count - 1
            WHERE id = ?1 AND exists_count > 1
            RETURNING exists_count
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let outcome = if let Some(quantity) = decremented {
            debug!(id, quantity, "coin decremented");
            RemoveOutcome::Decremented
        } else {
            let deleted: Option<i64> = sqlx::query_scalar(
                r#"
                DELETE FROM coins
                WHERE id = ?1 AND exists_count <= 1
                RETURNING id
                "#,
            )
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;

            if deleted.is_none() {
                return Err(AppError::coin_not_found());
            }
            debug!(id, "coin deleted");
            RemoveOutcome::Deleted
        };

        tx.commit().await?;
        Ok(outcome)
    }
}

//! User repository: profiles and the favorites ledger.

use async_trait::async_trait;
use chrono::Utc;
use domain::models::{Identity, User};
use domain::ports::{StoreError, UserStore};
use sqlx::{PgPool, Postgres, Transaction};

use crate::entities::UserEntity;
use crate::error::store_error;
use crate::metrics::QueryTimer;

/// Repository for user-related database operations.
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Creates a new UserRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Create the user or refresh name and picture.
    pub async fn upsert(&self, identity: &Identity) -> Result<UserEntity, sqlx::Error> {
        let timer = QueryTimer::new("upsert_user");
        let result = sqlx::query_as::<_, UserEntity>(
            r#"
            INSERT INTO users (email, name, picture, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $4)
            ON CONFLICT (email) DO UPDATE SET
                name = EXCLUDED.name,
                picture = EXCLUDED.picture,
                updated_at = EXCLUDED.updated_at
            RETURNING email, name, picture, created_at, updated_at
            "#,
        )
        .bind(&identity.email)
        .bind(identity.name.as_deref())
        .bind(identity.picture.as_deref())
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await;
        timer.finish(&result);
        result
    }

    /// Find a user by email address.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<UserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_user_by_email");
        let result = sqlx::query_as::<_, UserEntity>(
            r#"
            SELECT email, name, picture, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await;
        timer.finish(&result);
        result
    }

    /// Favorited ids in ascending order.
    pub async fn favorite_ids(&self, email: &str) -> Result<Vec<i64>, sqlx::Error> {
        let timer = QueryTimer::new("list_favorites");
        let rows: Result<Vec<(i64,)>, sqlx::Error> = sqlx::query_as(
            r#"
            SELECT osm_id
            FROM user_favorites
            WHERE email = $1
            ORDER BY osm_id ASC
            "#,
        )
        .bind(email)
        .fetch_all(&self.pool)
        .await;
        timer.finish(&rows);
        Ok(rows?.into_iter().map(|(id,)| id).collect())
    }

    /// Insert the favorite and bump the counter in one transaction.
    ///
    /// The counter moves only when the favorite row is new. Unknown bathroom
    /// ids update zero counter rows.
    pub async fn insert_favorite(&self, email: &str, osm_id: i64) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("add_favorite");
        let mut tx = self.pool.begin().await?;

        ensure_user(&mut tx, email).await?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO user_favorites (email, osm_id)
            VALUES ($1, $2)
            ON CONFLICT (email, osm_id) DO NOTHING
            "#,
        )
        .bind(email)
        .bind(osm_id)
        .execute(&mut *tx)
        .await?
        .rows_affected()
            == 1;

        if inserted {
            sqlx::query(
                r#"
                UPDATE bathrooms
                SET favorite_count = favorite_count + 1
                WHERE osm_id = $1
                "#,
            )
            .bind(osm_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        timer.record();
        Ok(inserted)
    }

    /// Delete the favorite and decrement the counter in one transaction.
    pub async fn delete_favorite(&self, email: &str, osm_id: i64) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("remove_favorite");
        let mut tx = self.pool.begin().await?;

        let removed = sqlx::query(
            r#"
            DELETE FROM user_favorites
            WHERE email = $1 AND osm_id = $2
            "#,
        )
        .bind(email)
        .bind(osm_id)
        .execute(&mut *tx)
        .await?
        .rows_affected()
            == 1;

        if removed {
            sqlx::query(
                r#"
                UPDATE bathrooms
                SET favorite_count = GREATEST(favorite_count - 1, 0)
                WHERE osm_id = $1
                "#,
            )
            .bind(osm_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        timer.record();
        Ok(removed)
    }
}

/// Creates a bare user row if none exists.
async fn ensure_user(tx: &mut Transaction<'_, Postgres>, email: &str) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO users (email)
        VALUES ($1)
        ON CONFLICT (email) DO NOTHING
        "#,
    )
    .bind(email)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

#[async_trait]
impl UserStore for UserRepository {
    async fn upsert_profile(&self, identity: &Identity) -> Result<User, StoreError> {
        let entity = self.upsert(identity).await.map_err(store_error)?;
        let favorites = self
            .favorite_ids(&entity.email)
            .await
            .map_err(store_error)?;
        Ok(entity.into_user(favorites))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let Some(entity) = UserRepository::find_by_email(self, email)
            .await
            .map_err(store_error)?
        else {
            return Ok(None);
        };
        let favorites = self.favorite_ids(email).await.map_err(store_error)?;
        Ok(Some(entity.into_user(favorites)))
    }

    async fn add_favorite(&self, email: &str, osm_id: i64) -> Result<bool, StoreError> {
        self.insert_favorite(email, osm_id).await.map_err(store_error)
    }

    async fn remove_favorite(&self, email: &str, osm_id: i64) -> Result<bool, StoreError> {
        self.delete_favorite(email, osm_id).await.map_err(store_error)
    }

    async fn list_favorites(&self, email: &str) -> Result<Vec<i64>, StoreError> {
        self.favorite_ids(email).await.map_err(store_error)
    }
}

//! Bathroom repository for database operations.

use async_trait::async_trait;
use domain::models::{Bathroom, BathroomQuery, BathroomSort, NewBathroom};
use domain::ports::{
    BathroomStore, ReviewMutation, ReviewMutationOutcome, StoreError, UpsertOutcome,
};
use sqlx::types::Json;
use sqlx::PgPool;

use crate::entities::{BathroomEntity, BATHROOM_COLUMNS};
use crate::error::store_error;
use crate::metrics::QueryTimer;

/// ORDER BY clause for a listing sort. `id` breaks ties in natural order.
fn order_clause(sort: Option<BathroomSort>) -> &'static str {
    match sort {
        Some(BathroomSort::Rating) => "average_rating DESC NULLS LAST, id ASC",
        Some(BathroomSort::Reviews) => "rating_count DESC, id ASC",
        Some(BathroomSort::Name) => "tags->>'name' COLLATE \"C\" ASC NULLS FIRST, id ASC",
        None => "id ASC",
    }
}

/// Repository for bathroom-related database operations.
#[derive(Clone)]
pub struct BathroomRepository {
    pool: PgPool,
}

impl BathroomRepository {
    /// Creates a new BathroomRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Insert a bathroom, or merge location and tags into the existing row.
    ///
    /// The update only fires when a value differs, so an identical payload
    /// returns no row. A new row starts with the favorites recorded for its
    /// id before it existed.
    pub async fn upsert(&self, bathroom: &NewBathroom) -> Result<UpsertOutcome, sqlx::Error> {
        let timer = QueryTimer::new("upsert_bathroom");
        let result: Result<Option<(bool,)>, sqlx::Error> = sqlx::query_as(
            r#"
            INSERT INTO bathrooms (osm_id, lat, lon, tags, favorite_count)
            VALUES (
                $1, $2, $3, $4,
                (SELECT count(*) FROM user_favorites WHERE osm_id = $1)
            )
            ON CONFLICT (osm_id) DO UPDATE SET
                lat = EXCLUDED.lat,
                lon = EXCLUDED.lon,
                tags = EXCLUDED.tags
            WHERE (bathrooms.lat, bathrooms.lon, bathrooms.tags)
                IS DISTINCT FROM (EXCLUDED.lat, EXCLUDED.lon, EXCLUDED.tags)
            RETURNING (xmax = 0) AS inserted
            "#,
        )
        .bind(bathroom.osm_id)
        .bind(bathroom.lat)
        .bind(bathroom.lon)
        .bind(Json(&bathroom.tags))
        .fetch_optional(&self.pool)
        .await;
        timer.finish(&result);

        Ok(match result? {
            Some((true,)) => UpsertOutcome::Inserted,
            Some((false,)) => UpsertOutcome::Modified,
            None => UpsertOutcome::Unchanged,
        })
    }

    /// Find a bathroom by its OpenStreetMap id.
    pub async fn find_by_osm_id(&self, osm_id: i64) -> Result<Option<BathroomEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_bathroom_by_osm_id");
        let result = sqlx::query_as::<_, BathroomEntity>(
            r#"
            SELECT id, osm_id, lat, lon, tags, reviews, images, average_rating,
                   rating_count, favorite_count
            FROM bathrooms
            WHERE osm_id = $1
            "#,
        )
        .bind(osm_id)
        .fetch_optional(&self.pool)
        .await;
        timer.finish(&result);
        result
    }

    /// List bathrooms matching the filters.
    ///
    /// Absent filters bind NULL and are skipped; `LIMIT NULL` is unbounded.
    pub async fn find_many(
        &self,
        query: &BathroomQuery,
    ) -> Result<Vec<BathroomEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_bathrooms");
        let sql = format!(
            r#"
            SELECT {columns}
            FROM bathrooms
            WHERE ($1::float8 IS NULL OR (lat BETWEEN $1 AND $2 AND lon BETWEEN $3 AND $4))
              AND ($5::text IS NULL OR strpos(lower(tags->>'name'), lower($5)) > 0)
            ORDER BY {order}
            LIMIT $6
            "#,
            columns = BATHROOM_COLUMNS,
            order = order_clause(query.sort),
        );

        let bbox = query.bbox;
        let result = sqlx::query_as::<_, BathroomEntity>(&sql)
            .bind(bbox.map(|b| b.min_lat))
            .bind(bbox.map(|b| b.max_lat))
            .bind(bbox.map(|b| b.min_lon))
            .bind(bbox.map(|b| b.max_lon))
            .bind(query.keyword.as_deref())
            .bind(query.limit.map(|l| l as i64))
            .fetch_all(&self.pool)
            .await;
        timer.finish(&result);
        result
    }

    /// Apply a review mutation under a row lock.
    ///
    /// Returns `None` when the bathroom does not exist.
    pub async fn mutate_reviews(
        &self,
        osm_id: i64,
        mutation: &ReviewMutation,
    ) -> Result<Option<(BathroomEntity, bool)>, sqlx::Error> {
        let timer = QueryTimer::new("mutate_bathroom_reviews");
        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_as::<_, BathroomEntity>(
            r#"
            SELECT id, osm_id, lat, lon, tags, reviews, images, average_rating,
                   rating_count, favorite_count
            FROM bathrooms
            WHERE osm_id = $1
            FOR UPDATE
            "#,
        )
        .bind(osm_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(current) = current else {
            tx.rollback().await?;
            timer.record();
            return Ok(None);
        };

        let Some(aggregate) = mutation.apply(&current.reviews.0) else {
            tx.rollback().await?;
            timer.record();
            return Ok(Some((current, false)));
        };

        let updated = sqlx::query_as::<_, BathroomEntity>(
            r#"
            UPDATE bathrooms
            SET reviews = $2, average_rating = $3, rating_count = $4
            WHERE osm_id = $1
            RETURNING id, osm_id, lat, lon, tags, reviews, images, average_rating,
                      rating_count, favorite_count
            "#,
        )
        .bind(osm_id)
        .bind(Json(&aggregate.reviews))
        .bind(aggregate.average_rating)
        .bind(aggregate.rating_count)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        timer.record();
        Ok(Some((updated, true)))
    }

    /// Append an image reference.
    pub async fn push_image(
        &self,
        osm_id: i64,
        image: &str,
    ) -> Result<Option<BathroomEntity>, sqlx::Error> {
        let timer = QueryTimer::new("push_bathroom_image");
        let result = sqlx::query_as::<_, BathroomEntity>(
            r#"
            UPDATE bathrooms
            SET images = images || jsonb_build_array($2::text)
            WHERE osm_id = $1
            RETURNING id, osm_id, lat, lon, tags, reviews, images, average_rating,
                      rating_count, favorite_count
            "#,
        )
        .bind(osm_id)
        .bind(image)
        .fetch_optional(&self.pool)
        .await;
        timer.finish(&result);
        result
    }

    /// Bathrooms carrying a review by the given author.
    pub async fn find_reviewed_by(&self, email: &str) -> Result<Vec<BathroomEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_bathrooms_reviewed_by");
        let result = sqlx::query_as::<_, BathroomEntity>(
            r#"
            SELECT id, osm_id, lat, lon, tags, reviews, images, average_rating,
                   rating_count, favorite_count
            FROM bathrooms
            WHERE reviews @> jsonb_build_array(jsonb_build_object('user_email', $1::text))
            ORDER BY id ASC
            "#,
        )
        .bind(email)
        .fetch_all(&self.pool)
        .await;
        timer.finish(&result);
        result
    }

    /// Check database connectivity.
    pub async fn ping(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        crate::metrics::record_pool_metrics(&self.pool);
        Ok(())
    }
}

#[async_trait]
impl BathroomStore for BathroomRepository {
    async fn upsert_by_osm_id(&self, bathroom: NewBathroom) -> Result<UpsertOutcome, StoreError> {
        self.upsert(&bathroom).await.map_err(store_error)
    }

    async fn find_by_osm_id(&self, osm_id: i64) -> Result<Option<Bathroom>, StoreError> {
        let entity = BathroomRepository::find_by_osm_id(self, osm_id)
            .await
            .map_err(store_error)?;
        Ok(entity.map(Bathroom::from))
    }

    async fn find_many(&self, query: &BathroomQuery) -> Result<Vec<Bathroom>, StoreError> {
        let entities = BathroomRepository::find_many(self, query)
            .await
            .map_err(store_error)?;
        Ok(entities.into_iter().map(Bathroom::from).collect())
    }

    async fn apply_review_mutation(
        &self,
        osm_id: i64,
        mutation: ReviewMutation,
    ) -> Result<Option<ReviewMutationOutcome>, StoreError> {
        let result = self
            .mutate_reviews(osm_id, &mutation)
            .await
            .map_err(store_error)?;
        Ok(result.map(|(entity, changed)| ReviewMutationOutcome {
            bathroom: entity.into(),
            changed,
        }))
    }

    async fn push_image(
        &self,
        osm_id: i64,
        image: String,
    ) -> Result<Option<Bathroom>, StoreError> {
        let entity = BathroomRepository::push_image(self, osm_id, &image)
            .await
            .map_err(store_error)?;
        Ok(entity.map(Bathroom::from))
    }

    async fn find_reviews_by_author(&self, email: &str) -> Result<Vec<Bathroom>, StoreError> {
        let entities = self.find_reviewed_by(email).await.map_err(store_error)?;
        Ok(entities.into_iter().map(Bathroom::from).collect())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        BathroomRepository::ping(self).await.map_err(store_error)
    }
}

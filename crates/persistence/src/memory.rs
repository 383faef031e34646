//! In-memory store used by tests and the `memory` storage backend.
//!
//! Bathrooms and users share one lock so that a favorite toggle and its
//! counter update happen together, and a review mutation is a single
//! read-modify-write.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use domain::models::{Bathroom, BathroomQuery, Identity, NewBathroom, User};
use domain::ports::{
    BathroomStore, ReviewMutation, ReviewMutationOutcome, StoreError, UpsertOutcome, UserStore,
};
use domain::services::apply_query;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct MemoryState {
    /// Natural (insertion) order.
    bathrooms: Vec<Bathroom>,
    /// osm_id -> position in `bathrooms`.
    index: HashMap<i64, usize>,
    users: HashMap<String, User>,
}

impl MemoryState {
    fn bathroom_mut(&mut self, osm_id: i64) -> Option<&mut Bathroom> {
        let position = *self.index.get(&osm_id)?;
        self.bathrooms.get_mut(position)
    }

    fn user_entry(&mut self, email: &str) -> &mut User {
        self.users.entry(email.to_string()).or_insert_with(|| {
            let now = Utc::now();
            User {
                email: email.to_string(),
                name: None,
                picture: None,
                favorites: Vec::new(),
                created_at: now,
                updated_at: now,
            }
        })
    }
}

#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: RwLock<MemoryState>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with full bathroom documents, in the given order.
    pub fn with_bathrooms(bathrooms: impl IntoIterator<Item = Bathroom>) -> Self {
        let mut state = MemoryState::default();
        for bathroom in bathrooms {
            match state.index.get(&bathroom.osm_id).copied() {
                Some(position) => state.bathrooms[position] = bathroom,
                None => {
                    state.index.insert(bathroom.osm_id, state.bathrooms.len());
                    state.bathrooms.push(bathroom);
                }
            }
        }
        Self {
            state: RwLock::new(state),
        }
    }
}

#[async_trait]
impl BathroomStore for InMemoryStore {
    async fn upsert_by_osm_id(&self, bathroom: NewBathroom) -> Result<UpsertOutcome, StoreError> {
        let mut state = self.state.write().await;

        if let Some(existing) = state.bathroom_mut(bathroom.osm_id) {
            if existing.lat == bathroom.lat
                && existing.lon == bathroom.lon
                && existing.tags == bathroom.tags
            {
                return Ok(UpsertOutcome::Unchanged);
            }
            existing.lat = bathroom.lat;
            existing.lon = bathroom.lon;
            existing.tags = bathroom.tags;
            return Ok(UpsertOutcome::Modified);
        }

        let mut created = Bathroom::new(bathroom.osm_id, bathroom.lat, bathroom.lon, bathroom.tags);
        // Users may have favorited this id before it existed.
        created.favorite_count = state
            .users
            .values()
            .filter(|u| u.favorites.binary_search(&created.osm_id).is_ok())
            .count() as i64;

        let position = state.bathrooms.len();
        state.index.insert(created.osm_id, position);
        state.bathrooms.push(created);
        Ok(UpsertOutcome::Inserted)
    }

    async fn find_by_osm_id(&self, osm_id: i64) -> Result<Option<Bathroom>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .index
            .get(&osm_id)
            .and_then(|&position| state.bathrooms.get(position))
            .cloned())
    }

    async fn find_many(&self, query: &BathroomQuery) -> Result<Vec<Bathroom>, StoreError> {
        let state = self.state.read().await;
        Ok(apply_query(state.bathrooms.iter().cloned(), query))
    }

    async fn apply_review_mutation(
        &self,
        osm_id: i64,
        mutation: ReviewMutation,
    ) -> Result<Option<ReviewMutationOutcome>, StoreError> {
        let mut state = self.state.write().await;
        let Some(bathroom) = state.bathroom_mut(osm_id) else {
            return Ok(None);
        };

        let changed = match mutation.apply(&bathroom.reviews) {
            Some(aggregate) => {
                aggregate.write_to(bathroom);
                true
            }
            None => false,
        };

        Ok(Some(ReviewMutationOutcome {
            bathroom: bathroom.clone(),
            changed,
        }))
    }

    async fn push_image(
        &self,
        osm_id: i64,
        image: String,
    ) -> Result<Option<Bathroom>, StoreError> {
        let mut state = self.state.write().await;
        Ok(state.bathroom_mut(osm_id).map(|bathroom| {
            bathroom.images.push(image);
            bathroom.clone()
        }))
    }

    async fn find_reviews_by_author(&self, email: &str) -> Result<Vec<Bathroom>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .bathrooms
            .iter()
            .filter(|b| b.review_by(email).is_some())
            .cloned()
            .collect())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[async_trait]
impl UserStore for InMemoryStore {
    async fn upsert_profile(&self, identity: &Identity) -> Result<User, StoreError> {
        let mut state = self.state.write().await;
        let user = state.user_entry(&identity.email);
        user.name = identity.name.clone();
        user.picture = identity.picture.clone();
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self.state.read().await.users.get(email).cloned())
    }

    async fn add_favorite(&self, email: &str, osm_id: i64) -> Result<bool, StoreError> {
        let mut state = self.state.write().await;
        let user = state.user_entry(email);
        let Err(slot) = user.favorites.binary_search(&osm_id) else {
            return Ok(false);
        };
        user.favorites.insert(slot, osm_id);

        if let Some(bathroom) = state.bathroom_mut(osm_id) {
            bathroom.favorite_count += 1;
        }
        Ok(true)
    }

    async fn remove_favorite(&self, email: &str, osm_id: i64) -> Result<bool, StoreError> {
        let mut state = self.state.write().await;
        let Some(user) = state.users.get_mut(email) else {
            return Ok(false);
        };
        let Ok(slot) = user.favorites.binary_search(&osm_id) else {
            return Ok(false);
        };
        user.favorites.remove(slot);

        if let Some(bathroom) = state.bathroom_mut(osm_id) {
            bathroom.favorite_count = (bathroom.favorite_count - 1).max(0);
        }
        Ok(true)
    }

    async fn list_favorites(&self, email: &str) -> Result<Vec<i64>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .users
            .get(email)
            .map(|u| u.favorites.clone())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::models::{BathroomSort, Review, Tags};
    use fake::faker::internet::en::SafeEmail;
    use fake::Fake;
    use std::sync::Arc;

    fn new_bathroom(osm_id: i64, name: &str) -> NewBathroom {
        NewBathroom {
            osm_id,
            lat: 40.0 + osm_id as f64 / 100.0,
            lon: -73.0,
            tags: Tags::from([("name".to_string(), name.to_string())]),
        }
    }

    fn review(email: &str, rating: f64) -> Review {
        Review {
            user_email: email.to_string(),
            user_name: "Anonymous".to_string(),
            rating,
            comment: String::new(),
            created_at: "2024-05-01T09:30:00.000Z".to_string(),
        }
    }

    #[tokio::test]
    async fn test_upsert_outcomes() {
        let store = InMemoryStore::new();

        let outcome = store.upsert_by_osm_id(new_bathroom(1, "A")).await.unwrap();
        assert_eq!(outcome, UpsertOutcome::Inserted);

        let outcome = store.upsert_by_osm_id(new_bathroom(1, "A")).await.unwrap();
        assert_eq!(outcome, UpsertOutcome::Unchanged);

        let outcome = store.upsert_by_osm_id(new_bathroom(1, "B")).await.unwrap();
        assert_eq!(outcome, UpsertOutcome::Modified);

        let stored = store.find_by_osm_id(1).await.unwrap().unwrap();
        assert_eq!(stored.name(), Some("B"));
    }

    #[tokio::test]
    async fn test_merge_keeps_reviews() {
        let store = InMemoryStore::new();
        store.upsert_by_osm_id(new_bathroom(1, "A")).await.unwrap();
        store
            .apply_review_mutation(1, ReviewMutation::Upsert(review("a@nyu.edu", 4.0)))
            .await
            .unwrap();

        store.upsert_by_osm_id(new_bathroom(1, "Renamed")).await.unwrap();

        let stored = store.find_by_osm_id(1).await.unwrap().unwrap();
        assert_eq!(stored.rating_count, 1);
        assert_eq!(stored.average_rating, Some(4.0));
    }

    #[tokio::test]
    async fn test_find_many_natural_order_and_sort() {
        let store = InMemoryStore::new();
        for (id, name) in [(3, "Charlie"), (1, "Alpha"), (2, "Bravo")] {
            store.upsert_by_osm_id(new_bathroom(id, name)).await.unwrap();
        }

        let natural: Vec<i64> = store
            .find_all()
            .await
            .unwrap()
            .iter()
            .map(|b| b.osm_id)
            .collect();
        assert_eq!(natural, vec![3, 1, 2]);

        let query = BathroomQuery {
            sort: Some(BathroomSort::Name),
            ..Default::default()
        };
        let sorted: Vec<i64> = store
            .find_many(&query)
            .await
            .unwrap()
            .iter()
            .map(|b| b.osm_id)
            .collect();
        assert_eq!(sorted, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_review_mutation_on_missing_bathroom() {
        let store = InMemoryStore::new();
        let outcome = store
            .apply_review_mutation(99, ReviewMutation::Upsert(review("a@nyu.edu", 3.0)))
            .await
            .unwrap();
        assert!(outcome.is_none());
    }

    #[tokio::test]
    async fn test_delete_without_review_reports_unchanged() {
        let store = InMemoryStore::new();
        store.upsert_by_osm_id(new_bathroom(1, "A")).await.unwrap();
        let outcome = store
            .apply_review_mutation(
                1,
                ReviewMutation::Delete {
                    user_email: "nobody@nyu.edu".into(),
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert!(!outcome.changed);
        assert_eq!(outcome.bathroom.rating_count, 0);
    }

    #[tokio::test]
    async fn test_concurrent_submissions_by_one_author_keep_one_review() {
        let store = Arc::new(InMemoryStore::new());
        store.upsert_by_osm_id(new_bathroom(1, "A")).await.unwrap();

        let mut handles = Vec::new();
        for i in 0..20 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                let rating = (i % 6) as f64;
                store
                    .apply_review_mutation(
                        1,
                        ReviewMutation::Upsert(review("same@nyu.edu", rating)),
                    )
                    .await
                    .unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let stored = store.find_by_osm_id(1).await.unwrap().unwrap();
        assert_eq!(stored.reviews.len(), 1);
        assert_eq!(stored.rating_count, 1);
        assert_eq!(stored.average_rating, Some(stored.reviews[0].rating));
    }

    #[tokio::test]
    async fn test_favorites_are_idempotent_and_counted() {
        let store = InMemoryStore::new();
        store.upsert_by_osm_id(new_bathroom(5, "E")).await.unwrap();
        let email: String = SafeEmail().fake();

        assert!(store.add_favorite(&email, 5).await.unwrap());
        assert!(!store.add_favorite(&email, 5).await.unwrap());
        assert_eq!(store.list_favorites(&email).await.unwrap(), vec![5]);
        assert_eq!(store.find_by_osm_id(5).await.unwrap().unwrap().favorite_count, 1);

        assert!(store.remove_favorite(&email, 5).await.unwrap());
        assert!(!store.remove_favorite(&email, 5).await.unwrap());
        assert_eq!(store.find_by_osm_id(5).await.unwrap().unwrap().favorite_count, 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_add_favorite_counts_once() {
        let store = Arc::new(InMemoryStore::new());
        store.upsert_by_osm_id(new_bathroom(8, "H")).await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..50 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.add_favorite("racer@nyu.edu", 8).await.unwrap()
            }));
        }
        let mut inserted = 0;
        for handle in handles {
            if handle.await.unwrap() {
                inserted += 1;
            }
        }

        assert_eq!(inserted, 1);
        assert_eq!(store.find_by_osm_id(8).await.unwrap().unwrap().favorite_count, 1);
        assert_eq!(store.list_favorites("racer@nyu.edu").await.unwrap(), vec![8]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_remove_favorite_counts_once() {
        let store = Arc::new(InMemoryStore::new());
        store.upsert_by_osm_id(new_bathroom(9, "I")).await.unwrap();
        store.add_favorite("racer@nyu.edu", 9).await.unwrap();
        store.add_favorite("other@nyu.edu", 9).await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..50 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.remove_favorite("racer@nyu.edu", 9).await.unwrap()
            }));
        }
        let mut removed = 0;
        for handle in handles {
            if handle.await.unwrap() {
                removed += 1;
            }
        }

        assert_eq!(removed, 1);
        assert_eq!(store.find_by_osm_id(9).await.unwrap().unwrap().favorite_count, 1);
        assert!(store.list_favorites("racer@nyu.edu").await.unwrap().is_empty());
        assert_eq!(store.list_favorites("other@nyu.edu").await.unwrap(), vec![9]);
    }

    #[tokio::test]
    async fn test_favorite_unknown_bathroom_updates_user_only() {
        let store = InMemoryStore::new();
        assert!(store.add_favorite("early@nyu.edu", 77).await.unwrap());
        assert_eq!(store.list_favorites("early@nyu.edu").await.unwrap(), vec![77]);

        store.upsert_by_osm_id(new_bathroom(77, "Late")).await.unwrap();
        let stored = store.find_by_osm_id(77).await.unwrap().unwrap();
        assert_eq!(stored.favorite_count, 1);
    }

    #[tokio::test]
    async fn test_upsert_profile_keeps_favorites() {
        let store = InMemoryStore::new();
        store.add_favorite("me@nyu.edu", 3).await.unwrap();

        let user = store
            .upsert_profile(&Identity {
                email: "me@nyu.edu".into(),
                name: Some("Me".into()),
                picture: None,
            })
            .await
            .unwrap();
        assert_eq!(user.name.as_deref(), Some("Me"));
        assert_eq!(user.favorites, vec![3]);
    }

    #[tokio::test]
    async fn test_find_reviews_by_author() {
        let store = InMemoryStore::new();
        for id in [1, 2, 3] {
            store.upsert_by_osm_id(new_bathroom(id, "X")).await.unwrap();
        }
        for id in [3, 1] {
            store
                .apply_review_mutation(id, ReviewMutation::Upsert(review("author@nyu.edu", 5.0)))
                .await
                .unwrap();
        }

        let ids: Vec<i64> = store
            .find_reviews_by_author("author@nyu.edu")
            .await
            .unwrap()
            .iter()
            .map(|b| b.osm_id)
            .collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn test_ping_and_empty_listing() {
        let store = InMemoryStore::new();
        tokio_test::assert_ok!(tokio_test::block_on(store.ping()));
        let all = tokio_test::block_on(store.find_all()).unwrap();
        assert!(all.is_empty());
    }
}

use async_trait::async_trait;

use models::car::{self, CarFields};

use super::domain::CarQuery;
use crate::errors::ServiceError;

/// Persistence contract for car records.
#[async_trait]
pub trait CarRepository: Send + Sync {
    async fn list(&self, query: &CarQuery) -> Result<Vec<car::Model>, ServiceError>;
    async fn get(&self, id: i32) -> Result<Option<car::Model>, ServiceError>;
    async fn exists(&self, id: i32) -> Result<bool, ServiceError>;
    /// Insert with the given status; the store assigns the id.
    async fn insert(&self, fields: &CarFields, status: &str) -> Result<car::Model, ServiceError>;
    /// Replace car `id` only if its version is still `expected_version`.
    /// `Ok(None)` means no row matched (changed or deleted since read).
    async fn update(&self, id: i32, expected_version: i32, fields: &CarFields, status: &str) -> Result<Option<car::Model>, ServiceError>;
    /// Returns whether a row was removed.
    async fn delete(&self, id: i32) -> Result<bool, ServiceError>;
}

/// In-memory repository for tests and doc examples
pub mod mock {
    use super::*;
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    use chrono::Utc;
    use sea_orm::prelude::DateTimeWithTimeZone;

    use crate::catalog::domain::SortOrder;

    #[derive(Default)]
    pub struct MockCarRepository {
        rows: Mutex<BTreeMap<i32, car::Model>>,
        next_id: Mutex<i32>,
    }

    impl MockCarRepository {
        /// Simulate another writer touching the row (bumps its version).
        pub fn touch(&self, id: i32) {
            if let Some(row) = self.rows.lock().unwrap().get_mut(&id) {
                row.version += 1;
            }
        }

        /// Remove a row behind the service's back.
        pub fn remove(&self, id: i32) {
            self.rows.lock().unwrap().remove(&id);
        }

        pub fn len(&self) -> usize { self.rows.lock().unwrap().len() }

        pub fn is_empty(&self) -> bool { self.len() == 0 }
    }

    fn build(id: i32, version: i32, f: &CarFields, status: &str, created_at: DateTimeWithTimeZone) -> car::Model {
        car::Model {
            id,
            make: f.make.clone(),
            model: f.model.clone(),
            year: f.year,
            color: f.color.clone(),
            mileage: f.mileage,
            fuel_type: f.fuel_type.clone(),
            transmission: f.transmission.clone(),
            price: f.price,
            description: f.description.clone(),
            image_url: f.image_url.clone(),
            status: status.to_string(),
            version,
            created_at,
            updated_at: Utc::now().into(),
        }
    }

    #[async_trait]
    impl CarRepository for MockCarRepository {
        async fn list(&self, query: &CarQuery) -> Result<Vec<car::Model>, ServiceError> {
            let rows = self.rows.lock().unwrap();
            let mut out: Vec<car::Model> = rows.values().filter(|c| query.matches(c)).cloned().collect();
            match query.sort {
                SortOrder::PriceAsc => out.sort_by(|a, b| a.price.cmp(&b.price).then(a.id.cmp(&b.id))),
                SortOrder::PriceDesc => out.sort_by(|a, b| b.price.cmp(&a.price).then(a.id.cmp(&b.id))),
                SortOrder::YearAsc => out.sort_by(|a, b| a.year.cmp(&b.year).then(a.id.cmp(&b.id))),
                SortOrder::YearDesc => out.sort_by(|a, b| b.year.cmp(&a.year).then(a.id.cmp(&b.id))),
            }
            Ok(out)
        }

        async fn get(&self, id: i32) -> Result<Option<car::Model>, ServiceError> {
            Ok(self.rows.lock().unwrap().get(&id).cloned())
        }

        async fn exists(&self, id: i32) -> Result<bool, ServiceError> {
            Ok(self.rows.lock().unwrap().contains_key(&id))
        }

        async fn insert(&self, fields: &CarFields, status: &str) -> Result<car::Model, ServiceError> {
            let mut next = self.next_id.lock().unwrap();
            *next += 1;
            let row = build(*next, 0, fields, status, Utc::now().into());
            self.rows.lock().unwrap().insert(row.id, row.clone());
            Ok(row)
        }

        async fn update(&self, id: i32, expected_version: i32, fields: &CarFields, status: &str) -> Result<Option<car::Model>, ServiceError> {
            let mut rows = self.rows.lock().unwrap();
            let Some(current) = rows.get(&id).cloned() else { return Ok(None) };
            if current.version != expected_version {
                return Ok(None);
            }
            let row = build(id, expected_version + 1, fields, status, current.created_at);
            rows.insert(id, row.clone());
            Ok(Some(row))
        }

        async fn delete(&self, id: i32) -> Result<bool, ServiceError> {
            Ok(self.rows.lock().unwrap().remove(&id).is_some())
        }
    }
}

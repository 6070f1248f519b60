use std::sync::Arc;

use tracing::{error, info, instrument, warn};

use models::car::{self, CarInput, STATUS_AVAILABLE};

use super::domain::{CarQuery, CarUpdate, UpdateOutcome};
use super::repository::CarRepository;
use crate::caller::Caller;
use crate::errors::ServiceError;

/// Application service for the car catalog.
///
/// Reads are open to everyone; every mutating operation (and the reads that
/// back the admin forms) checks the Admin capability before touching the
/// repository.
pub struct CatalogService<R: CarRepository + ?Sized = dyn CarRepository> {
    repo: Arc<R>,
}

impl<R: CarRepository + ?Sized> CatalogService<R> {
    pub fn new(repo: Arc<R>) -> Self { Self { repo } }

    /// List cars whose make or model contains `query.search`, in `query.sort` order.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use service::{Caller, catalog::{CatalogService, domain::CarQuery, repository::mock::MockCarRepository}};
    /// use models::car::CarInput;
    ///
    /// let svc = CatalogService::new(Arc::new(MockCarRepository::default()));
    /// let admin = Caller::user(uuid::Uuid::new_v4(), vec!["Admin".into()]);
    /// let input = CarInput { make: "Toyota".into(), model: "Corolla".into(), year: Some(2020), price: Some(15000.into()), ..Default::default() };
    /// tokio_test::block_on(svc.create(&admin, input)).unwrap();
    /// let cars = tokio_test::block_on(svc.list(&CarQuery::new(Some("Corolla".into()), None))).unwrap();
    /// assert_eq!(cars.len(), 1);
    /// assert_eq!(cars[0].status, "Available");
    /// ```
    #[instrument(skip(self, query), fields(search = ?query.search, sort = query.sort.as_str()))]
    pub async fn list(&self, query: &CarQuery) -> Result<Vec<car::Model>, ServiceError> {
        let cars = self.repo.list(query).await?;
        info!(count = cars.len(), "list cars");
        Ok(cars)
    }

    /// Detail lookup; `None` id is treated like an unknown id.
    pub async fn get(&self, id: Option<i32>) -> Result<car::Model, ServiceError> {
        let Some(id) = id else { return Err(ServiceError::not_found("car")) };
        self.repo.get(id).await?.ok_or_else(|| ServiceError::not_found("car"))
    }

    /// Blank create form.
    pub fn create_form(&self, caller: &Caller) -> Result<CarInput, ServiceError> {
        caller.require_admin()?;
        Ok(CarInput { status: Some(STATUS_AVAILABLE.to_string()), ..CarInput::default() })
    }

    /// Persist a new car. The stored status is always `Available`.
    #[instrument(skip(self, caller, input), fields(make = %input.make, model = %input.model))]
    pub async fn create(&self, caller: &Caller, input: CarInput) -> Result<car::Model, ServiceError> {
        caller.require_admin()?;
        let fields = input.validate()?;
        if let Some(requested) = fields.status.as_deref().filter(|s| *s != STATUS_AVAILABLE) {
            info!(requested, "ignoring caller-supplied status on create");
        }
        let created = self.repo.insert(&fields, STATUS_AVAILABLE).await?;
        info!(id = created.id, "car_created");
        Ok(created)
    }

    /// Record behind the edit form, as an update payload carrying the current version.
    pub async fn edit_form(&self, caller: &Caller, id: Option<i32>) -> Result<CarUpdate, ServiceError> {
        caller.require_admin()?;
        Ok(CarUpdate::from_model(self.get(id).await?))
    }

    /// Whole-record replacement guarded by optimistic concurrency.
    ///
    /// A path/payload id mismatch yields `NotFound` without writing. When the
    /// store reports that no row matched, existence is re-checked: a vanished
    /// record is `NotFound`, a still-present one is `Conflict`, which callers
    /// must treat as fatal for the request.
    #[instrument(skip(self, caller, update), fields(payload_id = update.id, version = update.version))]
    pub async fn update(&self, caller: &Caller, id: i32, update: CarUpdate) -> Result<UpdateOutcome, ServiceError> {
        caller.require_admin()?;
        if id != update.id {
            warn!("path id does not match payload id");
            return Ok(UpdateOutcome::NotFound);
        }
        let fields = update.fields.validate()?;
        let status = fields.status.clone().unwrap_or_else(|| STATUS_AVAILABLE.to_string());

        if let Some(updated) = self.repo.update(id, update.version, &fields, &status).await? {
            info!(version = updated.version, "car_updated");
            return Ok(UpdateOutcome::Updated(updated));
        }
        if !self.repo.exists(id).await? {
            info!("car vanished before update");
            return Ok(UpdateOutcome::NotFound);
        }
        error!("car changed since it was read; refusing to overwrite");
        Ok(UpdateOutcome::Conflict)
    }

    /// Record shown on the delete confirmation.
    pub async fn delete_form(&self, caller: &Caller, id: Option<i32>) -> Result<car::Model, ServiceError> {
        caller.require_admin()?;
        self.get(id).await
    }

    /// Confirmed deletion. Deleting an unknown id is a successful no-op;
    /// the return value tells whether a row was removed.
    #[instrument(skip(self, caller))]
    pub async fn delete(&self, caller: &Caller, id: i32) -> Result<bool, ServiceError> {
        caller.require_admin()?;
        let removed = self.repo.delete(id).await?;
        if removed {
            info!("car_deleted");
        } else {
            info!("delete of unknown car ignored");
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::repository::mock::MockCarRepository;
    use rust_decimal::Decimal;
    use uuid::Uuid;

    fn admin() -> Caller { Caller::user(Uuid::new_v4(), vec!["Admin".into()]) }

    fn input(make: &str, model: &str, year: i32, price: i64) -> CarInput {
        CarInput {
            make: make.into(),
            model: model.into(),
            year: Some(year),
            price: Some(Decimal::from(price)),
            ..CarInput::default()
        }
    }

    async fn seeded() -> (Arc<MockCarRepository>, CatalogService<MockCarRepository>) {
        let repo = Arc::new(MockCarRepository::default());
        let svc = CatalogService::new(repo.clone());
        let a = admin();
        svc.create(&a, input("Toyota", "Corolla", 2020, 15000)).await.unwrap();
        svc.create(&a, input("Toyota", "Yaris", 2017, 9000)).await.unwrap();
        svc.create(&a, input("Honda", "Civic", 2022, 21000)).await.unwrap();
        svc.create(&a, input("BMW", "X5 Toyota-edition", 2015, 30000)).await.unwrap();
        (repo, svc)
    }

    fn makes_models(cars: &[car::Model]) -> Vec<String> {
        cars.iter().map(|c| format!("{} {}", c.make, c.model)).collect()
    }

    #[tokio::test]
    async fn search_matches_make_or_model_case_sensitively() {
        let (_, svc) = seeded().await;
        let hits = svc.list(&CarQuery::new(Some("Toyota".into()), None)).await.unwrap();
        assert_eq!(makes_models(&hits), vec!["Toyota Yaris", "Toyota Corolla", "BMW X5 Toyota-edition"]);

        let none = svc.list(&CarQuery::new(Some("toyota".into()), None)).await.unwrap();
        assert!(none.is_empty());

        let by_model = svc.list(&CarQuery::new(Some("ivi".into()), None)).await.unwrap();
        assert_eq!(makes_models(&by_model), vec!["Honda Civic"]);
    }

    #[tokio::test]
    async fn empty_and_absent_search_return_everything() {
        let (_, svc) = seeded().await;
        let all = svc.list(&CarQuery::new(None, None)).await.unwrap();
        let empty = svc.list(&CarQuery::new(Some(String::new()), None)).await.unwrap();
        assert_eq!(all.len(), 4);
        assert_eq!(all, empty);
    }

    #[tokio::test]
    async fn sort_orders() {
        let (_, svc) = seeded().await;
        let prices = |cars: Vec<car::Model>| cars.iter().map(|c| c.price).collect::<Vec<_>>();
        let years = |cars: Vec<car::Model>| cars.iter().map(|c| c.year).collect::<Vec<_>>();

        let d = |xs: [i64; 4]| xs.iter().map(|x| Decimal::from(*x)).collect::<Vec<_>>();

        let asc = svc.list(&CarQuery::new(None, None)).await.unwrap();
        assert_eq!(prices(asc.clone()), d([9000, 15000, 21000, 30000]));

        let desc = svc.list(&CarQuery::new(None, Some("price_desc"))).await.unwrap();
        assert_eq!(prices(desc), d([30000, 21000, 15000, 9000]));

        let y_asc = svc.list(&CarQuery::new(None, Some("year_asc"))).await.unwrap();
        assert_eq!(years(y_asc), vec![2015, 2017, 2020, 2022]);

        let y_desc = svc.list(&CarQuery::new(None, Some("year_desc"))).await.unwrap();
        assert_eq!(years(y_desc), vec![2022, 2020, 2017, 2015]);

        for unknown in ["", "bogus", "PRICE_DESC", "price_asc"] {
            let got = svc.list(&CarQuery::new(None, Some(unknown))).await.unwrap();
            assert_eq!(got, asc, "sort key {unknown:?}");
        }
    }

    #[tokio::test]
    async fn create_forces_available_status() {
        let repo = Arc::new(MockCarRepository::default());
        let svc = CatalogService::new(repo.clone());
        let mut sold = input("Toyota", "Corolla", 2020, 15000);
        sold.status = Some("Sold".into());
        let created = svc.create(&admin(), sold).await.unwrap();
        assert_eq!(created.status, STATUS_AVAILABLE);
        assert!(created.id > 0);

        let listed = svc.list(&CarQuery::default()).await.unwrap();
        assert_eq!(listed.first().map(|c| c.id), Some(created.id));
    }

    #[tokio::test]
    async fn non_admin_cannot_create() {
        let repo = Arc::new(MockCarRepository::default());
        let svc = CatalogService::new(repo.clone());
        for caller in [Caller::anonymous(), Caller::user(Uuid::new_v4(), vec!["Sales".into()])] {
            let res = svc.create(&caller, input("Toyota", "Corolla", 2020, 15000)).await;
            assert!(matches!(res, Err(ServiceError::Forbidden)));
        }
        assert!(repo.is_empty());
        assert!(matches!(svc.create_form(&Caller::anonymous()), Err(ServiceError::Forbidden)));
    }

    #[tokio::test]
    async fn invalid_create_persists_nothing() {
        let repo = Arc::new(MockCarRepository::default());
        let svc = CatalogService::new(repo.clone());
        let err = svc.create(&admin(), CarInput::default()).await.unwrap_err();
        assert!(err.is_validation());
        assert!(repo.is_empty());
    }

    #[tokio::test]
    async fn get_missing_or_absent_is_not_found() {
        let (_, svc) = seeded().await;
        assert!(matches!(svc.get(None).await, Err(ServiceError::NotFound(_))));
        assert!(matches!(svc.get(Some(999)).await, Err(ServiceError::NotFound(_))));
        assert_eq!(svc.get(Some(1)).await.unwrap().model, "Corolla");
    }

    #[tokio::test]
    async fn update_replaces_record_and_bumps_version() {
        let (_, svc) = seeded().await;
        let mut form = svc.edit_form(&admin(), Some(1)).await.unwrap();
        form.fields.color = "Red".into();
        form.fields.status = Some("Reserved".into());
        match svc.update(&admin(), 1, form.clone()).await.unwrap() {
            UpdateOutcome::Updated(updated) => {
                assert_eq!(updated.color, "Red");
                assert_eq!(updated.status, "Reserved");
                assert_eq!(updated.version, form.version + 1);
            }
            other => panic!("expected update, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn update_with_mismatched_ids_is_not_found_and_writes_nothing() {
        let (_, svc) = seeded().await;
        let before = svc.get(Some(1)).await.unwrap();
        let mut form = svc.edit_form(&admin(), Some(1)).await.unwrap();
        form.fields.make = "Changed".into();
        let out = svc.update(&admin(), 2, form).await.unwrap();
        assert_eq!(out, UpdateOutcome::NotFound);
        assert_eq!(svc.get(Some(1)).await.unwrap(), before);
    }

    #[tokio::test]
    async fn update_of_deleted_record_is_not_found() {
        let (repo, svc) = seeded().await;
        let form = svc.edit_form(&admin(), Some(2)).await.unwrap();
        repo.remove(2);
        assert_eq!(svc.update(&admin(), 2, form).await.unwrap(), UpdateOutcome::NotFound);
    }

    #[tokio::test]
    async fn concurrent_modification_is_a_conflict() {
        let (repo, svc) = seeded().await;
        let form = svc.edit_form(&admin(), Some(3)).await.unwrap();
        repo.touch(3);
        let before = svc.get(Some(3)).await.unwrap();
        assert_eq!(svc.update(&admin(), 3, form).await.unwrap(), UpdateOutcome::Conflict);
        assert_eq!(svc.get(Some(3)).await.unwrap(), before);
    }

    #[tokio::test]
    async fn blank_status_on_update_means_available() {
        let (_, svc) = seeded().await;
        let mut form = svc.edit_form(&admin(), Some(1)).await.unwrap();
        form.fields.status = None;
        let UpdateOutcome::Updated(updated) = svc.update(&admin(), 1, form).await.unwrap() else { panic!("not updated") };
        assert_eq!(updated.status, STATUS_AVAILABLE);
    }

    #[tokio::test]
    async fn delete_confirm_and_idempotent_delete() {
        let (repo, svc) = seeded().await;
        assert!(matches!(svc.delete_form(&admin(), Some(999)).await, Err(ServiceError::NotFound(_))));
        assert_eq!(svc.delete_form(&admin(), Some(4)).await.unwrap().make, "BMW");

        assert!(svc.delete(&admin(), 4).await.unwrap());
        assert!(!svc.delete(&admin(), 4).await.unwrap());
        assert!(!svc.delete(&admin(), 999).await.unwrap());
        assert_eq!(repo.len(), 3);
    }

    #[tokio::test]
    async fn mutations_require_admin() {
        let (repo, svc) = seeded().await;
        let anon = Caller::anonymous();
        let form = svc.edit_form(&admin(), Some(1)).await.unwrap();
        assert!(matches!(svc.edit_form(&anon, Some(1)).await, Err(ServiceError::Forbidden)));
        assert!(matches!(svc.update(&anon, 1, form).await, Err(ServiceError::Forbidden)));
        assert!(matches!(svc.delete_form(&anon, Some(1)).await, Err(ServiceError::Forbidden)));
        assert!(matches!(svc.delete(&anon, 1).await, Err(ServiceError::Forbidden)));
        assert_eq!(repo.len(), 4);
    }
}

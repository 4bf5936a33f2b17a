use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use heapless::String as HeaplessString;
use tracing::{info, warn};
use uuid::Uuid;

use crate::cache::ConsolidationCache;
use crate::guard::AuthorizationGuard;
use freight_core_api::{
    ConsolidateRequest, ConsolidationEventDetails, ConsolidationStatus, EngineError,
    EngineResult, StatusUpdateOptions, UnconsolidateOptions,
};
use freight_core_db::models::package::{
    ConsolidatedPackageModel, ConsolidationTotals, PackageModel,
};
use freight_core_db::models::person::PersonModel;
use freight_core_db::repository::{
    CacheInvalidation, ConsolidationStore, StagedOp, UnitOfWork,
};

/// Orchestrates consolidation mutations over a transactional store.
///
/// Every mutation runs the Authorization Guard first, stages its writes and
/// history append into one unit of work, commits atomically, and only then
/// applies the drained cache invalidations. The acting person is always an
/// explicit parameter.
pub struct ConsolidationEngine<S> {
    pub(crate) store: Arc<S>,
    pub(crate) cache: ConsolidationCache,
}

impl<S: ConsolidationStore> ConsolidationEngine<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            cache: ConsolidationCache::new(),
        }
    }

    /// Groups the requested packages under a new consolidated package.
    ///
    /// Requires at least two existing, unlinked packages sharing one owning
    /// customer. The consolidated tracking number is assigned inside the
    /// commit.
    pub async fn consolidate(
        &self,
        request: ConsolidateRequest,
        actor: &PersonModel,
    ) -> EngineResult<ConsolidatedPackageModel> {
        AuthorizationGuard::authorize_mutation(actor)?;
        request
            .ensure_valid()
            .map_err(|msg| self.reject("consolidate", EngineError::Validation(msg)))?;

        let distinct: HashSet<Uuid> = request.package_ids.iter().copied().collect();
        if distinct.len() != request.package_ids.len() {
            return Err(self.reject(
                "consolidate",
                EngineError::Validation("duplicate package in selection".to_string()),
            ));
        }

        let loaded = self
            .store
            .load_packages(&request.package_ids)
            .await
            .map_err(persistence)?;
        let mut members = Vec::with_capacity(loaded.len());
        for (id, package) in request.package_ids.iter().zip(loaded) {
            match package {
                Some(package) => members.push(package),
                None => {
                    return Err(self.reject(
                        "consolidate",
                        EngineError::NotFound(format!("package {id} not found")),
                    ))
                }
            }
        }

        let customer_id = members[0].customer_id;
        if members.iter().any(|package| package.customer_id != customer_id) {
            return Err(self.reject(
                "consolidate",
                EngineError::Validation("packages must belong to the same customer".to_string()),
            ));
        }
        if let Some(linked) = members.iter().find(|package| package.is_consolidated) {
            return Err(self.reject(
                "consolidate",
                EngineError::Validation(format!(
                    "package {} is already consolidated",
                    linked.tracking_number.as_str()
                )),
            ));
        }

        let now = Utc::now();
        let totals = ConsolidationTotals::from_members(&members);
        let mut group = ConsolidatedPackageModel {
            id: Uuid::new_v4(),
            // Assigned by the store inside the commit
            tracking_number: HeaplessString::new(),
            customer_id,
            created_by_person_id: actor.id,
            status: request.status.unwrap_or(ConsolidationStatus::Pending),
            is_active: true,
            notes: request.notes.clone(),
            total_weight: Default::default(),
            total_quantity: 0,
            total_freight_price: Default::default(),
            total_clearance_fee: Default::default(),
            total_storage_fee: Default::default(),
            total_delivery_fee: Default::default(),
            consolidated_at: now,
            unconsolidated_at: None,
        };
        group.apply_totals(&totals);

        let mut uow = UnitOfWork::new(actor.id);
        uow.stage(StagedOp::InsertConsolidatedPackage(group.clone()));
        for member in &members {
            let mut linked = member.clone();
            linked.link_to(group.id, now);
            uow.guard_linkage(member.id, None);
            uow.stage(StagedOp::UpdatePackage(linked));
        }
        uow.stage(StagedOp::AppendHistory {
            consolidated_package_id: group.id,
            performed_by_person_id: actor.id,
            details: ConsolidationEventDetails::Consolidated {
                package_ids: request.package_ids.clone(),
                package_count: members.len() as i32,
                total_weight: totals.total_weight,
                total_cost: totals.total_cost(),
            },
        });
        uow.invalidate(CacheInvalidation::Customer(customer_id));
        uow.invalidate(CacheInvalidation::ConsolidatedPackage(group.id));

        let outcome = self.store.commit(uow).await.map_err(EngineError::from)?;
        self.cache.apply(&outcome.invalidations).await;

        let created = outcome
            .consolidated_packages
            .into_iter()
            .find(|candidate| candidate.id == group.id)
            .ok_or_else(|| {
                EngineError::Persistence("committed group missing from outcome".to_string())
            })?;
        info!(
            consolidated_package_id = %created.id,
            tracking_number = %created.tracking_number.as_str(),
            package_count = members.len(),
            "consolidated packages into group"
        );
        Ok(created)
    }

    /// Dissolves an active group: clears linkage on every member package
    /// and deactivates the group while leaving its record and history
    /// intact. Member statuses are sticky, never reverted.
    pub async fn unconsolidate(
        &self,
        consolidated_package_id: Uuid,
        actor: &PersonModel,
        options: UnconsolidateOptions,
    ) -> EngineResult<Vec<PackageModel>> {
        AuthorizationGuard::authorize_mutation(actor)?;
        let group = self.active_group(consolidated_package_id, "unconsolidate").await?;
        let members = self
            .store
            .find_by_consolidated_package_id(group.id)
            .await
            .map_err(persistence)?;

        let mut uow = UnitOfWork::new(actor.id);
        let mut released = Vec::with_capacity(members.len());
        for member in &members {
            let mut cleared = member.clone();
            cleared.clear_linkage();
            uow.guard_linkage(member.id, Some(group.id));
            uow.stage(StagedOp::UpdatePackage(cleared.clone()));
            released.push(cleared);
        }

        let mut closed = group.clone();
        closed.is_active = false;
        closed.unconsolidated_at = Some(Utc::now());
        uow.stage(StagedOp::UpdateConsolidatedPackage(closed));
        uow.stage(StagedOp::AppendHistory {
            consolidated_package_id: group.id,
            performed_by_person_id: actor.id,
            details: ConsolidationEventDetails::Unconsolidated {
                package_ids: members.iter().map(|member| member.id).collect(),
                package_count: members.len() as i32,
                reason: options.reason.map(|reason| reason.as_str().to_string()),
            },
        });
        uow.invalidate(CacheInvalidation::Customer(group.customer_id));
        uow.invalidate(CacheInvalidation::ConsolidatedPackage(group.id));

        let outcome = self.store.commit(uow).await.map_err(EngineError::from)?;
        self.cache.apply(&outcome.invalidations).await;

        info!(
            consolidated_package_id = %group.id,
            package_count = released.len(),
            "unconsolidated group"
        );
        Ok(released)
    }

    /// Atomically sets the group status and propagates it to every
    /// currently linked member package.
    pub async fn update_status(
        &self,
        consolidated_package_id: Uuid,
        new_status: ConsolidationStatus,
        actor: &PersonModel,
        options: StatusUpdateOptions,
    ) -> EngineResult<ConsolidatedPackageModel> {
        AuthorizationGuard::authorize_mutation(actor)?;
        let group = self.active_group(consolidated_package_id, "update_status").await?;
        let members = self
            .store
            .find_by_consolidated_package_id(group.id)
            .await
            .map_err(persistence)?;

        let mut uow = UnitOfWork::new(actor.id);
        let mut updated_group = group.clone();
        updated_group.status = new_status;
        uow.stage(StagedOp::UpdateConsolidatedPackage(updated_group));
        for member in &members {
            let mut updated = member.clone();
            updated.status = new_status;
            uow.guard_linkage(member.id, Some(group.id));
            uow.stage(StagedOp::UpdatePackage(updated));
        }
        uow.stage(StagedOp::AppendHistory {
            consolidated_package_id: group.id,
            performed_by_person_id: actor.id,
            details: ConsolidationEventDetails::StatusChanged {
                old_status: group.status,
                new_status,
                package_count: members.len() as i32,
                reason: options.reason.map(|reason| reason.as_str().to_string()),
            },
        });
        uow.invalidate(CacheInvalidation::Customer(group.customer_id));
        uow.invalidate(CacheInvalidation::ConsolidatedPackage(group.id));

        let outcome = self.store.commit(uow).await.map_err(EngineError::from)?;
        self.cache.apply(&outcome.invalidations).await;

        let updated = outcome
            .consolidated_packages
            .into_iter()
            .find(|candidate| candidate.id == group.id)
            .ok_or_else(|| {
                EngineError::Persistence("committed group missing from outcome".to_string())
            })?;
        info!(
            consolidated_package_id = %updated.id,
            old_status = %group.status,
            new_status = %new_status,
            package_count = members.len(),
            "updated group status"
        );
        Ok(updated)
    }

    /// Memoized aggregate totals for one group.
    ///
    /// The cache entry carries the owning customer, so the read check runs
    /// on hits without touching the store.
    pub async fn get_consolidated_totals(
        &self,
        consolidated_package_id: Uuid,
        actor: &PersonModel,
    ) -> EngineResult<ConsolidationTotals> {
        let store = Arc::clone(&self.store);
        let (customer_id, totals) = self
            .cache
            .totals(consolidated_package_id, || async move {
                let group = store
                    .load_consolidated_package(consolidated_package_id)
                    .await
                    .map_err(persistence)?
                    .ok_or_else(|| {
                        EngineError::NotFound(format!(
                            "consolidated package {consolidated_package_id} not found"
                        ))
                    })?;
                Ok((group.customer_id, group.totals()))
            })
            .await?;
        AuthorizationGuard::authorize_customer_read(actor, customer_id)?;
        Ok(totals)
    }

    /// Memoized listing of a customer's groups (active and inactive).
    pub async fn get_customer_consolidations(
        &self,
        customer_id: Uuid,
        actor: &PersonModel,
    ) -> EngineResult<Arc<Vec<ConsolidatedPackageModel>>> {
        AuthorizationGuard::authorize_customer_read(actor, customer_id)?;
        let store = Arc::clone(&self.store);
        self.cache
            .customer_consolidations(customer_id, || async move {
                let groups = store
                    .list_consolidated_packages(Some(customer_id))
                    .await
                    .map_err(persistence)?;
                Ok(Arc::new(groups))
            })
            .await
    }

    /// Memoized listing of a customer's consolidation candidates:
    /// unconsolidated packages in a non-terminal status.
    pub async fn get_available_packages(
        &self,
        customer_id: Uuid,
        actor: &PersonModel,
    ) -> EngineResult<Arc<Vec<PackageModel>>> {
        AuthorizationGuard::authorize_customer_read(actor, customer_id)?;
        let store = Arc::clone(&self.store);
        self.cache
            .available_packages(customer_id, || async move {
                let packages = store
                    .find_available_for_consolidation(customer_id)
                    .await
                    .map_err(persistence)?;
                Ok(Arc::new(packages))
            })
            .await
    }

    /// Administrative bulk cache drop.
    pub fn invalidate_caches(&self) {
        self.cache.invalidate_all();
    }

    /// Loads a group and rejects mutations against inactive ones.
    async fn active_group(
        &self,
        consolidated_package_id: Uuid,
        operation: &str,
    ) -> EngineResult<ConsolidatedPackageModel> {
        let group = self
            .store
            .load_consolidated_package(consolidated_package_id)
            .await
            .map_err(persistence)?
            .ok_or_else(|| {
                EngineError::NotFound(format!(
                    "consolidated package {consolidated_package_id} not found"
                ))
            })?;
        if !group.is_active {
            return Err(self.reject(
                operation,
                EngineError::Validation(format!(
                    "consolidated package {} is no longer active",
                    group.tracking_number.as_str()
                )),
            ));
        }
        Ok(group)
    }

    fn reject(&self, operation: &str, error: EngineError) -> EngineError {
        warn!(operation, %error, "operation rejected");
        error
    }

    /// Resolves a group and checks the actor may read its customer's data.
    pub(crate) async fn authorized_group(
        &self,
        consolidated_package_id: Uuid,
        actor: &PersonModel,
    ) -> EngineResult<ConsolidatedPackageModel> {
        let group = self
            .store
            .load_consolidated_package(consolidated_package_id)
            .await
            .map_err(persistence)?
            .ok_or_else(|| {
                EngineError::NotFound(format!(
                    "consolidated package {consolidated_package_id} not found"
                ))
            })?;
        AuthorizationGuard::authorize_customer_read(actor, group.customer_id)?;
        Ok(group)
    }
}

pub(crate) fn persistence(err: Box<dyn std::error::Error + Send + Sync>) -> EngineError {
    EngineError::Persistence(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    use crate::store::MemoryStore;
    use crate::test_helper::{admin_actor, customer_actor, new_test_customer, new_test_package};
    use freight_core_db::models::customer::CustomerModel;
    use freight_core_db::{
        ConsolidatedPackageRepository, ConsolidationHistoryRepository, PackageRepository,
    };

    struct Fixture {
        store: Arc<MemoryStore>,
        engine: ConsolidationEngine<MemoryStore>,
        customer: CustomerModel,
        admin: PersonModel,
        packages: Vec<PackageModel>,
    }

    /// One active customer with three pending, unconsolidated packages.
    fn seeded(package_count: usize) -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let customer = new_test_customer("Acme Imports");
        let admin = admin_actor();
        store.seed_customer(customer.clone());
        store.seed_person(admin.clone());

        let packages: Vec<PackageModel> = (0..package_count)
            .map(|index| {
                let package = new_test_package(
                    customer.id,
                    &format!("TRK-100{index}"),
                    "Electronics",
                );
                store.seed_package(package.clone());
                package
            })
            .collect();

        Fixture {
            engine: ConsolidationEngine::new(Arc::clone(&store)),
            store,
            customer,
            admin,
            packages,
        }
    }

    fn ids(packages: &[PackageModel]) -> Vec<Uuid> {
        packages.iter().map(|package| package.id).collect()
    }

    #[tokio::test]
    async fn consolidating_three_packages_aggregates_totals_and_links_members() {
        let fixture = seeded(3);

        let group = fixture
            .engine
            .consolidate(
                ConsolidateRequest::new(ids(&fixture.packages)),
                &fixture.admin,
            )
            .await
            .unwrap();

        // 3 x (5.0 kg, 25.00 freight)
        assert_eq!(group.total_weight, Decimal::new(150, 1));
        assert_eq!(group.total_quantity, 3);
        assert_eq!(group.total_freight_price, Decimal::new(7500, 2));
        assert_eq!(group.total_cost(), Decimal::new(7500, 2));
        assert_eq!(group.status, ConsolidationStatus::Pending);
        assert!(group.is_active);
        assert!(group.tracking_number.as_str().starts_with("CONS-"));

        for package in &fixture.packages {
            let linked = fixture
                .store
                .load_package(package.id)
                .await
                .unwrap()
                .unwrap();
            assert_eq!(linked.consolidated_package_id, Some(group.id));
            assert!(linked.is_consolidated);
            assert!(linked.linkage_is_consistent());
        }

        // Exactly one persisted history row carrying the full payload.
        let history = fixture.store.find_history(group.id).await.unwrap();
        assert_eq!(history.len(), 1);
        match &history[0].details {
            ConsolidationEventDetails::Consolidated {
                package_ids,
                package_count,
                total_weight,
                total_cost,
            } => {
                assert_eq!(package_ids, &ids(&fixture.packages));
                assert_eq!(*package_count, 3);
                assert_eq!(*total_weight, Decimal::new(150, 1));
                assert_eq!(*total_cost, Decimal::new(7500, 2));
            }
            details => panic!("unexpected history payload: {details:?}"),
        }
    }

    #[tokio::test]
    async fn consolidation_accepts_an_initial_status() {
        let fixture = seeded(2);
        let mut request = ConsolidateRequest::new(ids(&fixture.packages));
        request.status = Some(ConsolidationStatus::Processing);

        let group = fixture
            .engine
            .consolidate(request, &fixture.admin)
            .await
            .unwrap();
        assert_eq!(group.status, ConsolidationStatus::Processing);
    }

    #[tokio::test]
    async fn a_single_package_cannot_be_consolidated() {
        let fixture = seeded(1);

        let err = fixture
            .engine
            .consolidate(
                ConsolidateRequest::new(ids(&fixture.packages)),
                &fixture.admin,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
        assert!(err.to_string().contains("at least 2 packages required"));
    }

    #[tokio::test]
    async fn duplicate_ids_in_the_selection_are_rejected() {
        let fixture = seeded(1);
        let id = fixture.packages[0].id;

        let err = fixture
            .engine
            .consolidate(ConsolidateRequest::new(vec![id, id]), &fixture.admin)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
    }

    #[tokio::test]
    async fn an_unknown_package_fails_with_not_found() {
        let fixture = seeded(1);

        let err = fixture
            .engine
            .consolidate(
                ConsolidateRequest::new(vec![fixture.packages[0].id, Uuid::new_v4()]),
                &fixture.admin,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::NotFound(_)));
    }

    #[tokio::test]
    async fn packages_of_different_customers_cannot_be_grouped() {
        let fixture = seeded(1);
        let other_customer = new_test_customer("Globex Freight");
        let foreign = new_test_package(other_customer.id, "TRK-2001", "Foreign");
        fixture.store.seed_customer(other_customer);
        fixture.store.seed_package(foreign.clone());

        let err = fixture
            .engine
            .consolidate(
                ConsolidateRequest::new(vec![fixture.packages[0].id, foreign.id]),
                &fixture.admin,
            )
            .await
            .unwrap_err();
        assert!(err
            .to_string()
            .contains("packages must belong to the same customer"));
    }

    #[tokio::test]
    async fn an_already_linked_package_cannot_be_consolidated_again() {
        let fixture = seeded(3);
        fixture
            .engine
            .consolidate(
                ConsolidateRequest::new(ids(&fixture.packages[..2])),
                &fixture.admin,
            )
            .await
            .unwrap();

        let third = new_test_package(fixture.customer.id, "TRK-1003", "Extra");
        fixture.store.seed_package(third.clone());

        let err = fixture
            .engine
            .consolidate(
                ConsolidateRequest::new(vec![fixture.packages[0].id, third.id]),
                &fixture.admin,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
        assert!(err.to_string().contains("TRK-1000"));
        assert!(err.to_string().contains("already consolidated"));
    }

    #[tokio::test]
    async fn mutations_by_customer_actors_are_denied() {
        let fixture = seeded(2);
        let actor = customer_actor(fixture.customer.id);

        let err = fixture
            .engine
            .consolidate(ConsolidateRequest::new(ids(&fixture.packages)), &actor)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::PermissionDenied(_)));

        // Nothing was written.
        let unchanged = fixture
            .store
            .load_package(fixture.packages[0].id)
            .await
            .unwrap()
            .unwrap();
        assert!(!unchanged.is_consolidated);
    }

    #[tokio::test]
    async fn unconsolidation_releases_members_and_deactivates_the_group() {
        let fixture = seeded(2);
        let group = fixture
            .engine
            .consolidate(
                ConsolidateRequest::new(ids(&fixture.packages)),
                &fixture.admin,
            )
            .await
            .unwrap();
        fixture
            .engine
            .update_status(
                group.id,
                ConsolidationStatus::Shipped,
                &fixture.admin,
                StatusUpdateOptions::default(),
            )
            .await
            .unwrap();

        let released = fixture
            .engine
            .unconsolidate(group.id, &fixture.admin, UnconsolidateOptions::default())
            .await
            .unwrap();
        assert_eq!(released.len(), 2);
        for package in &released {
            assert!(!package.is_consolidated);
            assert!(package.consolidated_package_id.is_none());
            // Statuses are sticky, not reverted.
            assert_eq!(package.status, ConsolidationStatus::Shipped);
            // Weight, fees and identity come back untouched.
            assert_eq!(package.weight, Decimal::new(50, 1));
            assert_eq!(package.freight_price, Decimal::new(2500, 2));
            assert_eq!(package.clearance_fee, Decimal::ZERO);
            assert_eq!(package.quantity, 1);
        }
        let released_tracking: Vec<&str> = released
            .iter()
            .map(|package| package.tracking_number.as_str())
            .collect();
        for package in &fixture.packages {
            assert!(released_tracking.contains(&package.tracking_number.as_str()));
        }

        let closed = fixture
            .store
            .load_consolidated_package(group.id)
            .await
            .unwrap()
            .unwrap();
        assert!(!closed.is_active);
        assert!(closed.unconsolidated_at.is_some());
    }

    #[tokio::test]
    async fn an_inactive_group_rejects_further_mutations() {
        let fixture = seeded(2);
        let group = fixture
            .engine
            .consolidate(
                ConsolidateRequest::new(ids(&fixture.packages)),
                &fixture.admin,
            )
            .await
            .unwrap();
        fixture
            .engine
            .unconsolidate(group.id, &fixture.admin, UnconsolidateOptions::default())
            .await
            .unwrap();

        let err = fixture
            .engine
            .update_status(
                group.id,
                ConsolidationStatus::Shipped,
                &fixture.admin,
                StatusUpdateOptions::default(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
        assert!(err.to_string().contains("no longer active"));

        let err = fixture
            .engine
            .unconsolidate(group.id, &fixture.admin, UnconsolidateOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
    }

    #[tokio::test]
    async fn released_packages_can_be_consolidated_again() {
        let fixture = seeded(2);
        let first_group = fixture
            .engine
            .consolidate(
                ConsolidateRequest::new(ids(&fixture.packages)),
                &fixture.admin,
            )
            .await
            .unwrap();
        fixture
            .engine
            .unconsolidate(
                first_group.id,
                &fixture.admin,
                UnconsolidateOptions::default(),
            )
            .await
            .unwrap();

        let second_group = fixture
            .engine
            .consolidate(
                ConsolidateRequest::new(ids(&fixture.packages)),
                &fixture.admin,
            )
            .await
            .unwrap();
        assert_ne!(second_group.id, first_group.id);
        assert_ne!(
            second_group.tracking_number.as_str(),
            first_group.tracking_number.as_str()
        );
    }

    #[tokio::test]
    async fn status_updates_propagate_to_every_member() {
        let fixture = seeded(3);
        let group = fixture
            .engine
            .consolidate(
                ConsolidateRequest::new(ids(&fixture.packages)),
                &fixture.admin,
            )
            .await
            .unwrap();

        let updated = fixture
            .engine
            .update_status(
                group.id,
                ConsolidationStatus::Customs,
                &fixture.admin,
                StatusUpdateOptions::default(),
            )
            .await
            .unwrap();
        assert_eq!(updated.status, ConsolidationStatus::Customs);

        for package in &fixture.packages {
            let member = fixture
                .store
                .load_package(package.id)
                .await
                .unwrap()
                .unwrap();
            assert_eq!(member.status, ConsolidationStatus::Customs);
        }
    }

    #[tokio::test]
    async fn totals_reads_are_served_from_cache_until_invalidated() {
        let fixture = seeded(2);
        let group = fixture
            .engine
            .consolidate(
                ConsolidateRequest::new(ids(&fixture.packages)),
                &fixture.admin,
            )
            .await
            .unwrap();

        let totals = fixture
            .engine
            .get_consolidated_totals(group.id, &fixture.admin)
            .await
            .unwrap();
        assert_eq!(totals.total_weight, Decimal::new(100, 1));
        let reads_after_miss = fixture.store.read_count();

        let again = fixture
            .engine
            .get_consolidated_totals(group.id, &fixture.admin)
            .await
            .unwrap();
        assert_eq!(again, totals);
        assert_eq!(fixture.store.read_count(), reads_after_miss);

        // The next mutation invalidates the entry, so the following read
        // goes back to the store.
        fixture
            .engine
            .update_status(
                group.id,
                ConsolidationStatus::Ready,
                &fixture.admin,
                StatusUpdateOptions::default(),
            )
            .await
            .unwrap();
        let reads_before_recompute = fixture.store.read_count();
        fixture
            .engine
            .get_consolidated_totals(group.id, &fixture.admin)
            .await
            .unwrap();
        assert!(fixture.store.read_count() > reads_before_recompute);
    }

    #[tokio::test]
    async fn totals_reads_are_scoped_to_the_owning_customer() {
        let fixture = seeded(2);
        let group = fixture
            .engine
            .consolidate(
                ConsolidateRequest::new(ids(&fixture.packages)),
                &fixture.admin,
            )
            .await
            .unwrap();

        let owner = customer_actor(fixture.customer.id);
        let totals = fixture
            .engine
            .get_consolidated_totals(group.id, &owner)
            .await
            .unwrap();
        assert_eq!(totals.total_quantity, 2);

        // A cache hit is still denied for another customer's actor.
        let outsider = customer_actor(Uuid::new_v4());
        let err = fixture
            .engine
            .get_consolidated_totals(group.id, &outsider)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::PermissionDenied(_)));
    }

    #[tokio::test]
    async fn available_packages_reflect_a_commit_immediately() {
        let fixture = seeded(3);

        let before = fixture
            .engine
            .get_available_packages(fixture.customer.id, &fixture.admin)
            .await
            .unwrap();
        assert_eq!(before.len(), 3);

        fixture
            .engine
            .consolidate(
                ConsolidateRequest::new(ids(&fixture.packages[..2])),
                &fixture.admin,
            )
            .await
            .unwrap();

        let after = fixture
            .engine
            .get_available_packages(fixture.customer.id, &fixture.admin)
            .await
            .unwrap();
        assert_eq!(after.len(), 1);
        assert_eq!(after[0].id, fixture.packages[2].id);
    }

    #[tokio::test]
    async fn customer_listings_include_inactive_groups() {
        let fixture = seeded(2);
        let group = fixture
            .engine
            .consolidate(
                ConsolidateRequest::new(ids(&fixture.packages)),
                &fixture.admin,
            )
            .await
            .unwrap();
        fixture
            .engine
            .unconsolidate(group.id, &fixture.admin, UnconsolidateOptions::default())
            .await
            .unwrap();

        let listed = fixture
            .engine
            .get_customer_consolidations(fixture.customer.id, &fixture.admin)
            .await
            .unwrap();
        assert_eq!(listed.len(), 1);
        assert!(!listed[0].is_active);
    }

    #[tokio::test]
    async fn totals_for_an_unknown_group_fail_with_not_found() {
        let fixture = seeded(0);
        let err = fixture
            .engine
            .get_consolidated_totals(Uuid::new_v4(), &fixture.admin)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::NotFound(_)));
    }

    #[tokio::test]
    async fn concurrent_consolidations_of_the_same_packages_commit_once() {
        let fixture = seeded(2);
        let request = ConsolidateRequest::new(ids(&fixture.packages));

        let (first, second) = tokio::join!(
            fixture.engine.consolidate(request.clone(), &fixture.admin),
            fixture.engine.consolidate(request, &fixture.admin),
        );

        let outcomes = [first, second];
        assert_eq!(outcomes.iter().filter(|result| result.is_ok()).count(), 1);
        let loser = outcomes
            .iter()
            .find(|result| result.is_err())
            .unwrap()
            .as_ref()
            .unwrap_err();
        // The loser fails either at its pre-check or at the commit-time
        // linkage guard, depending on interleaving.
        assert!(matches!(
            loser,
            EngineError::Conflict(_) | EngineError::Validation(_)
        ));

        let groups = fixture
            .store
            .list_consolidated_packages(Some(fixture.customer.id))
            .await
            .unwrap();
        assert_eq!(groups.len(), 1);
    }
}

use std::future::Future;
use std::sync::Arc;

use moka::future::Cache;
use uuid::Uuid;

use freight_core_api::{EngineError, EngineResult};
use freight_core_db::models::package::{
    ConsolidatedPackageModel, ConsolidationTotals, PackageModel,
};
use freight_core_db::repository::CacheInvalidation;

const MAX_ENTRIES: u64 = 10_000;

/// Memoizes the engine's hot read paths: group totals, per-customer
/// consolidation listings, and per-customer consolidation candidates.
///
/// Entries are dropped only through `apply`, which the engine calls with the
/// invalidations drained from a committed unit of work, strictly after the
/// commit. A hit therefore never returns staler totals than the last
/// committed mutation.
///
/// Totals entries carry the owning customer id so a hit can be
/// authorization-checked without going back to the store.
pub struct ConsolidationCache {
    totals: Cache<Uuid, (Uuid, ConsolidationTotals)>,
    customer_consolidations: Cache<Uuid, Arc<Vec<ConsolidatedPackageModel>>>,
    available_packages: Cache<Uuid, Arc<Vec<PackageModel>>>,
}

impl ConsolidationCache {
    pub fn new() -> Self {
        Self {
            totals: Cache::new(MAX_ENTRIES),
            customer_consolidations: Cache::new(MAX_ENTRIES),
            available_packages: Cache::new(MAX_ENTRIES),
        }
    }

    pub async fn totals<F, Fut>(
        &self,
        consolidated_package_id: Uuid,
        init: F,
    ) -> EngineResult<(Uuid, ConsolidationTotals)>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = EngineResult<(Uuid, ConsolidationTotals)>>,
    {
        self.totals
            .try_get_with(consolidated_package_id, init())
            .await
            .map_err(shared_error)
    }

    pub async fn customer_consolidations<F, Fut>(
        &self,
        customer_id: Uuid,
        init: F,
    ) -> EngineResult<Arc<Vec<ConsolidatedPackageModel>>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = EngineResult<Arc<Vec<ConsolidatedPackageModel>>>>,
    {
        self.customer_consolidations
            .try_get_with(customer_id, init())
            .await
            .map_err(shared_error)
    }

    pub async fn available_packages<F, Fut>(
        &self,
        customer_id: Uuid,
        init: F,
    ) -> EngineResult<Arc<Vec<PackageModel>>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = EngineResult<Arc<Vec<PackageModel>>>>,
    {
        self.available_packages
            .try_get_with(customer_id, init())
            .await
            .map_err(shared_error)
    }

    /// Applies the invalidations drained from a committed unit of work.
    pub async fn apply(&self, invalidations: &[CacheInvalidation]) {
        for invalidation in invalidations {
            match invalidation {
                CacheInvalidation::ConsolidatedPackage(id) => {
                    self.totals.invalidate(id).await;
                }
                CacheInvalidation::Customer(id) => {
                    self.customer_consolidations.invalidate(id).await;
                    self.available_packages.invalidate(id).await;
                }
                CacheInvalidation::All => self.invalidate_all(),
            }
        }
    }

    /// Administrative/maintenance bulk invalidation.
    pub fn invalidate_all(&self) {
        self.totals.invalidate_all();
        self.customer_consolidations.invalidate_all();
        self.available_packages.invalidate_all();
    }
}

impl Default for ConsolidationCache {
    fn default() -> Self {
        Self::new()
    }
}

/// moka hands shared init errors back as `Arc`; rebuild the owned error.
fn shared_error(err: Arc<EngineError>) -> EngineError {
    match err.as_ref() {
        EngineError::Validation(msg) => EngineError::Validation(msg.clone()),
        EngineError::PermissionDenied(msg) => EngineError::PermissionDenied(msg.clone()),
        EngineError::Conflict(msg) => EngineError::Conflict(msg.clone()),
        EngineError::NotFound(msg) => EngineError::NotFound(msg.clone()),
        EngineError::Persistence(msg) => EngineError::Persistence(msg.clone()),
    }
}

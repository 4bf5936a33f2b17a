//! Case-insensitive substring search over packages and consolidated groups.

use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use crate::engine::persistence;
use freight_core_api::{EngineError, EngineResult, SearchFilter, SearchRecordKind};
use freight_core_db::models::package::{ConsolidatedPackageModel, PackageModel};
use freight_core_db::models::person::PersonModel;
use freight_core_db::repository::ConsolidationStore;

/// One search result, either an individual package or a consolidated group.
#[derive(Debug, Clone)]
pub enum SearchHit {
    IndividualPackage(PackageModel),
    ConsolidatedGroup(ConsolidatedPackageModel),
}

impl SearchHit {
    pub fn kind(&self) -> SearchRecordKind {
        match self {
            SearchHit::IndividualPackage(_) => SearchRecordKind::IndividualPackage,
            SearchHit::ConsolidatedGroup(_) => SearchRecordKind::ConsolidatedGroup,
        }
    }
}

/// Read-only lookup across both record kinds.
///
/// Packages match on tracking number or description. A consolidated group
/// matches on its own tracking number, or transitively when any currently
/// linked member package matches, so a carrier tracking number keeps finding
/// its shipment after consolidation.
pub struct PackageSearchService<S> {
    store: Arc<S>,
}

impl<S: ConsolidationStore> PackageSearchService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub async fn search(
        &self,
        term: &str,
        actor: &PersonModel,
        filter: SearchFilter,
    ) -> EngineResult<Vec<SearchHit>> {
        let term_lower = term.trim().to_lowercase();
        if term_lower.is_empty() {
            return Err(EngineError::Validation(
                "search term must not be empty".to_string(),
            ));
        }

        let scope = self.resolve_scope(actor, &filter)?;

        let packages = self
            .store
            .list_packages(scope)
            .await
            .map_err(persistence)?;
        let groups = self
            .store
            .list_consolidated_packages(scope)
            .await
            .map_err(persistence)?;

        let mut hits = Vec::new();
        if filter.kind != Some(SearchRecordKind::ConsolidatedGroup) {
            hits.extend(
                packages
                    .iter()
                    .filter(|package| package.matches_term(&term_lower))
                    .cloned()
                    .map(SearchHit::IndividualPackage),
            );
        }
        if filter.kind != Some(SearchRecordKind::IndividualPackage) {
            for group in groups {
                let own_match = group
                    .tracking_number
                    .as_str()
                    .to_lowercase()
                    .contains(&term_lower);
                let member_match = group.is_active
                    && packages.iter().any(|package| {
                        package.consolidated_package_id == Some(group.id)
                            && package.matches_term(&term_lower)
                    });
                if own_match || member_match {
                    hits.push(SearchHit::ConsolidatedGroup(group));
                }
            }
        }

        debug!(term = %term_lower, hits = hits.len(), "search served");
        Ok(hits)
    }

    /// Elevated actors search the requested scope (or everything);
    /// customer-tier actors are pinned to their own customer.
    fn resolve_scope(
        &self,
        actor: &PersonModel,
        filter: &SearchFilter,
    ) -> EngineResult<Option<Uuid>> {
        if actor.is_elevated() {
            return Ok(filter.customer_id);
        }
        match (actor.customer_id, filter.customer_id) {
            (Some(own), None) => Ok(Some(own)),
            (Some(own), Some(requested)) if requested == own => Ok(Some(own)),
            _ => Err(EngineError::PermissionDenied(
                crate::guard::READ_DENIED.to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::engine::ConsolidationEngine;
    use crate::store::MemoryStore;
    use crate::test_helper::{admin_actor, customer_actor, new_test_customer, new_test_package};
    use freight_core_api::ConsolidateRequest;

    struct Fixture {
        store: Arc<MemoryStore>,
        customer_id: Uuid,
        other_customer_id: Uuid,
        group_id: Uuid,
        group_tracking: String,
    }

    /// One customer with a two-package consolidated group plus a loose
    /// package, and a second customer with one package.
    async fn seeded() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let customer = new_test_customer("Acme Imports");
        let other = new_test_customer("Globex Freight");
        let admin = admin_actor();
        let first = new_test_package(customer.id, "TRK-1001", "Laptop");
        let second = new_test_package(customer.id, "TRK-1002", "Monitor");
        let loose = new_test_package(customer.id, "TRK-1003", "Keyboard");
        let foreign = new_test_package(other.id, "TRK-2001", "Laptop stand");
        store.seed_customer(customer.clone());
        store.seed_customer(other.clone());
        store.seed_person(admin.clone());
        store.seed_package(first.clone());
        store.seed_package(second.clone());
        store.seed_package(loose);
        store.seed_package(foreign);

        let engine = ConsolidationEngine::new(Arc::clone(&store));
        let group = engine
            .consolidate(ConsolidateRequest::new(vec![first.id, second.id]), &admin)
            .await
            .unwrap();

        Fixture {
            store,
            customer_id: customer.id,
            other_customer_id: other.id,
            group_id: group.id,
            group_tracking: group.tracking_number.as_str().to_string(),
        }
    }

    #[tokio::test]
    async fn empty_terms_are_rejected() {
        let fixture = seeded().await;
        let service = PackageSearchService::new(fixture.store);

        let err = service
            .search("   ", &admin_actor(), SearchFilter::default())
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
    }

    #[tokio::test]
    async fn member_tracking_number_finds_package_and_its_group() {
        let fixture = seeded().await;
        let service = PackageSearchService::new(fixture.store);

        let hits = service
            .search("trk-1001", &admin_actor(), SearchFilter::default())
            .await
            .unwrap();
        assert_eq!(hits.len(), 2);
        assert!(hits
            .iter()
            .any(|hit| hit.kind() == SearchRecordKind::IndividualPackage));
        assert!(hits.iter().any(|hit| matches!(
            hit,
            SearchHit::ConsolidatedGroup(group) if group.id == fixture.group_id
        )));
    }

    #[tokio::test]
    async fn group_tracking_number_finds_the_group() {
        let fixture = seeded().await;
        let group_tracking = fixture.group_tracking.clone();
        let service = PackageSearchService::new(fixture.store);

        let hits = service
            .search(&group_tracking, &admin_actor(), SearchFilter::default())
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].kind(), SearchRecordKind::ConsolidatedGroup);
    }

    #[tokio::test]
    async fn kind_filter_narrows_the_hits() {
        let fixture = seeded().await;
        let service = PackageSearchService::new(fixture.store);

        let filter = SearchFilter {
            customer_id: None,
            kind: Some(SearchRecordKind::IndividualPackage),
        };
        let hits = service
            .search("laptop", &admin_actor(), filter)
            .await
            .unwrap();
        assert!(!hits.is_empty());
        assert!(hits
            .iter()
            .all(|hit| hit.kind() == SearchRecordKind::IndividualPackage));
    }

    #[tokio::test]
    async fn customer_actors_only_see_their_own_records() {
        let fixture = seeded().await;
        let actor = customer_actor(fixture.customer_id);
        let service = PackageSearchService::new(fixture.store);

        // "laptop" also matches the other customer's "Laptop stand".
        let hits = service
            .search("laptop", &actor, SearchFilter::default())
            .await
            .unwrap();
        assert!(!hits.is_empty());
        assert!(hits.iter().all(|hit| match hit {
            SearchHit::IndividualPackage(package) =>
                package.customer_id == fixture.customer_id,
            SearchHit::ConsolidatedGroup(group) => group.customer_id == fixture.customer_id,
        }));
    }

    #[tokio::test]
    async fn customer_actors_cannot_request_another_scope() {
        let fixture = seeded().await;
        let actor = customer_actor(fixture.customer_id);
        let foreign_scope = SearchFilter {
            customer_id: Some(fixture.other_customer_id),
            kind: None,
        };
        let service = PackageSearchService::new(fixture.store);

        let err = service
            .search("laptop", &actor, foreign_scope)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::PermissionDenied(_)));
    }

    #[tokio::test]
    async fn admins_can_scope_to_one_customer() {
        let fixture = seeded().await;
        let scope = SearchFilter {
            customer_id: Some(fixture.other_customer_id),
            kind: None,
        };
        let service = PackageSearchService::new(fixture.store);

        let hits = service.search("laptop", &admin_actor(), scope).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert!(matches!(
            &hits[0],
            SearchHit::IndividualPackage(package)
                if package.tracking_number.as_str() == "TRK-2001"
        ));
    }
}

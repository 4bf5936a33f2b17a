pub mod consolidated_package_repository;
pub mod consolidation_history_repository;
pub mod customer_repository;
pub mod package_repository;
pub mod pagination;
pub mod person_repository;
pub mod unit_of_work;

// Re-exports
pub use consolidated_package_repository::*;
pub use consolidation_history_repository::*;
pub use customer_repository::*;
pub use package_repository::*;
pub use pagination::*;
pub use person_repository::*;
pub use unit_of_work::*;

/// One bound covering everything the consolidation engine needs from a
/// backend: the per-entity repositories plus transactional commit.
pub trait ConsolidationStore:
    PackageRepository
    + ConsolidatedPackageRepository
    + ConsolidationHistoryRepository
    + CustomerRepository
    + PersonRepository
    + TransactionalStore
{
}

impl<T> ConsolidationStore for T where
    T: PackageRepository
        + ConsolidatedPackageRepository
        + ConsolidationHistoryRepository
        + CustomerRepository
        + PersonRepository
        + TransactionalStore
{
}

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::package::PackageModel;

/// Repository for individually-tracked packages.
///
/// Read-only by contract: linkage and status fields are mutated exclusively
/// through the unit-of-work commit.
#[async_trait]
pub trait PackageRepository: Send + Sync {
    /// Load a single package by its unique identifier
    ///
    /// # Returns
    /// * `Ok(Some(PackageModel))` - The package if it exists
    /// * `Ok(None)` - No package with this ID
    /// * `Err` - An error if the query could not be executed
    async fn load_package(
        &self,
        id: Uuid,
    ) -> Result<Option<PackageModel>, Box<dyn std::error::Error + Send + Sync>>;

    /// Load multiple packages by their unique identifiers
    ///
    /// # Returns
    /// * `Ok(Vec<Option<PackageModel>>)` - Results in the same order as the
    ///   provided IDs, `None` for packages that do not exist
    /// * `Err` - An error if the query could not be executed
    async fn load_packages(
        &self,
        ids: &[Uuid],
    ) -> Result<Vec<Option<PackageModel>>, Box<dyn std::error::Error + Send + Sync>>;

    /// All packages ordered by creation time, optionally restricted to one
    /// customer
    async fn list_packages(
        &self,
        customer_id: Option<Uuid>,
    ) -> Result<Vec<PackageModel>, Box<dyn std::error::Error + Send + Sync>>;

    /// Packages currently linked to the given consolidated group
    async fn find_by_consolidated_package_id(
        &self,
        consolidated_package_id: Uuid,
    ) -> Result<Vec<PackageModel>, Box<dyn std::error::Error + Send + Sync>>;

    /// Unconsolidated, non-terminal-status packages for a customer
    async fn find_available_for_consolidation(
        &self,
        customer_id: Uuid,
    ) -> Result<Vec<PackageModel>, Box<dyn std::error::Error + Send + Sync>>;
}

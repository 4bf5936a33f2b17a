use async_trait::async_trait;
use uuid::Uuid;

use crate::models::package::ConsolidatedPackageModel;

/// Repository for consolidated groups.
///
/// Groups are inserted, updated and deactivated exclusively through the
/// unit-of-work commit; these methods are read-only.
#[async_trait]
pub trait ConsolidatedPackageRepository: Send + Sync {
    /// Load a single consolidated group by its unique identifier
    ///
    /// # Returns
    /// * `Ok(Some(ConsolidatedPackageModel))` - The group if it exists
    /// * `Ok(None)` - No group with this ID
    /// * `Err` - An error if the query could not be executed
    async fn load_consolidated_package(
        &self,
        id: Uuid,
    ) -> Result<Option<ConsolidatedPackageModel>, Box<dyn std::error::Error + Send + Sync>>;

    /// All groups (active and inactive) ordered by consolidation time,
    /// optionally restricted to one customer
    async fn list_consolidated_packages(
        &self,
        customer_id: Option<Uuid>,
    ) -> Result<Vec<ConsolidatedPackageModel>, Box<dyn std::error::Error + Send + Sync>>;
}

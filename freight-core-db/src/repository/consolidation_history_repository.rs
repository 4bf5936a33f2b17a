use async_trait::async_trait;
use uuid::Uuid;

use crate::models::package::ConsolidationHistoryModel;
use crate::repository::pagination::{Page, PageRequest};

/// Repository for the append-only consolidation audit trail.
///
/// Records are written exclusively by the unit-of-work commit; retrieval is
/// ordered by insertion, which is timestamp order.
#[async_trait]
pub trait ConsolidationHistoryRepository: Send + Sync {
    /// Full ordered history for one consolidated group (oldest first)
    async fn find_history(
        &self,
        consolidated_package_id: Uuid,
    ) -> Result<Vec<ConsolidationHistoryModel>, Box<dyn std::error::Error + Send + Sync>>;

    /// Paginated history for one consolidated group (most recent first)
    async fn load_history_page(
        &self,
        consolidated_package_id: Uuid,
        page: PageRequest,
    ) -> Result<Page<ConsolidationHistoryModel>, Box<dyn std::error::Error + Send + Sync>>;
}

use chrono::{DateTime, Utc};
use heapless::String as HeaplessString;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::identifiable::Identifiable;
use freight_core_api::ConsolidationStatus;

/// Database model for an individually-tracked package.
///
/// Created by the external intake workflow with status, weight and fee
/// fields already populated. This core mutates only the status field and the
/// consolidation linkage fields; packages are never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct PackageModel {
    pub id: Uuid,

    /// Immutable carrier tracking number
    pub tracking_number: HeaplessString<50>,

    pub description: HeaplessString<200>,

    /// References CustomerModel.id for the owning customer
    pub customer_id: Uuid,

    #[serde(
        serialize_with = "freight_core_api::serialize_consolidation_status",
        deserialize_with = "freight_core_api::deserialize_consolidation_status"
    )]
    pub status: ConsolidationStatus,

    pub weight: Decimal,
    pub quantity: i32,
    pub freight_price: Decimal,
    pub clearance_fee: Decimal,
    pub storage_fee: Decimal,
    pub delivery_fee: Decimal,

    /// References ConsolidatedPackageModel.id while linked to an active group
    pub consolidated_package_id: Option<Uuid>,
    pub is_consolidated: bool,
    pub consolidated_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
}

impl PackageModel {
    /// Invariant: `is_consolidated` mirrors the linkage field at all times.
    pub fn linkage_is_consistent(&self) -> bool {
        self.is_consolidated == self.consolidated_package_id.is_some()
    }

    pub fn link_to(&mut self, consolidated_package_id: Uuid, at: DateTime<Utc>) {
        self.consolidated_package_id = Some(consolidated_package_id);
        self.is_consolidated = true;
        self.consolidated_at = Some(at);
    }

    /// Clears linkage fields only; weight, fees, tracking number and status
    /// stay untouched.
    pub fn clear_linkage(&mut self) {
        self.consolidated_package_id = None;
        self.is_consolidated = false;
        self.consolidated_at = None;
    }

    /// Case-insensitive substring match on tracking number or description.
    pub fn matches_term(&self, term_lower: &str) -> bool {
        self.tracking_number
            .as_str()
            .to_lowercase()
            .contains(term_lower)
            || self.description.as_str().to_lowercase().contains(term_lower)
    }
}

impl Identifiable for PackageModel {
    fn get_id(&self) -> Uuid {
        self.id
    }
}

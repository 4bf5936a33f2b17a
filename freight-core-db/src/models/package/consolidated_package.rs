use chrono::{DateTime, Utc};
use heapless::String as HeaplessString;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::totals::ConsolidationTotals;
use crate::models::identifiable::Identifiable;
use freight_core_api::ConsolidationStatus;

/// Database model for a consolidated group of packages.
///
/// Aggregate totals mirror the Totals Aggregator output over currently
/// linked members after every mutation. Groups are deactivated, never
/// deleted, so their history stays addressable.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ConsolidatedPackageModel {
    pub id: Uuid,

    /// `CONS-YYYYMMDD-NNNN`; assigned by the store inside the commit that
    /// inserts this row, never reused
    pub tracking_number: HeaplessString<50>,

    /// References CustomerModel.id; all linked packages share it
    pub customer_id: Uuid,

    /// References PersonModel.id for the creating actor
    pub created_by_person_id: Uuid,

    #[serde(
        serialize_with = "freight_core_api::serialize_consolidation_status",
        deserialize_with = "freight_core_api::deserialize_consolidation_status"
    )]
    pub status: ConsolidationStatus,

    /// Only active groups accept status updates or membership changes
    pub is_active: bool,

    pub notes: Option<HeaplessString<200>>,

    pub total_weight: Decimal,
    pub total_quantity: i32,
    pub total_freight_price: Decimal,
    pub total_clearance_fee: Decimal,
    pub total_storage_fee: Decimal,
    pub total_delivery_fee: Decimal,

    pub consolidated_at: DateTime<Utc>,
    pub unconsolidated_at: Option<DateTime<Utc>>,
}

impl ConsolidatedPackageModel {
    pub fn totals(&self) -> ConsolidationTotals {
        ConsolidationTotals {
            total_weight: self.total_weight,
            total_quantity: self.total_quantity,
            total_freight_price: self.total_freight_price,
            total_clearance_fee: self.total_clearance_fee,
            total_storage_fee: self.total_storage_fee,
            total_delivery_fee: self.total_delivery_fee,
        }
    }

    pub fn apply_totals(&mut self, totals: &ConsolidationTotals) {
        self.total_weight = totals.total_weight;
        self.total_quantity = totals.total_quantity;
        self.total_freight_price = totals.total_freight_price;
        self.total_clearance_fee = totals.total_clearance_fee;
        self.total_storage_fee = totals.total_storage_fee;
        self.total_delivery_fee = totals.total_delivery_fee;
    }

    pub fn total_cost(&self) -> Decimal {
        self.totals().total_cost()
    }
}

impl Identifiable for ConsolidatedPackageModel {
    fn get_id(&self) -> Uuid {
        self.id
    }
}

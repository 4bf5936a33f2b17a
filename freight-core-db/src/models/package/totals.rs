use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::package::PackageModel;

/// Aggregate sums over a set of member packages.
///
/// Pure and deterministic; an empty member list yields zero totals.
/// `total_quantity` is the count of member packages, not the sum of their
/// per-package quantity fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsolidationTotals {
    pub total_weight: Decimal,
    pub total_quantity: i32,
    pub total_freight_price: Decimal,
    pub total_clearance_fee: Decimal,
    pub total_storage_fee: Decimal,
    pub total_delivery_fee: Decimal,
}

impl ConsolidationTotals {
    pub fn from_members(members: &[PackageModel]) -> Self {
        let mut totals = Self::default();
        for package in members {
            totals.total_weight += package.weight;
            totals.total_freight_price += package.freight_price;
            totals.total_clearance_fee += package.clearance_fee;
            totals.total_storage_fee += package.storage_fee;
            totals.total_delivery_fee += package.delivery_fee;
        }
        totals.total_quantity = members.len() as i32;
        totals
    }

    /// Combined cost across all fee categories.
    pub fn total_cost(&self) -> Decimal {
        self.total_freight_price
            + self.total_clearance_fee
            + self.total_storage_fee
            + self.total_delivery_fee
    }
}

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;
use uuid::Uuid;

use crate::domain::status::ConsolidationStatus;

/// Action kinds recorded in a group's audit trail.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ConsolidationAction {
    Consolidated,
    Unconsolidated,
    StatusChanged,
}

impl std::fmt::Display for ConsolidationAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConsolidationAction::Consolidated => write!(f, "consolidated"),
            ConsolidationAction::Unconsolidated => write!(f, "unconsolidated"),
            ConsolidationAction::StatusChanged => write!(f, "status_changed"),
        }
    }
}

impl FromStr for ConsolidationAction {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "consolidated" => Ok(ConsolidationAction::Consolidated),
            "unconsolidated" => Ok(ConsolidationAction::Unconsolidated),
            "status_changed" => Ok(ConsolidationAction::StatusChanged),
            _ => Err(()),
        }
    }
}

/// Strongly-typed history payload, one variant per action kind.
///
/// Persisted as tagged JSON so malformed history writes are caught at
/// compile time while the stored form stays structured and flexible.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ConsolidationEventDetails {
    Consolidated {
        package_ids: Vec<Uuid>,
        package_count: i32,
        total_weight: Decimal,
        /// Sum of freight, clearance, storage and delivery fee totals.
        total_cost: Decimal,
    },
    Unconsolidated {
        package_ids: Vec<Uuid>,
        package_count: i32,
        #[serde(skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },
    StatusChanged {
        old_status: ConsolidationStatus,
        new_status: ConsolidationStatus,
        package_count: i32,
        #[serde(skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },
}

impl ConsolidationEventDetails {
    pub fn action(&self) -> ConsolidationAction {
        match self {
            ConsolidationEventDetails::Consolidated { .. } => ConsolidationAction::Consolidated,
            ConsolidationEventDetails::Unconsolidated { .. } => {
                ConsolidationAction::Unconsolidated
            }
            ConsolidationEventDetails::StatusChanged { .. } => {
                ConsolidationAction::StatusChanged
            }
        }
    }
}

/// Aggregated view over a group's audit trail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistorySummary {
    pub total_actions: usize,
    pub actions_by_type: BTreeMap<ConsolidationAction, usize>,
    pub first_action: Option<DateTime<Utc>>,
    pub last_action: Option<DateTime<Utc>>,
}

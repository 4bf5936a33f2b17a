use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;

/// Lifecycle status shared by individual packages and consolidated groups.
///
/// The lifecycle is ordered-ish (Pending through Delivered) but no
/// transition graph is enforced: any authorized actor may set any status.
/// `Delayed` is a terminal side-state alongside `Delivered`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "consolidation_status", rename_all = "PascalCase")
)]
pub enum ConsolidationStatus {
    Pending,
    Processing,
    Shipped,
    Customs,
    Ready,
    ReadyForPickup,
    Delivered,
    Delayed,
}

impl ConsolidationStatus {
    /// Terminal statuses are excluded from consolidation candidate lists.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ConsolidationStatus::Delivered | ConsolidationStatus::Delayed
        )
    }
}

impl std::fmt::Display for ConsolidationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConsolidationStatus::Pending => write!(f, "Pending"),
            ConsolidationStatus::Processing => write!(f, "Processing"),
            ConsolidationStatus::Shipped => write!(f, "Shipped"),
            ConsolidationStatus::Customs => write!(f, "Customs"),
            ConsolidationStatus::Ready => write!(f, "Ready"),
            ConsolidationStatus::ReadyForPickup => write!(f, "ReadyForPickup"),
            ConsolidationStatus::Delivered => write!(f, "Delivered"),
            ConsolidationStatus::Delayed => write!(f, "Delayed"),
        }
    }
}

impl FromStr for ConsolidationStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(ConsolidationStatus::Pending),
            "Processing" => Ok(ConsolidationStatus::Processing),
            "Shipped" => Ok(ConsolidationStatus::Shipped),
            "Customs" => Ok(ConsolidationStatus::Customs),
            "Ready" => Ok(ConsolidationStatus::Ready),
            "ReadyForPickup" => Ok(ConsolidationStatus::ReadyForPickup),
            "Delivered" => Ok(ConsolidationStatus::Delivered),
            "Delayed" => Ok(ConsolidationStatus::Delayed),
            _ => Err(()),
        }
    }
}

pub fn serialize_consolidation_status<S>(
    value: &ConsolidationStatus,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&value.to_string())
}

pub fn deserialize_consolidation_status<'de, D>(
    deserializer: D,
) -> Result<ConsolidationStatus, D::Error>
where
    D: Deserializer<'de>,
{
    let value_str = String::deserialize(deserializer)?;
    ConsolidationStatus::from_str(&value_str).map_err(|_| {
        serde::de::Error::custom(format!("Invalid ConsolidationStatus: {value_str}"))
    })
}

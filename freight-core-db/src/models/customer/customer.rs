use heapless::String as HeaplessString;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;
use uuid::Uuid;

use crate::models::identifiable::Identifiable;

/// Database model for Customer
/// Owns packages and consolidated groups; account management itself is an
/// external collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct CustomerModel {
    pub id: Uuid,
    pub display_name: HeaplessString<100>,
    #[serde(
        serialize_with = "serialize_customer_status",
        deserialize_with = "deserialize_customer_status"
    )]
    pub status: CustomerStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "customer_status", rename_all = "PascalCase")]
pub enum CustomerStatus {
    Active,
    Suspended,
    Closed,
}

impl std::fmt::Display for CustomerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CustomerStatus::Active => write!(f, "Active"),
            CustomerStatus::Suspended => write!(f, "Suspended"),
            CustomerStatus::Closed => write!(f, "Closed"),
        }
    }
}

impl FromStr for CustomerStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Active" => Ok(CustomerStatus::Active),
            "Suspended" => Ok(CustomerStatus::Suspended),
            "Closed" => Ok(CustomerStatus::Closed),
            _ => Err(()),
        }
    }
}

impl Identifiable for CustomerModel {
    fn get_id(&self) -> Uuid {
        self.id
    }
}

fn serialize_customer_status<S>(value: &CustomerStatus, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&value.to_string())
}

fn deserialize_customer_status<'de, D>(deserializer: D) -> Result<CustomerStatus, D::Error>
where
    D: Deserializer<'de>,
{
    let value_str = String::deserialize(deserializer)?;
    CustomerStatus::from_str(&value_str)
        .map_err(|_| serde::de::Error::custom(format!("Invalid CustomerStatus: {value_str}")))
}

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;

/// Role tier of an acting person.
///
/// Consolidation mutations require an elevated role (Admin or above).
/// Customer-tier actors may only read their own customer's data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(type_name = "actor_role", rename_all = "PascalCase"))]
pub enum ActorRole {
    Customer,
    Admin,
    SuperAdmin,
}

impl ActorRole {
    pub fn is_elevated(&self) -> bool {
        matches!(self, ActorRole::Admin | ActorRole::SuperAdmin)
    }
}

impl std::fmt::Display for ActorRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActorRole::Customer => write!(f, "Customer"),
            ActorRole::Admin => write!(f, "Admin"),
            ActorRole::SuperAdmin => write!(f, "SuperAdmin"),
        }
    }
}

impl FromStr for ActorRole {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Customer" => Ok(ActorRole::Customer),
            "Admin" => Ok(ActorRole::Admin),
            "SuperAdmin" => Ok(ActorRole::SuperAdmin),
            _ => Err(()),
        }
    }
}

pub fn serialize_actor_role<S>(value: &ActorRole, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&value.to_string())
}

pub fn deserialize_actor_role<'de, D>(deserializer: D) -> Result<ActorRole, D::Error>
where
    D: Deserializer<'de>,
{
    let value_str = String::deserialize(deserializer)?;
    ActorRole::from_str(&value_str)
        .map_err(|_| serde::de::Error::custom(format!("Invalid ActorRole: {value_str}")))
}

use heapless::String as HeaplessString;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::identifiable::Identifiable;
use freight_core_api::ActorRole;

/// Database model for Person
/// Represents an acting person for authorization and audit attribution.
/// Actors are always passed explicitly into engine operations, never read
/// from ambient state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct PersonModel {
    pub id: Uuid,

    pub display_name: HeaplessString<100>,

    #[serde(
        serialize_with = "freight_core_api::serialize_actor_role",
        deserialize_with = "freight_core_api::deserialize_actor_role"
    )]
    pub role: ActorRole,

    /// References CustomerModel.id for customer-tier actors
    pub customer_id: Option<Uuid>,
}

impl PersonModel {
    pub fn is_elevated(&self) -> bool {
        self.role.is_elevated()
    }

    /// Whether this actor's own customer scope covers `customer_id`.
    pub fn owns_customer(&self, customer_id: Uuid) -> bool {
        self.customer_id == Some(customer_id)
    }
}

impl Identifiable for PersonModel {
    fn get_id(&self) -> Uuid {
        self.id
    }
}

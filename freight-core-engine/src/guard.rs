use uuid::Uuid;

use freight_core_api::{EngineError, EngineResult};
use freight_core_db::models::person::PersonModel;

pub(crate) const MUTATION_DENIED: &str = "consolidation operations require an administrator";
pub(crate) const READ_DENIED: &str = "access to another customer's records is not permitted";

/// Uniform authorization checks invoked at the start of every engine
/// operation.
///
/// Same-customer membership of a consolidate request is a validation
/// concern and is enforced by the engine, not here.
pub struct AuthorizationGuard;

impl AuthorizationGuard {
    /// `consolidate`, `unconsolidate` and `update_status` require an
    /// elevated (admin-tier or above) actor.
    pub fn authorize_mutation(actor: &PersonModel) -> EngineResult<()> {
        if actor.is_elevated() {
            Ok(())
        } else {
            Err(EngineError::PermissionDenied(MUTATION_DENIED.to_string()))
        }
    }

    /// History, export, listing and availability reads: elevated actors may
    /// read any customer; customer-tier actors only their own data.
    pub fn authorize_customer_read(actor: &PersonModel, customer_id: Uuid) -> EngineResult<()> {
        if actor.is_elevated() || actor.owns_customer(customer_id) {
            Ok(())
        } else {
            Err(EngineError::PermissionDenied(READ_DENIED.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helper::{admin_actor, customer_actor};

    #[test]
    fn mutations_require_an_elevated_actor() {
        assert!(AuthorizationGuard::authorize_mutation(&admin_actor()).is_ok());

        let err =
            AuthorizationGuard::authorize_mutation(&customer_actor(Uuid::new_v4())).unwrap_err();
        assert!(matches!(err, EngineError::PermissionDenied(_)));
    }

    #[test]
    fn elevated_actors_read_any_customer() {
        assert!(
            AuthorizationGuard::authorize_customer_read(&admin_actor(), Uuid::new_v4()).is_ok()
        );
    }

    #[test]
    fn customer_actors_read_only_their_own_data() {
        let own_customer = Uuid::new_v4();
        let actor = customer_actor(own_customer);

        assert!(AuthorizationGuard::authorize_customer_read(&actor, own_customer).is_ok());
        let err =
            AuthorizationGuard::authorize_customer_read(&actor, Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, EngineError::PermissionDenied(_)));
    }
}

use uuid::Uuid;

use super::identifiable::Identifiable;

/// Trait for entities whose writes reference the audit log of the unit of
/// work that produced them
pub trait Auditable: Identifiable {
    /// Returns the ID of the audit log entry that last wrote this entity, if any
    fn get_audit_log_id(&self) -> Option<Uuid>;
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::Identifiable;

/// # Documentation
/// - Struct to maintain an audit log
/// - One audit log per committed unit of work; every history record written
///   in that commit references the same audit log.
/// - Created by the engine when an operation stages its writes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct AuditLogModel {
    pub id: Uuid,
    pub performed_at: DateTime<Utc>,
    pub performed_by_person_id: Uuid,
}

impl AuditLogModel {
    pub fn new(performed_by_person_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            performed_at: Utc::now(),
            performed_by_person_id,
        }
    }
}

impl Identifiable for AuditLogModel {
    fn get_id(&self) -> Uuid {
        self.id
    }
}

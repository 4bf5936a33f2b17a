use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::auditable::Auditable;
use crate::models::identifiable::Identifiable;
use crate::utils::hash_as_i64;
use freight_core_api::{ConsolidationAction, ConsolidationEventDetails};

/// Append-only audit record for a consolidated group.
///
/// Records form a per-group hash chain: `antecedent_hash` carries the hash
/// of the previous record (0 for the first) and `hash` is computed over this
/// record with its own hash field zeroed. Records are never updated or
/// deleted and survive unconsolidation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ConsolidationHistoryModel {
    pub id: Uuid,

    /// References ConsolidatedPackageModel.id; owns this record
    pub consolidated_package_id: Uuid,

    pub action: ConsolidationAction,

    /// References PersonModel.id for the acting person
    pub performed_by_person_id: Uuid,

    pub performed_at: DateTime<Utc>,

    /// Structured payload, shape fixed per action kind
    #[cfg_attr(feature = "sqlx", sqlx(json))]
    pub details: ConsolidationEventDetails,

    /// Hash of the previous record in this group's chain (0 for the first)
    pub antecedent_hash: i64,

    /// Hash of this record with the hash field set to 0
    pub hash: i64,

    /// References the audit log of the unit of work that wrote this record
    pub audit_log_id: Option<Uuid>,
}

impl ConsolidationHistoryModel {
    pub fn new(
        consolidated_package_id: Uuid,
        performed_by_person_id: Uuid,
        details: ConsolidationEventDetails,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            consolidated_package_id,
            action: details.action(),
            performed_by_person_id,
            performed_at: Utc::now(),
            details,
            antecedent_hash: 0,
            hash: 0,
            audit_log_id: None,
        }
    }

    /// Computes this record's hash with the hash field zeroed.
    pub fn compute_hash(&self) -> Result<i64, String> {
        let mut unhashed = self.clone();
        unhashed.hash = 0;
        hash_as_i64(&unhashed)
    }

    /// Links this record behind `antecedent` and seals it.
    pub fn chain_from_antecedent(
        &mut self,
        antecedent: Option<&ConsolidationHistoryModel>,
        audit_log_id: Uuid,
    ) -> Result<(), String> {
        self.antecedent_hash = antecedent.map(|previous| previous.hash).unwrap_or(0);
        self.audit_log_id = Some(audit_log_id);
        self.hash = self.compute_hash()?;
        Ok(())
    }
}

/// Verifies a group's ordered history chain. Detects tampered record
/// contents as well as dropped or reordered records.
pub fn verify_chain(records: &[ConsolidationHistoryModel]) -> bool {
    let mut previous_hash = 0i64;
    for record in records {
        if record.antecedent_hash != previous_hash {
            return false;
        }
        match record.compute_hash() {
            Ok(hash) if hash == record.hash => previous_hash = record.hash,
            _ => return false,
        }
    }
    true
}

impl Identifiable for ConsolidationHistoryModel {
    fn get_id(&self) -> Uuid {
        self.id
    }
}

impl Auditable for ConsolidationHistoryModel {
    fn get_audit_log_id(&self) -> Option<Uuid> {
        self.audit_log_id
    }
}

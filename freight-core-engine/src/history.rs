//! History retrieval, summarization and audit-trail export.
//!
//! All reads here are idempotent: retrieving or exporting a group's history
//! never appends to it. Authorization follows the customer-read rule, so a
//! customer-tier actor can only see trails for their own groups.

use std::collections::BTreeMap;
use std::collections::HashSet;

use uuid::Uuid;

use crate::engine::{persistence, ConsolidationEngine};
use freight_core_api::{
    AuditTrailDocument, AuditTrailExport, EngineError, EngineResult, ExportFormat,
    ExportedHistoryRecord, HistoryFilter, HistorySummary,
};
use freight_core_db::models::package::{verify_chain, ConsolidationHistoryModel};
use freight_core_db::models::person::PersonModel;
use freight_core_db::repository::pagination::{Page, PageRequest};
use freight_core_db::repository::ConsolidationStore;

impl<S: ConsolidationStore> ConsolidationEngine<S> {
    /// Full history for one group, oldest first, optionally filtered by
    /// action kind and by a trailing window of days.
    pub async fn get_history(
        &self,
        consolidated_package_id: Uuid,
        filter: HistoryFilter,
        actor: &PersonModel,
    ) -> EngineResult<Vec<ConsolidationHistoryModel>> {
        self.authorized_group(consolidated_package_id, actor).await?;
        let mut records = self
            .store
            .find_history(consolidated_package_id)
            .await
            .map_err(persistence)?;

        if let Some(action) = filter.action {
            records.retain(|record| record.action == action);
        }
        if let Some(days) = filter.days {
            let cutoff = chrono::Utc::now() - chrono::Duration::days(days);
            records.retain(|record| record.performed_at >= cutoff);
        }
        Ok(records)
    }

    /// One page of a group's history, most recent first.
    pub async fn get_history_page(
        &self,
        consolidated_package_id: Uuid,
        page: PageRequest,
        actor: &PersonModel,
    ) -> EngineResult<Page<ConsolidationHistoryModel>> {
        self.authorized_group(consolidated_package_id, actor).await?;
        self.store
            .load_history_page(consolidated_package_id, page)
            .await
            .map_err(persistence)
    }

    /// Counts per action kind plus the first and last action timestamps.
    pub async fn get_history_summary(
        &self,
        consolidated_package_id: Uuid,
        actor: &PersonModel,
    ) -> EngineResult<HistorySummary> {
        self.authorized_group(consolidated_package_id, actor).await?;
        let records = self
            .store
            .find_history(consolidated_package_id)
            .await
            .map_err(persistence)?;

        let mut actions_by_type = BTreeMap::new();
        for record in &records {
            *actions_by_type.entry(record.action).or_insert(0) += 1;
        }
        Ok(HistorySummary {
            total_actions: records.len(),
            actions_by_type,
            first_action: records.first().map(|record| record.performed_at),
            last_action: records.last().map(|record| record.performed_at),
        })
    }

    /// Verifies the group's hash chain end to end.
    pub async fn verify_history(
        &self,
        consolidated_package_id: Uuid,
        actor: &PersonModel,
    ) -> EngineResult<bool> {
        self.authorized_group(consolidated_package_id, actor).await?;
        let records = self
            .store
            .find_history(consolidated_package_id)
            .await
            .map_err(persistence)?;
        Ok(verify_chain(&records))
    }

    /// Exports a group's full audit trail with actor names resolved.
    ///
    /// Persons no longer resolvable are rendered by their UUID so the export
    /// never drops a record.
    pub async fn export_audit_trail(
        &self,
        consolidated_package_id: Uuid,
        format: ExportFormat,
        actor: &PersonModel,
    ) -> EngineResult<AuditTrailExport> {
        let group = self.authorized_group(consolidated_package_id, actor).await?;
        let records = self
            .store
            .find_history(consolidated_package_id)
            .await
            .map_err(persistence)?;

        let customer_name = self
            .store
            .load_customer(group.customer_id)
            .await
            .map_err(persistence)?
            .map(|customer| customer.display_name.as_str().to_string())
            .ok_or_else(|| {
                EngineError::NotFound(format!("customer {} not found", group.customer_id))
            })?;

        let actor_ids: Vec<Uuid> = records
            .iter()
            .map(|record| record.performed_by_person_id)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        let persons = self
            .store
            .load_persons(&actor_ids)
            .await
            .map_err(persistence)?;
        let names: BTreeMap<Uuid, String> = actor_ids
            .iter()
            .zip(persons)
            .filter_map(|(id, person)| {
                person.map(|person| (*id, person.display_name.as_str().to_string()))
            })
            .collect();

        let document = AuditTrailDocument {
            consolidated_package_id: group.id,
            tracking_number: group.tracking_number.as_str().to_string(),
            customer_name,
            records: records
                .into_iter()
                .map(|record| ExportedHistoryRecord {
                    action: record.action,
                    performed_by: names
                        .get(&record.performed_by_person_id)
                        .cloned()
                        .unwrap_or_else(|| record.performed_by_person_id.to_string()),
                    performed_at: record.performed_at,
                    details: record.details,
                })
                .collect(),
        };
        document.render(format)
    }
}

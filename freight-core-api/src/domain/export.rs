use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::history::{ConsolidationAction, ConsolidationEventDetails};
use crate::error::{EngineError, EngineResult};

/// Supported audit-trail export formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Array,
    Json,
    Csv,
}

/// One history record with actor name resolved, ready for export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportedHistoryRecord {
    pub action: ConsolidationAction,
    pub performed_by: String,
    pub performed_at: DateTime<Utc>,
    pub details: ConsolidationEventDetails,
}

/// Structured audit-trail export for one consolidated group: group
/// identity, customer name, and the full ordered history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditTrailDocument {
    pub consolidated_package_id: Uuid,
    pub tracking_number: String,
    pub customer_name: String,
    pub records: Vec<ExportedHistoryRecord>,
}

#[derive(Debug, Clone)]
pub enum AuditTrailExport {
    Records(AuditTrailDocument),
    Json(serde_json::Value),
    Csv(String),
}

impl AuditTrailDocument {
    pub fn render(self, format: ExportFormat) -> EngineResult<AuditTrailExport> {
        match format {
            ExportFormat::Array => Ok(AuditTrailExport::Records(self)),
            ExportFormat::Json => serde_json::to_value(&self)
                .map(AuditTrailExport::Json)
                .map_err(|e| EngineError::Persistence(e.to_string())),
            ExportFormat::Csv => self.to_csv().map(AuditTrailExport::Csv),
        }
    }

    fn to_csv(&self) -> EngineResult<String> {
        let mut out = String::from(
            "tracking_number,customer_name,action,performed_by,performed_at,details\n",
        );
        for record in &self.records {
            let details = serde_json::to_string(&record.details)
                .map_err(|e| EngineError::Persistence(e.to_string()))?;
            out.push_str(&format!(
                "{},{},{},{},{},{}\n",
                csv_field(&self.tracking_number),
                csv_field(&self.customer_name),
                record.action,
                csv_field(&record.performed_by),
                record.performed_at.to_rfc3339(),
                csv_field(&details),
            ));
        }
        Ok(out)
    }
}

/// Quotes a CSV field when it contains separators, quotes or newlines.
fn csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::status::ConsolidationStatus;

    fn sample_document() -> AuditTrailDocument {
        AuditTrailDocument {
            consolidated_package_id: Uuid::new_v4(),
            tracking_number: "CONS-20260115-0001".to_string(),
            customer_name: "Acme Imports, Ltd".to_string(),
            records: vec![ExportedHistoryRecord {
                action: ConsolidationAction::StatusChanged,
                performed_by: "Ops Admin".to_string(),
                performed_at: Utc::now(),
                details: ConsolidationEventDetails::StatusChanged {
                    old_status: ConsolidationStatus::Pending,
                    new_status: ConsolidationStatus::Shipped,
                    package_count: 2,
                    reason: None,
                },
            }],
        }
    }

    #[test]
    fn json_export_contains_group_identity_and_records() {
        let export = sample_document().render(ExportFormat::Json).unwrap();
        let AuditTrailExport::Json(value) = export else {
            panic!("expected json export");
        };
        assert_eq!(value["tracking_number"], "CONS-20260115-0001");
        assert_eq!(value["customer_name"], "Acme Imports, Ltd");
        assert_eq!(value["records"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn csv_export_quotes_fields_with_separators() {
        let export = sample_document().render(ExportFormat::Csv).unwrap();
        let AuditTrailExport::Csv(csv) = export else {
            panic!("expected csv export");
        };
        let mut lines = csv.lines();
        assert_eq!(
            lines.next().unwrap(),
            "tracking_number,customer_name,action,performed_by,performed_at,details"
        );
        let row = lines.next().unwrap();
        assert!(row.contains("\"Acme Imports, Ltd\""));
        assert!(row.contains("status_changed"));
    }
}

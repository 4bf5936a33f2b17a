use heapless::String as HeaplessString;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::domain::history::ConsolidationAction;
use crate::domain::status::ConsolidationStatus;

/// Request payload for `consolidate`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ConsolidateRequest {
    #[validate(length(min = 2, message = "at least 2 packages required"))]
    pub package_ids: Vec<Uuid>,

    /// Initial status for the new group. Defaults to `Pending`.
    pub status: Option<ConsolidationStatus>,

    pub notes: Option<HeaplessString<200>>,
}

impl ConsolidateRequest {
    pub fn new(package_ids: Vec<Uuid>) -> Self {
        Self {
            package_ids,
            status: None,
            notes: None,
        }
    }

    /// Runs declarative validation, flattening field errors into one message.
    pub fn ensure_valid(&self) -> Result<(), String> {
        self.validate().map_err(|e| e.to_string())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UnconsolidateOptions {
    pub reason: Option<HeaplessString<200>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatusUpdateOptions {
    pub reason: Option<HeaplessString<200>>,
}

/// Filter for history retrieval.
#[derive(Debug, Clone, Copy, Default)]
pub struct HistoryFilter {
    pub action: Option<ConsolidationAction>,

    /// Restrict to records no older than this many days.
    pub days: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn singleton_selection_fails_validation() {
        let request = ConsolidateRequest::new(vec![Uuid::new_v4()]);
        let err = request.validate().unwrap_err();
        assert!(err.to_string().contains("at least 2 packages required"));
    }

    #[test]
    fn two_packages_pass_validation() {
        let request = ConsolidateRequest::new(vec![Uuid::new_v4(), Uuid::new_v4()]);
        assert!(request.validate().is_ok());
    }
}

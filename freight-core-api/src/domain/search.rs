use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind tag attached to every search hit so callers can render and filter
/// individual packages and consolidated groups distinctly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchRecordKind {
    IndividualPackage,
    ConsolidatedGroup,
}

impl std::fmt::Display for SearchRecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchRecordKind::IndividualPackage => write!(f, "Individual Package"),
            SearchRecordKind::ConsolidatedGroup => write!(f, "Consolidated Group"),
        }
    }
}

/// Optional narrowing of a search.
///
/// `customer_id` is honored for elevated callers; customer-tier callers are
/// always scoped to their own customer and may not request another one.
#[derive(Debug, Clone, Copy, Default)]
pub struct SearchFilter {
    pub customer_id: Option<Uuid>,
    pub kind: Option<SearchRecordKind>,
}

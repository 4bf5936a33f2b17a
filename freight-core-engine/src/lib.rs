pub mod cache;
pub mod engine;
pub mod guard;
pub mod history;
pub mod search;
pub mod store;

pub use cache::ConsolidationCache;
pub use engine::ConsolidationEngine;
pub use guard::AuthorizationGuard;
pub use search::{PackageSearchService, SearchHit};
pub use store::memory_store::MemoryStore;

#[cfg(test)]
pub mod test_helper;

pub mod consolidated_package;
pub mod consolidation_history;
pub mod package;
pub mod totals;

// Re-exports
pub use consolidated_package::*;
pub use consolidation_history::*;
pub use package::*;
pub use totals::*;

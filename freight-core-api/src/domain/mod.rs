pub mod actor;
pub mod export;
pub mod history;
pub mod requests;
pub mod search;
pub mod status;

// Re-exports
pub use actor::*;
pub use export::*;
pub use history::*;
pub use requests::*;
pub use search::*;
pub use status::*;

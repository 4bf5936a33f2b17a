pub mod audit;
pub mod auditable;
pub mod customer;
pub mod identifiable;
pub mod package;
pub mod person;

// Re-exports
pub use audit::*;
pub use auditable::*;
pub use customer::*;
pub use identifiable::*;
pub use package::*;
pub use person::*;

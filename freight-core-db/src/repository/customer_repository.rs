use async_trait::async_trait;
use uuid::Uuid;

use crate::models::customer::CustomerModel;

/// Repository for customers (external collaborator data; read-only here,
/// used for ownership checks and export name resolution).
#[async_trait]
pub trait CustomerRepository: Send + Sync {
    /// Load a single customer by its unique identifier
    ///
    /// # Returns
    /// * `Ok(Some(CustomerModel))` - The customer if it exists
    /// * `Ok(None)` - No customer with this ID
    /// * `Err` - An error if the query could not be executed
    async fn load_customer(
        &self,
        id: Uuid,
    ) -> Result<Option<CustomerModel>, Box<dyn std::error::Error + Send + Sync>>;
}

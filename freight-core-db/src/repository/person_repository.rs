use async_trait::async_trait;
use uuid::Uuid;

use crate::models::person::PersonModel;

/// Repository for acting persons (external collaborator data; read-only
/// here, used for audit attribution and export name resolution).
#[async_trait]
pub trait PersonRepository: Send + Sync {
    /// Load a single person by their unique identifier
    ///
    /// # Returns
    /// * `Ok(Some(PersonModel))` - The person if they exist
    /// * `Ok(None)` - No person with this ID
    /// * `Err` - An error if the query could not be executed
    async fn load_person(
        &self,
        id: Uuid,
    ) -> Result<Option<PersonModel>, Box<dyn std::error::Error + Send + Sync>>;

    /// Load multiple persons by their unique identifiers
    ///
    /// Results are returned in the same order as the provided IDs, with
    /// `None` for persons that do not exist.
    async fn load_persons(
        &self,
        ids: &[Uuid],
    ) -> Result<Vec<Option<PersonModel>>, Box<dyn std::error::Error + Send + Sync>>;
}

use async_trait::async_trait;
use connection::{FileStream, PaginatedCollection, RequestParameters};

use crate::contract::{
    error::ContactsError,
    model::{Contact, ContactPatch, NewContact},
};

/// Public API of the contacts service
#[async_trait]
pub trait ContactsApi: Send + Sync {
    /// Get a contact by ID
    async fn get_contact(&self, id: u64) -> Result<Contact, ContactsError>;

    /// One page of contacts; the cursor fetches the following pages
    async fn list_contacts(
        &self,
        params: RequestParameters,
    ) -> Result<PaginatedCollection<Contact>, ContactsError>;

    /// Every contact matching `params`, across all pages
    async fn list_all_contacts(&self, params: RequestParameters) -> Result<Vec<Contact>, ContactsError>;

    async fn create_contact(&self, new_contact: NewContact) -> Result<Contact, ContactsError>;

    /// Update a contact with partial data
    async fn update_contact(&self, id: u64, patch: ContactPatch) -> Result<Contact, ContactsError>;

    async fn delete_contact(&self, id: u64) -> Result<(), ContactsError>;

    /// Download the contacts matching `params` as a CSV file
    async fn export_contacts(&self, params: RequestParameters) -> Result<FileStream, ContactsError>;
}

//! Contacts service: typed access to the `contacts` resource of the API.

pub mod contract;
pub mod gateways;

pub use contract::{
    client::ContactsApi,
    error::{ContactConflictError, ContactNotFoundError, ContactsError},
    model::{Contact, ContactPatch, NewContact},
};
pub use gateways::remote::HttpContactsClient;

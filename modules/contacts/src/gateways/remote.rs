use std::sync::Arc;

use async_trait::async_trait;
use connection::{
    ensure_not_empty, FileStream, HttpTransport, Interceptor, ListRequest, PaginatedCollection,
    RequestParameters, Transport,
};
use runtime::ApiConfig;
use tracing::instrument;

use crate::contract::{
    client::ContactsApi,
    error::{ContactConflictError, ContactNotFoundError, ContactsError},
    model::{Contact, ContactPatch, NewContact},
};

const CONTACTS_PATH: &str = "contacts";

/// [`ContactsApi`] over the REST API.
#[derive(Clone)]
pub struct HttpContactsClient {
    transport: Arc<dyn Transport>,
}

impl HttpContactsClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    pub fn from_config(cfg: &ApiConfig) -> Result<Self, ContactsError> {
        let transport = HttpTransport::from_config(cfg)?;
        Ok(Self::new(Arc::new(transport)))
    }

    fn list_request(&self) -> ListRequest {
        ListRequest::new(Arc::clone(&self.transport), CONTACTS_PATH)
    }
}

fn contact_path(id: u64) -> Result<String, ContactsError> {
    if id == 0 {
        return Err(ContactsError::validation("id", "must be a positive integer"));
    }
    Ok(format!("{CONTACTS_PATH}/{id}"))
}

fn not_found(id: u64) -> Interceptor {
    Interceptor::not_found(move |_| ContactNotFoundError { id })
}

fn conflict() -> Interceptor {
    Interceptor::conflict(|raw| ContactConflictError {
        detail: raw.text().into_owned(),
    })
}

#[async_trait]
impl ContactsApi for HttpContactsClient {
    #[instrument(name = "contacts.http.get_contact", skip_all, fields(contact_id = id))]
    async fn get_contact(&self, id: u64) -> Result<Contact, ContactsError> {
        let path = contact_path(id)?;
        let envelope = connection::get::<Contact, _>(
            &*self.transport,
            &path,
            &RequestParameters::new(),
            &[not_found(id)],
        )
        .await?;
        Ok(envelope.into_data())
    }

    #[instrument(name = "contacts.http.list_contacts", skip_all, fields(query = %params))]
    async fn list_contacts(
        &self,
        params: RequestParameters,
    ) -> Result<PaginatedCollection<Contact>, ContactsError> {
        Ok(self.list_request().page(params).await?)
    }

    #[instrument(name = "contacts.http.list_all_contacts", skip_all, fields(query = %params))]
    async fn list_all_contacts(&self, params: RequestParameters) -> Result<Vec<Contact>, ContactsError> {
        let contacts: Vec<Contact> = self.list_request().all(params).await?;
        tracing::debug!(count = contacts.len(), "listed all contacts");
        Ok(contacts)
    }

    #[instrument(name = "contacts.http.create_contact", skip_all)]
    async fn create_contact(&self, new_contact: NewContact) -> Result<Contact, ContactsError> {
        ensure_not_empty("name", &new_contact.name)?;
        ensure_not_empty("email", &new_contact.email)?;

        let envelope =
            connection::post::<Contact, _, _>(&*self.transport, CONTACTS_PATH, &new_contact, &[conflict()])
                .await?;
        Ok(envelope.into_data())
    }

    #[instrument(name = "contacts.http.update_contact", skip_all, fields(contact_id = id))]
    async fn update_contact(&self, id: u64, patch: ContactPatch) -> Result<Contact, ContactsError> {
        let path = contact_path(id)?;
        if patch.is_empty() {
            return Err(ContactsError::validation("patch", "at least one field must be set"));
        }
        if let Some(email) = &patch.email {
            ensure_not_empty("email", email)?;
        }

        let envelope = connection::patch::<Contact, _, _>(
            &*self.transport,
            &path,
            &patch,
            &[not_found(id), conflict()],
        )
        .await?;
        Ok(envelope.into_data())
    }

    #[instrument(name = "contacts.http.delete_contact", skip_all, fields(contact_id = id))]
    async fn delete_contact(&self, id: u64) -> Result<(), ContactsError> {
        let path = contact_path(id)?;
        connection::delete::<(), _>(&*self.transport, &path, &[not_found(id)]).await?;
        Ok(())
    }

    #[instrument(name = "contacts.http.export_contacts", skip_all, fields(query = %params))]
    async fn export_contacts(&self, params: RequestParameters) -> Result<FileStream, ContactsError> {
        let path = format!("{CONTACTS_PATH}/export");
        Ok(connection::get_file(&*self.transport, &path, &params, &[]).await?)
    }
}

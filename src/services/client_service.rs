//! Client service.

use super::{check, import_records, trim_in_place, CrudService};
use crate::backend::StoreBackend;
use crate::error::Result;
use crate::models::{new_id, BillingPatch, Client, ClientPatch, NewClient};
use crate::repository::{Repository, StoreRepository};
use chrono::Utc;

#[derive(Clone)]
pub struct ClientService<B: StoreBackend> {
    repo: StoreRepository<Client, B>,
}

impl<B: StoreBackend> ClientService<B> {
    pub fn new(repo: StoreRepository<Client, B>) -> Self {
        ClientService { repo }
    }

    /// # Errors
    /// Returns `Err` if the store fails
    pub async fn get_active(&self) -> Result<Vec<Client>> {
        let clients = self.repo.fetch_all().await?;
        Ok(clients.into_iter().filter(|c| c.is_active).collect())
    }

    /// Case-insensitive search over name, email and company.
    ///
    /// # Errors
    /// Returns `Err` if the store fails
    pub async fn search(&self, query: &str) -> Result<Vec<Client>> {
        let clients = self.repo.fetch_all().await?;
        Ok(clients
            .into_iter()
            .filter(|client| client.matches_query(query))
            .collect())
    }

    /// Merge billing fields and record the contact.
    ///
    /// # Errors
    /// Returns `Error::NotFound` for an unknown id, `Error::Validation` for a
    /// malformed billing email
    pub async fn update_billing_info(&self, id: &str, patch: BillingPatch) -> Result<Client> {
        check("billing", &patch)?;

        let client = self
            .repo
            .modify(&id.to_string(), |client| {
                client.billing.apply(patch);
                client.last_contact = Utc::now();
                Ok(client.clone())
            })
            .await?;
        info!("Updated billing info for client {}", client.id);
        Ok(client)
    }

    /// # Errors
    /// Returns `Error::Validation` on a duplicate id
    pub async fn import(&self, clients: Vec<Client>) -> Result<usize> {
        import_records(&self.repo, clients).await
    }
}

impl<B: StoreBackend> CrudService for ClientService<B> {
    type Entity = Client;
    type Draft = NewClient;
    type Patch = ClientPatch;

    async fn get_all(&self) -> Result<Vec<Client>> {
        self.repo.fetch_all().await
    }

    async fn get_by_id(&self, id: &str) -> Result<Client> {
        self.repo.require(&id.to_string()).await
    }

    async fn create(&self, mut draft: NewClient) -> Result<Client> {
        trim_in_place(&mut draft.name);
        trim_in_place(&mut draft.email);
        check("client", &draft)?;

        let client = Client::from_draft(new_id("client"), draft, Utc::now());
        self.repo.insert(&client).await?;
        info!("Created client {} \"{}\"", client.id, client.name);
        Ok(client)
    }

    async fn update(&self, id: &str, mut patch: ClientPatch) -> Result<Client> {
        if let Some(name) = patch.name.as_mut() {
            trim_in_place(name);
        }
        if let Some(email) = patch.email.as_mut() {
            trim_in_place(email);
        }
        check("client", &patch)?;

        let (client, changed) = self
            .repo
            .modify(&id.to_string(), |client| {
                let changed = client.apply(patch);
                Ok((client.clone(), changed))
            })
            .await?;
        if changed {
            info!("Updated client {}", client.id);
        }
        Ok(client)
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.repo.remove(&id.to_string()).await?;
        info!("Deleted client {}", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::InMemoryBackend;
    use crate::error::Error;

    fn service() -> ClientService<InMemoryBackend> {
        ClientService::new(StoreRepository::new(InMemoryBackend::new()))
    }

    #[tokio::test]
    async fn test_create_validates_email() {
        let service = service();
        let err = service
            .create(NewClient::new("Ada", "ada-at-example"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(service.get_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search() {
        let service = service();
        let mut acme = NewClient::new("Wile Coyote", "wile@acme.test");
        acme.company = "Acme Corp".to_string();
        service.create(acme).await.unwrap();
        service
            .create(NewClient::new("Road Runner", "beep@desert.test"))
            .await
            .unwrap();

        assert_eq!(service.search("ACME").await.unwrap().len(), 1);
        assert_eq!(service.search("test").await.unwrap().len(), 2);
        assert!(service.search("nobody").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_billing_info_merges() {
        let service = service();
        let client = service
            .create(NewClient::new("Ada", "ada@analytical.io"))
            .await
            .unwrap();

        service
            .update_billing_info(
                &client.id,
                BillingPatch {
                    currency: Some("GBP".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let updated = service
            .update_billing_info(
                &client.id,
                BillingPatch {
                    payment_terms_days: Some(14),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.billing.currency.as_deref(), Some("GBP"));
        assert_eq!(updated.billing.payment_terms_days, Some(14));
        assert!(updated.last_contact >= client.last_contact);
    }

    #[tokio::test]
    async fn test_update_billing_unknown_client() {
        let err = service()
            .update_billing_info("client-x", BillingPatch::default())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Client not found");
    }
}

//! Client records.

use super::merge;
use crate::entity::Entity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Billing details kept on a client.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingInfo {
    #[serde(default)]
    pub billing_email: Option<String>,
    #[serde(default)]
    pub tax_id: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub payment_terms_days: Option<u32>,
}

impl BillingInfo {
    /// Merge provided fields, leaving the others untouched.
    pub fn apply(&mut self, patch: BillingPatch) -> bool {
        let mut changed = merge(&mut self.billing_email, patch.billing_email.map(Some));
        changed |= merge(&mut self.tax_id, patch.tax_id.map(Some));
        changed |= merge(&mut self.currency, patch.currency.map(Some));
        changed |= merge(&mut self.payment_terms_days, patch.payment_terms_days.map(Some));
        changed
    }
}

#[derive(Clone, Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BillingPatch {
    #[validate(email(message = "billing email is not a valid address"))]
    pub billing_email: Option<String>,
    pub tax_id: Option<String>,
    pub currency: Option<String>,
    pub payment_terms_days: Option<u32>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub company: String,
    pub address: String,
    pub notes: String,
    pub is_active: bool,
    pub project_ids: Vec<String>,
    #[serde(default)]
    pub billing: BillingInfo,
    pub date_added: DateTime<Utc>,
    pub last_contact: DateTime<Utc>,
}

impl Client {
    pub fn from_draft(id: String, draft: NewClient, now: DateTime<Utc>) -> Self {
        Client {
            id,
            name: draft.name,
            email: draft.email,
            phone: draft.phone,
            company: draft.company,
            address: draft.address,
            notes: draft.notes,
            is_active: draft.is_active.unwrap_or(true),
            project_ids: draft.project_ids,
            billing: draft.billing,
            date_added: now,
            last_contact: now,
        }
    }

    pub fn apply(&mut self, patch: ClientPatch) -> bool {
        let mut changed = merge(&mut self.name, patch.name);
        changed |= merge(&mut self.email, patch.email);
        changed |= merge(&mut self.phone, patch.phone);
        changed |= merge(&mut self.company, patch.company);
        changed |= merge(&mut self.address, patch.address);
        changed |= merge(&mut self.notes, patch.notes);
        changed |= merge(&mut self.is_active, patch.is_active);
        changed |= merge(&mut self.project_ids, patch.project_ids);
        changed |= merge(&mut self.last_contact, patch.last_contact);
        changed
    }

    /// Case-insensitive match over name, email and company.
    pub fn matches_query(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        [&self.name, &self.email, &self.company]
            .iter()
            .any(|field| field.to_lowercase().contains(&query))
    }
}

impl Entity for Client {
    type Key = String;

    fn entity_key(&self) -> Self::Key {
        self.id.clone()
    }

    fn collection() -> &'static str {
        "client"
    }

    fn entity_name() -> &'static str {
        "Client"
    }
}

#[derive(Clone, Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewClient {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[validate(email(message = "email is not a valid address"))]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub notes: String,
    /// Defaults to active.
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub project_ids: Vec<String>,
    #[serde(default)]
    pub billing: BillingInfo,
}

impl NewClient {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        NewClient {
            name: name.into(),
            email: email.into(),
            ..Default::default()
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ClientPatch {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: Option<String>,
    #[validate(email(message = "email is not a valid address"))]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub address: Option<String>,
    pub notes: Option<String>,
    pub is_active: Option<bool>,
    pub project_ids: Option<Vec<String>>,
    pub last_contact: Option<DateTime<Utc>>,
}

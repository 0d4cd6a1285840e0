// Copyright (c) 2026 Suporte ao Franqueado
// SPDX-License-Identifier: AGPL-3.0

//! Movidesk Directory Client
//!
//! Anti-Corruption Layer over the Movidesk public persons API. Translates
//! OData-style person queries into the directory domain types.
//!
//! # Architecture
//!
//! - **Layer:** Infrastructure
//! - **Purpose:** Resolve requesters by email and list active units
//! - **Integration:** Movidesk persons API (optionally via relay) → DirectoryService

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, error, info, warn};

use crate::domain::directory::{
    dedup_units, DirectoryError, DirectoryService, RemotePerson, RemoteUnit, ValidationResult,
};
use crate::infrastructure::relay::{with_query, Relay};

const PERSON_SELECT: &str = "id,businessName,role";
const PERSON_EXPAND: &str = "contacts";
const UNIT_FILTER: &str = "personType eq 2 and isActive eq true";
const UNIT_SELECT: &str = "id,businessName";

pub struct MovideskDirectoryClient {
    client: Client,
    base_url: String,
    token: String,
    relay: Relay,
}

impl MovideskDirectoryClient {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url, token)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            token: token.into(),
            relay: Relay::direct(),
        }
    }

    pub fn with_relay(mut self, relay: Relay) -> Self {
        self.relay = relay;
        self
    }

    /// `$filter` expression matching any contact email equal to `email`
    pub fn email_filter(email: &str) -> String {
        // OData string literals escape quotes by doubling them
        format!("emails/any(d:d/email eq '{}')", email.replace('\'', "''"))
    }

    fn persons_url(&self, params: &[(&str, &str)]) -> String {
        let endpoint = format!("{}/persons", self.base_url.trim_end_matches('/'));
        let mut all = vec![("token", self.token.as_str())];
        all.extend_from_slice(params);
        self.relay.wrap(&with_query(&endpoint, &all))
    }

    async fn fetch_persons<T: DeserializeOwned>(&self, url: &str) -> Result<Vec<T>, DirectoryError> {
        let response = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| {
                // The request URL carries the token; keep it out of error text
                let builder = e.is_builder();
                let message = e.without_url().to_string();
                if builder {
                    DirectoryError::InvalidUrl(message)
                } else {
                    DirectoryError::Network(message)
                }
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(DirectoryError::Status { status, body });
        }

        // Movidesk answers `null` instead of `[]` on some empty filters
        let records: Option<Vec<T>> = response
            .json()
            .await
            .map_err(|e| DirectoryError::Decode(e.without_url().to_string()))?;

        Ok(records.unwrap_or_default())
    }
}

#[async_trait]
impl DirectoryService for MovideskDirectoryClient {
    async fn resolve_person(&self, email: &str) -> Result<ValidationResult, DirectoryError> {
        let filter = Self::email_filter(email);
        let url = self.persons_url(&[
            ("$filter", filter.as_str()),
            ("$select", PERSON_SELECT),
            ("$expand", PERSON_EXPAND),
        ]);

        debug!(email = %email, relayed = !self.relay.is_direct(), "Resolving person by email");

        let records: Vec<RemotePerson> = self.fetch_persons(&url).await.map_err(|e| {
            error!(email = %email, error = %e, "Error checking user role");
            e
        })?;

        let result = ValidationResult::from_records(&records);
        info!(
            email = %email,
            matches = records.len(),
            is_franchisee = result.is_franchisee,
            has_phone = result.phone.is_some(),
            "Person lookup completed"
        );
        Ok(result)
    }

    async fn list_units(&self) -> Vec<RemoteUnit> {
        let url = self.persons_url(&[("$filter", UNIT_FILTER), ("$select", UNIT_SELECT)]);

        match self.fetch_persons::<RemoteUnit>(&url).await {
            Ok(units) => {
                let units = dedup_units(units);
                debug!(count = units.len(), "Fetched active units");
                units
            }
            Err(e) => {
                warn!(error = %e, "Error fetching units, continuing with an empty list");
                Vec::new()
            }
        }
    }
}

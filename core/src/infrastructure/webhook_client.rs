// Copyright (c) 2026 Suporte ao Franqueado
// SPDX-License-Identifier: AGPL-3.0

//! Automation Webhook Client
//!
//! Posts the ticket-shaped access request to the chat-automation webhook.
//! A single POST is made per call; the endpoint triggers outbound messages,
//! so a repeated POST would duplicate them.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use tracing::{error, info};

use crate::domain::submission::{AccessRequest, SubmissionError, SubmissionService, TicketPayload};
use crate::infrastructure::relay::Relay;

/// Token returned on any 2xx answer; the response body is not inspected.
pub const CONFIRMATION_TOKEN: &str = "OK";

pub struct WebhookSubmissionClient {
    client: Client,
    webhook_url: String,
    relay: Relay,
}

impl WebhookSubmissionClient {
    pub fn new(webhook_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), webhook_url)
    }

    pub fn with_client(client: Client, webhook_url: impl Into<String>) -> Self {
        Self {
            client,
            webhook_url: webhook_url.into(),
            relay: Relay::direct(),
        }
    }

    pub fn with_relay(mut self, relay: Relay) -> Self {
        self.relay = relay;
        self
    }
}

#[async_trait]
impl SubmissionService for WebhookSubmissionClient {
    async fn submit(&self, request: &AccessRequest) -> Result<String, SubmissionError> {
        let payload = TicketPayload::build(request, Utc::now());
        let body = serde_json::to_vec(&payload).map_err(|e| SubmissionError::Encode(e.to_string()))?;

        let url = self.relay.wrap(&self.webhook_url);
        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| {
                // Webhook paths embed a secret; strip the URL from the message
                let err = if e.is_timeout() {
                    SubmissionError::Timeout
                } else if e.is_builder() {
                    SubmissionError::InvalidUrl(e.without_url().to_string())
                } else {
                    SubmissionError::Transport(e.without_url().to_string())
                };
                error!(error = %err, "Failed to send data to webhook");
                err
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            error!(status, "Webhook rejected the access request");
            return Err(SubmissionError::Rejected { status, body });
        }

        info!(
            person_id = %request.person_id,
            unit_id = %request.unit_id,
            "Access request delivered to webhook"
        );
        Ok(CONFIRMATION_TOKEN.to_string())
    }
}

// Copyright (c) 2026 Suporte ao Franqueado
// SPDX-License-Identifier: AGPL-3.0
//! Service Factory - Application Layer
//!
//! Creates the concrete directory and submission clients from the client
//! configuration and wires them into a workflow. Keeps the domain layer free
//! of infrastructure dependencies.
//!
//! # Architecture
//!
//! - **Layer:** Application Layer
//! - **Purpose:** Implements service construction from configuration

use std::sync::Arc;

use anyhow::{Context, Result};
use reqwest::Client;

use crate::application::access_request_workflow::AccessRequestWorkflow;
use crate::domain::client_config::ClientConfig;
use crate::domain::directory::DirectoryService;
use crate::domain::submission::SubmissionService;
use crate::infrastructure::movidesk_client::MovideskDirectoryClient;
use crate::infrastructure::relay::Relay;
use crate::infrastructure::webhook_client::WebhookSubmissionClient;

/// Shared HTTP client honouring the optional request timeout
pub fn create_http_client(config: &ClientConfig) -> Result<Client> {
    let mut builder = Client::builder();
    if let Some(timeout) = config.request_timeout() {
        builder = builder.timeout(timeout);
    }
    builder.build().context("Failed to create HTTP client")
}

pub fn create_directory_service(config: &ClientConfig, client: Client) -> Result<Arc<dyn DirectoryService>> {
    let token = config
        .directory_token()
        .context("Failed to resolve directory token")?;
    let directory = MovideskDirectoryClient::with_client(client, config.directory.base_url.clone(), token)
        .with_relay(Relay::new(config.relay_url.clone()));
    Ok(Arc::new(directory))
}

pub fn create_submission_service(config: &ClientConfig, client: Client) -> Result<Arc<dyn SubmissionService>> {
    let webhook_url = config
        .webhook_url()
        .context("Failed to resolve automation webhook URL")?;
    let submission = WebhookSubmissionClient::with_client(client, webhook_url)
        .with_relay(Relay::new(config.relay_url.clone()));
    Ok(Arc::new(submission))
}

/// Fully wired workflow instance
pub fn create_workflow(config: &ClientConfig) -> Result<Arc<AccessRequestWorkflow>> {
    let client = create_http_client(config)?;
    let directory = create_directory_service(config, client.clone())?;
    let submission = create_submission_service(config, client)?;
    Ok(Arc::new(AccessRequestWorkflow::new(directory, submission)))
}

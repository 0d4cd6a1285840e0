// Copyright (c) 2026 Suporte ao Franqueado
// SPDX-License-Identifier: AGPL-3.0

//! Command implementations for the access request CLI

use anyhow::{Context, Result};
use std::path::PathBuf;

use access_request_core::domain::client_config::ClientConfigManifest;

pub mod check;
pub mod config;
pub mod form;
pub mod units;

pub use self::config::ConfigCommand;
pub use self::form::FormArgs;

/// Discover, load and validate the client configuration
pub fn load_config(config_override: Option<PathBuf>) -> Result<ClientConfigManifest> {
    let config = ClientConfigManifest::load_or_default(config_override)
        .context("Failed to load configuration")?;
    config
        .validate()
        .context("Configuration validation failed")?;
    Ok(config)
}

// Copyright (c) 2026 Suporte ao Franqueado
// SPDX-License-Identifier: AGPL-3.0
//! Domain
//!
//! Form state, directory records and the request payload, plus the service
//! traits the workflow depends on.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Implements domain types and service interfaces

pub mod client_config;
pub mod directory;
pub mod events;
pub mod form;
pub mod submission;

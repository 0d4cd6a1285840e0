// Copyright (c) 2026 Suporte ao Franqueado
// SPDX-License-Identifier: AGPL-3.0
//! Lib
//!
//! Client-side validation and submission workflow for the franchisee access
//! request form: directory lookups, the authorization state machine, and
//! delivery of the request to the automation webhook.
//!
//! # Architecture
//!
//! - **Layer:** Core System
//! - **Purpose:** Implements lib

pub mod domain;
pub mod application;
pub mod infrastructure;

pub use domain::*;

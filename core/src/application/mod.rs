// Copyright (c) 2026 Suporte ao Franqueado
// SPDX-License-Identifier: AGPL-3.0

pub mod access_request_workflow;
pub mod service_factory;

// Re-export use cases for convenience
pub use access_request_workflow::{AccessRequestWorkflow, BlurOutcome, FormSnapshot, SubmitOutcome};
pub use service_factory::create_workflow;

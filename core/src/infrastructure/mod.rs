// Copyright (c) 2026 Suporte ao Franqueado
// SPDX-License-Identifier: AGPL-3.0

pub mod event_bus;
pub mod movidesk_client;
pub mod relay;
pub mod webhook_client;

pub use event_bus::{EventBusError, FormEventBus, FormEventReceiver};
pub use movidesk_client::MovideskDirectoryClient;
pub use relay::Relay;
pub use webhook_client::WebhookSubmissionClient;

// Copyright (c) 2026 Suporte ao Franqueado
// SPDX-License-Identifier: AGPL-3.0
//! Submission
//!
//! The access request handed to the automation webhook and the ticket-shaped
//! payload it is serialized into.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Implements request payload assembly

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::form::{digits_only, FormState, COUNTRY_CODE};

pub const TICKET_TYPE: u8 = 2;
pub const TICKET_SUBJECT: &str = "Liberação Sugestão de Planos";
pub const TICKET_URGENCY: &str = "Alta";
pub const TICKET_CATEGORY: &str = "Solicitação de serviço";
pub const TICKET_ORIGIN: u8 = 9;
pub const SERVICE_FIRST_LEVEL_ID: u64 = 1392257;

const UNIT_FIELD: (u64, u64) = (205660, 106945);
const PLACEHOLDER_FIELD: (u64, u64) = (205496, 106882);
const PLACEHOLDER_VALUE: &str = "12345678";
const PHONE_FIELD: (u64, u64) = (217972, 113942);

/// Domain interface for the downstream automation endpoint
#[async_trait]
pub trait SubmissionService: Send + Sync {
    /// Transmit the request exactly once. Returns a confirmation token.
    async fn submit(&self, request: &AccessRequest) -> Result<String, SubmissionError>;
}

/// Errors that can occur while submitting
#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Webhook rejected the request with HTTP {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Webhook did not answer in time")]
    Timeout,

    #[error("Failed to encode payload: {0}")]
    Encode(String),

    #[error("Invalid webhook URL: {0}")]
    InvalidUrl(String),
}

/// Fully populated request. Authorization is the caller's responsibility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessRequest {
    pub person_id: String,
    pub business_name: String,
    pub email: String,
    pub phone: String,
    pub unit_id: String,
    pub unit_name: String,
    pub message: String,
}

impl From<&FormState> for AccessRequest {
    fn from(form: &FormState) -> Self {
        Self {
            person_id: form.person_id.clone(),
            business_name: form.business_name.clone(),
            email: form.email.trim().to_string(),
            phone: form.phone.clone(),
            unit_id: form.unit_id.clone(),
            unit_name: form.unit_name.clone(),
            message: form.message.clone(),
        }
    }
}

impl AccessRequest {
    /// Phone in national format: digits only, country code removed once.
    pub fn local_phone(&self) -> String {
        local_phone(&self.phone)
    }
}

pub fn local_phone(phone: &str) -> String {
    let digits = digits_only(phone);
    match digits.strip_prefix(COUNTRY_CODE) {
        Some(national) => national.to_string(),
        None => digits,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketPayload {
    #[serde(rename = "type")]
    pub ticket_type: u8,
    pub subject: String,
    pub urgency: String,
    pub category: String,
    pub origin: u8,
    pub service_first_level_id: u64,
    pub created_by: PersonRef,
    pub clients: Vec<PersonRef>,
    pub actions: Vec<TicketAction>,
    pub custom_field_values: Vec<CustomFieldValue>,
    #[serde(rename = "webhook_metadata")]
    pub webhook_metadata: WebhookMetadata,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonRef {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketAction {
    #[serde(rename = "type")]
    pub action_type: u8,
    pub origin: u8,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomFieldValue {
    pub custom_field_id: u64,
    pub custom_field_rule_id: u64,
    pub line: u32,
    /// Serialized as `null` when absent
    pub value: Option<String>,
    pub items: Vec<CustomFieldItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomFieldItem {
    pub custom_field_item: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookMetadata {
    pub email: String,
    #[serde(rename = "businessName")]
    pub business_name: String,
    pub sent_at: String,
}

impl CustomFieldValue {
    fn new((custom_field_id, custom_field_rule_id): (u64, u64)) -> Self {
        Self {
            custom_field_id,
            custom_field_rule_id,
            line: 1,
            value: None,
            items: Vec::new(),
        }
    }

    fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    fn with_item(mut self, item: impl Into<String>) -> Self {
        self.items.push(CustomFieldItem {
            custom_field_item: item.into(),
        });
        self
    }
}

impl TicketPayload {
    pub fn build(request: &AccessRequest, sent_at: DateTime<Utc>) -> Self {
        let requester = PersonRef {
            id: request.person_id.clone(),
        };

        Self {
            ticket_type: TICKET_TYPE,
            subject: TICKET_SUBJECT.to_string(),
            urgency: TICKET_URGENCY.to_string(),
            category: TICKET_CATEGORY.to_string(),
            origin: TICKET_ORIGIN,
            service_first_level_id: SERVICE_FIRST_LEVEL_ID,
            created_by: requester.clone(),
            clients: vec![requester],
            actions: vec![TicketAction {
                action_type: TICKET_TYPE,
                origin: TICKET_ORIGIN,
                description: request.message.clone(),
            }],
            custom_field_values: vec![
                CustomFieldValue::new(UNIT_FIELD).with_item(request.unit_name.clone()),
                CustomFieldValue::new(PLACEHOLDER_FIELD).with_value(PLACEHOLDER_VALUE),
                CustomFieldValue::new(PHONE_FIELD).with_value(request.local_phone()),
            ],
            webhook_metadata: WebhookMetadata {
                email: request.email.clone(),
                business_name: request.business_name.clone(),
                sent_at: sent_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            },
        }
    }

    pub fn unit_field(&self) -> Option<&str> {
        self.field(UNIT_FIELD.0)
            .and_then(|f| f.items.first())
            .map(|item| item.custom_field_item.as_str())
    }

    pub fn phone_field(&self) -> Option<&str> {
        self.field(PHONE_FIELD.0).and_then(|f| f.value.as_deref())
    }

    fn field(&self, custom_field_id: u64) -> Option<&CustomFieldValue> {
        self.custom_field_values
            .iter()
            .find(|f| f.custom_field_id == custom_field_id)
    }
}

// Copyright (c) 2026 Suporte ao Franqueado
// SPDX-License-Identifier: AGPL-3.0

// Directory Domain Interface (Anti-Corruption Layer)
//
// Person and unit records as the helpdesk directory returns them, the
// derived validation result, and the trait the workflow depends on.
// The HTTP implementation lives in infrastructure/movidesk_client.rs.

use std::cmp::Ordering;
use std::collections::HashSet;

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Role tag that grants access to the request form.
pub const FRANCHISEE_ROLE: &str = "FRANQUEADO";

/// `contactType` code of the primary phone channel.
pub const PRIMARY_PHONE_CONTACT_TYPE: i64 = 1;

/// Domain interface for the contact/ticketing directory
#[async_trait]
pub trait DirectoryService: Send + Sync {
    /// Look up the person whose email list contains exactly `email`.
    ///
    /// An unknown email is `Ok` with `is_franchisee == false`; transport and
    /// status failures are `Err` so callers can tell the two apart.
    async fn resolve_person(&self, email: &str) -> Result<ValidationResult, DirectoryError>;

    /// Active organization records. Best-effort: failures yield an empty list.
    async fn list_units(&self) -> Vec<RemoteUnit>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    #[serde(default)]
    pub contact_type: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub contact: String,
    #[serde(default)]
    pub is_main: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemotePerson {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub business_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub role: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub contacts: Vec<Contact>,
}

impl RemotePerson {
    pub fn is_franchisee(&self) -> bool {
        self.role == FRANCHISEE_ROLE
    }

    /// First primary-phone contact, else the first contact of any kind.
    pub fn phone_contact(&self) -> Option<&Contact> {
        self.contacts
            .iter()
            .find(|c| c.contact_type == PRIMARY_PHONE_CONTACT_TYPE)
            .or_else(|| self.contacts.first())
    }
}

/// Organization record offered in the unit selector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteUnit {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub business_name: String,
}

/// Result of resolving an email against the directory.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ValidationResult {
    pub is_franchisee: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_name: Option<String>,
}

impl ValidationResult {
    /// No directory record matched the email.
    pub fn unknown() -> Self {
        Self::default()
    }

    pub fn from_person(person: &RemotePerson) -> Self {
        let phone = person
            .phone_contact()
            .map(|c| c.contact.trim())
            .filter(|contact| contact.chars().any(|ch| ch.is_ascii_digit()))
            .map(str::to_string);

        Self {
            is_franchisee: person.is_franchisee(),
            phone,
            id: Some(person.id.clone()),
            business_name: Some(person.business_name.clone()),
        }
    }

    /// First record wins when the directory returns several.
    pub fn from_records(records: &[RemotePerson]) -> Self {
        records
            .first()
            .map(Self::from_person)
            .unwrap_or_else(Self::unknown)
    }
}

/// Errors that can occur while querying the directory
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Directory returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to decode directory response: {0}")]
    Decode(String),

    #[error("Invalid directory URL: {0}")]
    InvalidUrl(String),
}

/// Drops repeated ids, keeping the first occurrence.
pub fn dedup_units(units: Vec<RemoteUnit>) -> Vec<RemoteUnit> {
    let mut seen = HashSet::new();
    units
        .into_iter()
        .filter(|unit| seen.insert(unit.id.clone()))
        .collect()
}

/// Sorts units by display name the way a pt-BR collator would order them:
/// accents and case are ignored first, then the raw name breaks ties.
pub fn sort_units_for_display(units: &mut [RemoteUnit]) {
    units.sort_by(|a, b| compare_display_names(&a.business_name, &b.business_name));
}

pub fn compare_display_names(a: &str, b: &str) -> Ordering {
    collation_key(a)
        .cmp(&collation_key(b))
        .then_with(|| a.cmp(b))
}

fn collation_key(name: &str) -> String {
    name.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {other}"
        ))),
    }
}

// Copyright (c) 2026 Suporte ao Franqueado
// SPDX-License-Identifier: AGPL-3.0
//! Form
//!
//! Form state owned by the access request workflow, plus the pure projections
//! (email shape, phone prefixing, unit name) recomputed on every input change.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Implements form state and derived fields

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::domain::directory::RemoteUnit;

/// Brazilian country calling code, always present at the head of `FormState::phone`.
pub const COUNTRY_CODE: &str = "55";

static EMAIL_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("static email pattern"));

/// Mutable form contents. Only the workflow controller mutates this.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormState {
    /// Directory id of the validated requester (empty = unresolved)
    pub person_id: String,
    pub business_name: String,
    pub email: String,
    /// Derived from the directory lookup, never typed by the user
    pub phone: String,
    pub unit_id: String,
    /// Projection of `unit_id` against the loaded unit list
    pub unit_name: String,
    pub message: String,
}

impl Default for FormState {
    fn default() -> Self {
        Self {
            person_id: String::new(),
            business_name: String::new(),
            email: String::new(),
            phone: COUNTRY_CODE.to_string(),
            unit_id: String::new(),
            unit_name: String::new(),
            message: String::new(),
        }
    }
}

impl FormState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Required fields that are still blank, in display order.
    pub fn missing_fields(&self) -> Vec<FormField> {
        let mut missing = Vec::new();
        if self.email.trim().is_empty() {
            missing.push(FormField::Email);
        }
        if self.unit_id.is_empty() {
            missing.push(FormField::Unit);
        }
        if self.message.trim().is_empty() {
            missing.push(FormField::Message);
        }
        missing
    }
}

/// User-editable fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormField {
    Email,
    Unit,
    Message,
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormField::Email => write!(f, "email"),
            FormField::Unit => write!(f, "unit"),
            FormField::Message => write!(f, "message"),
        }
    }
}

/// UI-facing status of the workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FormStatus {
    #[default]
    Idle,
    Validating,
    Sending,
    Success,
    Error,
    Unauthorized,
    Incomplete,
}

impl fmt::Display for FormStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FormStatus::Idle => "idle",
            FormStatus::Validating => "validating",
            FormStatus::Sending => "sending",
            FormStatus::Success => "success",
            FormStatus::Error => "error",
            FormStatus::Unauthorized => "unauthorized",
            FormStatus::Incomplete => "incomplete",
        };
        f.write_str(label)
    }
}

/// Outcome of the most recent email validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Authorization {
    /// No validation yet, or the email failed the shape check
    #[default]
    Unknown,
    Authorized,
    Denied,
}

impl Authorization {
    pub fn is_authorized(self) -> bool {
        matches!(self, Authorization::Authorized)
    }
}

/// Simple `local@domain.tld` shape check, no whitespace allowed.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_SHAPE.is_match(email)
}

pub fn digits_only(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Normalizes a raw directory contact into the form's phone field.
///
/// Idempotent: a number that already carries the country code is returned
/// as digits only, anything else gets exactly one `55` prepended.
pub fn with_country_code(raw: &str) -> String {
    let digits = digits_only(raw);
    if digits.starts_with(COUNTRY_CODE) {
        digits
    } else {
        format!("{COUNTRY_CODE}{digits}")
    }
}

/// Display name of the unit whose id is `unit_id`, or empty when none matches.
pub fn unit_name_for(units: &[RemoteUnit], unit_id: &str) -> String {
    if unit_id.is_empty() {
        return String::new();
    }
    units
        .iter()
        .find(|unit| unit.id == unit_id)
        .map(|unit| unit.business_name.clone())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(id: &str, name: &str) -> RemoteUnit {
        RemoteUnit {
            id: id.to_string(),
            business_name: name.to_string(),
        }
    }

    #[test]
    fn test_default_form_carries_bare_prefix() {
        let form = FormState::default();
        assert_eq!(form.phone, "55");
        assert!(form.person_id.is_empty());
        assert!(form.unit_name.is_empty());
    }

    #[test]
    fn test_email_shape() {
        assert!(is_valid_email("joao@unidade.com.br"));
        assert!(is_valid_email("a@b.co"));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("joao@unidade"));
        assert!(!is_valid_email("jo ao@unidade.com"));
        assert!(!is_valid_email("@unidade.com"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn test_country_code_prefix_is_idempotent() {
        assert_eq!(with_country_code("11999998888"), "5511999998888");
        assert_eq!(with_country_code("5511999998888"), "5511999998888");
        assert_eq!(
            with_country_code(&with_country_code("11999998888")),
            "5511999998888"
        );
        assert_eq!(with_country_code("+55 (11) 99999-8888"), "5511999998888");
        assert_eq!(with_country_code("(11) 99999-8888"), "5511999998888");
    }

    #[test]
    fn test_unit_name_projection() {
        let units = vec![unit("3", "Unidade Sul"), unit("7", "Unidade Norte")];

        assert_eq!(unit_name_for(&units, "7"), "Unidade Norte");
        assert_eq!(unit_name_for(&units, "99"), "");
        assert_eq!(unit_name_for(&units, ""), "");
        assert_eq!(unit_name_for(&[], "7"), "");
    }

    #[test]
    fn test_missing_fields() {
        let mut form = FormState::new();
        assert_eq!(
            form.missing_fields(),
            vec![FormField::Email, FormField::Unit, FormField::Message]
        );

        form.email = "joao@unidade.com.br".to_string();
        form.unit_id = "7".to_string();
        form.message = "   ".to_string();
        assert_eq!(form.missing_fields(), vec![FormField::Message]);

        form.message = "Liberar acesso".to_string();
        assert!(form.missing_fields().is_empty());
    }

    #[test]
    fn test_status_serializes_like_the_ui_enum() {
        let json = serde_json::to_string(&FormStatus::Unauthorized).unwrap();
        assert_eq!(json, "\"UNAUTHORIZED\"");
    }
}

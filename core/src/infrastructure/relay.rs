// Copyright (c) 2026 Suporte ao Franqueado
// SPDX-License-Identifier: AGPL-3.0

//! Relay URL wrapping
//!
//! Both remote services may be reached through a forwarding relay that takes
//! the whole target URL, percent-encoded, appended to its own prefix
//! (`https://corsproxy.io/?<encoded target>`). With no relay configured the
//! target URL is used as is.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Characters left untouched by `encodeURIComponent`
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Percent-encode a single URL component (query value, whole URL for the relay)
pub fn encode_component(value: &str) -> String {
    utf8_percent_encode(value, URI_COMPONENT).to_string()
}

/// Builds `path?key=value&...`; keys are static and sent raw, values are encoded
pub fn with_query(base: &str, params: &[(&str, &str)]) -> String {
    let query = params
        .iter()
        .map(|(k, v)| format!("{}={}", k, encode_component(v)))
        .collect::<Vec<_>>()
        .join("&");
    if query.is_empty() {
        base.to_string()
    } else {
        format!("{}?{}", base, query)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Relay {
    prefix: Option<String>,
}

impl Relay {
    pub fn new(prefix: Option<String>) -> Self {
        Self {
            prefix: prefix.filter(|p| !p.trim().is_empty()),
        }
    }

    /// Call target services directly
    pub fn direct() -> Self {
        Self::default()
    }

    pub fn is_direct(&self) -> bool {
        self.prefix.is_none()
    }

    /// URL to actually request for `target`
    pub fn wrap(&self, target: &str) -> String {
        match &self.prefix {
            Some(prefix) => format!("{}{}", prefix, encode_component(target)),
            None => target.to_string(),
        }
    }
}

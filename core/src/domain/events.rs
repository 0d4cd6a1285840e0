// Copyright (c) 2026 Suporte ao Franqueado
// SPDX-License-Identifier: AGPL-3.0

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::form::{Authorization, FormStatus};

/// Events emitted by the access request workflow so a presentation layer
/// can follow asynchronous results without polling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FormEvent {
    StatusChanged {
        from: FormStatus,
        to: FormStatus,
        changed_at: DateTime<Utc>,
    },
    AuthorizationChanged {
        authorization: Authorization,
        changed_at: DateTime<Utc>,
    },
    UnitsLoaded {
        count: usize,
        loaded_at: DateTime<Utc>,
    },
    /// A lookup finished after a newer one started, or after the email changed
    StaleLookupDiscarded {
        email: String,
        discarded_at: DateTime<Utc>,
    },
    RequestSubmitted {
        person_id: String,
        unit_id: String,
        submitted_at: DateTime<Utc>,
    },
    SubmissionFailed {
        reason: String,
        failed_at: DateTime<Utc>,
    },
    FormReset {
        reset_at: DateTime<Utc>,
    },
}

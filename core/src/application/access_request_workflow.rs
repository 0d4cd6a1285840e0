// Copyright (c) 2026 Suporte ao Franqueado
// SPDX-License-Identifier: AGPL-3.0
//! Access Request Workflow
//!
//! Owns the form state, drives validation-on-blur against the directory,
//! derives the authorization status, gates submission and reconciles
//! asynchronous results into the UI-facing status.
//!
//! # Architecture
//!
//! - **Layer:** Application Layer
//! - **Purpose:** Implements the form state machine
//!
//! State lives behind a mutex that is never held across an `.await`. Each
//! email lookup is fenced by a sequence number and the email that triggered
//! it, so a slow lookup can never overwrite the result of a newer one.

use std::sync::Arc;

use chrono::Utc;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::domain::directory::{sort_units_for_display, DirectoryService, RemoteUnit, ValidationResult};
use crate::domain::events::FormEvent;
use crate::domain::form::{
    is_valid_email, unit_name_for, with_country_code, Authorization, FormField, FormState,
    FormStatus, COUNTRY_CODE,
};
use crate::domain::submission::{AccessRequest, SubmissionService};
use crate::infrastructure::event_bus::{FormEventBus, FormEventReceiver};

/// Read-only view of the workflow handed to the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormSnapshot {
    pub form: FormState,
    pub status: FormStatus,
    pub authorization: Authorization,
    /// An email lookup is in flight
    pub validating: bool,
    pub loading_units: bool,
    pub units: Vec<RemoteUnit>,
}

/// What happened to an email blur
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlurOutcome {
    /// Empty or malformed email: no lookup, authorization reset to unknown
    InvalidEmail,
    /// Lookup result applied; carries the resulting status
    Applied(FormStatus),
    /// A newer lookup or an email edit superseded this one
    Stale,
    /// Lookup failed; status is `Error`
    Failed,
    /// A submission is in flight; no lookup was started
    Busy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// A submission is already in flight
    AlreadySending,
    /// Profile is incomplete; only a fresh email validation can unblock it
    Blocked,
    /// An email lookup is still in flight
    StillValidating,
    /// Not authorized; status moved to `Unauthorized`
    Unauthorized,
    /// Required fields are blank; nothing was sent
    MissingFields(Vec<FormField>),
    /// Delivered; carries the confirmation token
    Submitted(String),
    /// Delivery failed; form kept for a retry
    Failed(String),
    /// The form was reset while the request was in flight
    Superseded,
}

#[derive(Debug, Default)]
struct LookupFence {
    latest: u64,
    in_flight: Option<u64>,
}

impl LookupFence {
    fn begin(&mut self) -> u64 {
        self.latest += 1;
        self.in_flight = Some(self.latest);
        self.latest
    }

    fn invalidate(&mut self) {
        self.latest += 1;
        self.in_flight = None;
    }

    /// Clears the in-flight marker if it still belongs to `seq`
    fn finish(&mut self, seq: u64) {
        if self.in_flight == Some(seq) {
            self.in_flight = None;
        }
    }
}

#[derive(Debug, Default)]
struct WorkflowState {
    form: FormState,
    status: FormStatus,
    authorization: Authorization,
    units: Vec<RemoteUnit>,
    loading_units: bool,
    lookup: LookupFence,
    submission_generation: u64,
}

pub struct AccessRequestWorkflow {
    directory: Arc<dyn DirectoryService>,
    submission: Arc<dyn SubmissionService>,
    event_bus: FormEventBus,
    state: Mutex<WorkflowState>,
}

impl AccessRequestWorkflow {
    pub fn new(directory: Arc<dyn DirectoryService>, submission: Arc<dyn SubmissionService>) -> Self {
        Self::with_event_bus(directory, submission, FormEventBus::with_default_capacity())
    }

    pub fn with_event_bus(
        directory: Arc<dyn DirectoryService>,
        submission: Arc<dyn SubmissionService>,
        event_bus: FormEventBus,
    ) -> Self {
        Self {
            directory,
            submission,
            event_bus,
            state: Mutex::new(WorkflowState::default()),
        }
    }

    pub fn subscribe(&self) -> FormEventReceiver {
        self.event_bus.subscribe()
    }

    pub fn snapshot(&self) -> FormSnapshot {
        let state = self.state.lock();
        FormSnapshot {
            form: state.form.clone(),
            status: state.status,
            authorization: state.authorization,
            validating: state.lookup.in_flight.is_some(),
            loading_units: state.loading_units,
            units: state.units.clone(),
        }
    }

    pub fn status(&self) -> FormStatus {
        self.state.lock().status
    }

    /// Fetch the unit list once. Failures leave the list empty.
    pub async fn load_units(&self) -> usize {
        self.state.lock().loading_units = true;

        let mut units = self.directory.list_units().await;
        sort_units_for_display(&mut units);
        let count = units.len();

        {
            let mut state = self.state.lock();
            state.form.unit_name = unit_name_for(&units, &state.form.unit_id);
            state.units = units;
            state.loading_units = false;
        }

        if count == 0 {
            warn!("No units loaded; unit selector will be empty");
        } else {
            info!(count, "Units loaded");
        }
        self.event_bus.publish(FormEvent::UnitsLoaded {
            count,
            loaded_at: Utc::now(),
        });
        count
    }

    /// Fire-and-forget unit load at workflow start
    pub fn spawn_unit_load(self: &Arc<Self>) -> JoinHandle<usize> {
        let workflow = Arc::clone(self);
        tokio::spawn(async move { workflow.load_units().await })
    }

    pub fn set_email(&self, email: impl Into<String>) {
        let mut state = self.state.lock();
        state.form.email = email.into();
        self.dismiss_banner(&mut state);
    }

    pub fn set_message(&self, message: impl Into<String>) {
        let mut state = self.state.lock();
        state.form.message = message.into();
        self.dismiss_banner(&mut state);
    }

    /// Select a unit; `unit_name` is recomputed, status is left alone.
    pub fn select_unit(&self, unit_id: impl Into<String>) {
        let mut state = self.state.lock();
        let unit_id = unit_id.into();
        state.form.unit_name = unit_name_for(&state.units, &unit_id);
        state.form.unit_id = unit_id;
    }

    /// The email field lost focus: validate it against the directory.
    pub async fn blur_email(&self) -> BlurOutcome {
        let (seq, email) = {
            let mut state = self.state.lock();
            if state.status == FormStatus::Sending {
                return BlurOutcome::Busy;
            }
            let email = state.form.email.trim().to_string();
            if email.is_empty() || !is_valid_email(&email) {
                debug!("Email failed the shape check; skipping lookup");
                self.set_authorization(&mut state, Authorization::Unknown);
                return BlurOutcome::InvalidEmail;
            }
            let seq = state.lookup.begin();
            self.transition(&mut state, FormStatus::Validating);
            (seq, email)
        };

        let result = self.directory.resolve_person(&email).await;

        let mut state = self.state.lock();
        let superseded = state.lookup.latest != seq;
        let email_changed = state.form.email.trim() != email;
        state.lookup.finish(seq);

        if superseded || email_changed {
            debug!(email = %email, superseded, email_changed, "Discarding stale person lookup");
            if !superseded && state.status == FormStatus::Validating {
                self.transition(&mut state, FormStatus::Idle);
            }
            self.event_bus.publish(FormEvent::StaleLookupDiscarded {
                email,
                discarded_at: Utc::now(),
            });
            return BlurOutcome::Stale;
        }

        match result {
            Ok(validation) => {
                let status = self.apply_validation(&mut state, validation);
                BlurOutcome::Applied(status)
            }
            Err(e) => {
                warn!(email = %email, error = %e, "Validation error");
                self.transition(&mut state, FormStatus::Error);
                BlurOutcome::Failed
            }
        }
    }

    fn apply_validation(&self, state: &mut WorkflowState, validation: ValidationResult) -> FormStatus {
        let ValidationResult {
            is_franchisee,
            phone,
            id,
            business_name,
        } = validation;

        match (is_franchisee, phone) {
            (false, _) => {
                state.form.person_id.clear();
                state.form.business_name.clear();
                self.set_authorization(state, Authorization::Denied);
                self.transition(state, FormStatus::Unauthorized);
            }
            (true, None) => {
                state.form.person_id.clear();
                state.form.business_name = business_name.unwrap_or_default();
                state.form.phone = COUNTRY_CODE.to_string();
                self.set_authorization(state, Authorization::Denied);
                self.transition(state, FormStatus::Incomplete);
            }
            (true, Some(phone)) => {
                state.form.person_id = id.unwrap_or_default();
                state.form.business_name = business_name.unwrap_or_default();
                state.form.phone = with_country_code(&phone);
                self.set_authorization(state, Authorization::Authorized);
                self.transition(state, FormStatus::Idle);
            }
        }

        info!(
            status = %state.status,
            person_id = %state.form.person_id,
            "Email validation applied"
        );
        state.status
    }

    /// Submit the request. Exactly one downstream call per accepted submit.
    pub async fn submit(&self) -> SubmitOutcome {
        let (request, generation) = {
            let mut state = self.state.lock();
            if state.status == FormStatus::Sending {
                debug!("Submit ignored: already sending");
                return SubmitOutcome::AlreadySending;
            }
            if state.lookup.in_flight.is_some() {
                return SubmitOutcome::StillValidating;
            }
            if !state.authorization.is_authorized() || state.form.person_id.is_empty() {
                if state.status == FormStatus::Incomplete {
                    return SubmitOutcome::Blocked;
                }
                self.transition(&mut state, FormStatus::Unauthorized);
                return SubmitOutcome::Unauthorized;
            }
            let missing = state.form.missing_fields();
            if !missing.is_empty() {
                return SubmitOutcome::MissingFields(missing);
            }
            self.transition(&mut state, FormStatus::Sending);
            (AccessRequest::from(&state.form), state.submission_generation)
        };

        let result = self.submission.submit(&request).await;

        let mut state = self.state.lock();
        if state.submission_generation != generation || state.status != FormStatus::Sending {
            debug!("Form reset while submission was in flight; dropping its outcome");
            return SubmitOutcome::Superseded;
        }

        match result {
            Ok(token) => {
                state.form = FormState::default();
                state.lookup.invalidate();
                self.set_authorization(&mut state, Authorization::Unknown);
                self.transition(&mut state, FormStatus::Success);
                self.event_bus.publish(FormEvent::RequestSubmitted {
                    person_id: request.person_id,
                    unit_id: request.unit_id,
                    submitted_at: Utc::now(),
                });
                SubmitOutcome::Submitted(token)
            }
            Err(e) => {
                warn!(error = %e, "Submission failed; form kept for retry");
                self.transition(&mut state, FormStatus::Error);
                let reason = e.to_string();
                self.event_bus.publish(FormEvent::SubmissionFailed {
                    reason: reason.clone(),
                    failed_at: Utc::now(),
                });
                SubmitOutcome::Failed(reason)
            }
        }
    }

    /// Clear the form and return to `Idle` from any state
    pub fn reset(&self) {
        let mut state = self.state.lock();
        state.form = FormState::default();
        state.lookup.invalidate();
        state.submission_generation += 1;
        self.set_authorization(&mut state, Authorization::Unknown);
        self.transition(&mut state, FormStatus::Idle);
        self.event_bus.publish(FormEvent::FormReset { reset_at: Utc::now() });
    }

    /// Editing dismisses result banners. `Incomplete` stays until a fresh
    /// validation; in-progress states stay until their call completes.
    fn dismiss_banner(&self, state: &mut WorkflowState) {
        if matches!(
            state.status,
            FormStatus::Unauthorized | FormStatus::Error | FormStatus::Success
        ) {
            self.transition(state, FormStatus::Idle);
        }
    }

    fn transition(&self, state: &mut WorkflowState, to: FormStatus) {
        let from = state.status;
        if from == to {
            return;
        }
        state.status = to;
        debug!(%from, %to, "Form status changed");
        self.event_bus.publish(FormEvent::StatusChanged {
            from,
            to,
            changed_at: Utc::now(),
        });
    }

    fn set_authorization(&self, state: &mut WorkflowState, authorization: Authorization) {
        if state.authorization == authorization {
            return;
        }
        state.authorization = authorization;
        self.event_bus.publish(FormEvent::AuthorizationChanged {
            authorization,
            changed_at: Utc::now(),
        });
    }
}

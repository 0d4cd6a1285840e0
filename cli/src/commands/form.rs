// Copyright (c) 2026 Suporte ao Franqueado
// SPDX-License-Identifier: AGPL-3.0

//! Interactive access request form
//!
//! Walks the requester through email validation, unit selection and the
//! request message, then submits once. A failed submission can be retried
//! with the form kept intact.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input, Select};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

use access_request_core::application::{create_workflow, AccessRequestWorkflow, BlurOutcome, SubmitOutcome};
use access_request_core::domain::directory::RemoteUnit;
use access_request_core::domain::events::FormEvent;
use access_request_core::domain::form::{FormField, FormStatus};
use access_request_core::infrastructure::event_bus::{EventBusError, FormEventReceiver};

use crate::render::{self, field_label};

#[derive(Args, Default)]
pub struct FormArgs {
    /// Pre-fill the corporate email
    #[arg(long, value_name = "EMAIL")]
    pub email: Option<String>,

    /// Skip the initial notice
    #[arg(long)]
    pub quiet: bool,
}

pub async fn execute(args: FormArgs, config_override: Option<PathBuf>) -> Result<()> {
    let config = super::load_config(config_override)?;
    let workflow = create_workflow(&config.spec)?;
    tokio::spawn(log_events(workflow.subscribe()));

    let units = workflow.spawn_unit_load();

    println!("{}", render::TITLE.bold());
    println!("{}", render::SUBTITLE.dimmed());
    println!();
    if !args.quiet {
        println!("{} {}", "ATENÇÃO:".yellow().bold(), render::NOTICE.yellow());
        println!();
    }

    let theme = ColorfulTheme::default();

    if !validate_email(&workflow, &theme, args.email).await? {
        return Ok(());
    }

    units.await.context("Unit loading task failed")?;
    let snapshot = workflow.snapshot();
    println!("{}: {}", "WhatsApp".bold(), snapshot.form.phone);

    let Some(unit) = choose_unit(&theme, &snapshot.units)? else {
        println!("{}", "Nenhuma unidade disponível no momento. Tente novamente mais tarde.".red());
        return Ok(());
    };
    workflow.select_unit(unit.id.clone());

    let message: String = Input::with_theme(&theme)
        .with_prompt(field_label(FormField::Message))
        .interact_text()?;
    workflow.set_message(message);

    submit_until_done(&workflow, &theme).await
}

/// Prompt and validate until the email is authorized. `false` means the
/// requester gave up.
async fn validate_email(
    workflow: &AccessRequestWorkflow,
    theme: &ColorfulTheme,
    mut prefill: Option<String>,
) -> Result<bool> {
    loop {
        let email = match prefill.take() {
            Some(email) => email,
            None => Input::<String>::with_theme(theme)
                .with_prompt(field_label(FormField::Email))
                .with_initial_text(workflow.snapshot().form.email)
                .interact_text()?,
        };
        workflow.set_email(email);

        render::print_status(FormStatus::Validating);
        let outcome = workflow.blur_email().await;
        debug!(?outcome, "Email blur handled");

        if let Some(hint) = render::blur_hint(&outcome) {
            println!("{}", hint.yellow());
            continue;
        }
        render::print_status(workflow.status());

        if outcome == BlurOutcome::Applied(FormStatus::Idle) {
            let snapshot = workflow.snapshot();
            println!(
                "{} {}",
                "✓".green(),
                format!("Franqueado identificado: {}", snapshot.form.business_name).green()
            );
            return Ok(true);
        }

        let retry = Confirm::with_theme(theme)
            .with_prompt("Tentar com outro e-mail?")
            .default(true)
            .interact()?;
        if !retry {
            return Ok(false);
        }
    }
}

/// Labels for the unit selector, in display order
pub fn unit_items(units: &[RemoteUnit]) -> Vec<String> {
    units.iter().map(|u| u.business_name.clone()).collect()
}

fn choose_unit<'a>(theme: &ColorfulTheme, units: &'a [RemoteUnit]) -> Result<Option<&'a RemoteUnit>> {
    if units.is_empty() {
        return Ok(None);
    }
    let items = unit_items(units);
    let index = Select::with_theme(theme)
        .with_prompt(field_label(FormField::Unit))
        .items(&items)
        .default(0)
        .interact()?;
    Ok(units.get(index))
}

async fn submit_until_done(workflow: &Arc<AccessRequestWorkflow>, theme: &ColorfulTheme) -> Result<()> {
    loop {
        render::print_status(FormStatus::Sending);
        let outcome = workflow.submit().await;

        if let Some(hint) = render::submit_hint(&outcome) {
            println!("{}", hint.yellow());
        }

        match outcome {
            SubmitOutcome::Submitted(token) => {
                info!(confirmation = %token, "Access request submitted");
                render::print_status(FormStatus::Success);
                println!("  {}", "Verifique seu celular".cyan());
                return Ok(());
            }
            SubmitOutcome::Failed(_) => {
                render::print_status(FormStatus::Error);
                let retry = Confirm::with_theme(theme)
                    .with_prompt("Tentar novamente?")
                    .default(true)
                    .interact()?;
                if !retry {
                    workflow.reset();
                    return Ok(());
                }
            }
            _ => {
                render::print_status(workflow.status());
                return Ok(());
            }
        }
    }
}

async fn log_events(mut events: FormEventReceiver) {
    loop {
        match events.recv().await {
            Ok(FormEvent::StatusChanged { from, to, .. }) => {
                debug!(%from, %to, "Status changed");
            }
            Ok(event) => debug!(?event, "Form event"),
            Err(EventBusError::Lagged(_)) => continue,
            Err(_) => break,
        }
    }
}

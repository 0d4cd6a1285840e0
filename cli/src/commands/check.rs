// Copyright (c) 2026 Suporte ao Franqueado
// SPDX-License-Identifier: AGPL-3.0

//! `check <email>`: run the email validation step without submitting

use anyhow::Result;
use colored::Colorize;
use std::path::PathBuf;

use access_request_core::application::{create_workflow, BlurOutcome};
use access_request_core::domain::form::FormStatus;

use crate::render;

pub async fn execute(email: String, config_override: Option<PathBuf>) -> Result<()> {
    let config = super::load_config(config_override)?;
    let workflow = create_workflow(&config.spec)?;

    workflow.set_email(email.clone());
    let outcome = workflow.blur_email().await;

    if let Some(hint) = render::blur_hint(&outcome) {
        println!("{}", hint.yellow());
        return Ok(());
    }

    let snapshot = workflow.snapshot();
    println!("{}: {}", "E-mail".bold(), email.trim());
    render::print_status(snapshot.status);

    if outcome == BlurOutcome::Applied(FormStatus::Idle) {
        println!("{}", "✓ Acesso liberado para solicitação".green());
    }
    if !snapshot.form.business_name.is_empty() {
        println!("  Cadastro: {}", snapshot.form.business_name);
    }
    if !snapshot.form.person_id.is_empty() {
        println!("  ID: {}", snapshot.form.person_id);
    }
    println!("  WhatsApp: {}", snapshot.form.phone);

    Ok(())
}

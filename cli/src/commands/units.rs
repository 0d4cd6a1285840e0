// Copyright (c) 2026 Suporte ao Franqueado
// SPDX-License-Identifier: AGPL-3.0

//! `units`: list the active units offered in the form

use anyhow::Result;
use colored::Colorize;
use std::path::PathBuf;

use access_request_core::application::create_workflow;

pub async fn execute(config_override: Option<PathBuf>) -> Result<()> {
    let config = super::load_config(config_override)?;
    let workflow = create_workflow(&config.spec)?;

    let count = workflow.load_units().await;
    if count == 0 {
        println!("{}", "Nenhuma unidade encontrada.".yellow());
        return Ok(());
    }

    let units = workflow.snapshot().units;
    let width = units.iter().map(|u| u.id.len()).max().unwrap_or(0);
    println!("{}", format!("{} unidades ativas:", count).bold());
    for unit in &units {
        println!("  {}  {}", format!("{:>width$}", unit.id).dimmed(), unit.business_name);
    }

    Ok(())
}

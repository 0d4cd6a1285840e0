// Copyright (c) 2026 Suporte ao Franqueado
// SPDX-License-Identifier: AGPL-3.0

//! Terminal rendering of workflow status
//!
//! Text shown to the requester is Brazilian Portuguese, matching the
//! franchisee support channel it feeds.

use access_request_core::application::{BlurOutcome, SubmitOutcome};
use access_request_core::domain::form::{FormField, FormStatus};
use colored::{ColoredString, Colorize};

pub const TITLE: &str = "Inclusão de Acesso";
pub const SUBTITLE: &str = "Sugestão de Planos";
pub const NOTICE: &str = "SOMENTE FRANQUEADOS PODEM SOLICITAR A LIBERAÇÃO DESTE ACESSO.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Progress,
    Success,
    Warning,
    Failure,
}

/// Message block shown for a non-idle status
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
    pub tone: Tone,
    pub title: &'static str,
    pub detail: Option<&'static str>,
}

impl Banner {
    pub fn plain(&self) -> String {
        match self.detail {
            Some(detail) => format!("{}\n{}", self.title, detail),
            None => self.title.to_string(),
        }
    }

    fn paint(&self, text: &str) -> ColoredString {
        match self.tone {
            Tone::Progress => text.dimmed(),
            Tone::Success => text.green(),
            Tone::Warning => text.yellow(),
            Tone::Failure => text.red(),
        }
    }

    pub fn print(&self) {
        let marker = match self.tone {
            Tone::Progress => "…",
            Tone::Success => "✓",
            Tone::Warning => "!",
            Tone::Failure => "✗",
        };
        println!("{}", self.paint(&format!("{} {}", marker, self.title)).bold());
        if let Some(detail) = self.detail {
            println!("  {}", self.paint(detail));
        }
    }
}

pub fn banner(status: FormStatus) -> Option<Banner> {
    let banner = match status {
        FormStatus::Idle => return None,
        FormStatus::Validating => Banner {
            tone: Tone::Progress,
            title: "Validando e-mail...",
            detail: None,
        },
        FormStatus::Sending => Banner {
            tone: Tone::Progress,
            title: "Enviando solicitação...",
            detail: None,
        },
        FormStatus::Success => Banner {
            tone: Tone::Success,
            title: "Solicitação Recebida!",
            detail: Some(
                "Sua solicitação foi processada com sucesso. \
                 Uma confirmação foi encaminhada agora mesmo via WhatsApp.",
            ),
        },
        FormStatus::Error => Banner {
            tone: Tone::Failure,
            title: "Ocorreu um erro ao processar seu envio. Por favor, tente novamente.",
            detail: None,
        },
        FormStatus::Unauthorized => Banner {
            tone: Tone::Warning,
            title: "Acesso restrito: Perfil de Franqueado não identificado.",
            detail: None,
        },
        FormStatus::Incomplete => Banner {
            tone: Tone::Warning,
            title: "Cadastro Incompleto",
            detail: Some(
                "O seu cadastro está incompleto no sistema (telefone não encontrado). \
                 Sendo assim, você deve abrir um chamado para atualizar seus dados antes de prosseguir.",
            ),
        },
    };
    Some(banner)
}

pub fn print_status(status: FormStatus) {
    if let Some(banner) = banner(status) {
        banner.print();
    }
}

pub fn field_label(field: FormField) -> &'static str {
    match field {
        FormField::Email => "E-mail Corporativo",
        FormField::Unit => "Sua Unidade",
        FormField::Message => "Sua Solicitação",
    }
}

pub fn missing_fields_message(fields: &[FormField]) -> String {
    let labels: Vec<&str> = fields.iter().copied().map(field_label).collect();
    format!("Preencha os campos obrigatórios: {}", labels.join(", "))
}

/// One-line hint for blur outcomes that have no status banner
pub fn blur_hint(outcome: &BlurOutcome) -> Option<&'static str> {
    match outcome {
        BlurOutcome::InvalidEmail => Some("Informe um e-mail válido (exemplo@unidade.com.br)."),
        BlurOutcome::Busy => Some("Aguarde o envio em andamento."),
        BlurOutcome::Stale => Some("O e-mail mudou durante a validação; validando novamente."),
        BlurOutcome::Applied(_) | BlurOutcome::Failed => None,
    }
}

/// One-line hint for submit outcomes that have no status banner
pub fn submit_hint(outcome: &SubmitOutcome) -> Option<String> {
    match outcome {
        SubmitOutcome::AlreadySending => Some("Envio já em andamento.".to_string()),
        SubmitOutcome::StillValidating => Some("Aguarde a validação do e-mail.".to_string()),
        SubmitOutcome::MissingFields(fields) => Some(missing_fields_message(fields)),
        SubmitOutcome::Superseded => Some("Formulário limpo antes da confirmação do envio.".to_string()),
        SubmitOutcome::Blocked
        | SubmitOutcome::Unauthorized
        | SubmitOutcome::Submitted(_)
        | SubmitOutcome::Failed(_) => None,
    }
}

/// Hide all but the first characters of a literal secret; `env:` references are shown as is
pub fn mask_secret(value: &str) -> String {
    if value.is_empty() {
        return "(not set)".to_string();
    }
    if value.starts_with("env:") {
        return value.to_string();
    }
    let visible: String = value.chars().take(4).collect();
    format!("{visible}****")
}

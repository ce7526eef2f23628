// --- File: crates/bora_common/src/models.rs ---
//! Domain status vocabularies shared across feature crates.
//!
//! The document workflow is the one piece of this system that is easy to get
//! wrong with ad hoc string comparisons, so the vocabulary and the allowed
//! transitions live here as typed enums. Every status mutation in the
//! repositories and handlers goes through [`DocumentoStatus::can_transition_to`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Review/apostille/translation workflow states for an uploaded documento.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum DocumentoStatus {
    Pending,
    Analyzing,
    WaitingApostille,
    AnalyzingApostille,
    WaitingTranslationQuote,
    WaitingQuoteApproval,
    WaitingTranslation,
    AnalyzingTranslation,
    Approved,
    Rejected,
}

impl DocumentoStatus {
    /// The wire/database representation, identical to the serde form.
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentoStatus::Pending => "PENDING",
            DocumentoStatus::Analyzing => "ANALYZING",
            DocumentoStatus::WaitingApostille => "WAITING_APOSTILLE",
            DocumentoStatus::AnalyzingApostille => "ANALYZING_APOSTILLE",
            DocumentoStatus::WaitingTranslationQuote => "WAITING_TRANSLATION_QUOTE",
            DocumentoStatus::WaitingQuoteApproval => "WAITING_QUOTE_APPROVAL",
            DocumentoStatus::WaitingTranslation => "WAITING_TRANSLATION",
            DocumentoStatus::AnalyzingTranslation => "ANALYZING_TRANSLATION",
            DocumentoStatus::Approved => "APPROVED",
            DocumentoStatus::Rejected => "REJECTED",
        }
    }

    /// States a documento in `self` may move to.
    pub fn allowed_transitions(&self) -> &'static [DocumentoStatus] {
        use DocumentoStatus::*;
        match self {
            Pending => &[Analyzing],
            Analyzing => &[WaitingApostille, WaitingTranslationQuote, Approved, Rejected],
            WaitingApostille => &[AnalyzingApostille],
            AnalyzingApostille => &[WaitingTranslationQuote, Approved, Rejected],
            WaitingTranslationQuote => &[WaitingQuoteApproval],
            WaitingQuoteApproval => &[WaitingTranslation, Rejected],
            WaitingTranslation => &[AnalyzingTranslation],
            AnalyzingTranslation => &[Approved, Rejected],
            // Re-upload after rejection restarts the flow
            Rejected => &[Pending],
            Approved => &[],
        }
    }

    pub fn can_transition_to(&self, next: DocumentoStatus) -> bool {
        self.allowed_transitions().contains(&next)
    }

    /// Terminal success state.
    pub fn is_final(&self) -> bool {
        matches!(self, DocumentoStatus::Approved)
    }
}

impl fmt::Display for DocumentoStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentoStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(DocumentoStatus::Pending),
            "ANALYZING" => Ok(DocumentoStatus::Analyzing),
            "WAITING_APOSTILLE" => Ok(DocumentoStatus::WaitingApostille),
            "ANALYZING_APOSTILLE" => Ok(DocumentoStatus::AnalyzingApostille),
            "WAITING_TRANSLATION_QUOTE" => Ok(DocumentoStatus::WaitingTranslationQuote),
            "WAITING_QUOTE_APPROVAL" => Ok(DocumentoStatus::WaitingQuoteApproval),
            "WAITING_TRANSLATION" => Ok(DocumentoStatus::WaitingTranslation),
            "ANALYZING_TRANSLATION" => Ok(DocumentoStatus::AnalyzingTranslation),
            "APPROVED" => Ok(DocumentoStatus::Approved),
            "REJECTED" => Ok(DocumentoStatus::Rejected),
            other => Err(format!("unknown documento status: {other}")),
        }
    }
}

/// Lifecycle of a translation quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum OrcamentoStatus {
    AguardandoAprovacao,
    Aprovado,
    Pago,
    Rejeitado,
}

impl OrcamentoStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrcamentoStatus::AguardandoAprovacao => "aguardando_aprovacao",
            OrcamentoStatus::Aprovado => "aprovado",
            OrcamentoStatus::Pago => "pago",
            OrcamentoStatus::Rejeitado => "rejeitado",
        }
    }

    pub fn allowed_transitions(&self) -> &'static [OrcamentoStatus] {
        use OrcamentoStatus::*;
        match self {
            AguardandoAprovacao => &[Aprovado, Rejeitado],
            Aprovado => &[Pago],
            Pago => &[],
            Rejeitado => &[],
        }
    }

    pub fn can_transition_to(&self, next: OrcamentoStatus) -> bool {
        self.allowed_transitions().contains(&next)
    }
}

impl fmt::Display for OrcamentoStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrcamentoStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "aguardando_aprovacao" => Ok(OrcamentoStatus::AguardandoAprovacao),
            "aprovado" => Ok(OrcamentoStatus::Aprovado),
            "pago" => Ok(OrcamentoStatus::Pago),
            "rejeitado" => Ok(OrcamentoStatus::Rejeitado),
            other => Err(format!("unknown orcamento status: {other}")),
        }
    }
}

/// Lifecycle of a commercial appointment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum AgendamentoStatus {
    PendentePagamento,
    Confirmado,
    Cancelado,
}

impl AgendamentoStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgendamentoStatus::PendentePagamento => "pendente_pagamento",
            AgendamentoStatus::Confirmado => "confirmado",
            AgendamentoStatus::Cancelado => "cancelado",
        }
    }
}

impl fmt::Display for AgendamentoStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AgendamentoStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pendente_pagamento" => Ok(AgendamentoStatus::PendentePagamento),
            "confirmado" => Ok(AgendamentoStatus::Confirmado),
            "cancelado" => Ok(AgendamentoStatus::Cancelado),
            other => Err(format!("unknown agendamento status: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_DOC_STATUSES: [DocumentoStatus; 10] = [
        DocumentoStatus::Pending,
        DocumentoStatus::Analyzing,
        DocumentoStatus::WaitingApostille,
        DocumentoStatus::AnalyzingApostille,
        DocumentoStatus::WaitingTranslationQuote,
        DocumentoStatus::WaitingQuoteApproval,
        DocumentoStatus::WaitingTranslation,
        DocumentoStatus::AnalyzingTranslation,
        DocumentoStatus::Approved,
        DocumentoStatus::Rejected,
    ];

    #[test]
    fn upload_review_happy_path() {
        use DocumentoStatus::*;
        let path = [
            Pending,
            Analyzing,
            WaitingApostille,
            AnalyzingApostille,
            WaitingTranslationQuote,
            WaitingQuoteApproval,
            WaitingTranslation,
            AnalyzingTranslation,
            Approved,
        ];
        for pair in path.windows(2) {
            assert!(
                pair[0].can_transition_to(pair[1]),
                "{} -> {} should be allowed",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn approved_is_terminal() {
        for next in ALL_DOC_STATUSES {
            assert!(!DocumentoStatus::Approved.can_transition_to(next));
        }
        assert!(DocumentoStatus::Approved.is_final());
    }

    #[test]
    fn rejected_allows_reupload_only() {
        assert_eq!(
            DocumentoStatus::Rejected.allowed_transitions(),
            &[DocumentoStatus::Pending]
        );
    }

    #[test]
    fn no_skipping_review_stages() {
        use DocumentoStatus::*;
        assert!(!Pending.can_transition_to(Approved));
        assert!(!Pending.can_transition_to(WaitingTranslation));
        assert!(!Pending.can_transition_to(Rejected));
        assert!(!WaitingApostille.can_transition_to(Approved));
        assert!(!WaitingTranslationQuote.can_transition_to(WaitingTranslation));
        // A payment landing late must not pull a rejected documento back in.
        assert!(!Rejected.can_transition_to(WaitingTranslation));
    }

    #[test]
    fn status_roundtrips_through_strings() {
        for status in ALL_DOC_STATUSES {
            assert_eq!(status.as_str().parse::<DocumentoStatus>(), Ok(status));
        }
        assert!("TRANSLATING".parse::<DocumentoStatus>().is_err());
    }

    #[test]
    fn orcamento_flow() {
        use OrcamentoStatus::*;
        assert!(AguardandoAprovacao.can_transition_to(Aprovado));
        assert!(AguardandoAprovacao.can_transition_to(Rejeitado));
        assert!(Aprovado.can_transition_to(Pago));
        assert!(!Pago.can_transition_to(AguardandoAprovacao));
        assert!(!Rejeitado.can_transition_to(Aprovado));
        // Quotes are born awaiting approval; there is no earlier state.
        assert!("pendente".parse::<OrcamentoStatus>().is_err());
    }
}

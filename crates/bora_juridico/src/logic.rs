// --- File: crates/bora_juridico/src/logic.rs ---
//! Review-queue rules: processo status vocabulary and the documento
//! transition check applied before any status write.

use crate::error::JuridicoError;
use bora_common::DocumentoStatus;

/// Lifecycle states of a processo. Unlike documentos these have no ordering
/// constraints; a case can be reopened or archived at any point.
pub const PROCESSO_STATUSES: &[&str] = &["aberto", "em_andamento", "concluido", "arquivado"];

pub fn validate_processo_status(status: &str) -> Result<(), JuridicoError> {
    if PROCESSO_STATUSES.contains(&status) {
        Ok(())
    } else {
        Err(JuridicoError::InvalidStatus(status.to_string()))
    }
}

/// Checks a requested documento transition against the state machine.
pub fn check_transition(current: &str, requested: DocumentoStatus) -> Result<(), JuridicoError> {
    let from: DocumentoStatus = current
        .parse()
        .map_err(|_| JuridicoError::InvalidStatus(current.to_string()))?;

    if from.can_transition_to(requested) {
        Ok(())
    } else {
        let allowed = from
            .allowed_transitions()
            .iter()
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        Err(JuridicoError::InvalidTransition {
            from: from.as_str().to_string(),
            to: requested.as_str().to_string(),
            allowed: if allowed.is_empty() {
                "none".to_string()
            } else {
                allowed
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bora_common::DocumentoStatus::*;

    #[test]
    fn review_can_start_on_pending_documents() {
        assert!(check_transition("PENDING", Analyzing).is_ok());
    }

    #[test]
    fn rejected_documents_only_go_back_to_pending() {
        assert!(check_transition("REJECTED", Pending).is_ok());
        assert!(check_transition("REJECTED", Approved).is_err());
        assert!(check_transition("REJECTED", Analyzing).is_err());
    }

    #[test]
    fn approved_is_terminal() {
        let err = check_transition("APPROVED", Analyzing).unwrap_err();
        assert!(matches!(err, JuridicoError::InvalidTransition { .. }));
        assert!(err.to_string().contains("none"));
    }

    #[test]
    fn unknown_status_string_is_a_validation_error() {
        assert!(matches!(
            check_transition("DRAFT", Analyzing),
            Err(JuridicoError::InvalidStatus(_))
        ));
    }

    #[test]
    fn processo_status_vocabulary() {
        assert!(validate_processo_status("em_andamento").is_ok());
        assert!(validate_processo_status("EM_ANDAMENTO").is_err());
        assert!(validate_processo_status("fechado").is_err());
    }
}

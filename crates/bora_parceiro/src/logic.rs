// --- File: crates/bora_parceiro/src/logic.rs ---
//! Validation for partner registration and incoming leads.

use crate::error::ParceiroError;

pub const MIN_COMISSAO_PERCENT: i64 = 0;
pub const MAX_COMISSAO_PERCENT: i64 = 100;

pub fn validate_email(email: &str) -> Result<(), ParceiroError> {
    let email = email.trim();
    if email.is_empty() || !email.contains('@') || email.starts_with('@') || email.ends_with('@') {
        return Err(ParceiroError::ValidationError(format!(
            "'{email}' is not a valid email address"
        )));
    }
    Ok(())
}

pub fn validate_parceiro(
    nome: &str,
    email: &str,
    percentual_comissao: i64,
) -> Result<(), ParceiroError> {
    if nome.trim().is_empty() {
        return Err(ParceiroError::ValidationError(
            "nome is required".to_string(),
        ));
    }
    validate_email(email)?;
    if !(MIN_COMISSAO_PERCENT..=MAX_COMISSAO_PERCENT).contains(&percentual_comissao) {
        return Err(ParceiroError::ValidationError(format!(
            "percentual_comissao must be between {MIN_COMISSAO_PERCENT} and {MAX_COMISSAO_PERCENT}"
        )));
    }
    Ok(())
}

pub fn validate_lead(nome: &str, email: &str) -> Result<(), ParceiroError> {
    if nome.trim().is_empty() {
        return Err(ParceiroError::ValidationError(
            "nome is required".to_string(),
        ));
    }
    validate_email(email)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_a_sane_parceiro() {
        assert!(validate_parceiro("Despachante Silva", "silva@exemplo.com", 10).is_ok());
    }

    #[test]
    fn rejects_bad_emails() {
        assert!(validate_email("").is_err());
        assert!(validate_email("sem-arroba").is_err());
        assert!(validate_email("@começa.com").is_err());
        assert!(validate_email("termina@").is_err());
    }

    #[test]
    fn rejects_commission_out_of_bounds() {
        assert!(validate_parceiro("P", "p@x.com", -1).is_err());
        assert!(validate_parceiro("P", "p@x.com", 101).is_err());
        assert!(validate_parceiro("P", "p@x.com", 0).is_ok());
        assert!(validate_parceiro("P", "p@x.com", 100).is_ok());
    }

    #[test]
    fn rejects_nameless_lead() {
        assert!(validate_lead("  ", "lead@exemplo.com").is_err());
        assert!(validate_lead("Maria", "lead@exemplo.com").is_ok());
    }
}

// --- File: crates/bora_cliente/src/logic.rs ---
//! Intake and upload validation rules.

use crate::error::ClienteError;
use bora_common::DocumentoStatus;

/// Upload cap. Supabase free-tier buckets reject anything larger anyway.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Content types the review team can actually open.
pub const ALLOWED_CONTENT_TYPES: &[&str] = &[
    "application/pdf",
    "image/jpeg",
    "image/png",
    "image/webp",
];

pub fn validate_cadastro(nome: &str, email: &str) -> Result<(), ClienteError> {
    if nome.trim().is_empty() {
        return Err(ClienteError::ValidationError(
            "nome must not be empty".to_string(),
        ));
    }
    validate_email(email)
}

pub fn validate_email(email: &str) -> Result<(), ClienteError> {
    let trimmed = email.trim();
    let valid = trimmed.len() >= 5
        && trimmed.contains('@')
        && !trimmed.starts_with('@')
        && !trimmed.ends_with('@')
        && trimmed.rsplit('@').next().is_some_and(|d| d.contains('.'));
    if valid {
        Ok(())
    } else {
        Err(ClienteError::ValidationError(format!(
            "'{email}' is not a valid email address"
        )))
    }
}

pub fn validate_upload(content_type: &str, size: usize) -> Result<(), ClienteError> {
    if size == 0 {
        return Err(ClienteError::ValidationError(
            "uploaded file is empty".to_string(),
        ));
    }
    if size > MAX_UPLOAD_BYTES {
        return Err(ClienteError::UploadTooLarge {
            size,
            max: MAX_UPLOAD_BYTES,
        });
    }
    if !ALLOWED_CONTENT_TYPES.contains(&content_type) {
        return Err(ClienteError::UnsupportedContentType(
            content_type.to_string(),
        ));
    }
    Ok(())
}

/// A documento may only be removed while it still sits in the intake queue.
/// Once review starts it can own quotes and reviewer notes.
pub fn ensure_removable(status: DocumentoStatus) -> Result<(), ClienteError> {
    if status == DocumentoStatus::Pending {
        Ok(())
    } else {
        Err(ClienteError::RemovalBlocked(status.as_str().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_normal_email() {
        assert!(validate_email("maria@example.com").is_ok());
        assert!(validate_email("jose.silva@boraexpandir.com.br").is_ok());
    }

    #[test]
    fn rejects_malformed_emails() {
        assert!(validate_email("").is_err());
        assert!(validate_email("semarroba").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("maria@").is_err());
        assert!(validate_email("maria@semponto").is_err());
    }

    #[test]
    fn cadastro_requires_nome() {
        assert!(validate_cadastro("  ", "maria@example.com").is_err());
        assert!(validate_cadastro("Maria", "maria@example.com").is_ok());
    }

    #[test]
    fn removal_only_while_pending() {
        assert!(ensure_removable(DocumentoStatus::Pending).is_ok());
        for status in [
            DocumentoStatus::Analyzing,
            DocumentoStatus::WaitingQuoteApproval,
            DocumentoStatus::Rejected,
            DocumentoStatus::Approved,
        ] {
            assert!(matches!(
                ensure_removable(status),
                Err(ClienteError::RemovalBlocked(_))
            ));
        }
    }

    #[test]
    fn upload_limits_enforced() {
        assert!(validate_upload("application/pdf", 1024).is_ok());
        assert!(validate_upload("application/pdf", 0).is_err());
        assert!(matches!(
            validate_upload("application/pdf", MAX_UPLOAD_BYTES + 1),
            Err(ClienteError::UploadTooLarge { .. })
        ));
        assert!(matches!(
            validate_upload("application/zip", 1024),
            Err(ClienteError::UnsupportedContentType(_))
        ));
    }
}

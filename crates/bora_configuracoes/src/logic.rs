// --- File: crates/bora_configuracoes/src/logic.rs ---
//! Validation for settings updates.
//!
//! Updates are partial, so each rule runs against the value the row would
//! hold after the update, merging the patch over the current settings.

use crate::error::ConfiguracoesError;
use bora_db::repositories::configuracoes::{Configuracoes, UpdateConfiguracoes};
use chrono::NaiveTime;

pub const MIN_MARKUP_PERCENT: i64 = 0;
pub const MAX_MARKUP_PERCENT: i64 = 100;

fn parse_hhmm(value: &str) -> Result<NaiveTime, ConfiguracoesError> {
    NaiveTime::parse_from_str(value, "%H:%M").map_err(|_| {
        ConfiguracoesError::ValidationError(format!("'{value}' is not a HH:MM time"))
    })
}

fn validate_dias_uteis(dias_uteis: &str) -> Result<(), ConfiguracoesError> {
    let mut any = false;
    for part in dias_uteis.split(',') {
        let day: u32 = part.trim().parse().map_err(|_| {
            ConfiguracoesError::ValidationError(format!(
                "'{part}' is not an ISO weekday number"
            ))
        })?;
        if !(1..=7).contains(&day) {
            return Err(ConfiguracoesError::ValidationError(format!(
                "weekday {day} is outside 1..=7"
            )));
        }
        any = true;
    }
    if !any {
        return Err(ConfiguracoesError::ValidationError(
            "dias_uteis must name at least one weekday".to_string(),
        ));
    }
    Ok(())
}

pub fn validate_update(
    current: &Configuracoes,
    update: &UpdateConfiguracoes,
) -> Result<(), ConfiguracoesError> {
    let markup = update.markup_percent.unwrap_or(current.markup_percent);
    if !(MIN_MARKUP_PERCENT..=MAX_MARKUP_PERCENT).contains(&markup) {
        return Err(ConfiguracoesError::ValidationError(format!(
            "markup_percent must be between {MIN_MARKUP_PERCENT} and {MAX_MARKUP_PERCENT}"
        )));
    }

    if let Some(moeda) = &update.moeda {
        if moeda.len() != 3 || !moeda.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(ConfiguracoesError::ValidationError(format!(
                "'{moeda}' is not an uppercase ISO 4217 currency code"
            )));
        }
    }

    let inicio = parse_hhmm(
        update
            .horario_inicio
            .as_deref()
            .unwrap_or(&current.horario_inicio),
    )?;
    let fim = parse_hhmm(
        update
            .horario_fim
            .as_deref()
            .unwrap_or(&current.horario_fim),
    )?;
    if inicio >= fim {
        return Err(ConfiguracoesError::ValidationError(format!(
            "horario_inicio ({inicio}) must be before horario_fim ({fim})"
        )));
    }

    if let Some(dias_uteis) = &update.dias_uteis {
        validate_dias_uteis(dias_uteis)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn current() -> Configuracoes {
        Configuracoes {
            id: 1,
            markup_percent: 20,
            moeda: "BRL".to_string(),
            horario_inicio: "09:00".to_string(),
            horario_fim: "18:00".to_string(),
            dias_uteis: "1,2,3,4,5".to_string(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn empty_update_against_sane_row_passes() {
        assert!(validate_update(&current(), &UpdateConfiguracoes::default()).is_ok());
    }

    #[test]
    fn markup_bounds_are_inclusive() {
        for (markup, ok) in [(-1, false), (0, true), (100, true), (101, false)] {
            let update = UpdateConfiguracoes {
                markup_percent: Some(markup),
                ..Default::default()
            };
            assert_eq!(validate_update(&current(), &update).is_ok(), ok);
        }
    }

    #[test]
    fn inverted_hours_are_rejected_even_split_across_patch_and_row() {
        // Patch only moves the start past the stored end.
        let update = UpdateConfiguracoes {
            horario_inicio: Some("19:00".to_string()),
            ..Default::default()
        };
        assert!(validate_update(&current(), &update).is_err());

        let update = UpdateConfiguracoes {
            horario_inicio: Some("10:00".to_string()),
            horario_fim: Some("16:00".to_string()),
            ..Default::default()
        };
        assert!(validate_update(&current(), &update).is_ok());
    }

    #[test]
    fn bad_currency_codes_are_rejected() {
        for moeda in ["brl", "R$", "BRLX", ""] {
            let update = UpdateConfiguracoes {
                moeda: Some(moeda.to_string()),
                ..Default::default()
            };
            assert!(validate_update(&current(), &update).is_err(), "{moeda}");
        }
    }

    #[test]
    fn bad_weekday_lists_are_rejected() {
        for dias in ["", "0", "8", "1,x"] {
            let update = UpdateConfiguracoes {
                dias_uteis: Some(dias.to_string()),
                ..Default::default()
            };
            assert!(validate_update(&current(), &update).is_err(), "{dias}");
        }
        let update = UpdateConfiguracoes {
            dias_uteis: Some("6,7".to_string()),
            ..Default::default()
        };
        assert!(validate_update(&current(), &update).is_ok());
    }
}

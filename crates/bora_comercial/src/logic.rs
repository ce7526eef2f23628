// --- File: crates/bora_comercial/src/logic.rs ---
//! Slot calculation for the commercial team's availability.
//!
//! Working hours and weekdays come from the `configuracoes` table and are
//! interpreted in UTC. Candidate slots are stepped through each working
//! window; a slot survives if it fits inside the window, starts in the
//! future, and clears every busy period plus the configured buffer.

use crate::error::ComercialError;
use bora_db::repositories::configuracoes::Configuracoes;
use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc};

/// Longest date range a single availability query may span.
pub const MAX_RANGE_DAYS: i64 = 62;

#[derive(Debug, Clone, PartialEq)]
pub struct WorkingHours {
    pub start: NaiveTime,
    pub end: NaiveTime,
    /// ISO weekday numbers, 1 = Monday .. 7 = Sunday.
    pub weekdays: Vec<u32>,
}

/// A bookable interval, inclusive start / exclusive end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    pub inicio: DateTime<Utc>,
    pub fim: DateTime<Utc>,
}

pub fn parse_hhmm(value: &str) -> Result<NaiveTime, ComercialError> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .map_err(|_| ComercialError::ValidationError(format!("'{value}' is not a HH:MM time")))
}

/// Builds the working-hours window from the stored settings.
pub fn working_hours(settings: &Configuracoes) -> Result<WorkingHours, ComercialError> {
    let start = parse_hhmm(&settings.horario_inicio)?;
    let end = parse_hhmm(&settings.horario_fim)?;
    if start >= end {
        return Err(ComercialError::ValidationError(format!(
            "working hours start ({start}) must be before end ({end})"
        )));
    }

    let mut weekdays = Vec::new();
    for part in settings.dias_uteis.split(',') {
        let day: u32 = part.trim().parse().map_err(|_| {
            ComercialError::ValidationError(format!("'{part}' is not an ISO weekday number"))
        })?;
        if !(1..=7).contains(&day) {
            return Err(ComercialError::ValidationError(format!(
                "weekday {day} is outside 1..=7"
            )));
        }
        weekdays.push(day);
    }
    if weekdays.is_empty() {
        return Err(ComercialError::ValidationError(
            "dias_uteis must name at least one weekday".to_string(),
        ));
    }

    Ok(WorkingHours {
        start,
        end,
        weekdays,
    })
}

/// Bounds-checks an availability query's date range.
pub fn validate_date_range(start_date: NaiveDate, end_date: NaiveDate) -> Result<(), ComercialError> {
    if end_date < start_date {
        return Err(ComercialError::ValidationError(
            "end_date must not be before start_date".to_string(),
        ));
    }
    if (end_date - start_date).num_days() > MAX_RANGE_DAYS {
        return Err(ComercialError::ValidationError(format!(
            "date range exceeds {MAX_RANGE_DAYS} days"
        )));
    }
    Ok(())
}

/// Resolves the requested consultation length against the configured default.
pub fn booking_duration(
    requested_minutes: Option<i64>,
    default_minutes: i64,
) -> Result<Duration, ComercialError> {
    let minutes = requested_minutes.unwrap_or(default_minutes);
    if minutes <= 0 {
        return Err(ComercialError::ValidationError(
            "duration_minutes must be positive".to_string(),
        ));
    }
    Ok(Duration::minutes(minutes))
}

/// Computes bookable slots between `start_date` and `end_date` (inclusive).
///
/// `busy` holds already-booked intervals; each is widened by `buffer` on both
/// sides before the overlap check. Slots starting before `now` are dropped.
#[allow(clippy::too_many_arguments)]
pub fn calculate_available_slots(
    start_date: NaiveDate,
    end_date: NaiveDate,
    duration: Duration,
    buffer: Duration,
    step: Duration,
    hours: &WorkingHours,
    busy: &[(DateTime<Utc>, DateTime<Utc>)],
    now: DateTime<Utc>,
) -> Vec<Slot> {
    let mut slots = Vec::new();
    if duration <= Duration::zero() || step <= Duration::zero() {
        return slots;
    }

    let mut date = start_date;
    while date <= end_date {
        if hours
            .weekdays
            .contains(&date.weekday().number_from_monday())
        {
            let window_start = date.and_time(hours.start).and_utc();
            let window_end = date.and_time(hours.end).and_utc();

            let mut candidate = window_start;
            while candidate + duration <= window_end {
                let slot_end = candidate + duration;
                let clear = candidate >= now
                    && !busy.iter().any(|(busy_start, busy_end)| {
                        candidate < *busy_end + buffer && slot_end > *busy_start - buffer
                    });
                if clear {
                    slots.push(Slot {
                        inicio: candidate,
                        fim: slot_end,
                    });
                }
                candidate += step;
            }
        }
        date += Duration::days(1);
    }

    slots
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn settings() -> Configuracoes {
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

    fn hours() -> WorkingHours {
        working_hours(&settings()).unwrap()
    }

    fn at(date: NaiveDate, h: u32, m: u32) -> DateTime<Utc> {
        Utc.from_utc_datetime(&date.and_hms_opt(h, m, 0).unwrap())
    }

    // 2026-09-07 is a Monday
    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 9, 7).unwrap()
    }

    fn sunday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 9, 6).unwrap()
    }

    fn distant_past() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn full_free_day_yields_expected_slot_count() {
        let slots = calculate_available_slots(
            monday(),
            monday(),
            Duration::minutes(30),
            Duration::zero(),
            Duration::minutes(30),
            &hours(),
            &[],
            distant_past(),
        );
        // 09:00..18:00 is 9 hours, 18 half-hour slots
        assert_eq!(slots.len(), 18);
        assert_eq!(slots[0].inicio, at(monday(), 9, 0));
        assert_eq!(slots.last().unwrap().fim, at(monday(), 18, 0));
    }

    #[test]
    fn non_working_days_are_skipped() {
        let slots = calculate_available_slots(
            sunday(),
            sunday(),
            Duration::minutes(30),
            Duration::zero(),
            Duration::minutes(30),
            &hours(),
            &[],
            distant_past(),
        );
        assert!(slots.is_empty());
    }

    #[test]
    fn busy_periods_block_overlapping_slots() {
        let busy = vec![(at(monday(), 10, 0), at(monday(), 11, 0))];
        let slots = calculate_available_slots(
            monday(),
            monday(),
            Duration::minutes(30),
            Duration::zero(),
            Duration::minutes(30),
            &hours(),
            &busy,
            distant_past(),
        );
        assert!(slots.iter().all(|s| s.fim <= busy[0].0 || s.inicio >= busy[0].1));
        // 18 total minus the two blocked half-hours
        assert_eq!(slots.len(), 16);
    }

    #[test]
    fn buffer_widens_busy_periods() {
        let busy = vec![(at(monday(), 10, 0), at(monday(), 11, 0))];
        let slots = calculate_available_slots(
            monday(),
            monday(),
            Duration::minutes(30),
            Duration::minutes(15),
            Duration::minutes(30),
            &hours(),
            &busy,
            distant_past(),
        );
        // 09:30-10:00 now collides with the widened interval, as does 11:00-11:30
        assert!(!slots.iter().any(|s| s.inicio == at(monday(), 9, 30)));
        assert!(!slots.iter().any(|s| s.inicio == at(monday(), 11, 0)));
        assert!(slots.iter().any(|s| s.inicio == at(monday(), 9, 0)));
        assert!(slots.iter().any(|s| s.inicio == at(monday(), 11, 30)));
    }

    #[test]
    fn past_slots_are_dropped() {
        let now = at(monday(), 12, 0);
        let slots = calculate_available_slots(
            monday(),
            monday(),
            Duration::minutes(30),
            Duration::zero(),
            Duration::minutes(30),
            &hours(),
            &[],
            now,
        );
        assert!(slots.iter().all(|s| s.inicio >= now));
        assert_eq!(slots.len(), 12);
    }

    #[test]
    fn slot_must_fit_inside_the_window() {
        let slots = calculate_available_slots(
            monday(),
            monday(),
            Duration::minutes(50),
            Duration::zero(),
            Duration::minutes(30),
            &hours(),
            &[],
            distant_past(),
        );
        assert!(slots.iter().all(|s| s.fim <= at(monday(), 18, 0)));
    }

    #[test]
    fn date_range_bounds_are_enforced() {
        assert!(validate_date_range(monday(), monday()).is_ok());
        assert!(validate_date_range(monday(), sunday()).is_err());
        assert!(validate_date_range(monday(), monday() + Duration::days(MAX_RANGE_DAYS)).is_ok());
        assert!(
            validate_date_range(monday(), monday() + Duration::days(MAX_RANGE_DAYS + 1)).is_err()
        );
    }

    #[test]
    fn booking_duration_falls_back_and_rejects_nonpositive() {
        assert_eq!(booking_duration(None, 30).unwrap(), Duration::minutes(30));
        assert_eq!(booking_duration(Some(45), 30).unwrap(), Duration::minutes(45));
        assert!(booking_duration(Some(0), 30).is_err());
        assert!(booking_duration(Some(-15), 30).is_err());
    }

    #[test]
    fn working_hours_rejects_bad_settings() {
        let mut s = settings();
        s.horario_inicio = "18:00".to_string();
        s.horario_fim = "09:00".to_string();
        assert!(working_hours(&s).is_err());

        let mut s = settings();
        s.dias_uteis = "1,8".to_string();
        assert!(working_hours(&s).is_err());

        let mut s = settings();
        s.horario_inicio = "9am".to_string();
        assert!(working_hours(&s).is_err());
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn slots_never_overlap_busy_periods(
                busy_start_min in 0i64..=480,
                busy_len_min in 15i64..=120,
                duration_min in (1i64..=12).prop_map(|n| n * 15),
            ) {
                let day = monday();
                let base = at(day, 9, 0);
                let busy = vec![(
                    base + Duration::minutes(busy_start_min),
                    base + Duration::minutes(busy_start_min + busy_len_min),
                )];

                let slots = calculate_available_slots(
                    day,
                    day,
                    Duration::minutes(duration_min),
                    Duration::zero(),
                    Duration::minutes(15),
                    &hours(),
                    &busy,
                    distant_past(),
                );

                for slot in slots {
                    prop_assert!(slot.fim <= busy[0].0 || slot.inicio >= busy[0].1);
                }
            }

            #[test]
            fn slots_respect_working_window(duration_min in (1i64..=16).prop_map(|n| n * 15)) {
                let day = monday();
                let slots = calculate_available_slots(
                    day,
                    day,
                    Duration::minutes(duration_min),
                    Duration::zero(),
                    Duration::minutes(15),
                    &hours(),
                    &[],
                    distant_past(),
                );

                for slot in slots {
                    prop_assert!(slot.inicio >= at(day, 9, 0));
                    prop_assert!(slot.fim <= at(day, 18, 0));
                    prop_assert_eq!(slot.fim - slot.inicio, Duration::minutes(duration_min));
                }
            }
        }
    }
}

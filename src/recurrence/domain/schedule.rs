//! Pure recurrence date arithmetic.
//!
//! Everything here is deterministic over its inputs: callers supply the
//! current time where a rule depends on it, so the functions stay trivially
//! unit-testable and safe to share across concurrent operations.

use super::{Cadence, RecurrenceRuleError, ScheduleError, TaskRecord};
use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc, Weekday};

/// Smallest accepted occurrence count for [`generate_occurrences`].
pub const MIN_OCCURRENCES: usize = 1;
/// Largest accepted occurrence count for [`generate_occurrences`].
pub const MAX_OCCURRENCES: usize = 100;
/// Iteration ceiling guarding [`occurrences_in_period`] against degenerate
/// inputs.
pub const MAX_PERIOD_OCCURRENCES: usize = 1000;

/// Grace period a recurring task's due date may trail the current time by.
const DUE_DATE_GRACE: Duration = Duration::days(1);

/// Computes the occurrence following `base` for the given cadence.
///
/// Daily adds one calendar day and weekly adds seven. Monthly advances the
/// month while preserving the day-of-month, clamping to the last day of
/// shorter target months (Jan 31 maps to Feb 28, or Feb 29 in leap years).
/// The time of day is preserved in all cases.
///
/// # Errors
///
/// Returns [`ScheduleError::UnsupportedCadence`] for [`Cadence::None`] and
/// [`ScheduleError::DateOverflow`] when the result leaves the representable
/// date range.
pub fn next_occurrence(
    base: DateTime<Utc>,
    cadence: Cadence,
) -> Result<DateTime<Utc>, ScheduleError> {
    match cadence {
        Cadence::None => Err(ScheduleError::UnsupportedCadence(cadence)),
        Cadence::Daily => base
            .checked_add_signed(Duration::days(1))
            .ok_or(ScheduleError::DateOverflow),
        Cadence::Weekly => base
            .checked_add_signed(Duration::days(7))
            .ok_or(ScheduleError::DateOverflow),
        Cadence::Monthly => add_one_month(base),
    }
}

/// Produces `count` consecutive occurrences strictly after `start`.
///
/// Each date is the prior one advanced through [`next_occurrence`], so the
/// result is strictly increasing.
///
/// # Errors
///
/// Returns [`ScheduleError::CountOutOfRange`] when `count` is outside
/// 1 to 100, and propagates [`next_occurrence`] failures.
pub fn generate_occurrences(
    start: DateTime<Utc>,
    cadence: Cadence,
    count: usize,
) -> Result<Vec<DateTime<Utc>>, ScheduleError> {
    if !(MIN_OCCURRENCES..=MAX_OCCURRENCES).contains(&count) {
        return Err(ScheduleError::CountOutOfRange(count));
    }
    let mut occurrences = Vec::with_capacity(count);
    let mut cursor = start;
    for _ in 0..count {
        cursor = next_occurrence(cursor, cadence)?;
        occurrences.push(cursor);
    }
    Ok(occurrences)
}

/// Checks whether a task is eligible for occurrence generation.
///
/// A [`Cadence::None`] task is always valid and simply never generates.
/// Otherwise the task must carry a due date no more than one day before
/// `now`, and must not itself be a subtask: recurrence and the hierarchical
/// parent relation are mutually exclusive.
///
/// # Errors
///
/// Returns the violated [`RecurrenceRuleError`] rule.
pub fn validate_recurrence_rules(
    task: &TaskRecord,
    now: DateTime<Utc>,
) -> Result<(), RecurrenceRuleError> {
    if !task.cadence().is_recurring() {
        return Ok(());
    }
    let due = task.due().ok_or(RecurrenceRuleError::MissingDueDate)?;
    if due < now - DUE_DATE_GRACE {
        return Err(RecurrenceRuleError::StaleDueDate(due));
    }
    if task.parent().is_some() {
        return Err(RecurrenceRuleError::RecurrenceOnSubtask);
    }
    Ok(())
}

/// Enumerates occurrences strictly after `start`, up to and including `end`.
///
/// # Errors
///
/// Returns [`ScheduleError::EmptyPeriod`] when `end <= start`,
/// [`ScheduleError::PeriodOverflow`] when enumeration would exceed
/// [`MAX_PERIOD_OCCURRENCES`], and propagates [`next_occurrence`] failures.
pub fn occurrences_in_period(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    cadence: Cadence,
) -> Result<Vec<DateTime<Utc>>, ScheduleError> {
    if end <= start {
        return Err(ScheduleError::EmptyPeriod);
    }
    let mut occurrences = Vec::new();
    let mut cursor = next_occurrence(start, cadence)?;
    while cursor <= end {
        if occurrences.len() >= MAX_PERIOD_OCCURRENCES {
            return Err(ScheduleError::PeriodOverflow(MAX_PERIOD_OCCURRENCES));
        }
        occurrences.push(cursor);
        cursor = next_occurrence(cursor, cadence)?;
    }
    Ok(occurrences)
}

/// Returns `true` when the date falls on a Saturday or Sunday.
#[must_use]
pub fn is_weekend(date: DateTime<Utc>) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Shifts a weekend date forward to the following Monday.
///
/// Weekday inputs are returned unchanged. Callers opt into business-day
/// shifting explicitly; the generation path never applies it.
///
/// # Errors
///
/// Returns [`ScheduleError::DateOverflow`] when the shift leaves the
/// representable date range.
pub fn shift_to_weekday(date: DateTime<Utc>) -> Result<DateTime<Utc>, ScheduleError> {
    let days_ahead = match date.weekday() {
        Weekday::Sat => 2,
        Weekday::Sun => 1,
        _ => return Ok(date),
    };
    date.checked_add_signed(Duration::days(days_ahead))
        .ok_or(ScheduleError::DateOverflow)
}

/// Advances `base` by one month, clamping the day-of-month to the target
/// month's length and preserving the time of day.
fn add_one_month(base: DateTime<Utc>) -> Result<DateTime<Utc>, ScheduleError> {
    let date = base.date_naive();
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    let day = date.day().min(days_in_month(year, month));
    NaiveDate::from_ymd_opt(year, month, day)
        .map(|next| next.and_time(base.time()).and_utc())
        .ok_or(ScheduleError::DateOverflow)
}

/// Returns the number of days in the given month.
fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first| first.pred_opt())
        .map_or(28, |last| last.day())
}

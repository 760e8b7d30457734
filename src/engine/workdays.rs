use chrono::{Datelike, NaiveDate, Weekday};

use crate::error::EngineError;

/// Counts working days in [start, end], inclusive of both endpoints.
/// Saturdays and Sundays are excluded; no holiday calendar is consulted.
/// Pure and deterministic.
pub fn count_working_days(start: NaiveDate, end: NaiveDate) -> Result<i64, EngineError> {
    if end < start {
        return Err(EngineError::InvalidRange);
    }

    let mut days = 0;
    let mut day = start;
    while day <= end {
        if !matches!(day.weekday(), Weekday::Sat | Weekday::Sun) {
            days += 1;
        }
        day = day.succ_opt().ok_or(EngineError::InvalidRange)?;
    }
    Ok(days)
}

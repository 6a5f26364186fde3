use crate::models::{CalendarDay, CalendarMonth, DayStatus, HabitEntry};
use crate::stats::first_of_month;
use chrono::{Datelike, Duration, NaiveDate};
use std::collections::HashMap;

/// Six full weeks, Sunday first.
pub const GRID_CELLS: usize = 42;

/// Builds the month grid for `year`/`month` (zero-based), starting on the
/// Sunday on or before the first. Returns `None` for an invalid month or
/// when the six weeks would run past the range of representable dates.
pub fn calendar_month(
    year: i32,
    month: u32,
    entries: &[HabitEntry],
    today: NaiveDate,
) -> Option<CalendarMonth> {
    let first = first_of_month(year, month)?;
    let start = first.checked_sub_signed(Duration::days(i64::from(first.weekday().num_days_from_sunday())))?;
    start.checked_add_signed(Duration::days(GRID_CELLS as i64 - 1))?;
    let recorded: HashMap<NaiveDate, bool> = entries
        .iter()
        .map(|entry| (entry.date, entry.completed))
        .collect();

    let days = start
        .iter_days()
        .take(GRID_CELLS)
        .map(|date| CalendarDay {
            date,
            day_number: date.day(),
            is_current_month: date.year() == first.year() && date.month() == first.month(),
            is_today: date == today,
            status: classify_day(date, recorded.get(&date).copied(), today),
        })
        .collect();

    Some(CalendarMonth {
        year,
        month,
        label: first.format("%B %Y").to_string(),
        days,
    })
}

/// Status of one day given its entry, if any.
pub fn classify_day(date: NaiveDate, completed: Option<bool>, today: NaiveDate) -> DayStatus {
    match completed {
        Some(true) => DayStatus::Completed,
        Some(false) => DayStatus::Missed,
        None if date > today => DayStatus::Future,
        None => DayStatus::Pending,
    }
}

/// Previous and next `(year, month)` pairs, month zero-based.
pub fn month_navigation(year: i32, month: u32) -> ((i32, u32), (i32, u32)) {
    let previous = if month == 0 { (year - 1, 11) } else { (year, month - 1) };
    let next = if month >= 11 { (year + 1, 0) } else { (year, month + 1) };
    (previous, next)
}

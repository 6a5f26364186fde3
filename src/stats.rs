//! Streak and completion analytics over a habit's entry log.
//!
//! Everything here is a pure function of the entries passed in plus an
//! explicit reference date. Entries may arrive in any order.

use crate::models::{HabitEntry, HabitStats};
use chrono::{Datelike, Months, NaiveDate};
use std::collections::BTreeMap;

/// Current, longest and this-month figures for `today`.
pub fn habit_stats(entries: &[HabitEntry], today: NaiveDate) -> HabitStats {
    HabitStats {
        current_streak: current_streak(entries, today),
        longest_streak: longest_streak(entries),
        monthly_completions: monthly_completion_count(entries, today.year(), today.month0()),
    }
}

/// Consecutive completed days ending at today, or at yesterday when today
/// has no completed entry yet.
pub fn current_streak(entries: &[HabitEntry], today: NaiveDate) -> u32 {
    let days = completion_by_date(entries);
    let completed_on = |date: NaiveDate| days.get(&date).copied().unwrap_or(false);

    let mut cursor = if completed_on(today) {
        Some(today)
    } else {
        today.pred_opt()
    };

    let mut streak = 0;
    while let Some(date) = cursor {
        if !completed_on(date) {
            break;
        }
        streak += 1;
        cursor = date.pred_opt();
    }
    streak
}

/// Longest run of completed entries on consecutive calendar dates.
///
/// An explicit miss zeroes the run. A gap with no records at all restarts
/// the run at the next completed entry.
pub fn longest_streak(entries: &[HabitEntry]) -> u32 {
    let mut best = 0;
    let mut run = 0;
    let mut previous: Option<NaiveDate> = None;

    for (&date, &completed) in &completion_by_date(entries) {
        if completed {
            run = match previous {
                Some(prev) if prev.succ_opt() == Some(date) => run + 1,
                _ => 1,
            };
            best = best.max(run);
            previous = Some(date);
        } else {
            run = 0;
            previous = None;
        }
    }

    best
}

/// Completed entries dated within the given month. `month` is zero-based.
pub fn monthly_completion_count(entries: &[HabitEntry], year: i32, month: u32) -> u32 {
    let (Some(first), Some(last)) = (first_of_month(year, month), last_of_month(year, month)) else {
        return 0;
    };

    let count = entries
        .iter()
        .filter(|entry| entry.completed && (first..=last).contains(&entry.date))
        .count();
    u32::try_from(count).unwrap_or(u32::MAX)
}

/// `None` when `month` (zero-based) is outside 0..=11.
pub fn first_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month.checked_add(1)?, 1)
}

pub fn last_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    first_of_month(year, month)?
        .checked_add_months(Months::new(1))?
        .pred_opt()
}

// Later entries win if a caller passes duplicates for one date.
fn completion_by_date(entries: &[HabitEntry]) -> BTreeMap<NaiveDate, bool> {
    entries
        .iter()
        .map(|entry| (entry.date, entry.completed))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn entry(date: NaiveDate, completed: bool) -> HabitEntry {
        HabitEntry {
            habit_id: 1,
            date,
            completed,
        }
    }

    fn run_ending(end: NaiveDate, len: i64) -> Vec<HabitEntry> {
        (0..len)
            .map(|offset| entry(end - Duration::days(offset), true))
            .collect()
    }

    #[test]
    fn empty_history_scores_zero() {
        let today = day(2024, 5, 10);
        assert_eq!(current_streak(&[], today), 0);
        assert_eq!(longest_streak(&[]), 0);
        assert_eq!(monthly_completion_count(&[], 2024, 4), 0);
        assert_eq!(habit_stats(&[], today), HabitStats::default());
    }

    #[test]
    fn current_streak_counts_today_when_completed() {
        let today = day(2024, 5, 10);
        let entries = run_ending(today, 4);
        assert_eq!(current_streak(&entries, today), 4);
    }

    #[test]
    fn current_streak_gives_grace_until_end_of_today() {
        let d = day(2024, 5, 10);
        let entries = run_ending(d, 3);
        assert_eq!(current_streak(&entries, d), 3);
        assert_eq!(current_streak(&entries, d + Duration::days(1)), 3);
    }

    #[test]
    fn current_streak_ignores_todays_miss_but_not_yesterdays() {
        let today = day(2024, 5, 10);
        let mut entries = run_ending(today - Duration::days(1), 2);
        entries.push(entry(today, false));
        assert_eq!(current_streak(&entries, today), 2);

        let entries = vec![
            entry(today - Duration::days(2), true),
            entry(today - Duration::days(1), false),
        ];
        assert_eq!(current_streak(&entries, today), 0);
    }

    #[test]
    fn current_streak_stops_at_first_missing_day() {
        let today = day(2024, 5, 10);
        let mut entries = run_ending(today, 2);
        entries.extend(run_ending(today - Duration::days(3), 5));
        assert_eq!(current_streak(&entries, today), 2);
    }

    #[test]
    fn current_streak_is_zero_when_last_completion_is_older_than_yesterday() {
        let today = day(2024, 5, 10);
        let entries = run_ending(today - Duration::days(2), 6);
        assert_eq!(current_streak(&entries, today), 0);
    }

    #[test]
    fn current_streak_walks_across_month_and_year_boundaries() {
        let today = day(2024, 1, 2);
        let entries = run_ending(today, 5);
        assert_eq!(current_streak(&entries, today), 5);
    }

    #[test]
    fn order_of_input_does_not_matter() {
        let today = day(2024, 5, 10);
        let mut entries = run_ending(today, 6);
        entries.push(entry(today - Duration::days(6), false));
        entries.reverse();
        entries.swap(0, 3);
        assert_eq!(current_streak(&entries, today), 6);
        assert_eq!(longest_streak(&entries), 6);
    }

    #[test]
    fn longest_streak_breaks_on_missing_day() {
        let mut entries: Vec<_> = (1..=5).map(|d| entry(day(2024, 1, d), true)).collect();
        entries.push(entry(day(2024, 1, 7), true));
        assert_eq!(longest_streak(&entries), 5);
    }

    #[test]
    fn explicit_miss_resets_and_next_day_starts_fresh_run() {
        let entries = vec![
            entry(day(2024, 2, 1), true),
            entry(day(2024, 2, 2), true),
            entry(day(2024, 2, 3), false),
            entry(day(2024, 2, 4), true),
        ];
        assert_eq!(longest_streak(&entries), 2);

        let mut later = entries.clone();
        later.extend((5..=7).map(|d| entry(day(2024, 2, d), true)));
        assert_eq!(longest_streak(&later), 4);
    }

    #[test]
    fn longest_streak_spans_leap_day() {
        let entries: Vec<_> = [(2, 28), (2, 29), (3, 1)]
            .into_iter()
            .map(|(m, d)| entry(day(2024, m, d), true))
            .collect();
        assert_eq!(longest_streak(&entries), 3);
    }

    #[test]
    fn longest_is_at_least_current() {
        let today = day(2024, 5, 10);
        let mut entries = run_ending(today, 3);
        entries.extend(run_ending(today - Duration::days(10), 7));
        entries.push(entry(today - Duration::days(5), false));
        let current = current_streak(&entries, today);
        let longest = longest_streak(&entries);
        assert_eq!(current, 3);
        assert_eq!(longest, 7);
        assert!(longest >= current);
    }

    #[test]
    fn monthly_count_uses_zero_based_month_and_inclusive_bounds() {
        let entries = vec![
            entry(day(2024, 3, 1), true),
            entry(day(2024, 3, 15), false),
            entry(day(2024, 3, 31), true),
            entry(day(2024, 4, 1), true),
        ];
        assert_eq!(monthly_completion_count(&entries, 2024, 2), 2);
        assert_eq!(monthly_completion_count(&entries, 2024, 3), 1);
        assert_eq!(monthly_completion_count(&entries, 2023, 2), 0);
        assert_eq!(monthly_completion_count(&entries, 2024, 12), 0);
    }

    #[test]
    fn month_bounds() {
        assert_eq!(first_of_month(2024, 0), Some(day(2024, 1, 1)));
        assert_eq!(last_of_month(2024, 1), Some(day(2024, 2, 29)));
        assert_eq!(last_of_month(2023, 1), Some(day(2023, 2, 28)));
        assert_eq!(last_of_month(2024, 11), Some(day(2024, 12, 31)));
        assert_eq!(first_of_month(2024, 12), None);
        assert_eq!(last_of_month(2024, u32::MAX), None);
    }

    #[test]
    fn habit_stats_uses_todays_month() {
        let today = day(2024, 4, 2);
        let entries = vec![
            entry(day(2024, 3, 30), true),
            entry(day(2024, 3, 31), true),
            entry(day(2024, 4, 1), true),
        ];
        let stats = habit_stats(&entries, today);
        assert_eq!(
            stats,
            HabitStats {
                current_streak: 3,
                longest_streak: 3,
                monthly_completions: 1,
            }
        );
    }
}

use super::StoreError;
use crate::models::{Habit, HabitEntry, HabitId, HabitUpdate, NewHabit};
use crate::stats::{first_of_month, last_of_month};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

/// Habits and their entries. Entries are keyed by `(habit, date)` so a
/// date can only ever hold one record per habit.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "Snapshot", into = "Snapshot")]
pub struct StoreData {
    next_habit_id: HabitId,
    habits: BTreeMap<HabitId, Habit>,
    entries: BTreeMap<(HabitId, NaiveDate), bool>,
}

impl Default for StoreData {
    fn default() -> Self {
        Self {
            next_habit_id: 1,
            habits: BTreeMap::new(),
            entries: BTreeMap::new(),
        }
    }
}

impl StoreData {
    pub fn habits(&self) -> Vec<Habit> {
        self.habits.values().cloned().collect()
    }

    pub fn habit(&self, id: HabitId) -> Option<Habit> {
        self.habits.get(&id).cloned()
    }

    pub fn insert_habit(&mut self, new: NewHabit, created_at: NaiveDate) -> Habit {
        let id = self.next_habit_id;
        self.next_habit_id += 1;
        let habit = Habit {
            id,
            name: new.name,
            reminder_time: new.reminder_time,
            created_at,
        };
        self.habits.insert(id, habit.clone());
        habit
    }

    pub fn update_habit(&mut self, id: HabitId, update: HabitUpdate) -> Option<Habit> {
        let habit = self.habits.get_mut(&id)?;
        if let Some(name) = update.name {
            habit.name = name;
        }
        if let Some(reminder_time) = update.reminder_time {
            habit.reminder_time = reminder_time;
        }
        Some(habit.clone())
    }

    pub fn remove_habit(&mut self, id: HabitId) -> bool {
        self.entries.retain(|(habit_id, _), _| *habit_id != id);
        self.habits.remove(&id).is_some()
    }

    pub fn entries_for(&self, habit_id: HabitId) -> Vec<HabitEntry> {
        self.entries_between(habit_id, NaiveDate::MIN, NaiveDate::MAX)
    }

    pub fn entries_in_month(&self, habit_id: HabitId, year: i32, month: u32) -> Vec<HabitEntry> {
        match (first_of_month(year, month), last_of_month(year, month)) {
            (Some(first), Some(last)) => self.entries_between(habit_id, first, last),
            _ => Vec::new(),
        }
    }

    pub fn entry(&self, habit_id: HabitId, date: NaiveDate) -> Option<HabitEntry> {
        self.entries
            .get(&(habit_id, date))
            .map(|&completed| HabitEntry {
                habit_id,
                date,
                completed,
            })
    }

    pub fn upsert_entry(
        &mut self,
        habit_id: HabitId,
        date: NaiveDate,
        completed: bool,
    ) -> Result<HabitEntry, StoreError> {
        if !self.habits.contains_key(&habit_id) {
            return Err(StoreError::NotFound { habit_id });
        }
        self.entries.insert((habit_id, date), completed);
        Ok(HabitEntry {
            habit_id,
            date,
            completed,
        })
    }

    fn entries_between(&self, habit_id: HabitId, first: NaiveDate, last: NaiveDate) -> Vec<HabitEntry> {
        self.entries
            .range((habit_id, first)..=(habit_id, last))
            .map(|(&(habit_id, date), &completed)| HabitEntry {
                habit_id,
                date,
                completed,
            })
            .collect()
    }
}

/// On-disk shape: flat habit and entry rows.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Snapshot {
    #[serde(default)]
    next_habit_id: HabitId,
    #[serde(default)]
    habits: Vec<Habit>,
    #[serde(default)]
    entries: Vec<HabitEntry>,
}

impl From<Snapshot> for StoreData {
    fn from(snapshot: Snapshot) -> Self {
        let habits: BTreeMap<HabitId, Habit> = snapshot
            .habits
            .into_iter()
            .map(|habit| (habit.id, habit))
            .collect();

        let mut entries = BTreeMap::new();
        for entry in snapshot.entries {
            if !habits.contains_key(&entry.habit_id) {
                warn!(habit_id = entry.habit_id, date = %entry.date, "dropping entry for unknown habit");
                continue;
            }
            entries.insert((entry.habit_id, entry.date), entry.completed);
        }

        let after_last = habits.keys().next_back().map_or(1, |id| id + 1);
        Self {
            next_habit_id: snapshot.next_habit_id.max(after_last),
            habits,
            entries,
        }
    }
}

impl From<StoreData> for Snapshot {
    fn from(data: StoreData) -> Self {
        let entries = data
            .entries
            .into_iter()
            .map(|((habit_id, date), completed)| HabitEntry {
                habit_id,
                date,
                completed,
            })
            .collect();
        Self {
            next_habit_id: data.next_habit_id,
            habits: data.habits.into_values().collect(),
            entries,
        }
    }
}

use super::{HabitStore, StoreData, StoreError};
use crate::models::{Habit, HabitEntry, HabitId, HabitUpdate, NewHabit};
use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::RwLock;

/// Volatile store. Used by tests and when `HABIT_STORE=memory`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: RwLock<StoreData>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HabitStore for MemoryStore {
    async fn list_habits(&self) -> Result<Vec<Habit>, StoreError> {
        Ok(self.data.read().await.habits())
    }

    async fn get_habit(&self, id: HabitId) -> Result<Option<Habit>, StoreError> {
        Ok(self.data.read().await.habit(id))
    }

    async fn create_habit(&self, habit: NewHabit, created_at: NaiveDate) -> Result<Habit, StoreError> {
        Ok(self.data.write().await.insert_habit(habit, created_at))
    }

    async fn update_habit(&self, id: HabitId, update: HabitUpdate) -> Result<Option<Habit>, StoreError> {
        Ok(self.data.write().await.update_habit(id, update))
    }

    async fn delete_habit(&self, id: HabitId) -> Result<bool, StoreError> {
        Ok(self.data.write().await.remove_habit(id))
    }

    async fn fetch_all(&self, habit_id: HabitId) -> Result<Vec<HabitEntry>, StoreError> {
        Ok(self.data.read().await.entries_for(habit_id))
    }

    async fn fetch_by_month(&self, habit_id: HabitId, year: i32, month: u32) -> Result<Vec<HabitEntry>, StoreError> {
        Ok(self.data.read().await.entries_in_month(habit_id, year, month))
    }

    async fn get_by_date(&self, habit_id: HabitId, date: NaiveDate) -> Result<Option<HabitEntry>, StoreError> {
        Ok(self.data.read().await.entry(habit_id, date))
    }

    async fn upsert_entry(&self, habit_id: HabitId, date: NaiveDate, completed: bool) -> Result<HabitEntry, StoreError> {
        self.data.write().await.upsert_entry(habit_id, date, completed)
    }
}

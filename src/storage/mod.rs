//! Habit and entry persistence.
//!
//! [`HabitStore`] is the only interface the rest of the crate uses. Both
//! backends keep a [`StoreData`] behind one lock so that every operation,
//! including the habit delete cascade, is observed atomically.

mod data;
mod file;
mod memory;

pub use data::StoreData;
pub use file::JsonFileStore;
pub use memory::MemoryStore;

use crate::config::{Config, StoreKind};
use crate::models::{Habit, HabitEntry, HabitId, HabitUpdate, NewHabit};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("habit {habit_id} not found")]
    NotFound { habit_id: HabitId },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

#[async_trait]
pub trait HabitStore: Send + Sync {
    /// All habits, ordered by id.
    async fn list_habits(&self) -> Result<Vec<Habit>, StoreError>;

    async fn get_habit(&self, id: HabitId) -> Result<Option<Habit>, StoreError>;

    async fn create_habit(&self, habit: NewHabit, created_at: NaiveDate) -> Result<Habit, StoreError>;

    /// Applies name/reminder changes. `None` if the habit does not exist.
    async fn update_habit(&self, id: HabitId, update: HabitUpdate) -> Result<Option<Habit>, StoreError>;

    /// Removes the habit together with all of its entries.
    async fn delete_habit(&self, id: HabitId) -> Result<bool, StoreError>;

    /// Every entry for the habit, ascending by date.
    async fn fetch_all(&self, habit_id: HabitId) -> Result<Vec<HabitEntry>, StoreError>;

    /// Entries within one month (zero-based), ascending by date.
    async fn fetch_by_month(&self, habit_id: HabitId, year: i32, month: u32) -> Result<Vec<HabitEntry>, StoreError>;

    async fn get_by_date(&self, habit_id: HabitId, date: NaiveDate) -> Result<Option<HabitEntry>, StoreError>;

    /// Inserts the entry or overwrites `completed` on the existing one.
    async fn upsert_entry(&self, habit_id: HabitId, date: NaiveDate, completed: bool) -> Result<HabitEntry, StoreError>;
}

pub async fn open_store(config: &Config) -> Result<Arc<dyn HabitStore>, StoreError> {
    match config.store {
        StoreKind::Memory => {
            info!("using in-memory habit store");
            Ok(Arc::new(MemoryStore::new()))
        }
        StoreKind::File => {
            info!(path = %config.data_path.display(), "using json file habit store");
            Ok(Arc::new(JsonFileStore::open(config.data_path.clone()).await?))
        }
    }
}

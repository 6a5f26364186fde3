use super::{HabitStore, StoreData, StoreError};
use crate::models::{Habit, HabitEntry, HabitId, HabitUpdate, NewHabit};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::RwLock;
use tracing::{debug, error};

/// Store backed by a single JSON document, rewritten after every change.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    data: RwLock<StoreData>,
}

impl JsonFileStore {
    pub async fn open(path: PathBuf) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }
        let data = load_data(&path).await;
        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Runs `op` under the write lock and persists the result. If the write
    /// fails the in-memory state is restored.
    async fn mutate<T, F>(&self, op: F) -> Result<T, StoreError>
    where
        T: Send,
        F: FnOnce(&mut StoreData) -> Result<T, StoreError> + Send,
    {
        let mut data = self.data.write().await;
        // Snapshot to restore if the file cannot be written.
        let previous = data.clone();
        let result = op(&mut *data)?;
        if let Err(err) = persist_data(&self.path, &data).await {
            error!(path = %self.path.display(), "failed to persist habit data: {err}");
            *data = previous;
            return Err(err);
        }
        Ok(result)
    }
}

pub async fn load_data(path: &Path) -> StoreData {
    match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice(&bytes) {
            Ok(data) => data,
            Err(err) => {
                error!("failed to parse data file: {err}");
                StoreData::default()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => StoreData::default(),
        Err(err) => {
            error!("failed to read data file: {err}");
            StoreData::default()
        }
    }
}

/// Writes to a sibling temp file and renames it into place.
pub async fn persist_data(path: &Path, data: &StoreData) -> Result<(), StoreError> {
    let payload = serde_json::to_vec_pretty(data)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, payload).await?;
    fs::rename(&tmp, path).await?;
    debug!(path = %path.display(), "habit data persisted");
    Ok(())
}

#[async_trait]
impl HabitStore for JsonFileStore {
    async fn list_habits(&self) -> Result<Vec<Habit>, StoreError> {
        Ok(self.data.read().await.habits())
    }

    async fn get_habit(&self, id: HabitId) -> Result<Option<Habit>, StoreError> {
        Ok(self.data.read().await.habit(id))
    }

    async fn create_habit(&self, habit: NewHabit, created_at: NaiveDate) -> Result<Habit, StoreError> {
        self.mutate(|data| Ok(data.insert_habit(habit, created_at))).await
    }

    async fn update_habit(&self, id: HabitId, update: HabitUpdate) -> Result<Option<Habit>, StoreError> {
        if self.data.read().await.habit(id).is_none() {
            return Ok(None);
        }
        self.mutate(|data| Ok(data.update_habit(id, update))).await
    }

    async fn delete_habit(&self, id: HabitId) -> Result<bool, StoreError> {
        if self.data.read().await.habit(id).is_none() {
            return Ok(false);
        }
        self.mutate(|data| Ok(data.remove_habit(id))).await
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
        self.mutate(|data| data.upsert_entry(habit_id, date, completed)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unique_data_path() -> PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let mut path = std::env::temp_dir();
        path.push(format!("habit_store_{}_{}", std::process::id(), nanos));
        path.push("habits.json");
        path
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[tokio::test]
    async fn data_survives_reopen() {
        let path = unique_data_path();
        let store = JsonFileStore::open(path.clone()).await.unwrap();
        let habit = store
            .create_habit(
                NewHabit {
                    name: "Floss".to_string(),
                    reminder_time: None,
                },
                day(1),
            )
            .await
            .unwrap();
        store.upsert_entry(habit.id, day(2), true).await.unwrap();
        store.upsert_entry(habit.id, day(3), false).await.unwrap();
        drop(store);

        let reopened = JsonFileStore::open(path.clone()).await.unwrap();
        assert_eq!(reopened.path(), path.as_path());
        assert_eq!(reopened.get_habit(habit.id).await.unwrap(), Some(habit.clone()));
        let entries = reopened.fetch_all(habit.id).await.unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries[0].completed);
        assert!(!entries[1].completed);

        let next = reopened
            .create_habit(
                NewHabit {
                    name: "Stretch".to_string(),
                    reminder_time: None,
                },
                day(4),
            )
            .await
            .unwrap();
        assert_eq!(next.id, habit.id + 1);
    }

    #[tokio::test]
    async fn delete_cascade_is_persisted() {
        let path = unique_data_path();
        let store = JsonFileStore::open(path.clone()).await.unwrap();
        let habit = store
            .create_habit(
                NewHabit {
                    name: "Walk".to_string(),
                    reminder_time: None,
                },
                day(1),
            )
            .await
            .unwrap();
        store.upsert_entry(habit.id, day(1), true).await.unwrap();
        assert!(store.delete_habit(habit.id).await.unwrap());

        let reopened = JsonFileStore::open(path).await.unwrap();
        assert!(reopened.list_habits().await.unwrap().is_empty());
        assert!(reopened.fetch_all(habit.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn corrupt_file_starts_empty() {
        let path = unique_data_path();
        fs::create_dir_all(path.parent().unwrap()).await.unwrap();
        fs::write(&path, b"{ not json").await.unwrap();

        let store = JsonFileStore::open(path).await.unwrap();
        assert!(store.list_habits().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn failed_upsert_leaves_file_untouched() {
        let path = unique_data_path();
        let store = JsonFileStore::open(path.clone()).await.unwrap();
        let err = store.upsert_entry(1, day(1), true).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { habit_id: 1 }));
        assert!(!fs::try_exists(&path).await.unwrap());
    }

    #[tokio::test]
    async fn failed_write_restores_previous_state() {
        let path = unique_data_path();
        let store = JsonFileStore::open(path.clone()).await.unwrap();
        let habit = store
            .create_habit(
                NewHabit {
                    name: "Meditate".to_string(),
                    reminder_time: None,
                },
                day(1),
            )
            .await
            .unwrap();
        store.upsert_entry(habit.id, day(1), true).await.unwrap();

        // A directory at the data path makes the final rename fail.
        fs::remove_file(&path).await.unwrap();
        fs::create_dir(&path).await.unwrap();

        let err = store.upsert_entry(habit.id, day(2), true).await.unwrap_err();
        assert!(matches!(err, StoreError::Io(_)));
        let err = store.upsert_entry(habit.id, day(1), false).await.unwrap_err();
        assert!(matches!(err, StoreError::Io(_)));
        let err = store.delete_habit(habit.id).await.unwrap_err();
        assert!(matches!(err, StoreError::Io(_)));

        assert_eq!(store.list_habits().await.unwrap(), vec![habit.clone()]);
        let entries = store.fetch_all(habit.id).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].date, day(1));
        assert!(entries[0].completed);
    }

    #[tokio::test]
    async fn deleting_missing_habit_does_not_write() {
        let path = unique_data_path();
        let store = JsonFileStore::open(path.clone()).await.unwrap();
        assert!(!store.delete_habit(42).await.unwrap());
        assert!(!fs::try_exists(&path).await.unwrap());
    }
}

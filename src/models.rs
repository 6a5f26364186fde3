use chrono::{NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

pub type HabitId = u64;

pub const MAX_NAME_LEN: usize = 50;

/// Time of day a reminder would fire. Stored and echoed back only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReminderTime(NaiveTime);

impl ReminderTime {
    /// Accepts `HH:MM` or `HH:MM:SS`; seconds are dropped.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        let time = NaiveTime::parse_from_str(value, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
            .ok()?;
        NaiveTime::from_hms_opt(time.hour(), time.minute(), 0).map(Self)
    }

    /// 12-hour rendering used by the page, e.g. `7:30 PM`.
    pub fn to_12h(self) -> String {
        self.0.format("%-I:%M %p").to_string()
    }
}

impl fmt::Display for ReminderTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%H:%M"))
    }
}

impl Serialize for ReminderTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ReminderTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid reminder time '{raw}', expected HH:MM")))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Habit {
    pub id: HabitId,
    pub name: String,
    pub reminder_time: Option<ReminderTime>,
    pub created_at: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitEntry {
    pub habit_id: HabitId,
    pub date: NaiveDate,
    pub completed: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewHabit {
    pub name: String,
    #[serde(default)]
    pub reminder_time: Option<ReminderTime>,
}

/// Partial update. An absent `reminderTime` leaves it untouched, `null` clears it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "present_or_null")]
    pub reminder_time: Option<Option<ReminderTime>>,
}

fn present_or_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Deserialize)]
pub struct EntryRequest {
    pub date: NaiveDate,
    pub completed: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct MonthQuery {
    pub year: Option<i32>,
    pub month: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitStats {
    pub current_streak: u32,
    pub longest_streak: u32,
    pub monthly_completions: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayStatus {
    Completed,
    Missed,
    Pending,
    Future,
}

impl DayStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Missed => "missed",
            Self::Pending => "pending",
            Self::Future => "future",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub day_number: u32,
    pub is_current_month: bool,
    pub is_today: bool,
    pub status: DayStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarMonth {
    pub year: i32,
    pub month: u32,
    pub label: String,
    pub days: Vec<CalendarDay>,
}

/// Fields posted by the page's habit form. An empty reminder means none.
#[derive(Debug, Deserialize)]
pub struct HabitForm {
    pub name: String,
    #[serde(default)]
    pub reminder_time: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub habit: Option<HabitId>,
    #[serde(default)]
    pub new: bool,
    pub year: Option<i32>,
    pub month: Option<u32>,
}

/// Trims and checks a habit name, returning the value to store.
pub fn validate_habit_name(name: &str) -> Result<String, &'static str> {
    let name = name.trim();
    if name.is_empty() {
        return Err("habit name must not be empty");
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err("habit name must be 50 characters or less");
    }
    Ok(name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reminder_time_accepts_seconds_and_renders_short_form() {
        let time = ReminderTime::parse("07:05:59").expect("valid time");
        assert_eq!(time.to_string(), "07:05");
        assert_eq!(time.to_12h(), "7:05 AM");
        assert!(ReminderTime::parse("25:00").is_none());
        assert!(ReminderTime::parse("noon").is_none());
    }

    #[test]
    fn habit_serializes_with_camel_case_fields() {
        let habit = Habit {
            id: 3,
            name: "Read".to_string(),
            reminder_time: ReminderTime::parse("21:30"),
            created_at: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        };
        let value = serde_json::to_value(&habit).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "id": 3,
                "name": "Read",
                "reminderTime": "21:30",
                "createdAt": "2024-03-01"
            })
        );
    }

    #[test]
    fn update_distinguishes_absent_and_null_reminder() {
        let absent: HabitUpdate = serde_json::from_str(r#"{"name":"Walk"}"#).unwrap();
        assert_eq!(absent.reminder_time, None);

        let cleared: HabitUpdate = serde_json::from_str(r#"{"reminderTime":null}"#).unwrap();
        assert_eq!(cleared.reminder_time, Some(None));

        let set: HabitUpdate = serde_json::from_str(r#"{"reminderTime":"08:00"}"#).unwrap();
        assert_eq!(set.reminder_time, Some(ReminderTime::parse("08:00")));
    }

    #[test]
    fn habit_name_validation() {
        assert_eq!(validate_habit_name("  Stretch  "), Ok("Stretch".to_string()));
        assert!(validate_habit_name("   ").is_err());
        assert!(validate_habit_name(&"x".repeat(50)).is_ok());
        assert!(validate_habit_name(&"x".repeat(51)).is_err());
    }
}

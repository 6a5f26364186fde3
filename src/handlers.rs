use crate::calendar::calendar_month;
use crate::errors::AppError;
use crate::models::{
    validate_habit_name, CalendarMonth, EntryRequest, Habit, HabitEntry, HabitForm, HabitId, HabitStats,
    HabitUpdate, MonthQuery, NewHabit, PageQuery, ReminderTime,
};
use crate::state::AppState;
use crate::stats::habit_stats;
use crate::ui::{render_index, HabitView};
use async_trait::async_trait;
use axum::{
    extract::{
        rejection::{FormRejection, JsonRejection, QueryRejection},
        FromRequestParts, Path, Query, State,
    },
    http::{request::Parts, StatusCode},
    response::{Html, Redirect},
    Form, Json,
};
use chrono::{Datelike, Local, NaiveDate};
use std::collections::HashMap;
use tracing::info;

/// Habit id taken from the `:id` path segment.
pub struct HabitPath(pub HabitId);

/// Calendar date taken from the `:date` path segment.
pub struct DatePath(pub NaiveDate);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for HabitPath {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        path_param(parts, state, "id")
            .await
            .and_then(|raw| raw.parse().ok())
            .map(Self)
            .ok_or_else(|| AppError::bad_request("Invalid habit ID"))
    }
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for DatePath {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        path_param(parts, state, "date")
            .await
            .and_then(|raw| NaiveDate::parse_from_str(&raw, "%Y-%m-%d").ok())
            .map(Self)
            .ok_or_else(|| AppError::bad_request("Invalid date, expected YYYY-MM-DD"))
    }
}

async fn path_param<S: Send + Sync>(parts: &mut Parts, state: &S, name: &str) -> Option<String> {
    let Path(mut params) = Path::<HashMap<String, String>>::from_request_parts(parts, state)
        .await
        .ok()?;
    params.remove(name)
}

pub async fn index(
    State(state): State<AppState>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> Result<Html<String>, AppError> {
    let Query(query) = query?;
    let today = today();
    let habits = state.store.list_habits().await?;

    let selected = match query.habit {
        _ if query.new => None,
        Some(id) => habits.iter().find(|habit| habit.id == id),
        None => habits.first(),
    };

    let view = match selected {
        Some(habit) => {
            let entries = state.store.fetch_all(habit.id).await?;
            let (year, month) = resolve_month(query.year, query.month, today)?;
            Some(HabitView {
                habit: habit.clone(),
                stats: habit_stats(&entries, today),
                today_entry: entries
                    .iter()
                    .find(|entry| entry.date == today)
                    .map(|entry| entry.completed),
                calendar: month_grid(year, month, &entries, today)?,
            })
        }
        None => None,
    };

    Ok(Html(render_index(today, &habits, view.as_ref())))
}

pub async fn list_habits(State(state): State<AppState>) -> Result<Json<Vec<Habit>>, AppError> {
    Ok(Json(state.store.list_habits().await?))
}

pub async fn get_habit(
    State(state): State<AppState>,
    HabitPath(id): HabitPath,
) -> Result<Json<Habit>, AppError> {
    Ok(Json(require_habit(&state, id).await?))
}

pub async fn create_habit(
    State(state): State<AppState>,
    body: Result<Json<NewHabit>, JsonRejection>,
) -> Result<(StatusCode, Json<Habit>), AppError> {
    let Json(payload) = body?;
    let habit = insert_habit(&state, &payload.name, payload.reminder_time).await?;
    Ok((StatusCode::CREATED, Json(habit)))
}

pub async fn update_habit(
    State(state): State<AppState>,
    HabitPath(id): HabitPath,
    body: Result<Json<HabitUpdate>, JsonRejection>,
) -> Result<Json<Habit>, AppError> {
    let Json(update) = body?;
    Ok(Json(apply_update(&state, id, update).await?))
}

pub async fn delete_habit(
    State(state): State<AppState>,
    HabitPath(id): HabitPath,
) -> Result<StatusCode, AppError> {
    remove_habit(&state, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_entries(
    State(state): State<AppState>,
    HabitPath(id): HabitPath,
) -> Result<Json<Vec<HabitEntry>>, AppError> {
    require_habit(&state, id).await?;
    Ok(Json(state.store.fetch_all(id).await?))
}

pub async fn list_entries_by_month(
    State(state): State<AppState>,
    HabitPath(id): HabitPath,
    query: Result<Query<MonthQuery>, QueryRejection>,
) -> Result<Json<Vec<HabitEntry>>, AppError> {
    let Query(query) = query?;
    let (year, month) = resolve_month(query.year, query.month, today())?;
    require_habit(&state, id).await?;
    Ok(Json(state.store.fetch_by_month(id, year, month).await?))
}

pub async fn get_entry(
    State(state): State<AppState>,
    HabitPath(id): HabitPath,
    DatePath(date): DatePath,
) -> Result<Json<HabitEntry>, AppError> {
    require_habit(&state, id).await?;
    state
        .store
        .get_by_date(id, date)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("Entry not found"))
}

pub async fn upsert_entry(
    State(state): State<AppState>,
    HabitPath(id): HabitPath,
    body: Result<Json<EntryRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<HabitEntry>), AppError> {
    let Json(payload) = body?;
    let entry = record_entry(&state, id, payload.date, payload.completed).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

pub async fn get_stats(
    State(state): State<AppState>,
    HabitPath(id): HabitPath,
) -> Result<Json<HabitStats>, AppError> {
    require_habit(&state, id).await?;
    let entries = state.store.fetch_all(id).await?;
    Ok(Json(habit_stats(&entries, today())))
}

pub async fn get_calendar(
    State(state): State<AppState>,
    HabitPath(id): HabitPath,
    query: Result<Query<MonthQuery>, QueryRejection>,
) -> Result<Json<CalendarMonth>, AppError> {
    let Query(query) = query?;
    let today = today();
    let (year, month) = resolve_month(query.year, query.month, today)?;
    require_habit(&state, id).await?;
    let entries = state.store.fetch_all(id).await?;
    Ok(Json(month_grid(year, month, &entries, today)?))
}

pub async fn form_create_habit(
    State(state): State<AppState>,
    form: Result<Form<HabitForm>, FormRejection>,
) -> Result<Redirect, AppError> {
    let Form(form) = form?;
    let reminder_time = parse_form_reminder(&form.reminder_time)?;
    let habit = insert_habit(&state, &form.name, reminder_time).await?;
    Ok(Redirect::to(&format!("/?habit={}", habit.id)))
}

pub async fn form_update_habit(
    State(state): State<AppState>,
    HabitPath(id): HabitPath,
    form: Result<Form<HabitForm>, FormRejection>,
) -> Result<Redirect, AppError> {
    let Form(form) = form?;
    let update = HabitUpdate {
        name: Some(form.name),
        reminder_time: Some(parse_form_reminder(&form.reminder_time)?),
    };
    apply_update(&state, id, update).await?;
    Ok(Redirect::to(&format!("/?habit={id}")))
}

pub async fn mark_today_done(
    State(state): State<AppState>,
    HabitPath(id): HabitPath,
) -> Result<Redirect, AppError> {
    record_entry(&state, id, today(), true).await?;
    Ok(Redirect::to(&format!("/?habit={id}")))
}

pub async fn mark_today_missed(
    State(state): State<AppState>,
    HabitPath(id): HabitPath,
) -> Result<Redirect, AppError> {
    record_entry(&state, id, today(), false).await?;
    Ok(Redirect::to(&format!("/?habit={id}")))
}

pub async fn form_reset_habit(
    State(state): State<AppState>,
    HabitPath(id): HabitPath,
) -> Result<Redirect, AppError> {
    remove_habit(&state, id).await?;
    Ok(Redirect::to("/"))
}

async fn require_habit(state: &AppState, id: HabitId) -> Result<Habit, AppError> {
    state
        .store
        .get_habit(id)
        .await?
        .ok_or_else(|| AppError::not_found("Habit not found"))
}

async fn insert_habit(
    state: &AppState,
    name: &str,
    reminder_time: Option<ReminderTime>,
) -> Result<Habit, AppError> {
    let name = validate_habit_name(name).map_err(AppError::bad_request)?;
    let habit = state
        .store
        .create_habit(NewHabit { name, reminder_time }, today())
        .await?;
    info!(habit_id = habit.id, name = %habit.name, "habit created");
    Ok(habit)
}

async fn apply_update(state: &AppState, id: HabitId, mut update: HabitUpdate) -> Result<Habit, AppError> {
    if let Some(name) = update.name.take() {
        update.name = Some(validate_habit_name(&name).map_err(AppError::bad_request)?);
    }
    let habit = state
        .store
        .update_habit(id, update)
        .await?
        .ok_or_else(|| AppError::not_found("Habit not found"))?;
    info!(habit_id = id, "habit updated");
    Ok(habit)
}

async fn remove_habit(state: &AppState, id: HabitId) -> Result<(), AppError> {
    if !state.store.delete_habit(id).await? {
        return Err(AppError::not_found("Habit not found"));
    }
    info!(habit_id = id, "habit and entries deleted");
    Ok(())
}

async fn record_entry(
    state: &AppState,
    id: HabitId,
    date: NaiveDate,
    completed: bool,
) -> Result<HabitEntry, AppError> {
    let entry = state.store.upsert_entry(id, date, completed).await?;
    info!(habit_id = id, date = %date, completed, "entry recorded");
    Ok(entry)
}

fn parse_form_reminder(raw: &str) -> Result<Option<ReminderTime>, AppError> {
    if raw.trim().is_empty() {
        return Ok(None);
    }
    ReminderTime::parse(raw)
        .map(Some)
        .ok_or_else(|| AppError::bad_request("reminder time must be HH:MM"))
}

/// Fills in today's year/month and rejects months outside 0..=11.
fn resolve_month(year: Option<i32>, month: Option<u32>, today: NaiveDate) -> Result<(i32, u32), AppError> {
    let year = year.unwrap_or_else(|| today.year());
    let month = month.unwrap_or_else(|| today.month0());
    if month > 11 {
        return Err(AppError::bad_request("Invalid parameters: month must be 0-11"));
    }
    Ok((year, month))
}

fn month_grid(year: i32, month: u32, entries: &[HabitEntry], today: NaiveDate) -> Result<CalendarMonth, AppError> {
    calendar_month(year, month, entries, today)
        .ok_or_else(|| AppError::bad_request("Invalid parameters: year out of range"))
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

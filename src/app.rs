use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/habit", post(handlers::form_create_habit))
        .route("/habit/:id/update", post(handlers::form_update_habit))
        .route("/habit/:id/today/done", post(handlers::mark_today_done))
        .route("/habit/:id/today/missed", post(handlers::mark_today_missed))
        .route("/habit/:id/reset", post(handlers::form_reset_habit))
        .route("/api/habits", get(handlers::list_habits).post(handlers::create_habit))
        .route(
            "/api/habits/:id",
            get(handlers::get_habit)
                .patch(handlers::update_habit)
                .delete(handlers::delete_habit),
        )
        .route(
            "/api/habits/:id/entries",
            get(handlers::list_entries).post(handlers::upsert_entry),
        )
        .route("/api/habits/:id/entries/month", get(handlers::list_entries_by_month))
        .route("/api/habits/:id/entries/:date", get(handlers::get_entry))
        .route("/api/habits/:id/stats", get(handlers::get_stats))
        .route("/api/habits/:id/calendar", get(handlers::get_calendar))
        .with_state(state)
}

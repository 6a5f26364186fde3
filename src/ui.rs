use crate::calendar::month_navigation;
use crate::models::{CalendarMonth, DayStatus, Habit, HabitId, HabitStats, MAX_NAME_LEN};
use chrono::NaiveDate;
use std::fmt::Write as _;

/// Everything the page shows about the selected habit.
pub struct HabitView {
    pub habit: Habit,
    pub stats: HabitStats,
    pub today_entry: Option<bool>,
    pub calendar: CalendarMonth,
}

pub fn render_index(today: NaiveDate, habits: &[Habit], selected: Option<&HabitView>) -> String {
    let content = match selected {
        Some(view) => render_habit(today, habits, view),
        None => render_new_habit(),
    };
    INDEX_HTML
        .replace("{{TODAY}}", &today.format("%B %-d, %Y").to_string())
        .replace("{{CONTENT}}", &content)
}

fn render_new_habit() -> String {
    format!(
        r#"<section class="card">
      <h2>Define your habit</h2>
      <p class="subtitle">Pick one specific thing you want to do every day.</p>
      {form}
    </section>"#,
        form = habit_form("/habit", "", "", "Start tracking"),
    )
}

fn render_habit(today: NaiveDate, habits: &[Habit], view: &HabitView) -> String {
    let habit = &view.habit;
    let id = habit.id;
    let reminder = habit
        .reminder_time
        .map(|time| format!(r#"<p class="subtitle">Reminder at {}</p>"#, time.to_12h()))
        .unwrap_or_default();

    let prompt = match view.today_entry {
        Some(true) => r#"<p class="done">Done for today.</p>"#.to_string(),
        Some(false) => r#"<p class="missed">Marked as missed today.</p>"#.to_string(),
        None => String::new(),
    };

    let mut out = String::new();
    if habits.len() > 1 {
        out.push_str(r#"<nav class="switcher">"#);
        for other in habits {
            let class = if other.id == id { " class=\"active\"" } else { "" };
            let _ = write!(out, r#"<a href="/?habit={}"{class}>{}</a>"#, other.id, escape_html(&other.name));
        }
        out.push_str("</nav>");
    }

    let _ = write!(
        out,
        r#"<section class="card">
      <h2>{name}</h2>
      {reminder}
      <p>Did you do it today ({today})?</p>
      {prompt}
      <div class="actions">
        <form method="post" action="/habit/{id}/today/done"><button class="btn-done" type="submit">Yes</button></form>
        <form method="post" action="/habit/{id}/today/missed"><button class="btn-missed" type="submit">No</button></form>
      </div>
    </section>
    <section class="panel">
      <div class="stat"><span class="label">Current streak</span><span class="value">{current}</span></div>
      <div class="stat"><span class="label">Longest streak</span><span class="value">{longest}</span></div>
      <div class="stat"><span class="label">This month</span><span class="value">{monthly}</span></div>
    </section>
    {calendar}
    <section class="card">
      <h3>Edit habit</h3>
      {edit}
      <form method="post" action="/habit/{id}/reset" onsubmit="return confirm('Delete this habit and all of its history?');">
        <button class="btn-reset" type="submit">Reset habit</button>
      </form>
      <p><a href="/?new=true">Add another habit</a></p>
    </section>"#,
        name = escape_html(&habit.name),
        today = today.format("%Y-%m-%d"),
        current = view.stats.current_streak,
        longest = view.stats.longest_streak,
        monthly = view.stats.monthly_completions,
        calendar = render_calendar(id, &view.calendar),
        edit = habit_form(
            &format!("/habit/{id}/update"),
            &habit.name,
            &habit.reminder_time.map(|time| time.to_string()).unwrap_or_default(),
            "Save",
        ),
    );
    out
}

fn render_calendar(habit_id: HabitId, calendar: &CalendarMonth) -> String {
    let ((prev_year, prev_month), (next_year, next_month)) = month_navigation(calendar.year, calendar.month);
    let mut cells = String::new();
    for day in &calendar.days {
        let mut class = String::from("day");
        if !day.is_current_month {
            class.push_str(" outside");
        }
        if day.is_today {
            class.push_str(" today");
        }
        let mark = match day.status {
            DayStatus::Completed => "&#10003;",
            DayStatus::Missed => "&#10007;",
            DayStatus::Pending | DayStatus::Future => "",
        };
        let _ = write!(
            cells,
            r#"<div class="{class} {status}" title="{date}">{number}<small>{mark}</small></div>"#,
            status = day.status.as_str(),
            date = day.date,
            number = day.day_number,
        );
    }

    format!(
        r#"<section class="card">
      <div class="calendar-header">
        <a href="/?habit={habit_id}&year={prev_year}&month={prev_month}" aria-label="Previous month">&lsaquo;</a>
        <h3>{label}</h3>
        <a href="/?habit={habit_id}&year={next_year}&month={next_month}" aria-label="Next month">&rsaquo;</a>
      </div>
      <div class="grid weekdays"><span>S</span><span>M</span><span>T</span><span>W</span><span>T</span><span>F</span><span>S</span></div>
      <div class="grid">{cells}</div>
    </section>"#,
        label = calendar.label,
    )
}

fn habit_form(action: &str, name: &str, reminder: &str, submit: &str) -> String {
    format!(
        r#"<form class="habit-form" method="post" action="{action}">
        <label>Habit <input name="name" type="text" required maxlength="{max}" value="{name}" /></label>
        <label>Reminder <input name="reminder_time" type="time" value="{reminder}" /></label>
        <button type="submit">{submit}</button>
      </form>"#,
        max = MAX_NAME_LEN,
        name = escape_html(name),
    )
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Habit Tracker</title>
  <style>
    :root {
      --bg: #f4f6f8;
      --ink: #1f2933;
      --muted: #6b7280;
      --primary: #3b5bdb;
      --done: #10b981;
      --missed: #fb7185;
      --card: #ffffff;
    }

    * { box-sizing: border-box; }

    body {
      margin: 0;
      background: var(--bg);
      color: var(--ink);
      font-family: system-ui, sans-serif;
      display: grid;
      justify-items: center;
      padding: 24px 14px 40px;
    }

    main { width: min(460px, 100%); display: grid; gap: 16px; }
    header h1 { margin: 0; font-size: 1.6rem; }
    .subtitle { margin: 4px 0; color: var(--muted); }
    .card { background: var(--card); border-radius: 14px; padding: 18px; box-shadow: 0 6px 20px rgba(31, 41, 51, 0.08); }
    .card h2, .card h3 { margin-top: 0; }

    .switcher { display: flex; flex-wrap: wrap; gap: 6px; }
    .switcher a { padding: 6px 12px; border-radius: 999px; background: white; color: var(--ink); text-decoration: none; }
    .switcher a.active { background: var(--primary); color: white; }

    .actions { display: grid; grid-template-columns: 1fr 1fr; gap: 10px; }
    button { width: 100%; border: none; border-radius: 10px; padding: 12px; font-size: 1rem; font-weight: 600; cursor: pointer; background: var(--primary); color: white; }
    .btn-done { background: var(--done); }
    .btn-missed { background: var(--missed); }
    .btn-reset { background: transparent; color: #c92a2a; border: 1px solid #c92a2a; margin-top: 12px; }
    .done { color: var(--done); font-weight: 600; }
    .missed { color: var(--missed); font-weight: 600; }

    .panel { display: grid; grid-template-columns: repeat(3, 1fr); gap: 10px; }
    .stat { background: var(--card); border-radius: 12px; padding: 12px; text-align: center; }
    .stat .label { display: block; font-size: 0.75rem; text-transform: uppercase; color: var(--muted); }
    .stat .value { display: block; font-size: 1.6rem; font-weight: 700; color: var(--primary); }

    .calendar-header { display: flex; justify-content: space-between; align-items: center; }
    .calendar-header a { font-size: 1.6rem; text-decoration: none; color: var(--ink); padding: 0 10px; }
    .grid { display: grid; grid-template-columns: repeat(7, 1fr); gap: 4px; text-align: center; }
    .weekdays span { font-size: 0.8rem; color: var(--muted); }
    .day { position: relative; aspect-ratio: 1 / 1; display: flex; align-items: center; justify-content: center; border-radius: 8px; border: 1px solid #e5e7eb; }
    .day small { position: absolute; top: 1px; right: 4px; font-size: 0.65rem; }
    .day.today { border: 2px solid var(--primary); }
    .day.completed { background: var(--done); color: white; border-color: var(--done); }
    .day.missed { background: var(--missed); color: white; border-color: var(--missed); }
    .day.outside { color: #c4c9d0; background: transparent; border-color: transparent; }

    .habit-form { display: grid; gap: 10px; }
    .habit-form label { display: grid; gap: 4px; font-size: 0.9rem; color: var(--muted); }
    .habit-form input { padding: 10px; border-radius: 8px; border: 1px solid #d1d5db; font-size: 1rem; }
  </style>
</head>
<body>
  <main>
    <header>
      <h1>Habit Tracker</h1>
      <p class="subtitle">{{TODAY}}</p>
    </header>
    {{CONTENT}}
  </main>
</body>
</html>
"#;

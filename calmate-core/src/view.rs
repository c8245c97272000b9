//! Calendar view helpers: view kinds and day-grid computation.

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::event::CalendarEvent;

/// The three calendar views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewKind {
    Month,
    Week,
    Day,
}

/// One cell of the month grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub is_current_month: bool,
    pub is_today: bool,
    pub events: Vec<CalendarEvent>,
}

/// First day of the week containing `date`. Weeks start on Sunday.
pub fn start_of_week(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_sunday() as i64)
}

/// The seven days of the week containing `cursor`.
pub fn week_days(cursor: NaiveDate) -> [NaiveDate; 7] {
    let start = start_of_week(cursor);
    std::array::from_fn(|i| start + Duration::days(i as i64))
}

/// Week-aligned month grid around `cursor`: from the Sunday on or before
/// the 1st through the Saturday on or after the last day of the month.
pub fn month_grid(cursor: NaiveDate, today: NaiveDate, events: &[CalendarEvent]) -> Vec<CalendarDay> {
    let month_start = cursor.with_day(1).unwrap_or(cursor);
    let month_end = end_of_month(cursor);
    let grid_end = month_end
        + Duration::days(6 - month_end.weekday().num_days_from_sunday() as i64);

    let mut grid = Vec::new();
    let mut day = start_of_week(month_start);
    while day <= grid_end {
        grid.push(CalendarDay {
            date: day,
            is_current_month: day.month() == cursor.month() && day.year() == cursor.year(),
            is_today: day == today,
            events: events_on(events, day),
        });
        day = day + Duration::days(1);
    }
    grid
}

/// Events visible on `day`, ordered by start time.
pub fn events_on(events: &[CalendarEvent], day: NaiveDate) -> Vec<CalendarEvent> {
    let mut on_day: Vec<CalendarEvent> = events
        .iter()
        .filter(|e| e.occurs_on(day))
        .cloned()
        .collect();
    on_day.sort_by(|a, b| a.start.cmp(&b.start));
    on_day
}

fn end_of_month(date: NaiveDate) -> NaiveDate {
    let first = date.with_day(1).unwrap_or(date);
    let next_month = if first.month() == 12 {
        first
            .with_year(first.year() + 1)
            .and_then(|d| d.with_month(1))
    } else {
        first.with_month(first.month() + 1)
    };
    match next_month {
        Some(next) => next - Duration::days(1),
        None => date,
    }
}

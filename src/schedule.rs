use chrono::{DateTime, Datelike, Days, NaiveDate, TimeZone, Timelike, Utc, Weekday};
use chrono_tz::{America, Asia, Europe, Tz};
use serde::Serialize;

// classes run 06:00-19:00 Berlin time, Monday to Friday
pub const HOME_ZONE: Tz = Europe::Berlin;
pub const SESSION_START_HOUR: u32 = 6;
pub const SESSION_END_HOUR: u32 = 19;

const DISPLAY_ZONES: [(&str, Tz); 3] = [
    ("Germany", Europe::Berlin),
    ("India", Asia::Kolkata),
    ("USA", America::New_York),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionWindow {
    pub region: &'static str,
    pub timezone: &'static str,
    pub label: String,
}

fn is_class_day(day: Weekday) -> bool {
    !matches!(day, Weekday::Sat | Weekday::Sun)
}

fn home_time(date: NaiveDate, hour: u32) -> Option<DateTime<Tz>> {
    let local = date.and_hms_opt(hour, 0, 0)?;
    HOME_ZONE.from_local_datetime(&local).earliest()
}

/// Session window on `date` rendered in each display zone,
/// e.g. `10:30 AM - 11:30 PM (IST)`.
pub fn session_times(date: NaiveDate) -> Vec<SessionWindow> {
    let (Some(start), Some(end)) = (
        home_time(date, SESSION_START_HOUR),
        home_time(date, SESSION_END_HOUR),
    ) else {
        return Vec::new();
    };

    DISPLAY_ZONES
        .iter()
        .map(|(region, tz)| {
            let start = start.with_timezone(tz);
            let end = end.with_timezone(tz);
            SessionWindow {
                region: *region,
                timezone: tz.name(),
                label: format!(
                    "{} - {} ({})",
                    start.format("%-I:%M %p"),
                    end.format("%-I:%M %p"),
                    start.format("%Z"),
                ),
            }
        })
        .collect()
}

// None while a session is running
pub fn next_session(now: DateTime<Utc>) -> Option<DateTime<Tz>> {
    let local = now.with_timezone(&HOME_ZONE);
    let today = local.date_naive();

    if is_class_day(today.weekday()) {
        if (SESSION_START_HOUR..SESSION_END_HOUR).contains(&local.hour()) {
            return None;
        }
        if local.hour() < SESSION_START_HOUR {
            return home_time(today, SESSION_START_HOUR);
        }
    }

    (1..=7)
        .filter_map(|offset| today.checked_add_days(Days::new(offset)))
        .find(|day| is_class_day(day.weekday()))
        .and_then(|day| home_time(day, SESSION_START_HOUR))
}

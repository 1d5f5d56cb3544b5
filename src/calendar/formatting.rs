use chrono::{DateTime, Local, Timelike};

use super::events::Event;

const END_OF_DAY_SECS: u32 = 86399;

/// One row per event, the row text being the title. Pure in `events`.
pub fn render_rows(events: &[Event]) -> Vec<String> {
    events.iter().map(|e| e.display_title().to_string()).collect()
}

pub fn format_time(dt: &DateTime<Local>) -> String {
    format!("{:02}:{:02}", dt.hour(), dt.minute())
}

/// Providers that don't flag all-day events report them as midnight to 23:59:59.
pub fn is_all_day(event: &Event) -> bool {
    event.all_day
        || (event.start.time().num_seconds_from_midnight() == 0
            && event.end.time().num_seconds_from_midnight() == END_OF_DAY_SECS)
}

pub fn time_range(event: &Event) -> String {
    if is_all_day(event) {
        "All day".to_string()
    } else {
        format!("{} - {}", format_time(&event.start), format_time(&event.end))
    }
}

/// Multi-line detail for a single event.
pub fn describe_event(event: &Event) -> String {
    let mut out = format!(
        "{}\n{} {}",
        event.display_title(),
        event.start.format("%a %d %b"),
        time_range(event)
    );
    if let Some(location) = event.location.as_deref().filter(|l| !l.is_empty()) {
        out.push('\n');
        out.push_str(location);
    }
    out
}

use chrono::{DateTime, Days, Local};

const DAYS_TO_FETCH: u64 = 1;

/// A destination for events. Only the provider's default calendar is ever used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Calendar {
    pub id: String,
    pub title: String,
}

impl Calendar {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub id: String,
    pub title: Option<String>,
    pub start: DateTime<Local>,
    pub end: DateTime<Local>,
    pub calendar_id: String,
    pub all_day: bool,
    pub location: Option<String>,
}

impl Event {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        start: DateTime<Local>,
        end: DateTime<Local>,
        calendar: &Calendar,
    ) -> Self {
        Self {
            id: id.into(),
            title: Some(title.into()),
            start,
            end,
            calendar_id: calendar.id.clone(),
            all_day: false,
            location: None,
        }
    }

    /// Title as shown in a row; a missing title is an empty row, not an error.
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or_default()
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_all_day(mut self, all_day: bool) -> Self {
        self.all_day = all_day;
        self
    }
}

/// Half-open interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Local>,
    pub end: DateTime<Local>,
}

impl TimeWindow {
    /// Whether an event's own interval intersects this window.
    pub fn intersects(&self, start: &DateTime<Local>, end: &DateTime<Local>) -> bool {
        *start < self.end && *end > self.start
    }
}

/// `[now, now + 1 calendar day)`.
///
/// Adds a calendar day rather than 24 hours so the window ends at the same
/// wall-clock time tomorrow across DST changes. Falls back to the absolute
/// duration when tomorrow's wall-clock time does not exist.
pub fn next_day_window(now: DateTime<Local>) -> TimeWindow {
    let end = now
        .checked_add_days(Days::new(DAYS_TO_FETCH))
        .unwrap_or_else(|| now + chrono::Duration::days(DAYS_TO_FETCH as i64));
    TimeWindow { start: now, end }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32) -> DateTime<Local> {
        Local
            .with_ymd_and_hms(2024, 3, 12, h, m, 0)
            .single()
            .expect("unambiguous local time")
    }

    #[test]
    fn window_spans_one_calendar_day_from_now() {
        let now = at(9, 30);
        let window = next_day_window(now);
        assert_eq!(window.start, now);
        assert_eq!(window.end.date_naive(), now.date_naive().succ_opt().unwrap());
        assert_eq!(window.end.time(), now.time());
    }

    #[test]
    fn intersects_is_half_open() {
        let window = next_day_window(at(9, 0));
        assert!(window.intersects(&at(8, 0), &at(9, 30)));
        assert!(!window.intersects(&at(8, 0), &at(9, 0)));
        assert!(!window.intersects(&window.end, &(window.end + chrono::Duration::hours(1))));
    }

    #[test]
    fn missing_title_displays_as_empty() {
        let cal = Calendar::new("home", "Home");
        let mut event = Event::new("1", "Lunch", at(12, 0), at(13, 0), &cal);
        assert_eq!(event.display_title(), "Lunch");
        event.title = None;
        assert_eq!(event.display_title(), "");
    }
}

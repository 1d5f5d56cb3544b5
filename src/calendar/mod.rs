mod error;
mod events;
mod formatting;
mod provider;

#[cfg(target_os = "macos")]
pub mod eventkit;
pub mod memory;

pub use error::CalendarError;
pub use events::{next_day_window, Calendar, Event, TimeWindow};
pub use formatting::{describe_event, format_time, is_all_day, render_rows, time_range};
pub use provider::{
    AccessCallback, AuthorizationStatus, CalendarProvider, EditorAction, EditorCallback,
};

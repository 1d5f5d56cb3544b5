//! The contract a calendar backend has to honour.
//!
//! The controller never talks to EventKit (or anything else) directly; it only
//! sees a [`CalendarProvider`]. Callbacks handed to a provider may be invoked on
//! any thread, so they are `Send` and must not touch UI state themselves.

use std::fmt;

use super::error::CalendarError;
use super::events::{Calendar, Event, TimeWindow};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorizationStatus {
    Authorized,
    Denied,
    Restricted,
    NotDetermined,
}

impl fmt::Display for AuthorizationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Authorized => "authorized",
            Self::Denied => "denied",
            Self::Restricted => "restricted",
            Self::NotDetermined => "not determined",
        };
        f.write_str(s)
    }
}

/// How the provider-owned editor was dismissed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorAction {
    Canceled,
    Saved,
    Deleted,
}

impl EditorAction {
    /// Saved and Deleted both change the calendar and call for a re-fetch.
    pub fn changes_calendar(self) -> bool {
        !matches!(self, Self::Canceled)
    }
}

/// Single-shot answer to a permission request: `(granted, error)`.
pub type AccessCallback = Box<dyn FnOnce(bool, Option<CalendarError>) + Send + 'static>;

/// Single-shot completion of the event editor.
pub type EditorCallback = Box<dyn FnOnce(EditorAction) + Send + 'static>;

pub trait CalendarProvider {
    /// Current permission state, without prompting.
    fn authorization_status(&self) -> AuthorizationStatus;

    /// Prompt for access. `completion` is called exactly once, possibly from
    /// another thread.
    fn request_access(&self, completion: AccessCallback);

    fn default_calendar_for_new_events(&self) -> Result<Calendar, CalendarError>;

    /// Every event whose interval intersects `window`, limited to `calendars`,
    /// in the provider's own order.
    fn query_events(
        &self,
        window: &TimeWindow,
        calendars: &[Calendar],
    ) -> Result<Vec<Event>, CalendarError>;

    /// Show the modal editor for a new event in `calendar`. Field validation,
    /// saving and cancelling belong to the provider.
    fn present_event_editor(&self, calendar: &Calendar, completion: EditorCallback);
}

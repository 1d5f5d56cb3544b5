//! The event list screen: permission gate, next-day listing, event creation.
//!
//! [`EventListController`] owns the event list and the create flag. Provider
//! callbacks never reach it directly; they post to its [`UiQueue`] and the
//! owning thread applies them through [`EventListController::pump`] or
//! [`EventListController::wait_for_message`].

use std::slice;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Local};
use tracing::{debug, warn};

use crate::calendar::{
    next_day_window, render_rows, AuthorizationStatus, Calendar, CalendarError, CalendarProvider,
    Event,
};
use crate::dispatch::{UiMessage, UiQueue};

/// A non-blocking dialog with a single acknowledgement button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Warning {
    pub title: &'static str,
    pub message: &'static str,
    pub action: &'static str,
}

pub const PRIVACY_WARNING: Warning = Warning {
    title: "Privacy Warning",
    message: "Permission was not granted for Calendar",
    action: "OK",
};

/// What the controller drives. Called only from the controller's thread.
pub trait View {
    fn reload(&mut self, rows: &[String]);
    fn set_create_enabled(&mut self, enabled: bool);
    fn show_warning(&mut self, warning: &Warning);
    fn show_error(&mut self, error: &CalendarError);
    fn clear_error(&mut self) {}
}

pub trait Clock {
    fn now(&self) -> DateTime<Local>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<DateTime<Local>>>,
}

impl ManualClock {
    pub fn new(now: DateTime<Local>) -> Self {
        Self {
            now: Arc::new(Mutex::new(now)),
        }
    }

    pub fn advance(&self, by: chrono::Duration) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Local> {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessState {
    Unknown,
    Requesting,
    Authorized,
    Denied,
    Restricted,
}

pub struct EventListController<P, V> {
    provider: P,
    view: V,
    clock: Box<dyn Clock>,
    queue: UiQueue,
    state: AccessState,
    default_calendar: Option<Calendar>,
    events: Vec<Event>,
    create_enabled: bool,
    error: Option<CalendarError>,
}

impl<P: CalendarProvider, V: View> EventListController<P, V> {
    pub fn new(provider: P, mut view: V) -> Self {
        view.set_create_enabled(false);
        Self {
            provider,
            view,
            clock: Box::new(SystemClock),
            queue: UiQueue::new(),
            state: AccessState::Unknown,
            default_calendar: None,
            events: Vec::new(),
            create_enabled: false,
            error: None,
        }
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Re-checks access every time the list comes on screen.
    pub fn appear(&mut self) {
        let status = self.provider.authorization_status();
        debug!(%status, state = ?self.state, "list appeared");

        match status {
            AuthorizationStatus::Authorized => self.access_granted(),
            AuthorizationStatus::NotDetermined => self.request_access(),
            AuthorizationStatus::Denied => self.access_refused(AccessState::Denied),
            AuthorizationStatus::Restricted => self.access_refused(AccessState::Restricted),
        }
    }

    fn request_access(&mut self) {
        if self.state == AccessState::Requesting {
            debug!("access request already in flight");
            return;
        }
        self.state = AccessState::Requesting;

        let sender = self.queue.sender();
        self.provider.request_access(Box::new(move |granted, error| {
            sender.post(UiMessage::AccessResolved { granted, error });
        }));
    }

    fn access_refused(&mut self, state: AccessState) {
        self.state = state;
        self.revoke();
        self.view.show_warning(&PRIVACY_WARNING);
    }

    fn access_granted(&mut self) {
        self.state = AccessState::Authorized;

        match self.provider.default_calendar_for_new_events() {
            Ok(calendar) => {
                debug!(calendar = %calendar.title, "resolved default calendar");
                self.default_calendar = Some(calendar);
            }
            Err(e) => {
                self.default_calendar = None;
                self.set_create_enabled(false);
                self.events.clear();
                self.render();
                self.report(e);
                return;
            }
        }

        self.set_create_enabled(true);
        self.refresh();
    }

    /// Drops anything read while access was granted, banner included.
    fn revoke(&mut self) {
        self.set_create_enabled(false);
        self.default_calendar = None;
        if self.error.take().is_some() {
            self.view.clear_error();
        }
        if !self.events.is_empty() {
            self.events.clear();
            self.render();
        }
    }

    /// Events of the default calendar in `[now, now + 1 day)`, `now` being read
    /// at call time. Provider order, nothing added or dropped.
    pub fn fetch_upcoming(&self) -> Result<Vec<Event>, CalendarError> {
        let calendar = self
            .default_calendar
            .as_ref()
            .ok_or(CalendarError::NoDefaultCalendar)?;
        let window = next_day_window(self.clock.now());
        debug!(start = %window.start, end = %window.end, "fetching events");
        self.provider
            .query_events(&window, slice::from_ref(calendar))
    }

    /// Replaces the list with a fresh fetch and redraws. A failed fetch leaves
    /// an empty list and an error banner.
    pub fn refresh(&mut self) {
        match self.fetch_upcoming() {
            Ok(events) => {
                self.events = events;
                if self.error.take().is_some() {
                    self.view.clear_error();
                }
            }
            Err(e) => {
                self.events.clear();
                self.report(e);
            }
        }
        self.render();
    }

    fn render(&mut self) {
        let rows = self.rows();
        self.view.reload(&rows);
    }

    /// Opens the provider's editor on the default calendar. The outcome comes
    /// back through the UI queue.
    pub fn create_event(&mut self) -> Result<(), CalendarError> {
        if !self.create_enabled {
            return Err(CalendarError::CreationDisabled);
        }
        let calendar = self
            .default_calendar
            .as_ref()
            .ok_or(CalendarError::NoDefaultCalendar)?;

        let sender = self.queue.sender();
        self.provider.present_event_editor(
            calendar,
            Box::new(move |action| sender.post(UiMessage::EditorCompleted(action))),
        );
        Ok(())
    }

    pub fn handle(&mut self, message: UiMessage) {
        debug!(?message, "handling ui message");
        match message {
            UiMessage::AccessResolved { granted: true, .. } => self.access_granted(),
            UiMessage::AccessResolved {
                granted: false,
                error,
            } => {
                self.state = AccessState::Denied;
                self.revoke();
                if let Some(e) = error {
                    self.report(e);
                }
            }
            UiMessage::EditorCompleted(action) if action.changes_calendar() => self.refresh(),
            UiMessage::EditorCompleted(_) => {}
        }
    }

    /// Applies every message posted so far. Returns how many there were.
    pub fn pump(&mut self) -> usize {
        let messages = self.queue.drain();
        let count = messages.len();
        for message in messages {
            self.handle(message);
        }
        count
    }

    /// Blocks until one message arrives or `timeout` passes.
    pub fn wait_for_message(&mut self, timeout: Duration) -> bool {
        match self.queue.wait(timeout) {
            Some(message) => {
                self.handle(message);
                true
            }
            None => false,
        }
    }

    fn set_create_enabled(&mut self, enabled: bool) {
        self.create_enabled = enabled;
        self.view.set_create_enabled(enabled);
    }

    fn report(&mut self, error: CalendarError) {
        warn!(%error, "calendar operation failed");
        self.view.show_error(&error);
        self.error = Some(error);
    }

    pub fn rows(&self) -> Vec<String> {
        render_rows(&self.events)
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// The event behind a row, for a detail view.
    pub fn event_at(&self, row: usize) -> Option<&Event> {
        self.events.get(row)
    }

    pub fn access_state(&self) -> AccessState {
        self.state
    }

    pub fn is_create_enabled(&self) -> bool {
        self.create_enabled
    }

    pub fn default_calendar(&self) -> Option<&Calendar> {
        self.default_calendar.as_ref()
    }

    pub fn error(&self) -> Option<&CalendarError> {
        self.error.as_ref()
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }
}

//! System calendar through `EKEventStore` (macOS).

use chrono::{DateTime, Local};
use objc2::rc::Retained;
use objc2_event_kit::{EKAuthorizationStatus, EKCalendar, EKEvent, EKEventStore};
use objc2_foundation::NSDate;
use tracing::{debug, warn};

use crate::editor;
use crate::ffi::event_kit;

use super::error::CalendarError;
use super::events::{Calendar, Event, TimeWindow};
use super::provider::{
    AccessCallback, AuthorizationStatus, CalendarProvider, EditorAction, EditorCallback,
};

pub struct EventKitProvider {
    store: Retained<EKEventStore>,
}

impl EventKitProvider {
    pub fn new() -> Self {
        Self {
            store: event_kit::init_event_store(),
        }
    }

    fn resolve(&self, calendar: &Calendar) -> Result<Retained<EKCalendar>, CalendarError> {
        event_kit::calendar_with_id(&self.store, &calendar.id).ok_or_else(|| {
            CalendarError::QueryFailed(format!("calendar \"{}\" no longer exists", calendar.title))
        })
    }

    fn save(&self, calendar: &Calendar, draft: &editor::Draft) -> Result<(), CalendarError> {
        let target = self.resolve(calendar)?;
        event_kit::save_new_event(
            &self.store,
            &target,
            &draft.title,
            draft.start.timestamp() as f64,
            draft.end.timestamp() as f64,
        )
        .map_err(CalendarError::SaveFailed)
    }
}

impl Default for EventKitProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl CalendarProvider for EventKitProvider {
    fn authorization_status(&self) -> AuthorizationStatus {
        let status = event_kit::authorization_status();
        // Write-only access cannot read events.
        if status == EKAuthorizationStatus::FullAccess {
            AuthorizationStatus::Authorized
        } else if status == EKAuthorizationStatus::NotDetermined {
            AuthorizationStatus::NotDetermined
        } else if status == EKAuthorizationStatus::Denied {
            AuthorizationStatus::Denied
        } else {
            AuthorizationStatus::Restricted
        }
    }

    fn request_access(&self, completion: AccessCallback) {
        event_kit::request_full_access(&self.store, move |granted, error| {
            completion(granted, error.map(CalendarError::PermissionRequestFailed));
        });
    }

    fn default_calendar_for_new_events(&self) -> Result<Calendar, CalendarError> {
        let calendar =
            event_kit::default_calendar(&self.store).ok_or(CalendarError::NoDefaultCalendar)?;
        let (id, title) = event_kit::calendar_properties(&calendar);
        Ok(Calendar { id, title })
    }

    fn query_events(
        &self,
        window: &TimeWindow,
        calendars: &[Calendar],
    ) -> Result<Vec<Event>, CalendarError> {
        let targets = calendars
            .iter()
            .map(|c| self.resolve(c))
            .collect::<Result<Vec<_>, _>>()?;

        let start = NSDate::dateWithTimeIntervalSince1970(window.start.timestamp() as f64);
        let end = NSDate::dateWithTimeIntervalSince1970(window.end.timestamp() as f64);
        let raw = event_kit::fetch_events(&self.store, &start, &end, &targets);
        debug!(count = raw.len(), "eventkit query");

        let mut events = Vec::with_capacity(raw.len());
        for event in &raw {
            match parse_event(event) {
                Ok(event) => events.push(event),
                Err(id) => warn!(%id, "dropping event with unreadable dates"),
            }
        }
        Ok(events)
    }

    fn present_event_editor(&self, calendar: &Calendar, completion: EditorCallback) {
        let stdin = std::io::stdin();
        let mut input = stdin.lock();
        let mut output = std::io::stderr();

        let draft =
            editor::prompt_new_event(&mut input, &mut output, &calendar.title, Local::now());
        let action = match draft {
            Ok(Some(draft)) => match self.save(calendar, &draft) {
                Ok(()) => EditorAction::Saved,
                Err(e) => {
                    warn!(error = %e, "event not saved");
                    eprintln!("Error: {e}");
                    EditorAction::Canceled
                }
            },
            Ok(None) => EditorAction::Canceled,
            Err(e) => {
                warn!(error = %e, "event editor failed");
                EditorAction::Canceled
            }
        };
        completion(action);
    }
}

/// Fails with the event's identifier when either date is out of range.
fn parse_event(event: &EKEvent) -> Result<Event, String> {
    let props = event_kit::get_event_properties(event);
    let id = props.id.unwrap_or_default();
    let start = timestamp_to_local(props.start);
    let end = timestamp_to_local(props.end);
    let (Some(start), Some(end)) = (start, end) else {
        return Err(id);
    };
    Ok(Event {
        id,
        title: Some(props.title).filter(|t| !t.is_empty()),
        start,
        end,
        calendar_id: props.calendar_id.unwrap_or_default(),
        all_day: props.all_day,
        location: props.location,
    })
}

fn timestamp_to_local(ts: f64) -> Option<DateTime<Local>> {
    DateTime::from_timestamp(ts as i64, 0).map(|dt| dt.with_timezone(&Local))
}

use std::sync::Mutex;

use block2::RcBlock;
use objc2::rc::Retained;
use objc2::runtime::Bool;
use objc2_event_kit::{
    EKAuthorizationStatus, EKCalendar, EKEntityType, EKEvent, EKEventStore, EKSpan,
};
use objc2_foundation::{NSArray, NSDate, NSError, NSString};

pub fn init_event_store() -> Retained<EKEventStore> {
    unsafe { EKEventStore::new() }
}

pub fn authorization_status() -> EKAuthorizationStatus {
    unsafe { EKEventStore::authorizationStatusForEntityType(EKEntityType::Event) }
}

/// `completion` runs on an EventKit queue, never on the calling thread.
pub fn request_full_access<F>(store: &EKEventStore, completion: F)
where
    F: FnOnce(bool, Option<String>) + Send + 'static,
{
    let completion = Mutex::new(Some(completion));
    let block = RcBlock::new(move |granted: Bool, error: *mut NSError| {
        let error = if error.is_null() {
            None
        } else {
            Some(unsafe { (*error).localizedDescription() }.to_string())
        };
        let pending = completion.lock().ok().and_then(|mut c| c.take());
        if let Some(f) = pending {
            f(granted.as_bool(), error);
        }
    });
    unsafe {
        store.requestFullAccessToEventsWithCompletion(RcBlock::as_ptr(&block));
    }
}

pub fn default_calendar(store: &EKEventStore) -> Option<Retained<EKCalendar>> {
    unsafe { store.defaultCalendarForNewEvents() }
}

pub fn calendar_with_id(store: &EKEventStore, id: &str) -> Option<Retained<EKCalendar>> {
    unsafe { store.calendarWithIdentifier(&NSString::from_str(id)) }
}

pub fn calendar_properties(calendar: &EKCalendar) -> (String, String) {
    unsafe {
        (
            calendar.calendarIdentifier().to_string(),
            calendar.title().to_string(),
        )
    }
}

pub fn fetch_events(
    store: &EKEventStore,
    start: &NSDate,
    end: &NSDate,
    calendars: &[Retained<EKCalendar>],
) -> Vec<Retained<EKEvent>> {
    unsafe {
        let calendars = NSArray::from_retained_slice(calendars);
        let predicate =
            store.predicateForEventsWithStartDate_endDate_calendars(start, end, Some(&calendars));
        store.eventsMatchingPredicate(&predicate).to_vec()
    }
}

pub struct EventProperties {
    pub id: Option<String>,
    pub title: String,
    pub start: f64,
    pub end: f64,
    pub calendar_id: Option<String>,
    pub all_day: bool,
    pub location: Option<String>,
}

pub fn get_event_properties(event: &EKEvent) -> EventProperties {
    unsafe {
        EventProperties {
            id: event.eventIdentifier().map(|id| id.to_string()),
            title: event.title().to_string(),
            start: event.startDate().timeIntervalSince1970(),
            end: event.endDate().timeIntervalSince1970(),
            calendar_id: event
                .calendar()
                .map(|c| c.calendarIdentifier().to_string()),
            all_day: event.isAllDay(),
            location: event.location().map(|l| l.to_string()),
        }
    }
}

pub fn save_new_event(
    store: &EKEventStore,
    calendar: &EKCalendar,
    title: &str,
    start: f64,
    end: f64,
) -> Result<(), String> {
    unsafe {
        let event = EKEvent::eventWithEventStore(store);
        event.setTitle(Some(&NSString::from_str(title)));
        event.setStartDate(Some(&NSDate::dateWithTimeIntervalSince1970(start)));
        event.setEndDate(Some(&NSDate::dateWithTimeIntervalSince1970(end)));
        event.setCalendar(Some(calendar));
        store
            .saveEvent_span_commit_error(&event, EKSpan::ThisEvent, true)
            .map_err(|e| e.localizedDescription().to_string())
    }
}

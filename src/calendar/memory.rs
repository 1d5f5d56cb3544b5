//! In-process calendar store.
//!
//! Backs `--demo` and the tests. Permission answers and editor outcomes are
//! scripted up front; the permission answer is delivered from a separate
//! thread, the way EventKit delivers it from one of its own queues.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;

use chrono::{DateTime, Duration, Local};
use tracing::{debug, warn};

use crate::editor;

use super::error::CalendarError;
use super::events::{Calendar, Event, TimeWindow};
use super::provider::{
    AccessCallback, AuthorizationStatus, CalendarProvider, EditorAction, EditorCallback,
};

/// What the user does when prompted for access.
#[derive(Debug, Clone)]
pub enum AccessAnswer {
    Grant,
    Refuse,
    Fail(String),
    /// Leave the prompt open until [`MemoryProvider::answer_held_request`].
    Hold,
}

/// What the user does in the editor.
#[derive(Debug, Clone)]
pub enum EditorOutcome {
    Cancel,
    Save {
        title: String,
        start: DateTime<Local>,
        end: DateTime<Local>,
    },
    Delete(String),
}

struct State {
    status: AuthorizationStatus,
    answer: AccessAnswer,
    default_calendar: Option<Calendar>,
    events: Vec<Event>,
    editor_script: VecDeque<EditorOutcome>,
    query_failure: Option<String>,
    queries: Vec<TimeWindow>,
    access_requests: usize,
    held: Option<AccessCallback>,
    next_id: u64,
}

#[derive(Clone)]
pub struct MemoryProvider {
    state: Arc<Mutex<State>>,
    interactive: bool,
}

impl MemoryProvider {
    pub fn new(status: AuthorizationStatus, default_calendar: Option<Calendar>) -> Self {
        Self {
            state: Arc::new(Mutex::new(State {
                status,
                answer: AccessAnswer::Grant,
                default_calendar,
                events: Vec::new(),
                editor_script: VecDeque::new(),
                query_failure: None,
                queries: Vec::new(),
                access_requests: 0,
                held: None,
                next_id: 1,
            })),
            interactive: false,
        }
    }

    /// Once the editor script runs out, ask on the terminal instead of cancelling.
    pub fn interactive(mut self) -> Self {
        self.interactive = true;
        self
    }

    /// Authorized store with a "Calendar" default and a few events spread
    /// over the next day and a half.
    pub fn demo(now: DateTime<Local>) -> Self {
        let calendar = Calendar::new("demo", "Calendar");
        let other = Calendar::new("holidays", "Holidays");
        let provider = Self::new(AuthorizationStatus::Authorized, Some(calendar.clone()));
        let hour = |h: i64| now + Duration::hours(h);
        provider.insert(Event::new("demo-1", "Coffee with Sam", hour(1), hour(2), &calendar));
        provider.insert(
            Event::new("demo-2", "Design review", hour(4), hour(5), &calendar)
                .with_location("https://meet.example.com/design"),
        );
        provider.insert(
            Event::new("demo-3", "Bank holiday", hour(3), hour(27), &other).with_all_day(true),
        );
        provider.insert(Event::new("demo-4", "Dentist", hour(30), hour(31), &calendar));
        provider
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn insert(&self, event: Event) {
        self.lock().events.push(event);
    }

    pub fn set_status(&self, status: AuthorizationStatus) {
        self.lock().status = status;
    }

    pub fn set_access_answer(&self, answer: AccessAnswer) {
        self.lock().answer = answer;
    }

    pub fn script_editor(&self, outcome: EditorOutcome) {
        self.lock().editor_script.push_back(outcome);
    }

    /// Makes every following query fail until cleared with `None`.
    pub fn fail_queries(&self, reason: Option<&str>) {
        self.lock().query_failure = reason.map(str::to_string);
    }

    /// Windows passed to `query_events`, oldest first.
    pub fn queries(&self) -> Vec<TimeWindow> {
        self.lock().queries.clone()
    }

    pub fn access_requests(&self) -> usize {
        self.lock().access_requests
    }

    pub fn set_default_calendar(&self, calendar: Option<Calendar>) {
        self.lock().default_calendar = calendar;
    }

    /// Answers a prompt left open by [`AccessAnswer::Hold`]. Returns false if
    /// none is pending.
    pub fn answer_held_request(&self, answer: AccessAnswer) -> bool {
        let Some(completion) = self.lock().held.take() else {
            return false;
        };
        self.answer(answer, completion);
        true
    }

    fn answer(&self, answer: AccessAnswer, completion: AccessCallback) {
        if let AccessAnswer::Hold = answer {
            self.lock().held = Some(completion);
            return;
        }

        self.lock().status = match answer {
            AccessAnswer::Grant => AuthorizationStatus::Authorized,
            _ => AuthorizationStatus::Denied,
        };
        thread::spawn(move || match answer {
            AccessAnswer::Grant => completion(true, None),
            AccessAnswer::Fail(reason) => {
                completion(false, Some(CalendarError::PermissionRequestFailed(reason)))
            }
            AccessAnswer::Refuse | AccessAnswer::Hold => completion(false, None),
        });
    }

    fn prompt(&self, calendar: &Calendar) -> EditorOutcome {
        let stdin = std::io::stdin();
        let mut input = stdin.lock();
        let mut output = std::io::stderr();
        match editor::prompt_new_event(&mut input, &mut output, &calendar.title, Local::now()) {
            Ok(Some(draft)) => EditorOutcome::Save {
                title: draft.title,
                start: draft.start,
                end: draft.end,
            },
            Ok(None) => EditorOutcome::Cancel,
            Err(e) => {
                warn!(error = %e, "event editor failed");
                EditorOutcome::Cancel
            }
        }
    }

    fn apply(&self, calendar: &Calendar, outcome: EditorOutcome) -> EditorAction {
        let mut state = self.lock();
        match outcome {
            EditorOutcome::Cancel => EditorAction::Canceled,
            EditorOutcome::Save { title, start, end } => {
                let id = format!("mem-{}", state.next_id);
                state.next_id += 1;
                state.events.push(Event::new(id, title, start, end, calendar));
                EditorAction::Saved
            }
            EditorOutcome::Delete(id) => {
                state.events.retain(|e| e.id != id);
                EditorAction::Deleted
            }
        }
    }
}

impl CalendarProvider for MemoryProvider {
    fn authorization_status(&self) -> AuthorizationStatus {
        self.lock().status
    }

    fn request_access(&self, completion: AccessCallback) {
        let answer = {
            let mut state = self.lock();
            state.access_requests += 1;
            state.answer.clone()
        };
        self.answer(answer, completion);
    }

    fn default_calendar_for_new_events(&self) -> Result<Calendar, CalendarError> {
        self.lock()
            .default_calendar
            .clone()
            .ok_or(CalendarError::NoDefaultCalendar)
    }

    fn query_events(
        &self,
        window: &TimeWindow,
        calendars: &[Calendar],
    ) -> Result<Vec<Event>, CalendarError> {
        let mut state = self.lock();
        state.queries.push(*window);
        if let Some(reason) = &state.query_failure {
            return Err(CalendarError::QueryFailed(reason.clone()));
        }

        let events: Vec<Event> = state
            .events
            .iter()
            .filter(|e| calendars.iter().any(|c| c.id == e.calendar_id))
            .filter(|e| window.intersects(&e.start, &e.end))
            .cloned()
            .collect();
        debug!(count = events.len(), "memory store query");
        Ok(events)
    }

    fn present_event_editor(&self, calendar: &Calendar, completion: EditorCallback) {
        let scripted = self.lock().editor_script.pop_front();
        let outcome = match scripted {
            Some(outcome) => outcome,
            None if self.interactive => self.prompt(calendar),
            None => EditorOutcome::Cancel,
        };
        let action = self.apply(calendar, outcome);
        completion(action);
    }
}

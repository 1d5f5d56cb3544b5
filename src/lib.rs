pub mod args;
pub mod calendar;
pub mod controller;
pub mod dispatch;
pub mod editor;
#[cfg(target_os = "macos")]
mod ffi;
pub mod terminal;

pub use calendar::{CalendarError, CalendarProvider};
pub use controller::{AccessState, EventListController, View};

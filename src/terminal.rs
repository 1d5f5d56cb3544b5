use std::io::{self, Write};

use tracing::debug;

use crate::calendar::{time_range, CalendarError, Event};
use crate::controller::{View, Warning};

/// Dialogs and banners go to stderr as they happen; the listing itself is
/// written once at the end with [`write_listing`].
#[derive(Debug, Default)]
pub struct TerminalView;

impl View for TerminalView {
    fn reload(&mut self, rows: &[String]) {
        debug!(rows = rows.len(), "list reloaded");
    }

    fn set_create_enabled(&mut self, enabled: bool) {
        debug!(enabled, "create affordance");
    }

    fn show_warning(&mut self, warning: &Warning) {
        eprintln!("{}: {} [{}]", warning.title, warning.message, warning.action);
    }

    fn show_error(&mut self, error: &CalendarError) {
        eprintln!("Error: {error}");
    }
}

pub fn write_listing<W: Write>(out: &mut W, events: &[Event], details: bool) -> io::Result<()> {
    if events.is_empty() {
        return writeln!(out, "No events in the next 24 hours");
    }

    for (i, event) in events.iter().enumerate() {
        if details {
            writeln!(out, "{:>2}. {:<13}  {}", i + 1, time_range(event), event.display_title())?;
        } else {
            writeln!(out, "{}", event.display_title())?;
        }
    }
    Ok(())
}

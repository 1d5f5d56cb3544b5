use std::io::{self, Write};
use std::process::ExitCode;
use std::time::Duration;

use chrono::Local;
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use upcoming::args::{Cli, Command};
use upcoming::calendar::memory::MemoryProvider;
use upcoming::calendar::{describe_event, CalendarError, CalendarProvider};
use upcoming::terminal::{write_listing, TerminalView};
use upcoming::{AccessState, EventListController};

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.log_filter());

    match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            if e.is_permission() {
                print_settings_hint();
            }
            ExitCode::FAILURE
        }
    }
}

fn print_settings_hint() {
    eprintln!("Please grant calendar access in:");
    eprintln!("  System Settings > Privacy & Security > Calendars");
}

/// What to do once the permission gate has settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Gate {
    Open,
    /// The view already printed the privacy warning.
    Warned,
    /// The user just refused the prompt; nothing has been printed yet.
    Refused,
    /// The view already printed an error banner.
    Reported,
}

fn gate(state: AccessState, prompted: bool, errored: bool) -> Gate {
    match state {
        AccessState::Authorized => Gate::Open,
        AccessState::Denied | AccessState::Restricted if !prompted => Gate::Warned,
        AccessState::Denied if !errored => Gate::Refused,
        _ => Gate::Reported,
    }
}

fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    if let Err(e) = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init()
    {
        eprintln!("Warning: logging unavailable: {e}");
    }
}

fn run(cli: &Cli) -> Result<ExitCode, CalendarError> {
    if cli.demo {
        return run_with(MemoryProvider::demo(Local::now()).interactive(), cli);
    }

    #[cfg(target_os = "macos")]
    {
        run_with(upcoming::calendar::eventkit::EventKitProvider::new(), cli)
    }
    #[cfg(not(target_os = "macos"))]
    {
        Err(CalendarError::Unsupported("the system calendar (try --demo)"))
    }
}

fn run_with<P: CalendarProvider>(provider: P, cli: &Cli) -> Result<ExitCode, CalendarError> {
    let mut controller = EventListController::new(provider, TerminalView::default());
    controller.appear();

    let prompted = controller.access_state() == AccessState::Requesting;
    if prompted {
        eprintln!("Waiting for calendar permission...");
        if !controller.wait_for_message(Duration::from_secs(cli.wait_secs)) {
            return Err(CalendarError::PermissionRequestFailed(format!(
                "no answer after {}s",
                cli.wait_secs
            )));
        }
    }

    match gate(controller.access_state(), prompted, controller.error().is_some()) {
        Gate::Open => {}
        Gate::Warned => {
            print_settings_hint();
            return Ok(ExitCode::FAILURE);
        }
        Gate::Refused => return Err(CalendarError::PermissionDenied),
        Gate::Reported => return Ok(ExitCode::FAILURE),
    }

    let command = cli.command();
    debug!(?command, "running");

    if command == Command::Add {
        controller.create_event()?;
        controller.pump();
    }

    if controller.error().is_some() {
        return Ok(ExitCode::FAILURE);
    }

    let mut stdout = io::stdout().lock();
    match command {
        Command::List { details } => write_listing(&mut stdout, controller.events(), details)?,
        Command::Add => write_listing(&mut stdout, controller.events(), true)?,
        Command::Show { row } => {
            let Some(event) = row.checked_sub(1).and_then(|i| controller.event_at(i)) else {
                eprintln!("Error: no event at row {row}");
                return Ok(ExitCode::FAILURE);
            };
            writeln!(stdout, "{}", describe_event(event))?;
        }
    }

    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warning_is_not_followed_by_a_second_denial_message() {
        assert_eq!(gate(AccessState::Denied, false, false), Gate::Warned);
        assert_eq!(gate(AccessState::Restricted, false, false), Gate::Warned);
    }

    #[test]
    fn refusing_the_prompt_is_reported_once() {
        assert_eq!(gate(AccessState::Denied, true, false), Gate::Refused);
        assert_eq!(gate(AccessState::Denied, true, true), Gate::Reported);
    }

    #[test]
    fn authorized_proceeds() {
        assert_eq!(gate(AccessState::Authorized, false, false), Gate::Open);
        assert_eq!(gate(AccessState::Authorized, true, false), Gate::Open);
    }
}

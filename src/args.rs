use clap::{ArgAction, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "upcoming")]
#[command(about = "Events in your default calendar for the next 24 hours", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Use a built-in sample calendar instead of the system one
    #[arg(long, global = true)]
    pub demo: bool,

    /// Seconds to wait for an answer to the permission prompt
    #[arg(long, global = true, default_value_t = 60)]
    pub wait_secs: u64,

    /// More logging on stderr (RUST_LOG takes precedence)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// List upcoming events (the default)
    List {
        /// Show times and row numbers
        #[arg(long)]
        details: bool,
    },
    /// Create an event in the default calendar, then list again
    Add,
    /// Show one event from the listing
    Show {
        /// Row number as printed by `list --details`
        row: usize,
    },
}

impl Cli {
    pub fn command(&self) -> Command {
        self.command
            .clone()
            .unwrap_or(Command::List { details: false })
    }

    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "upcoming=debug",
            _ => "debug",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_plain_listing() {
        let cli = Cli::try_parse_from(["upcoming"]).unwrap();
        assert_eq!(cli.command(), Command::List { details: false });
        assert_eq!(cli.wait_secs, 60);
        assert!(!cli.demo);
        assert_eq!(cli.log_filter(), "warn");
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["upcoming", "show", "2", "--demo", "-vv"]).unwrap();
        assert_eq!(cli.command(), Command::Show { row: 2 });
        assert!(cli.demo);
        assert_eq!(cli.log_filter(), "debug");
    }

    #[test]
    fn list_details_flag() {
        let cli =
            Cli::try_parse_from(["upcoming", "list", "--details", "--wait-secs", "5"]).unwrap();
        assert_eq!(cli.command(), Command::List { details: true });
        assert_eq!(cli.wait_secs, 5);
    }

    #[test]
    fn show_requires_a_number() {
        assert!(Cli::try_parse_from(["upcoming", "show", "first"]).is_err());
    }
}

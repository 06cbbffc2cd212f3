use clap::{Parser, Subcommand};

/// Command-line interface definition for sheetfill
/// Fill or clear the clock times of a virtualized timesheet
#[derive(Parser)]
#[command(
    name = "sheetfill",
    version = env!("CARGO_PKG_VERSION"),
    about = "Autofill or clear timesheet clock-in/clock-out times so each day meets its required hours",
    long_about = None
)]
pub struct Cli {
    /// Override log database path (useful for tests or custom DB)
    #[arg(global = true, long = "db")]
    pub db: Option<String>,

    /// Run in test mode (no config file update)
    #[arg(global = true, long = "test", hide = true)]
    pub test: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the configuration and the log database
    Init,

    /// Manage the settings (view, query, change or edit)
    Config {
        #[arg(long = "print", help = "Print the current configuration")]
        print_config: bool,

        #[arg(long = "check", help = "Check configuration file for missing keys")]
        check: bool,

        #[arg(long = "get", value_name = "KEY", help = "Print the value of one key")]
        get: Option<String>,

        #[arg(
            long = "set",
            value_name = "KEY=VALUE",
            help = "Change one key (e.g. ftePercent=80)"
        )]
        set: Option<String>,

        #[arg(
            long = "edit",
            help = "Edit the configuration file (default editor: $EDITOR, or nano/notepad)"
        )]
        edit_config: bool,

        #[arg(
            long = "editor",
            help = "Specify the editor to use (vim, nano, or custom path)"
        )]
        editor: Option<String>,
    },

    /// Fill past days that are short of their required hours
    Autofill {
        #[arg(long, value_name = "FILE", help = "Timesheet snapshot (YAML)")]
        page: String,

        #[arg(
            long,
            value_name = "YYYY-MM-DD",
            help = "Reference day; only earlier days are filled (default: today)"
        )]
        today: Option<String>,

        #[arg(long, help = "Seed the random generator for a reproducible run")]
        seed: Option<u64>,

        #[arg(long = "dry-run", help = "Show what would change, keep the file as is")]
        dry_run: bool,

        #[arg(long, short, help = "Print each row as soon as it is written")]
        verbose: bool,
    },

    /// Blank every clock time of the timesheet
    Clear {
        #[arg(long, value_name = "FILE", help = "Timesheet snapshot (YAML)")]
        page: String,

        #[arg(long = "dry-run", help = "Show what would change, keep the file as is")]
        dry_run: bool,

        #[arg(long, short, help = "Print each row as soon as it is written")]
        verbose: bool,
    },

    /// Answer one command message ({"action": "autofill"|"clear"}) with a JSON status
    Message {
        #[arg(long, value_name = "FILE", help = "Timesheet snapshot (YAML)")]
        page: String,

        /// Request JSON; read from stdin when omitted
        json: Option<String>,
    },

    /// Print or manage the internal log table
    Log {
        #[arg(long = "print", help = "Print rows from the internal log table")]
        print: bool,
    },
}

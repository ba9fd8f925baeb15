//! CLI argument parsing for bazi

use clap::{Parser, Subcommand};
use lunarcal::ZiHourRule;
use std::path::PathBuf;

use crate::input::{CalendarSystem, Gender};

#[derive(Parser, Debug)]
#[command(name = "bz")]
#[command(author, version, about = "Four-Pillars (Bazi) chart calculator", long_about = None)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// History file (overrides config)
    #[arg(long, global = true)]
    pub history: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Derive the four-pillar chart of a birth moment
    Chart {
        #[command(flatten)]
        birth: BirthArgs,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,

        /// Save the chart to history
        #[arg(short, long)]
        save: bool,

        /// Label for the saved record
        #[arg(short, long, requires = "save")]
        name: Option<String>,
    },

    /// Derive two charts side by side for a compatibility match
    Match {
        /// Birth date of person A (YYYY-MM-DD)
        #[arg(long)]
        date_a: Option<String>,

        /// Birth time of person A (HH:mm)
        #[arg(long)]
        time_a: Option<String>,

        /// Birth date of person B (YYYY-MM-DD)
        #[arg(long)]
        date_b: Option<String>,

        /// Birth time of person B (HH:mm)
        #[arg(long)]
        time_b: Option<String>,

        /// Calendar both dates are given in
        #[arg(long)]
        calendar: Option<CalendarSystem>,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Show the almanac of a day
    Almanac {
        /// Gregorian date (default: today)
        #[arg(short, long)]
        date: Option<String>,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Convert a date between the solar and lunar calendars
    Convert {
        /// Date to convert (YYYY-MM-DD)
        #[arg(short, long)]
        date: String,

        /// Calendar the date is given in
        #[arg(long, default_value = "solar")]
        calendar: CalendarSystem,

        /// The lunar date lies in a leap month
        #[arg(long)]
        leap: bool,
    },

    /// List the 24 solar terms of a year
    Terms {
        /// Gregorian year
        #[arg(short, long)]
        year: i32,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Manage saved charts
    History {
        #[command(subcommand)]
        command: HistoryCommand,
    },
}

/// Birth data as entered on the command line
#[derive(clap::Args, Debug, Clone)]
pub struct BirthArgs {
    /// Birth date (YYYY-MM-DD)
    #[arg(short, long)]
    pub date: Option<String>,

    /// Birth time (HH:mm)
    #[arg(short, long)]
    pub time: Option<String>,

    /// Gender (male, female)
    #[arg(short, long, default_value = "male")]
    pub gender: Gender,

    /// Calendar the date is given in (default from config)
    #[arg(long)]
    pub calendar: Option<CalendarSystem>,

    /// Late Zi hour rule (same-day, next-day)
    #[arg(long)]
    pub zi_hour: Option<ZiHourRule>,
}

#[derive(Subcommand, Debug)]
pub enum HistoryCommand {
    /// List saved charts, newest first
    List {
        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Show one saved chart
    Show {
        /// Record ID
        #[arg(required = true)]
        id: String,
    },

    /// Delete one saved chart
    Delete {
        /// Record ID
        #[arg(required = true)]
        id: String,
    },

    /// Delete all saved charts
    Clear,
}

/// Output format for chart-producing commands
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "plain" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("Unknown format: {}. Use: text or json", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
        }
    }
}

use std::path::PathBuf;

use chrono::NaiveDateTime;
use clap::{Parser, Subcommand, ValueEnum};

use crate::theme::Filter;

#[derive(Parser, Debug)]
#[command(name = "dailynudge")]
#[command(about = "Daily micro-action nudges in your terminal", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Monthly content file produced by the generator
    #[arg(long, default_value = "content.json", global = true)]
    pub content: PathBuf,

    #[arg(long, value_enum, default_value = "info", global = true)]
    pub log_level: LogLevel,

    #[arg(long, global = true)]
    pub log_dir: Option<PathBuf>,

    /// Where shared cards are written
    #[arg(long, global = true)]
    pub share_dir: Option<PathBuf>,

    #[arg(long, global = true)]
    pub no_share: bool,

    /// Open Explore on this category (all, personal-identity, health-body, ...)
    #[arg(long, value_parser = parse_filter, global = true)]
    pub filter: Option<Filter>,

    /// Pretend the local clock reads this time (YYYY-MM-DDTHH:MM)
    #[arg(long, value_parser = parse_at, global = true)]
    pub at: Option<NaiveDateTime>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Render one of today's cards to an image file without the UI
    Share {
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=3))]
        card: u8,

        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Load the content file and print what today would show
    Check,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

fn parse_at(raw: &str) -> Result<NaiveDateTime, String> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M")
        .map_err(|err| format!("expected YYYY-MM-DDTHH:MM, got `{raw}`: {err}"))
}

fn parse_filter(raw: &str) -> Result<Filter, String> {
    Filter::parse(raw.trim()).ok_or_else(|| {
        let keys: Vec<&str> = Filter::PILLS.iter().map(|pill| pill.key()).collect();
        format!("unknown category `{raw}`; expected one of {}", keys.join(", "))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn defaults_run_the_ui() {
        let cli = Cli::try_parse_from(["dailynudge"]).unwrap();
        assert_eq!(cli.content, PathBuf::from("content.json"));
        assert_eq!(cli.log_level, LogLevel::Info);
        assert!(!cli.no_share);
        assert!(cli.command.is_none());
    }

    #[test]
    fn share_card_must_be_one_to_three() {
        assert!(Cli::try_parse_from(["dailynudge", "share", "--card", "4"]).is_err());
        let cli = Cli::try_parse_from(["dailynudge", "share", "--card", "2"]).unwrap();
        assert!(matches!(cli.command, Some(Command::Share { card: 2, output: None })));
    }

    #[test]
    fn at_overrides_clock() {
        let cli = Cli::try_parse_from(["dailynudge", "--at", "2026-10-17T21:30", "check"]).unwrap();
        assert_eq!(cli.at.unwrap().hour(), 21);
        assert!(Cli::try_parse_from(["dailynudge", "--at", "tomorrow"]).is_err());
    }

    #[test]
    fn filter_accepts_category_keys() {
        let cli = Cli::try_parse_from(["dailynudge", "--filter", "burnout"]).unwrap();
        assert_eq!(cli.filter, Some(Filter::Only(crate::theme::Theme::Burnout)));
        let err = Cli::try_parse_from(["dailynudge", "--filter", "gardening"]).unwrap_err();
        assert!(err.to_string().contains("health-body"));
    }
}

use crate::config::ReportFormat;
use crate::watch::DEFAULT_INTERVAL;
use clap::{builder::PossibleValuesParser, ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use strum::VariantNames;

#[derive(Debug, Parser)]
pub struct Args {
    /// Turn debugging information on
    #[arg(short, long, global = true, action(ArgAction::Count))]
    pub verbose: u8,
    /// Less verbose output
    #[arg(short, long, global = true, action(ArgAction::Count))]
    pub quiet: u8,
    /// Use this config file instead of the one in the user config directory
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
    #[command(subcommand)]
    pub subcommand: SubCommand,
}

#[derive(Debug, Subcommand)]
pub enum SubCommand {
    Scan(Scan),
    Report(Report),
    Watch(Watch),
    #[command(subcommand)]
    Config(ConfigCmd),
    /// List the report formats supported by dependency-check
    Formats,
}

/// Run dependency-check on a project and render the findings
#[derive(Debug, Parser)]
pub struct Scan {
    /// Project directory to scan (defaults to the current directory)
    pub path: Option<PathBuf>,
    /// Directory the scanner writes its reports into (defaults to the project)
    #[arg(short, long, value_name = "PATH")]
    pub out: Option<PathBuf>,
    /// Write the rendered html report to this file
    #[arg(short, long, value_name = "PATH")]
    pub panel: Option<PathBuf>,
}

/// Render an existing dependency-check json report
#[derive(Debug, Parser)]
pub struct Report {
    /// Path to dependency-check-report.json, or the directory containing it
    pub path: PathBuf,
    /// Write the rendered html report to this file
    #[arg(short, long, value_name = "PATH")]
    pub panel: Option<PathBuf>,
    /// Print the html table to stdout instead of writing a file
    #[arg(long)]
    pub stdout: bool,
}

/// Watch dependency manifests and ask for a re-scan when they change
#[derive(Debug, Parser)]
pub struct Watch {
    /// Project directory to watch (defaults to the current directory)
    pub path: Option<PathBuf>,
    /// Seconds between checks for modified manifests
    #[arg(short, long, default_value_t = DEFAULT_INTERVAL.as_secs())]
    pub interval: u64,
    /// Re-run the scan automatically instead of only printing a notice
    #[arg(short, long)]
    pub rescan: bool,
    /// Run a scan before starting to watch
    #[arg(long)]
    pub initial_scan: bool,
    /// Directory the scanner writes its reports into (defaults to the project)
    #[arg(short, long, value_name = "PATH")]
    pub out: Option<PathBuf>,
    /// Write the rendered html report to this file
    #[arg(short, long, value_name = "PATH")]
    pub panel: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCmd {
    /// Print the current configuration
    Show,
    /// Set the path to the dependency-check/bin folder
    SetPath { path: PathBuf },
    /// Set the report format passed to dependency-check
    SetFormat {
        #[arg(value_parser(PossibleValuesParser::new(ReportFormat::VARIANTS)), ignore_case = true)]
        format: String,
    },
    /// Disable (or enable) the automatic vulnerability database update
    SetNoUpdate {
        #[arg(action(ArgAction::Set))]
        enabled: bool,
    },
    /// Set the project name shown in the generated reports
    SetProjectName { name: String },
    /// Pretty print the json/xml reports
    SetPrettyPrint {
        #[arg(action(ArgAction::Set))]
        enabled: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::*;

    #[test]
    fn test_watch_interval_default() -> Result<()> {
        let args = Args::try_parse_from(["depcheck-watch", "watch"])?;
        match args.subcommand {
            SubCommand::Watch(watch) => {
                assert_eq!(watch.interval, DEFAULT_INTERVAL.as_secs());
                assert!(!watch.rescan);
            }
            other => panic!("unexpected subcommand: {:?}", other),
        }
        Ok(())
    }
}

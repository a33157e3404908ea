use clap::Parser;
use depcheck_watch::args::{Args, ConfigCmd, SubCommand};
use depcheck_watch::config::{self, Config, ReportFormat};
use depcheck_watch::controller::{Controller, WatchOptions};
use depcheck_watch::errors::*;
use depcheck_watch::render;
use depcheck_watch::report::{self, REPORT_FILENAME};
use env_logger::Env;
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;
use strum::VariantNames;

fn project_dir(path: Option<PathBuf>) -> Result<PathBuf> {
    match path {
        Some(path) => Ok(path),
        None => env::current_dir().context("Failed to detect current directory"),
    }
}

fn update_config(path: &Path, cmd: ConfigCmd) -> Result<()> {
    let mut config = Config::load(path)?;

    match cmd {
        ConfigCmd::Show => {
            print!("{}", toml::to_string_pretty(&config)?);
            return Ok(());
        }
        ConfigCmd::SetPath { path } => {
            if !path.is_dir() {
                bail!("Scanner directory {:?} does not exist", path);
            }
            info!("Using dependency-check from {:?}", path);
            config.scanner_dir = Some(path);
        }
        ConfigCmd::SetFormat { format } => {
            config.report_format = format.parse::<ReportFormat>()?;
        }
        ConfigCmd::SetNoUpdate { enabled } => config.no_update = enabled,
        ConfigCmd::SetProjectName { name } => config.project_name = name,
        ConfigCmd::SetPrettyPrint { enabled } => config.pretty_print = enabled,
    }

    config.save(path)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = match (args.quiet, args.verbose) {
        (0, 0) => "info",
        (_, 0) => "warn",
        (_, 1) => "debug",
        (_, _) => "trace",
    };
    env_logger::init_from_env(Env::default().default_filter_or(log_level));

    let config_path = match args.config {
        Some(path) => path,
        None => config::default_path()?,
    };

    match args.subcommand {
        SubCommand::Scan(scan) => {
            let config = Config::load(&config_path)?;
            let project = project_dir(scan.path)?;
            let mut controller = Controller::new(config).with_panel_path(scan.panel);
            controller.scan(&project, scan.out.as_deref()).await?;
        }
        SubCommand::Report(opts) => {
            let path = if opts.path.is_dir() {
                opts.path.join(REPORT_FILENAME)
            } else {
                opts.path
            };

            if opts.stdout {
                let deps = report::vulnerable_dependencies(report::load_report(&path)?);
                print!("{}", render::render_table(&deps)?);
            } else {
                let config = Config::load(&config_path)?;
                let mut controller = Controller::new(config).with_panel_path(opts.panel);
                controller.report(&path)?;
            }
        }
        SubCommand::Watch(opts) => {
            let config = Config::load(&config_path)?;
            let project = project_dir(opts.path)?;
            let mut controller = Controller::new(config).with_panel_path(opts.panel);
            let watch_opts = WatchOptions {
                out: opts.out,
                interval: Duration::from_secs(opts.interval.max(1)),
                rescan: opts.rescan,
                initial_scan: opts.initial_scan,
            };
            let summary = controller
                .watch(&project, &watch_opts, tokio::signal::ctrl_c())
                .await?;
            debug!("Stopped watching: {:?}", summary);
        }
        SubCommand::Config(cmd) => update_config(&config_path, cmd)?,
        SubCommand::Formats => {
            for format in ReportFormat::VARIANTS {
                println!("{}", format);
            }
        }
    }

    Ok(())
}

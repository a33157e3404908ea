use crate::command::{self, Platform};
use crate::config::Config;
use crate::errors::*;
use crate::panel::{Panel, PANEL_FILENAME};
use crate::render;
use crate::report::{self, REPORT_FILENAME};
use crate::runner;
use crate::watch::ManifestWatcher;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanOutcome {
    /// Scanner succeeded and the report is shown in the panel
    Reported,
    /// Scanner succeeded but its report couldn't be rendered
    ReportFailed,
}

#[derive(Debug, Clone)]
pub struct WatchOptions {
    pub out: Option<PathBuf>,
    pub interval: Duration,
    /// Re-run the scan on every change instead of only printing a notice
    pub rescan: bool,
    pub initial_scan: bool,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WatchSummary {
    /// Batches of manifest changes picked up between two polls
    pub batches: usize,
    pub scans: usize,
    pub failed_scans: usize,
}

pub struct Controller {
    config: Config,
    platform: Platform,
    panel: Option<Panel>,
    panel_path: Option<PathBuf>,
}

impl Controller {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            platform: Platform::current(),
            panel: None,
            panel_path: None,
        }
    }

    /// Write the report panel to this path instead of next to the report
    pub fn with_panel_path(mut self, path: Option<PathBuf>) -> Self {
        self.panel_path = path;
        self
    }

    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn panel(&self) -> Option<&Panel> {
        self.panel.as_ref()
    }

    /// Run the scanner on a project and refresh the report panel
    pub async fn scan(
        &mut self,
        project_dir: &Path,
        out_dir: Option<&Path>,
    ) -> Result<ScanOutcome> {
        if !project_dir.is_dir() {
            bail!("Project directory {:?} does not exist", project_dir);
        }
        let out_dir = out_dir.unwrap_or(project_dir);
        let cmd = command::scan_command(self.platform, &self.config, project_dir, out_dir)?;

        info!("Started dependency check of {:?}", project_dir);
        let mut last = None;
        runner::run_scan(
            &cmd,
            Some(|percent| {
                if last != Some(percent) {
                    info!("Progress: {}%", percent);
                    last = Some(percent);
                }
            }),
        )
        .await
        .context("Dependency check failed")?;
        info!("Dependency check finished");

        let report_path = out_dir.join(REPORT_FILENAME);
        if let Err(err) = self.report(&report_path) {
            error!("Failed to generate report: {:#}", err);
            return Ok(ScanOutcome::ReportFailed);
        }
        Ok(ScanOutcome::Reported)
    }

    /// Render a report file into the panel, returns the number of table rows
    pub fn report(&mut self, report_path: &Path) -> Result<usize> {
        let report = report::load_report(report_path)?;
        let deps = report::vulnerable_dependencies(report);
        let rows = deps.iter().map(|d| d.vulnerabilities.len()).sum();
        info!(
            "Found {} vulnerable dependencies with {} vulnerabilities",
            deps.len(),
            rows
        );
        let html = render::render_table(&deps)?;

        let panel = match self.panel.take() {
            Some(panel) => panel,
            None => {
                let path = self.panel_path.clone().unwrap_or_else(|| {
                    report_path
                        .parent()
                        .unwrap_or_else(|| Path::new("."))
                        .join(PANEL_FILENAME)
                });
                Panel::open(path)
            }
        };
        let shown = panel.show(&html);
        self.panel = Some(panel);
        shown?;

        Ok(rows)
    }

    pub fn close_panel(&mut self) {
        if let Some(panel) = self.panel.take() {
            panel.close();
        }
    }

    async fn scan_logged(
        &mut self,
        project_dir: &Path,
        out_dir: Option<&Path>,
        summary: &mut WatchSummary,
    ) {
        summary.scans += 1;
        if let Err(err) = self.scan(project_dir, out_dir).await {
            error!("{:#}", err);
            summary.failed_scans += 1;
        }
    }

    /// Watch the manifests of a project until `shutdown` completes
    ///
    /// Scans run inline, so manifest edits made while the scanner is busy are
    /// picked up by the next poll as a single batch.
    pub async fn watch<F: Future>(
        &mut self,
        project_dir: &Path,
        opts: &WatchOptions,
        shutdown: F,
    ) -> Result<WatchSummary> {
        if !project_dir.is_dir() {
            bail!("Project directory {:?} does not exist", project_dir);
        }
        if opts.rescan || opts.initial_scan {
            // fail early instead of on the first manifest change
            self.config.scanner_dir()?;
        }

        let mut watcher = ManifestWatcher::new(project_dir.to_path_buf(), opts.interval)?;
        let mut summary = WatchSummary::default();
        let out_dir = opts.out.as_deref();

        if opts.initial_scan {
            self.scan_logged(project_dir, out_dir, &mut summary).await;
        }

        tokio::pin!(shutdown);
        loop {
            let changes = tokio::select! {
                changes = watcher.changed() => changes,
                _ = &mut shutdown => break,
            };

            let changes = match changes {
                Ok(changes) => changes,
                Err(err) => {
                    error!("Failed to check manifests: {:#}", err);
                    tokio::time::sleep(opts.interval).await;
                    continue;
                }
            };
            summary.batches += 1;

            for change in &changes {
                info!("Manifest {}: {:?}", change.verb(), change.path());
            }

            if opts.rescan {
                self.scan_logged(project_dir, out_dir, &mut summary).await;
            } else {
                warn!(
                    "Dependencies of {:?} changed, run `depcheck-watch scan` to refresh the report",
                    project_dir
                );
            }
        }

        self.close_panel();
        Ok(summary)
    }
}

use crate::errors::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use strum::{Display, EnumString, EnumVariantNames};

pub const DEFAULT_PROJECT_NAME: &str = "Dependency Check";

/// Output formats understood by `dependency-check --format`
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumVariantNames,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum ReportFormat {
    Html,
    Xml,
    Csv,
    #[default]
    Json,
    Junit,
    Sarif,
    Jenkins,
    Gitlab,
    All,
}

impl ReportFormat {
    pub fn includes_json(&self) -> bool {
        matches!(self, ReportFormat::Json | ReportFormat::All)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory that contains dependency-check.sh / dependency-check.bat
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scanner_dir: Option<PathBuf>,
    pub report_format: ReportFormat,
    /// Pass --noupdate so the scanner doesn't refresh its vulnerability database
    pub no_update: bool,
    pub project_name: String,
    pub pretty_print: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scanner_dir: None,
            report_format: ReportFormat::default(),
            no_update: false,
            project_name: DEFAULT_PROJECT_NAME.to_string(),
            pretty_print: true,
        }
    }
}

pub fn default_path() -> Result<PathBuf> {
    let dir = dirs::config_dir().context("Failed to detect config directory")?;
    Ok(dir.join("depcheck-watch").join("config.toml"))
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No config file at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| anyhow!("Failed to read config file {:?}", path))?;
        let config = toml::from_str(&contents)
            .with_context(|| anyhow!("Failed to parse config file {:?}", path))?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let parent = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(parent)
            .with_context(|| anyhow!("Failed to create config directory {:?}", parent))?;

        let contents = toml::to_string_pretty(self)?;
        let mut tmp = tempfile::NamedTempFile::new_in(parent)?;
        tmp.write_all(contents.as_bytes())?;
        tmp.persist(path)
            .with_context(|| anyhow!("Failed to write config file {:?}", path))?;

        debug!("Saved config to {:?}", path);
        Ok(())
    }

    pub fn scanner_dir(&self) -> Result<&Path> {
        match &self.scanner_dir {
            Some(dir) => Ok(dir.as_path()),
            None => bail!("Scanner path is not configured, run `depcheck-watch config set-path <dir>` first"),
        }
    }
}

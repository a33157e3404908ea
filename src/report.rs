use crate::errors::*;
use serde::Deserialize;
use std::fs;
use std::path::Path;

pub const REPORT_FILENAME: &str = "dependency-check-report.json";

#[derive(Debug, Deserialize)]
pub struct ScanReport {
    pub dependencies: Vec<DependencyEntry>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyEntry {
    pub file_name: String,
    pub file_path: String,
    pub description: Option<String>,
    pub vulnerabilities: Option<Vec<Vulnerability>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Vulnerability {
    pub name: String,
    #[serde(default)]
    pub severity: String,
    #[serde(default)]
    pub description: String,
}

/// A dependency that has at least one known vulnerability
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VulnerableDependency {
    pub file_name: String,
    pub file_path: String,
    pub description: String,
    pub vulnerabilities: Vec<Vulnerability>,
}

impl VulnerableDependency {
    fn from_entry(entry: DependencyEntry) -> Option<Self> {
        let vulnerabilities = entry.vulnerabilities.filter(|v| !v.is_empty())?;
        Some(Self {
            file_name: entry.file_name,
            file_path: entry.file_path,
            description: entry.description.unwrap_or_default(),
            vulnerabilities,
        })
    }
}

pub fn parse_report(json: &str) -> Result<ScanReport> {
    let report = serde_json::from_str(json).context("Failed to parse scan report")?;
    Ok(report)
}

pub fn load_report(path: &Path) -> Result<ScanReport> {
    let json = fs::read_to_string(path)
        .with_context(|| anyhow!("Failed to read scan report {:?}", path))?;
    parse_report(&json).with_context(|| anyhow!("Invalid scan report {:?}", path))
}

/// Keep the dependencies that have vulnerabilities, in report order
pub fn vulnerable_dependencies(report: ScanReport) -> Vec<VulnerableDependency> {
    report
        .dependencies
        .into_iter()
        .filter_map(VulnerableDependency::from_entry)
        .collect()
}

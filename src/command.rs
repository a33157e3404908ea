use crate::config::{Config, ReportFormat};
use crate::errors::*;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    Unix,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(windows) {
            Platform::Windows
        } else {
            Platform::Unix
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arg {
    Literal(&'static str),
    Param(&'static str),
    /// Emitted only if the named flag is set
    Flag(&'static str, &'static str),
}

#[derive(Debug)]
pub struct CommandTemplate {
    pub platform: Platform,
    pub program: &'static str,
    pub args: &'static [Arg],
}

const SCAN_ARGS: &[Arg] = &[
    Arg::Literal("--project"),
    Arg::Param("project"),
    Arg::Literal("--scan"),
    Arg::Param("scan"),
    Arg::Literal("--out"),
    Arg::Param("out"),
    Arg::Flag("noupdate", "--noupdate"),
    Arg::Flag("pretty", "--prettyPrint"),
    Arg::Literal("--format"),
    Arg::Param("format"),
];

pub const TEMPLATES: &[CommandTemplate] = &[
    CommandTemplate {
        platform: Platform::Windows,
        program: "dependency-check.bat",
        args: SCAN_ARGS,
    },
    CommandTemplate {
        platform: Platform::Unix,
        program: "./dependency-check.sh",
        args: SCAN_ARGS,
    },
];

pub fn template_for(platform: Platform) -> Result<&'static CommandTemplate> {
    TEMPLATES
        .iter()
        .find(|t| t.platform == platform)
        .ok_or_else(|| anyhow!("No scanner command known for {:?}", platform))
}

#[derive(Debug, Default)]
pub struct Params {
    values: HashMap<&'static str, Vec<String>>,
    flags: HashMap<&'static str, bool>,
}

impl Params {
    pub fn set(&mut self, name: &'static str, value: impl Into<String>) -> &mut Self {
        self.values.insert(name, vec![value.into()]);
        self
    }

    /// Repeated parameters expand to `<flag> <value>` for every extra value
    pub fn push(&mut self, name: &'static str, value: impl Into<String>) -> &mut Self {
        self.values.entry(name).or_default().push(value.into());
        self
    }

    pub fn flag(&mut self, name: &'static str, enabled: bool) -> &mut Self {
        self.flags.insert(name, enabled);
        self
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct ScanCommand {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub work_dir: PathBuf,
}

impl CommandTemplate {
    pub fn render(&self, params: &Params) -> Result<Vec<String>> {
        let mut args = Vec::new();
        let mut last_literal = None;

        for arg in self.args {
            match arg {
                Arg::Literal(s) => {
                    args.push(s.to_string());
                    last_literal = Some(*s);
                }
                Arg::Param(name) => {
                    let values = params
                        .values
                        .get(name)
                        .filter(|v| !v.is_empty())
                        .ok_or_else(|| anyhow!("Missing value for scanner parameter {:?}", name))?;
                    for (i, value) in values.iter().enumerate() {
                        if i > 0 {
                            if let Some(literal) = last_literal {
                                args.push(literal.to_string());
                            }
                        }
                        args.push(value.clone());
                    }
                }
                Arg::Flag(name, flag) => {
                    if params.flags.get(name).copied().unwrap_or(false) {
                        args.push(flag.to_string());
                    }
                }
            }
        }

        Ok(args)
    }
}

/// Build the scanner invocation for a project directory
pub fn scan_command(
    platform: Platform,
    config: &Config,
    project_dir: &Path,
    out_dir: &Path,
) -> Result<ScanCommand> {
    let scanner_dir = config.scanner_dir()?;
    let template = template_for(platform)?;

    let mut params = Params::default();
    params
        .set("project", config.project_name.clone())
        .set("scan", project_dir.to_string_lossy())
        .set("out", out_dir.to_string_lossy())
        .set("format", config.report_format.to_string())
        .flag("noupdate", config.no_update)
        .flag("pretty", config.pretty_print);

    // the json report is always needed to render the table
    if !config.report_format.includes_json() {
        params.push("format", ReportFormat::Json.to_string());
    }

    let args = template.render(&params)?;
    Ok(ScanCommand {
        program: scanner_dir.join(template.program),
        args,
        work_dir: scanner_dir.to_path_buf(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config {
            scanner_dir: Some(PathBuf::from("/opt/dc/bin")),
            ..Default::default()
        }
    }

    #[test]
    fn test_unix_command() -> Result<()> {
        let cmd = scan_command(
            Platform::Unix,
            &config(),
            Path::new("/src/app"),
            Path::new("/src/app"),
        )?;
        assert_eq!(
            cmd,
            ScanCommand {
                program: PathBuf::from("/opt/dc/bin/./dependency-check.sh"),
                args: vec![
                    "--project".to_string(),
                    "Dependency Check".to_string(),
                    "--scan".to_string(),
                    "/src/app".to_string(),
                    "--out".to_string(),
                    "/src/app".to_string(),
                    "--prettyPrint".to_string(),
                    "--format".to_string(),
                    "JSON".to_string(),
                ],
                work_dir: PathBuf::from("/opt/dc/bin"),
            }
        );
        Ok(())
    }

    #[test]
    fn test_windows_command_with_flags() -> Result<()> {
        let mut config = config();
        config.no_update = true;
        config.pretty_print = false;
        config.report_format = ReportFormat::Html;

        let cmd = scan_command(
            Platform::Windows,
            &config,
            Path::new("C:\\src\\app"),
            Path::new("C:\\out"),
        )?;
        assert!(cmd.program.ends_with("dependency-check.bat"));
        assert_eq!(
            cmd.args[6..],
            ["--noupdate", "--format", "HTML", "--format", "JSON"]
        );
        assert!(!cmd.args.contains(&"--prettyPrint".to_string()));
        Ok(())
    }

    #[test]
    fn test_missing_scanner_dir() {
        let err = scan_command(
            Platform::Unix,
            &Config::default(),
            Path::new("/src"),
            Path::new("/src"),
        )
        .unwrap_err();
        assert!(err.to_string().contains("not configured"));
    }

    #[test]
    fn test_missing_param() {
        let template = template_for(Platform::Unix).unwrap();
        let mut params = Params::default();
        params.set("project", "x").set("scan", "/a");
        assert!(template.render(&params).is_err());
    }

    #[test]
    fn test_every_platform_has_a_template() {
        for platform in [Platform::Windows, Platform::Unix] {
            assert!(template_for(platform).is_ok());
        }
        assert!(template_for(Platform::current()).is_ok());
    }
}

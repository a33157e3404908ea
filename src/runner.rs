use crate::command::ScanCommand;
use crate::errors::*;
use regex::Regex;
use std::ffi::OsStr;
use std::path::Path;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;

pub struct ProgressParser {
    re: Regex,
}

impl ProgressParser {
    pub fn new() -> Result<Self> {
        let re = Regex::new(r"Progress: (\d+)%")?;
        Ok(Self { re })
    }

    pub fn parse(&self, line: &str) -> Option<u8> {
        let caps = self.re.captures(line)?;
        let percent = caps[1].parse::<u8>().ok()?;
        Some(percent.min(100))
    }
}

/// Run a command to completion, reporting `Progress: <n>%` lines from stdout
pub async fn run<S, F>(
    program: &Path,
    args: &[S],
    work_dir: &Path,
    mut on_progress: Option<F>,
) -> Result<()>
where
    S: AsRef<OsStr>,
    F: FnMut(u8),
{
    let parser = ProgressParser::new()?;

    let mut child = Command::new(program)
        .args(args)
        .current_dir(work_dir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .spawn()
        .with_context(|| anyhow!("Failed to run {:?}", program))?;

    let stdout = child
        .stdout
        .take()
        .context("Failed to capture stdout of child process")?;
    let mut lines = BufReader::new(stdout).split(b'\n');

    loop {
        let buf = match lines.next_segment().await {
            Ok(Some(buf)) => buf,
            Ok(None) => break,
            Err(err) => {
                warn!("Failed to read output of {:?}: {:#}", program, err);
                break;
            }
        };
        let line = String::from_utf8_lossy(&buf);
        let line = line.trim_end_matches('\r');

        match parser.parse(line) {
            Some(percent) => {
                trace!("Progress of {:?}: {}%", program, percent);
                if let Some(on_progress) = on_progress.as_mut() {
                    on_progress(percent);
                }
            }
            None => debug!("{}", line),
        }
    }

    let status = child
        .wait()
        .await
        .with_context(|| anyhow!("Failed to wait for {:?}", program))?;
    if !status.success() {
        bail!("Process ({:?}) exited with error: {:?}", program, status);
    }

    Ok(())
}

pub async fn run_scan<F: FnMut(u8)>(cmd: &ScanCommand, on_progress: Option<F>) -> Result<()> {
    info!("Running {:?} {:?}", cmd.program, cmd.args);
    run(&cmd.program, &cmd.args, &cmd.work_dir, on_progress).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_parsing() -> Result<()> {
        let parser = ProgressParser::new()?;
        assert_eq!(parser.parse("[INFO] Progress: 42%"), Some(42));
        assert_eq!(parser.parse("Progress: 0%"), Some(0));
        assert_eq!(parser.parse("Progress: 250%"), Some(100));
        assert_eq!(parser.parse("Progress: 99999%"), None);
        assert_eq!(parser.parse("Progress: 12"), None);
        assert_eq!(parser.parse("Analysis Started"), None);
        Ok(())
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_reports_progress() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let mut seen = Vec::new();
        run(
            Path::new("sh"),
            &["-c", "echo start; echo 'Progress: 10%'; echo 'Progress: 100%'; echo done"],
            dir.path(),
            Some(|p| seen.push(p)),
        )
        .await?;
        assert_eq!(seen, [10, 100]);
        Ok(())
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_tolerates_invalid_utf8() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let mut seen = Vec::new();
        run(
            Path::new("sh"),
            &["-c", "printf 'Caf\\351 analyzer\\r\\n'; echo 'Progress: 50%'; printf '\\377'; exit 0"],
            dir.path(),
            Some(|p| seen.push(p)),
        )
        .await?;
        assert_eq!(seen, [50]);
        Ok(())
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_uses_work_dir() -> Result<()> {
        let dir = tempfile::tempdir()?;
        run(
            Path::new("sh"),
            &["-c", "touch marker"],
            dir.path(),
            None::<fn(u8)>,
        )
        .await?;
        assert!(dir.path().join("marker").exists());
        Ok(())
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_non_zero_exit() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let err = run(Path::new("sh"), &["-c", "exit 3"], dir.path(), None::<fn(u8)>)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("exited with error"));
        Ok(())
    }

    #[tokio::test]
    async fn test_spawn_failure() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let program = dir.path().join("does-not-exist");
        let err = run(&program, &[] as &[&str], dir.path(), None::<fn(u8)>)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Failed to run"));
        Ok(())
    }
}

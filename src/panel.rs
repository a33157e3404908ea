use crate::errors::*;
use std::fs;
use std::path::{Path, PathBuf};

pub const PANEL_FILENAME: &str = "dependency-check-panel.html";
const TITLE: &str = "Dependency Check Report";

/// Display surface for a rendered report, backed by an html file
#[derive(Debug)]
pub struct Panel {
    path: PathBuf,
}

impl Panel {
    pub fn open(path: PathBuf) -> Self {
        debug!("Opening report panel at {:?}", path);
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn show(&self, fragment: &str) -> Result<()> {
        let html = format!(
            "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n</head>\n<body>\n<h1>{}</h1>\n{}</body>\n</html>\n",
            TITLE, TITLE, fragment
        );
        fs::write(&self.path, html)
            .with_context(|| anyhow!("Failed to write report panel {:?}", self.path))?;
        info!("Report written to {:?}", self.path);
        Ok(())
    }

    pub fn close(self) {
        debug!("Closing report panel at {:?}", self.path);
    }
}

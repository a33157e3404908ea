use crate::errors::*;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(2);

pub const MANIFESTS: &[&str] = &[
    "pom.xml",
    "build.gradle",
    "build.gradle.kts",
    "package.json",
    "package-lock.json",
    "yarn.lock",
    "requirements.txt",
    "Pipfile.lock",
    "Gemfile.lock",
    "composer.lock",
    "go.mod",
    "go.sum",
    "Cargo.lock",
    "packages.config",
];
const MANIFEST_EXTENSIONS: &[&str] = &["csproj"];
const SKIPPED_DIRS: &[&str] = &[".git", "node_modules", "target"];

pub fn is_manifest(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    if MANIFESTS.contains(&name) {
        return true;
    }
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| MANIFEST_EXTENSIONS.contains(&ext))
        .unwrap_or(false)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FileState {
    modified: Option<SystemTime>,
    len: u64,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct Snapshot {
    files: BTreeMap<PathBuf, FileState>,
}

impl Snapshot {
    pub fn scan(root: &Path) -> Result<Self> {
        let entries = fs::read_dir(root)
            .with_context(|| anyhow!("Failed to read directory {:?}", root))?;
        let mut snapshot = Snapshot::default();
        snapshot.visit(entries);
        Ok(snapshot)
    }

    fn walk(&mut self, dir: &Path) {
        match fs::read_dir(dir) {
            Ok(entries) => self.visit(entries),
            Err(err) => warn!("Skipping unreadable directory {:?}: {}", dir, err),
        }
    }

    fn visit(&mut self, entries: fs::ReadDir) {
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    warn!("Failed to read directory entry: {}", err);
                    continue;
                }
            };
            let path = entry.path();
            let file_type = match entry.file_type() {
                Ok(file_type) => file_type,
                Err(err) => {
                    warn!("Skipping {:?}: {}", path, err);
                    continue;
                }
            };

            if file_type.is_dir() {
                let skipped = entry
                    .file_name()
                    .to_str()
                    .map(|name| SKIPPED_DIRS.contains(&name))
                    .unwrap_or(false);
                if !skipped {
                    self.walk(&path);
                }
            } else if file_type.is_file() && is_manifest(&path) {
                match entry.metadata() {
                    Ok(metadata) => {
                        let state = FileState {
                            modified: metadata.modified().ok(),
                            len: metadata.len(),
                        };
                        self.files.insert(path, state);
                    }
                    // removed since read_dir listed it
                    Err(err) => warn!("Skipping {:?}: {}", path, err),
                }
            }
        }
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn changes_since(&self, old: &Snapshot) -> Vec<Change> {
        let mut changes = Vec::new();
        for (path, state) in &self.files {
            match old.files.get(path) {
                None => changes.push(Change::Created(path.clone())),
                Some(old_state) if old_state != state => {
                    changes.push(Change::Modified(path.clone()))
                }
                Some(_) => (),
            }
        }
        for path in old.files.keys() {
            if !self.files.contains_key(path) {
                changes.push(Change::Removed(path.clone()));
            }
        }
        changes
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    Created(PathBuf),
    Modified(PathBuf),
    Removed(PathBuf),
}

impl Change {
    pub fn path(&self) -> &Path {
        match self {
            Change::Created(path) => path,
            Change::Modified(path) => path,
            Change::Removed(path) => path,
        }
    }

    pub fn verb(&self) -> &'static str {
        match self {
            Change::Created(_) => "added",
            Change::Modified(_) => "modified",
            Change::Removed(_) => "removed",
        }
    }
}

/// Polls a project directory for added, modified or removed manifests
pub struct ManifestWatcher {
    root: PathBuf,
    interval: Duration,
    snapshot: Snapshot,
}

impl ManifestWatcher {
    pub fn new(root: PathBuf, interval: Duration) -> Result<Self> {
        let snapshot = Snapshot::scan(&root)?;
        info!(
            "Watching {} manifest(s) in {:?}",
            snapshot.len(),
            root
        );
        Ok(Self {
            root,
            interval,
            snapshot,
        })
    }

    /// Rescan now and return everything that changed since the last poll
    pub fn poll(&mut self) -> Result<Vec<Change>> {
        let snapshot = Snapshot::scan(&self.root)?;
        let changes = snapshot.changes_since(&self.snapshot);
        self.snapshot = snapshot;
        Ok(changes)
    }

    /// Wait until at least one manifest changed
    pub async fn changed(&mut self) -> Result<Vec<Change>> {
        loop {
            tokio::time::sleep(self.interval).await;
            let changes = self.poll()?;
            if !changes.is_empty() {
                return Ok(changes);
            }
        }
    }
}

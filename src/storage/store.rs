//! Snapshot files on disk
//!
//! JSON by default, YAML when the extension is `.yaml` or `.yml`. Reads take
//! a shared lock; writes go to a locked temp file that is renamed over the
//! target.

use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fs2::FileExt;
use tracing::info;

use super::snapshot::PlanSnapshot;
use crate::project::{Listener, ProjectFile, ProjectOptions};

/// Serialization used for a snapshot file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotFormat {
    Json,
    Yaml,
}

impl SnapshotFormat {
    /// Picks the format from a file extension
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
                SnapshotFormat::Yaml
            }
            _ => SnapshotFormat::Json,
        }
    }
}

/// Store for one plan snapshot file
pub struct SnapshotStore {
    path: PathBuf,
    format: SnapshotFormat,
}

impl SnapshotStore {
    /// Creates a store at the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let format = SnapshotFormat::from_path(&path);
        Self { path, format }
    }

    /// Returns the path to the store file
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> SnapshotFormat {
        self.format
    }

    /// Reads the raw snapshot
    pub fn read_snapshot(&self) -> Result<PlanSnapshot> {
        let file = File::open(&self.path)
            .with_context(|| format!("Failed to open snapshot: {}", self.path.display()))?;

        file.lock_shared()
            .context("Failed to acquire read lock on snapshot")?;

        let reader = BufReader::new(&file);
        let snapshot = match self.format {
            SnapshotFormat::Json => serde_json::from_reader(reader)
                .with_context(|| format!("Failed to parse snapshot: {}", self.path.display()))?,
            SnapshotFormat::Yaml => serde_yaml::from_reader(reader)
                .with_context(|| format!("Failed to parse snapshot: {}", self.path.display()))?,
        };

        Ok(snapshot)
    }

    /// Loads the snapshot into a new registry
    pub fn read(&self, options: ProjectOptions) -> Result<ProjectFile> {
        self.read_with_listeners(options, Vec::new())
    }

    /// Loads the snapshot, delivering read events to `listeners`
    pub fn read_with_listeners(
        &self,
        options: ProjectOptions,
        listeners: Vec<Listener>,
    ) -> Result<ProjectFile> {
        let project = self
            .read_snapshot()?
            .into_project_with_listeners(options, listeners)
            .with_context(|| format!("Invalid snapshot: {}", self.path.display()))?;

        info!(
            path = %self.path.display(),
            tasks = project.all_tasks().len(),
            resources = project.all_resources().len(),
            "loaded snapshot"
        );
        Ok(project)
    }

    /// Writes a registry to the store (full rewrite)
    pub fn write(&self, project: &mut ProjectFile) -> Result<()> {
        let snapshot = PlanSnapshot::from_project(project);
        self.write_snapshot(&snapshot)?;

        info!(
            path = %self.path.display(),
            tasks = snapshot.tasks.len(),
            "saved snapshot"
        );
        Ok(())
    }

    /// Writes a raw snapshot atomically
    pub fn write_snapshot(&self, snapshot: &PlanSnapshot) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let temp_path = self.temp_path();

        {
            let file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&temp_path)
                .with_context(|| format!("Failed to create temp file: {}", temp_path.display()))?;

            file.lock_exclusive()
                .context("Failed to acquire write lock on snapshot")?;

            let mut writer = BufWriter::new(&file);
            match self.format {
                SnapshotFormat::Json => {
                    serde_json::to_writer_pretty(&mut writer, snapshot)
                        .context("Failed to serialize snapshot")?;
                    writeln!(writer).context("Failed to write snapshot")?;
                }
                SnapshotFormat::Yaml => serde_yaml::to_writer(&mut writer, snapshot)
                    .context("Failed to serialize snapshot")?,
            }

            writer.flush().context("Failed to flush snapshot")?;
        }

        fs::rename(&temp_path, &self.path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                temp_path.display(),
                self.path.display()
            )
        })?;

        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

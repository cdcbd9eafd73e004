use crate::planner::collect_jpg_files;
use crate::renamer::{chrono_rename, RenameReport};
use crate::sequence::SequenceConfig;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

pub const CHRONO_SUFFIX: &str = "_chrono";
const DEFAULT_CHRONO_DIR: &str = "chrono";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobSummary {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub file_count: usize,
    pub first_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RunOutcome {
    Declined,
    Completed(RenameReport),
}

/// One run: copy the source JPGs into a fresh `<source>_chrono` directory
/// and rename the copies chronologically. Sources are only ever read.
#[derive(Debug, Clone)]
pub struct ChronoJob {
    source: PathBuf,
    destination: PathBuf,
    config: SequenceConfig,
}

impl ChronoJob {
    pub fn new(source: impl Into<PathBuf>, config: SequenceConfig) -> Self {
        let source = source.into();
        let destination = chrono_directory_for(&source);
        Self {
            source,
            destination,
            config,
        }
    }

    pub fn with_destination(mut self, destination: impl Into<PathBuf>) -> Self {
        self.destination = destination.into();
        self
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }

    pub fn summary(&self) -> Result<JobSummary> {
        let files = self.source_files()?;
        Ok(JobSummary {
            source: self.source.clone(),
            destination: self.destination.clone(),
            file_count: files.len(),
            first_name: self.config.first_name(),
        })
    }

    /// `confirm` sees the summary before anything on disk changes; returning
    /// `false` leaves the filesystem untouched.
    pub fn run<F>(&self, confirm: F) -> Result<RunOutcome>
    where
        F: FnOnce(&JobSummary) -> bool,
    {
        let files = self.source_files()?;
        self.config.ensure_fits(files.len())?;
        self.ensure_distinct_destination()?;

        let summary = JobSummary {
            source: self.source.clone(),
            destination: self.destination.clone(),
            file_count: files.len(),
            first_name: self.config.first_name(),
        };
        if !confirm(&summary) {
            info!("run declined, nothing changed");
            return Ok(RunOutcome::Declined);
        }

        self.prepare_destination()?;
        copy_into(&files, &self.destination)?;
        let report = chrono_rename(&self.destination, &self.config)?;

        info!(
            files = report.renamed.len(),
            destination = %self.destination.display(),
            "chronological rename finished"
        );
        Ok(RunOutcome::Completed(report))
    }

    fn source_files(&self) -> Result<Vec<PathBuf>> {
        if !self.source.is_dir() {
            bail!("source directory does not exist: {}", self.source.display());
        }
        collect_jpg_files(&self.source)
    }

    fn ensure_distinct_destination(&self) -> Result<()> {
        let source = fs::canonicalize(&self.source).with_context(|| {
            format!("could not resolve source directory: {}", self.source.display())
        })?;
        if let Ok(destination) = fs::canonicalize(&self.destination) {
            if source.starts_with(&destination) {
                bail!(
                    "destination would remove the source directory: {}",
                    self.destination.display()
                );
            }
        }
        Ok(())
    }

    fn prepare_destination(&self) -> Result<()> {
        if self.destination.is_dir() {
            fs::remove_dir_all(&self.destination).with_context(|| {
                format!(
                    "could not remove previous destination: {}",
                    self.destination.display()
                )
            })?;
        } else if self.destination.exists() {
            fs::remove_file(&self.destination).with_context(|| {
                format!(
                    "could not remove file in place of destination: {}",
                    self.destination.display()
                )
            })?;
        }
        fs::create_dir_all(&self.destination).with_context(|| {
            format!(
                "could not create destination directory: {}",
                self.destination.display()
            )
        })
    }
}

/// `pictures/family/` becomes `pictures/family_chrono`; a source with no
/// final component (such as `.`) becomes `chrono`.
pub fn chrono_directory_for(source: &Path) -> PathBuf {
    match source.file_name() {
        Some(name) => {
            let mut name = name.to_os_string();
            name.push(CHRONO_SUFFIX);
            source.with_file_name(name)
        }
        None => PathBuf::from(DEFAULT_CHRONO_DIR),
    }
}

fn copy_into(files: &[PathBuf], destination: &Path) -> Result<()> {
    for file in files {
        let Some(name) = file.file_name() else {
            continue;
        };
        let target = destination.join(name);
        fs::copy(file, &target).with_context(|| {
            format!(
                "could not copy photo: {} -> {}",
                file.display(),
                target.display()
            )
        })?;
    }
    Ok(())
}

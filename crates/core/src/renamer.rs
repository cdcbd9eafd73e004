use crate::metadata::CaptureTimestamp;
use crate::planner::{plan_order, OrderCandidate, OrderPlan, OrderStats};
use crate::sequence::{SequenceConfig, OUTPUT_EXTENSION};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::{self, File, FileTimes};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const TEMP_PREFIX: &str = ".chrono_tmp_";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenameRecord {
    pub original_name: String,
    pub staging_name: String,
    pub final_name: String,
    pub timestamp: Option<CaptureTimestamp>,
    pub times_restored: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenameReport {
    pub directory: PathBuf,
    pub renamed: Vec<RenameRecord>,
    pub stats: OrderStats,
}

/// Orders every JPG in `directory` by capture time and renames it into the
/// final numbered sequence. Nothing is rolled back on failure.
pub fn chrono_rename(directory: &Path, config: &SequenceConfig) -> Result<RenameReport> {
    let plan = plan_order(directory, config)?;
    validate_plan(&plan)?;
    order_by_date(&plan)?;
    let renamed = rename_files(&plan)?;

    Ok(RenameReport {
        directory: plan.directory.clone(),
        renamed,
        stats: plan.stats,
    })
}

/// Pass 1: every file takes its capture-time (or `x_`) name. Files go through
/// a temporary name first so a staging name never lands on a file that has
/// not been moved yet.
pub fn order_by_date(plan: &OrderPlan) -> Result<()> {
    info!(files = plan.candidates.len(), "renaming by capture time");

    let mut temp_paths = Vec::with_capacity(plan.candidates.len());
    for (index, candidate) in plan.candidates.iter().enumerate() {
        let temp_path = plan
            .directory
            .join(format!("{}{}.{}", TEMP_PREFIX, index, OUTPUT_EXTENSION));
        rename_no_clobber(&candidate.working_path, &temp_path)
            .context("temporary rename failed")?;
        temp_paths.push(temp_path);
    }

    for (candidate, temp_path) in plan.candidates.iter().zip(&temp_paths) {
        let staging_path = plan.directory.join(&candidate.staging_name);
        rename_no_clobber(temp_path, &staging_path).context("capture-time rename failed")?;
        debug!(
            from = %candidate.original_name,
            to = %candidate.staging_name,
            "pass 1 rename"
        );
    }

    Ok(())
}

/// Pass 2: staging names become `<year><delimiter><number>.jpg` in plan order,
/// and dated files get their access/modification times set to the capture time.
pub fn rename_files(plan: &OrderPlan) -> Result<Vec<RenameRecord>> {
    info!(
        files = plan.candidates.len(),
        delimiter = %plan.config.delimiter(),
        "renaming into numbered sequence"
    );

    let mut records = Vec::with_capacity(plan.candidates.len());
    for candidate in &plan.candidates {
        let staging_path = plan.directory.join(&candidate.staging_name);
        let target_path = plan.directory.join(&candidate.target_name);
        rename_no_clobber(&staging_path, &target_path).context("sequence rename failed")?;
        debug!(from = %candidate.staging_name, to = %candidate.target_name, "pass 2 rename");

        let times_restored = match &candidate.timestamp {
            Some(ts) => restore_file_times(&target_path, ts)?,
            None => false,
        };

        records.push(RenameRecord {
            original_name: candidate.original_name.clone(),
            staging_name: candidate.staging_name.clone(),
            final_name: candidate.target_name.clone(),
            timestamp: candidate.timestamp,
            times_restored,
        });
    }

    Ok(records)
}

pub fn validate_plan(plan: &OrderPlan) -> Result<()> {
    let mut seen_working = HashSet::<&Path>::new();
    let mut seen_staging = HashSet::<&str>::new();
    let mut seen_targets = HashSet::<&str>::new();

    for candidate in &plan.candidates {
        if candidate.working_path.parent() != Some(plan.directory.as_path()) {
            bail!(
                "file is outside the destination directory: {}",
                candidate.working_path.display()
            );
        }
        if !seen_working.insert(candidate.working_path.as_path()) {
            bail!(
                "file appears twice in the plan: {}",
                candidate.working_path.display()
            );
        }
        ensure_plain_name(candidate, &candidate.staging_name)?;
        ensure_plain_name(candidate, &candidate.target_name)?;
        if !seen_staging.insert(candidate.staging_name.as_str()) {
            bail!("duplicate capture-time name: {}", candidate.staging_name);
        }
        if !seen_targets.insert(candidate.target_name.as_str()) {
            bail!("duplicate sequence name: {}", candidate.target_name);
        }
    }

    if let Some(shared) = seen_targets.intersection(&seen_staging).next() {
        bail!("sequence name collides with a capture-time name: {}", shared);
    }

    Ok(())
}

fn ensure_plain_name(candidate: &OrderCandidate, name: &str) -> Result<()> {
    let plain = Path::new(name)
        .file_name()
        .map(|v| v == name)
        .unwrap_or(false);
    if !plain || name.starts_with(TEMP_PREFIX) {
        bail!(
            "invalid rename target for {}: {}",
            candidate.original_name,
            name
        );
    }
    Ok(())
}

fn rename_no_clobber(from: &Path, to: &Path) -> Result<()> {
    if to.exists() {
        bail!(
            "refusing to overwrite existing file: {} -> {}",
            from.display(),
            to.display()
        );
    }
    fs::rename(from, to)
        .with_context(|| format!("rename failed: {} -> {}", from.display(), to.display()))
}

fn restore_file_times(path: &Path, timestamp: &CaptureTimestamp) -> Result<bool> {
    let Some(time) = timestamp.local_system_time() else {
        warn!(
            file = %path.display(),
            timestamp = %timestamp,
            "capture time does not exist in the local zone, file times left unchanged"
        );
        return Ok(false);
    };

    let file = open_for_times(path)
        .with_context(|| format!("could not open file to set times: {}", path.display()))?;
    file.set_times(FileTimes::new().set_accessed(time).set_modified(time))
        .with_context(|| format!("could not set file times: {}", path.display()))?;
    Ok(true)
}

/// Read-only photos keep read-only copies; changing times only needs ownership.
#[cfg(not(windows))]
fn open_for_times(path: &Path) -> std::io::Result<File> {
    File::open(path)
}

#[cfg(windows)]
fn open_for_times(path: &Path) -> std::io::Result<File> {
    use std::os::windows::fs::OpenOptionsExt;

    const FILE_WRITE_ATTRIBUTES: u32 = 0x0100;
    File::options()
        .access_mode(FILE_WRITE_ATTRIBUTES)
        .open(path)
}

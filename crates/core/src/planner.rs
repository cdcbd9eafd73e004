use crate::exif_scan::read_capture_timestamp;
use crate::metadata::CaptureTimestamp;
use crate::sequence::{SequenceConfig, OUTPUT_EXTENSION};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const UNDATED_PREFIX: &str = "x_";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCandidate {
    pub working_path: PathBuf,
    pub original_name: String,
    pub timestamp: Option<CaptureTimestamp>,
    /// Pass 1 name, unique within the run.
    pub staging_name: String,
    /// Pass 2 name.
    pub target_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct OrderStats {
    pub files: usize,
    pub dated: usize,
    pub undated: usize,
    pub disambiguated: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderPlan {
    pub directory: PathBuf,
    pub config: SequenceConfig,
    pub candidates: Vec<OrderCandidate>,
    pub stats: OrderStats,
}

pub fn plan_order(directory: &Path, config: &SequenceConfig) -> Result<OrderPlan> {
    if !directory.is_dir() {
        anyhow::bail!("directory does not exist: {}", directory.display());
    }

    let files = collect_jpg_files(directory)?;
    config.ensure_fits(files.len())?;

    let mut scanned = Vec::with_capacity(files.len());
    for path in files {
        let timestamp = read_capture_timestamp(&path)?;
        let original_name = file_name_of(&path);
        match &timestamp {
            Some(ts) => debug!(file = %original_name, timestamp = %ts, "capture time found"),
            None => warn!(
                file = %original_name,
                "no capture time found, ordering alphabetically after dated photos"
            ),
        }
        scanned.push((path, original_name, timestamp));
    }

    scanned.sort_by(|a, b| chronological_order(&a.2, &a.1, &b.2, &b.1));

    let mut stats = OrderStats {
        files: scanned.len(),
        ..OrderStats::default()
    };
    let mut reserved = HashSet::<String>::new();
    let mut candidates = Vec::with_capacity(scanned.len());

    for (index, (working_path, original_name, timestamp)) in scanned.into_iter().enumerate() {
        let base = match &timestamp {
            Some(ts) => {
                stats.dated += 1;
                ts.compact()
            }
            None => {
                stats.undated += 1;
                format!("{}{}", UNDATED_PREFIX, stem_of(&original_name))
            }
        };
        let (staging_name, suffixed) = reserve_staging_name(&base, &mut reserved);
        if suffixed {
            stats.disambiguated += 1;
            debug!(file = %original_name, staging = %staging_name, "staging name disambiguated");
        }

        candidates.push(OrderCandidate {
            working_path,
            original_name,
            timestamp,
            staging_name,
            target_name: config.final_name(index),
        });
    }

    Ok(OrderPlan {
        directory: directory.to_path_buf(),
        config: *config,
        candidates,
        stats,
    })
}

/// Dated before undated; dated by capture time, undated by name. Ties on
/// capture time fall back to name so the result never depends on listing order.
pub fn chronological_order(
    a_time: &Option<CaptureTimestamp>,
    a_name: &str,
    b_time: &Option<CaptureTimestamp>,
    b_name: &str,
) -> Ordering {
    match (a_time, b_time) {
        (Some(a), Some(b)) => a
            .cmp(b)
            .then_with(|| a_name.as_bytes().cmp(b_name.as_bytes())),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a_name.as_bytes().cmp(b_name.as_bytes()),
    }
}

pub fn collect_jpg_files(root: &Path) -> Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    for entry in
        fs::read_dir(root).with_context(|| format!("could not read directory: {}", root.display()))?
    {
        let entry = entry.with_context(|| format!("could not read entry in: {}", root.display()))?;
        let path = entry.path();
        if !path.is_file() || is_hidden(&path) {
            continue;
        }
        if is_jpg(&path) {
            out.push(path);
        }
    }
    out.sort();
    Ok(out)
}

/// Candidates already reserved keep their name; later ones get `_001`, `_002`, ...
/// `_` sorts after `.`, so a suffixed name still follows its unsuffixed twin.
fn reserve_staging_name(base: &str, reserved: &mut HashSet<String>) -> (String, bool) {
    let candidate = format!("{}.{}", base, OUTPUT_EXTENSION);
    if reserved.insert(candidate.clone()) {
        return (candidate, false);
    }

    let mut n = 1usize;
    loop {
        let candidate = format!("{}_{:03}.{}", base, n, OUTPUT_EXTENSION);
        if reserved.insert(candidate.clone()) {
            return (candidate, true);
        }
        n += 1;
    }
}

pub fn is_jpg(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case(OUTPUT_EXTENSION))
        .unwrap_or(false)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy().starts_with('.'))
        .unwrap_or(false)
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|v| v.to_string_lossy().to_string())
        .unwrap_or_default()
}

fn stem_of(file_name: &str) -> &str {
    Path::new(file_name)
        .file_stem()
        .and_then(|v| v.to_str())
        .unwrap_or(file_name)
}

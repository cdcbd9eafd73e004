mod collection;
mod config;
mod exif_scan;
mod metadata;
mod planner;
mod renamer;
mod sequence;

pub use collection::{chrono_directory_for, ChronoJob, JobSummary, RunOutcome, CHRONO_SUFFIX};
pub use config::{
    app_paths, load_config, load_config_from, save_config, save_config_to, AppConfig, AppPaths,
};
pub use exif_scan::{extract_timestamp, read_capture_timestamp};
pub use metadata::CaptureTimestamp;
pub use planner::{
    chronological_order, collect_jpg_files, plan_order, OrderCandidate, OrderPlan, OrderStats,
    UNDATED_PREFIX,
};
pub use renamer::{
    chrono_rename, order_by_date, rename_files, validate_plan, RenameRecord, RenameReport,
};
pub use sequence::{
    Delimiter, SequenceConfig, SequenceError, DEFAULT_PRECISION, DEFAULT_START_VALUE,
    OUTPUT_EXTENSION,
};

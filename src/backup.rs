// Snapshot of the data files into backups/data_<YYYYMMDD_HHMMSS>/.
// No pruning, no restore: restoring is a manual copy back.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, FixedOffset};

use crate::error::{Result, StoreError};

pub const BACKUPS_DIR: &str = "backups";

// backups/data_20240101_093000
pub fn backup_dir_name(now: DateTime<FixedOffset>) -> String {
    format!("data_{}", now.format("%Y%m%d_%H%M%S"))
}

/// Copy the tasks file, schedule file and whole stats directory under
/// `<data_dir>/backups/`. A failure part-way leaves the partial directory.
pub fn create_backup(
    data_dir: &Path,
    tasks_file: &Path,
    schedule_file: &Path,
    stats_dir: &Path,
    now: DateTime<FixedOffset>,
) -> Result<PathBuf> {
    let target = data_dir.join(BACKUPS_DIR).join(backup_dir_name(now));
    fs::create_dir_all(&target).map_err(StoreError::io(&target))?;

    copy_file(tasks_file, &target.join("tasks.json"))?;
    copy_file(schedule_file, &target.join("schedule.json"))?;
    copy_dir(stats_dir, &target.join("stats"))?;

    Ok(target)
}

fn copy_file(src: &Path, dst: &Path) -> Result<()> {
    fs::copy(src, dst).map_err(StoreError::io(src))?;
    Ok(())
}

fn copy_dir(src: &Path, dst: &Path) -> Result<()> {
    fs::create_dir_all(dst).map_err(StoreError::io(dst))?;

    for entry in fs::read_dir(src).map_err(StoreError::io(src))? {
        let entry = entry.map_err(StoreError::io(src))?;
        let from = entry.path();
        let to = dst.join(entry.file_name());

        let file_type = entry.file_type().map_err(StoreError::io(&from))?;
        if file_type.is_dir() {
            copy_dir(&from, &to)?;
        } else {
            copy_file(&from, &to)?;
        }
    }
    Ok(())
}

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info};
use uuid::Uuid;

use crate::backup;
use crate::error::{Result, StoreError};
use crate::logic;
use crate::models::{DailyStats, Schedule, Task, TaskStatus, WeeklyStats, default_schedule};

pub const TASKS_FILE: &str = "tasks.json";
pub const SCHEDULE_FILE: &str = "schedule.json";
pub const STATS_DIR: &str = "stats";

// Current local time with the system's offset
pub fn now_fixed_offset() -> DateTime<FixedOffset> {
    chrono::Local::now().fixed_offset()
}

/// Operations the UI / CLI consume. All calls are blocking.
pub trait Storage {
    fn create_task(&self, task: &Task) -> Result<()>;
    fn get_task(&self, id: Uuid) -> Result<Task>;
    /// Full overwrite of the stored task; returns the value as persisted.
    fn update_task(&self, task: Task) -> Result<Task>;
    fn delete_task(&self, id: Uuid) -> Result<()>;
    fn list_tasks(&self) -> Result<Vec<Task>>;
    fn list_tasks_by_date(&self, date: NaiveDate) -> Result<Vec<Task>>;
    fn list_tasks_by_status(&self, status: TaskStatus) -> Result<Vec<Task>>;

    fn save_schedule(&self, schedule: &Schedule) -> Result<()>;
    fn get_schedule(&self) -> Result<Schedule>;

    fn get_daily_stats(&self, date: NaiveDate) -> Result<DailyStats>;
    fn save_daily_stats(&self, stats: &DailyStats) -> Result<()>;
    /// Recompute a date's stats from its tasks and persist them.
    fn refresh_daily_stats(&self, date: NaiveDate) -> Result<DailyStats>;
    fn get_weekly_stats(&self, start: NaiveDate) -> Result<WeeklyStats>;

    /// Snapshot all data files; returns the backup directory.
    fn backup(&self) -> Result<PathBuf>;
}

// --------------------------------------------------
// JSON file store
//
// Layout under data_dir:
//   tasks.json            array of Task
//   schedule.json         Schedule object
//   stats/YYYY-MM-DD.json one DailyStats per date
//   backups/data_*/       snapshots
//
// One RwLock covers every file: writers are exclusive for the
// whole load -> mutate -> save cycle, readers share.
// --------------------------------------------------
#[derive(Debug)]
pub struct FileStore {
    data_dir: PathBuf,
    tasks_file: PathBuf,
    schedule_file: PathBuf,
    stats_dir: PathBuf,
    lock: RwLock<()>,
}

impl FileStore {
    /// Open (and if needed initialize) a store rooted at `data_dir`.
    /// Seeds an empty task list and the default schedule on first use.
    pub fn open(data_dir: impl Into<PathBuf>) -> Result<Self> {
        let data_dir = data_dir.into();
        let stats_dir = data_dir.join(STATS_DIR);
        fs::create_dir_all(&stats_dir).map_err(StoreError::io(&stats_dir))?;

        let store = Self {
            tasks_file: data_dir.join(TASKS_FILE),
            schedule_file: data_dir.join(SCHEDULE_FILE),
            stats_dir,
            data_dir,
            lock: RwLock::new(()),
        };
        store.init_files()?;

        info!(data_dir = %store.data_dir.display(), "Store opened");
        Ok(store)
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn stats_file(&self, date: NaiveDate) -> PathBuf {
        self.stats_dir.join(format!("{}.json", date.format("%Y-%m-%d")))
    }

    fn init_files(&self) -> Result<()> {
        let _guard = self.write_lock();

        if !self.tasks_file.exists() {
            write_json(&self.tasks_file, &Vec::<Task>::new())?;
        }
        if !self.schedule_file.exists() {
            write_json(&self.schedule_file, &default_schedule())?;
            info!(path = %self.schedule_file.display(), "Seeded default schedule");
        }
        Ok(())
    }

    // A poisoned lock only means another caller panicked mid-operation;
    // the files are the state, so keep going.
    fn read_lock(&self) -> RwLockReadGuard<'_, ()> {
        self.lock.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_lock(&self) -> RwLockWriteGuard<'_, ()> {
        self.lock.write().unwrap_or_else(|e| e.into_inner())
    }

    // Callers below must already hold the lock.

    fn load_tasks(&self) -> Result<Vec<Task>> {
        read_json(&self.tasks_file)
    }

    fn save_tasks(&self, tasks: &[Task]) -> Result<()> {
        write_json(&self.tasks_file, tasks)
    }

    fn load_daily_stats(&self, date: NaiveDate) -> Result<DailyStats> {
        let path = self.stats_file(date);
        match read_json(&path) {
            Err(StoreError::NotFound(_)) => Ok(DailyStats::empty(date)),
            other => other,
        }
    }
}

impl Storage for FileStore {
    fn create_task(&self, task: &Task) -> Result<()> {
        let _guard = self.write_lock();

        let mut tasks = self.load_tasks()?;
        if tasks.iter().any(|t| t.id == task.id) {
            return Err(StoreError::DuplicateId(task.id));
        }

        tasks.push(task.clone());
        self.save_tasks(&tasks)?;
        debug!(task_id = %task.id, count = tasks.len(), "Task created");
        Ok(())
    }

    fn get_task(&self, id: Uuid) -> Result<Task> {
        let _guard = self.read_lock();

        self.load_tasks()?
            .into_iter()
            .find(|t| t.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("task {id}")))
    }

    fn update_task(&self, mut task: Task) -> Result<Task> {
        let _guard = self.write_lock();

        let mut tasks = self.load_tasks()?;
        let Some(slot) = tasks.iter_mut().find(|t| t.id == task.id) else {
            return Err(StoreError::NotFound(format!("task {}", task.id)));
        };

        task.updated_at = now_fixed_offset();
        *slot = task.clone();

        self.save_tasks(&tasks)?;
        debug!(task_id = %task.id, status = %task.status, "Task updated");
        Ok(task)
    }

    fn delete_task(&self, id: Uuid) -> Result<()> {
        let _guard = self.write_lock();

        let mut tasks = self.load_tasks()?;
        let before = tasks.len();
        tasks.retain(|t| t.id != id);

        if tasks.len() == before {
            return Err(StoreError::NotFound(format!("task {id}")));
        }

        self.save_tasks(&tasks)?;
        debug!(task_id = %id, "Task deleted");
        Ok(())
    }

    fn list_tasks(&self) -> Result<Vec<Task>> {
        let _guard = self.read_lock();
        self.load_tasks()
    }

    // Sorted by creation time, oldest first
    fn list_tasks_by_date(&self, date: NaiveDate) -> Result<Vec<Task>> {
        let _guard = self.read_lock();

        let mut tasks: Vec<Task> = self
            .load_tasks()?
            .into_iter()
            .filter(|t| logic::touches_date(t, date))
            .collect();
        tasks.sort_by_key(|t| t.created_at);
        Ok(tasks)
    }

    fn list_tasks_by_status(&self, status: TaskStatus) -> Result<Vec<Task>> {
        let _guard = self.read_lock();

        Ok(self
            .load_tasks()?
            .into_iter()
            .filter(|t| t.status == status)
            .collect())
    }

    fn save_schedule(&self, schedule: &Schedule) -> Result<()> {
        let _guard = self.write_lock();
        write_json(&self.schedule_file, schedule)?;
        debug!(name = %schedule.name, hours = schedule.hours.len(), "Schedule saved");
        Ok(())
    }

    fn get_schedule(&self) -> Result<Schedule> {
        let _guard = self.read_lock();
        read_json(&self.schedule_file)
    }

    // Missing file is not an error: yields a zero record for the date
    fn get_daily_stats(&self, date: NaiveDate) -> Result<DailyStats> {
        let _guard = self.read_lock();
        self.load_daily_stats(date)
    }

    fn save_daily_stats(&self, stats: &DailyStats) -> Result<()> {
        let _guard = self.write_lock();
        let path = self.stats_file(stats.date);
        write_json(&path, stats)?;
        debug!(date = %stats.date, "Daily stats saved");
        Ok(())
    }

    fn refresh_daily_stats(&self, date: NaiveDate) -> Result<DailyStats> {
        let _guard = self.write_lock();

        let tasks = self.load_tasks()?;
        let schedule: Schedule = read_json(&self.schedule_file)?;
        let stats = logic::daily_stats_from_tasks(date, &tasks, &schedule);

        write_json(&self.stats_file(date), &stats)?;
        debug!(
            date = %date,
            total = stats.total_tasks,
            completed = stats.completed_tasks,
            "Daily stats refreshed"
        );
        Ok(stats)
    }

    // One shared guard for all seven reads
    fn get_weekly_stats(&self, start: NaiveDate) -> Result<WeeklyStats> {
        let _guard = self.read_lock();
        logic::weekly_stats(start, |day| self.load_daily_stats(day))
    }

    fn backup(&self) -> Result<PathBuf> {
        let _guard = self.read_lock();

        let target = backup::create_backup(
            &self.data_dir,
            &self.tasks_file,
            &self.schedule_file,
            &self.stats_dir,
            now_fixed_offset(),
        )?;
        info!(path = %target.display(), "Backup created");
        Ok(target)
    }
}

// NotFound when the file is absent, Decode when it holds bad JSON
fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(StoreError::NotFound(path.display().to_string()));
        }
        Err(e) => return Err(StoreError::io(path)(e)),
    };
    serde_json::from_str(&text).map_err(|source| StoreError::Decode {
        path: path.to_path_buf(),
        source,
    })
}

// Whole-file rewrite via a sibling .tmp file and rename
fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| StoreError::io(path)(io::Error::new(io::ErrorKind::InvalidData, e)))?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(StoreError::io(parent))?;
    }

    let tmp_path = path.with_extension("json.tmp");
    fs::write(&tmp_path, text).map_err(StoreError::io(&tmp_path))?;
    fs::rename(&tmp_path, path).map_err(StoreError::io(path))?;
    Ok(())
}

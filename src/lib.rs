//! # qomoboro
//!
//! Task and time tracking around a fixed daily schedule of canonical hours.
//!
//! - [`models`]: tasks, scores, schedule blocks and stats records
//! - [`store`]: JSON-file persistence behind the [`Storage`] trait
//! - [`logic`]: daily roll-up and weekly aggregation
//! - [`backup`]: timestamped snapshots of the data directory
//!
//! ```rust,no_run
//! use qomoboro::{Config, FileStore, Score, Storage, Task};
//!
//! let config = Config::from_env();
//! let store = FileStore::open(&config.data_dir).expect("failed to open store");
//! let task = Task::new("write report", Score::new(4, 0, 2), qomoboro::store::now_fixed_offset());
//! store.create_task(&task).expect("failed to create task");
//! ```

pub use config::Config;
pub use error::{Result, StoreError};
pub use models::{
    CanonicalHour, DailyStats, Schedule, Score, Task, TaskStatus, WeeklyStats, default_schedule,
};
pub use store::{FileStore, Storage};

pub mod backup;
pub mod config;
pub mod error;
pub mod logging;
pub mod logic;
pub mod models;
pub mod store;

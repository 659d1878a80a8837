use std::collections::HashMap;
use std::fmt;
use std::ops::AddAssign;

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, Timelike};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// Upper bound for every Score component
pub const MAX_SCORE: i64 = 5;

// Work / play / learn triple, each 0..=5.
// Range is checked by is_valid(), never enforced on construction.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Score {
    pub work: i64,
    pub play: i64,
    pub learn: i64,
}

impl Score {
    pub fn new(work: i64, play: i64, learn: i64) -> Self {
        Self { work, play, learn }
    }

    pub fn is_valid(&self) -> bool {
        let in_range = |v: i64| (0..=MAX_SCORE).contains(&v);
        in_range(self.work) && in_range(self.play) && in_range(self.learn)
    }

    pub fn total(&self) -> i64 {
        self.work + self.play + self.learn
    }

    pub fn average(&self) -> f64 {
        self.total() as f64 / 3.0
    }

    // Componentwise integer division (truncating). Zero divisor yields zero.
    pub fn div_trunc(&self, n: i64) -> Score {
        if n == 0 {
            return Score::default();
        }
        Score {
            work: self.work / n,
            play: self.play / n,
            learn: self.learn / n,
        }
    }
}

// Componentwise sum, used when folding stats together
impl AddAssign for Score {
    fn add_assign(&mut self, other: Score) {
        self.work += other.work;
        self.play += other.play;
        self.learn += other.learn;
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    Active,
    Completed,
    Cancelled,
    Paused,
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Active => "active",
            TaskStatus::Completed => "completed",
            TaskStatus::Cancelled => "cancelled",
            TaskStatus::Paused => "paused",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub score: Score,
    pub status: TaskStatus,

    // timing, whole seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_secs: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_secs: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<FixedOffset>>, // set while active
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<FixedOffset>>,

    // scheduling
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_time: Option<DateTime<FixedOffset>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canonical_hour: Option<String>, // name of a Schedule block

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: DateTime<FixedOffset>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<FixedOffset>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reflection: Option<String>,
}

impl Task {
    /// New pending task with a random id.
    pub fn new(title: impl Into<String>, score: Score, now: DateTime<FixedOffset>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            description: None,
            score,
            status: TaskStatus::Pending,
            estimated_secs: None,
            actual_secs: None,
            start_time: None,
            end_time: None,
            scheduled_time: None,
            canonical_hour: None,
            tags: Vec::new(),
            created_at: now,
            updated_at: now,
            completed_at: None,
            notes: None,
            reflection: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == TaskStatus::Active
    }

    pub fn is_completed(&self) -> bool {
        self.status == TaskStatus::Completed
    }

    pub fn actual_duration(&self) -> Duration {
        Duration::seconds(self.actual_secs.unwrap_or(0))
    }

    pub fn start(&mut self, now: DateTime<FixedOffset>) {
        self.start_time = Some(now);
        self.status = TaskStatus::Active;
        self.updated_at = now;
    }

    // Only an active task with a running interval can be paused
    pub fn pause(&mut self, now: DateTime<FixedOffset>) {
        if self.status != TaskStatus::Active {
            return;
        }
        let Some(started) = self.start_time.take() else {
            return;
        };
        self.accumulate(started, now);
        self.status = TaskStatus::Paused;
        self.updated_at = now;
    }

    pub fn resume(&mut self, now: DateTime<FixedOffset>) {
        if self.status != TaskStatus::Paused {
            return;
        }
        self.start_time = Some(now);
        self.status = TaskStatus::Active;
        self.updated_at = now;
    }

    pub fn complete(&mut self, now: DateTime<FixedOffset>) {
        if self.status == TaskStatus::Active {
            if let Some(started) = self.start_time {
                self.accumulate(started, now);
            }
        }
        self.end_time = Some(now);
        self.completed_at = Some(now);
        self.status = TaskStatus::Completed;
        self.updated_at = now;
    }

    pub fn cancel(&mut self, now: DateTime<FixedOffset>) {
        self.start_time = None;
        self.status = TaskStatus::Cancelled;
        self.updated_at = now;
    }

    fn accumulate(&mut self, started: DateTime<FixedOffset>, now: DateTime<FixedOffset>) {
        let elapsed = (now - started).num_seconds().max(0);
        self.actual_secs = Some(self.actual_secs.unwrap_or(0) + elapsed);
    }
}

// Minutes past midnight for a "HH:MM" string.
// "24:00" is accepted as the end of the day.
pub fn parse_hhmm(hhmm: &str) -> Option<u32> {
    let (h, m) = hhmm.split_once(':')?;
    let h: u32 = h.trim().parse().ok()?;
    let m: u32 = m.trim().parse().ok()?;
    match (h, m) {
        (24, 0) => Some(MINUTES_PER_DAY),
        (0..=23, 0..=59) => Some(h * 60 + m),
        _ => None,
    }
}

const MINUTES_PER_DAY: u32 = 24 * 60;

// Named time-of-day block [start, end), not tied to a date.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CanonicalHour {
    pub name: String,
    pub start_time: String, // "HH:MM"
    pub end_time: String,   // "HH:MM"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
    #[serde(default)]
    pub default_score: Score,
}

impl CanonicalHour {
    /// True when the time-of-day of `t` (minute resolution) lies in `[start, end)`.
    /// An end of "24:00" runs to midnight. Blocks with unparsable bounds never match.
    pub fn is_active<T: Timelike>(&self, t: &T) -> bool {
        let (Some(start), Some(end)) = (parse_hhmm(&self.start_time), parse_hhmm(&self.end_time))
        else {
            return false;
        };
        let now = t.hour() * 60 + t.minute();
        start <= now && now < end
    }

    pub fn duration(&self) -> Option<Duration> {
        let start = parse_hhmm(&self.start_time)?;
        let end = parse_hhmm(&self.end_time)?;
        Some(Duration::minutes(i64::from(end) - i64::from(start)))
    }
}

// Ordered blocks; may overlap or leave gaps.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Schedule {
    pub name: String,
    pub hours: Vec<CanonicalHour>,
}

impl Schedule {
    // First block containing the time-of-day of `t`
    pub fn current_hour<T: Timelike>(&self, t: &T) -> Option<&CanonicalHour> {
        self.hours.iter().find(|h| h.is_active(t))
    }

    pub fn hour_by_name(&self, name: &str) -> Option<&CanonicalHour> {
        self.hours.iter().find(|h| h.name == name)
    }
}

impl Default for Schedule {
    fn default() -> Self {
        default_schedule()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DailyStats {
    pub date: NaiveDate,
    pub total_tasks: i64,
    pub completed_tasks: i64,
    pub total_score: Score,
    #[serde(default)]
    pub average_score: Score,
    pub time_spent_secs: i64,
    #[serde(default)]
    pub hourly_breakdown: HashMap<String, Score>, // canonical hour name -> score
}

impl DailyStats {
    // Zero record for a date with no stored stats
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            total_tasks: 0,
            completed_tasks: 0,
            total_score: Score::default(),
            average_score: Score::default(),
            time_spent_secs: 0,
            hourly_breakdown: HashMap::new(),
        }
    }

    /// Percentage of tasks completed; 0 when there are no tasks.
    pub fn completion_rate(&self) -> f64 {
        if self.total_tasks == 0 {
            return 0.0;
        }
        self.completed_tasks as f64 / self.total_tasks as f64 * 100.0
    }

    pub fn time_spent(&self) -> Duration {
        Duration::seconds(self.time_spent_secs)
    }
}

// Derived from seven DailyStats; never written to disk by the store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeeklyStats {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate, // inclusive, start + 6 days
    pub daily_stats: Vec<DailyStats>,
    pub weekly_total: Score,
    pub weekly_average: Score,
    pub total_time_spent_secs: i64,
}

impl WeeklyStats {
    pub fn total_time_spent(&self) -> Duration {
        Duration::seconds(self.total_time_spent_secs)
    }
}

// name, start, end, description, purpose, (work, play, learn)
type BlockRow = (
    &'static str,
    &'static str,
    &'static str,
    &'static str,
    &'static str,
    (i64, i64, i64),
);

const DEFAULT_BLOCKS: [BlockRow; 8] = [
    (
        "Matins",
        "06:00",
        "07:30",
        "Deep work, planning, and preparation",
        "High-focus work when mind is fresh",
        (4, 1, 3),
    ),
    (
        "Lauds",
        "07:30",
        "09:00",
        "Administrative tasks and organization",
        "Handle communications and planning",
        (3, 1, 2),
    ),
    (
        "Prime",
        "09:00",
        "12:00",
        "Primary work blocks and major tasks",
        "Core productive work period",
        (5, 1, 3),
    ),
    (
        "Terce",
        "12:00",
        "13:30",
        "Meetings, collaboration, and communication",
        "Social and collaborative work",
        (3, 2, 2),
    ),
    (
        "Sext",
        "13:30",
        "15:00",
        "Lunch, recovery, and personal time",
        "Rest and recharge",
        (1, 4, 1),
    ),
    (
        "None",
        "15:00",
        "16:30",
        "Creative work and experimentation",
        "Innovation and creative problem-solving",
        (3, 3, 4),
    ),
    (
        "Vespers",
        "16:30",
        "18:00",
        "Learning, documentation, and skill development",
        "Knowledge acquisition and sharing",
        (2, 2, 5),
    ),
    (
        "Compline",
        "18:00",
        "20:00",
        "Planning, reflection, and personal projects",
        "Review and prepare for tomorrow",
        (2, 3, 3),
    ),
];

/// Built-in schedule seeded on first run: eight blocks covering 06:00-20:00.
pub fn default_schedule() -> Schedule {
    let hours = DEFAULT_BLOCKS
        .iter()
        .map(|&(name, start, end, description, purpose, (work, play, learn))| CanonicalHour {
            name: name.to_string(),
            start_time: start.to_string(),
            end_time: end.to_string(),
            description: Some(description.to_string()),
            purpose: Some(purpose.to_string()),
            default_score: Score::new(work, play, learn),
        })
        .collect();

    Schedule {
        name: "Traditional Canonical Hours".to_string(),
        hours,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32) -> DateTime<FixedOffset> {
        let offset = FixedOffset::east_opt(0).unwrap();
        offset.with_ymd_and_hms(2024, 1, 1, h, m, 0).unwrap()
    }

    #[test]
    fn score_validity_bounds() {
        assert!(Score::new(3, 4, 2).is_valid());
        assert!(Score::new(0, 0, 0).is_valid());
        assert!(Score::new(5, 5, 5).is_valid());
        assert!(!Score::new(6, 3, 2).is_valid());
        assert!(!Score::new(3, -1, 2).is_valid());
        assert!(!Score::new(3, 4, 10).is_valid());
    }

    #[test]
    fn score_total_and_average() {
        assert_eq!(Score::new(3, 4, 2).total(), 9);
        assert_eq!(Score::new(5, 5, 5).total(), 15);
        assert_eq!(Score::new(3, 6, 0).average(), 3.0);
        assert_eq!(Score::new(0, 0, 0).average(), 0.0);
        assert_eq!(Score::new(1, 0, 0).average(), 1.0 / 3.0);
    }

    #[test]
    fn score_div_truncates() {
        assert_eq!(Score::new(20, 6, 7).div_trunc(7), Score::new(2, 0, 1));
        assert_eq!(Score::new(20, 6, 7).div_trunc(0), Score::default());
    }

    #[test]
    fn score_add_assign_sums_components() {
        let mut total = Score::new(1, 2, 3);
        total += Score::new(4, 0, 5);
        assert_eq!(total, Score::new(5, 2, 8));
    }

    #[test]
    fn status_display_and_json() {
        assert_eq!(TaskStatus::Cancelled.to_string(), "cancelled");
        assert_eq!(serde_json::to_string(&TaskStatus::Paused).unwrap(), "\"paused\"");
    }

    #[test]
    fn task_lifecycle_accumulates_active_time() {
        let mut task = Task::new("write report", Score::new(4, 0, 2), at(9, 0));
        assert_eq!(task.status, TaskStatus::Pending);

        task.start(at(9, 0));
        assert!(task.is_active());
        assert_eq!(task.start_time, Some(at(9, 0)));

        task.pause(at(9, 30));
        assert_eq!(task.status, TaskStatus::Paused);
        assert_eq!(task.start_time, None);
        assert_eq!(task.actual_secs, Some(30 * 60));

        task.resume(at(10, 0));
        assert!(task.is_active());
        assert_eq!(task.start_time, Some(at(10, 0)));

        task.complete(at(10, 15));
        assert!(task.is_completed());
        assert_eq!(task.actual_secs, Some(45 * 60));
        assert_eq!(task.completed_at, Some(at(10, 15)));
        assert_eq!(task.end_time, Some(at(10, 15)));
        assert_eq!(task.updated_at, at(10, 15));
    }

    #[test]
    fn pause_and_resume_ignore_wrong_state() {
        let mut task = Task::new("idle", Score::default(), at(8, 0));
        task.pause(at(8, 10));
        assert_eq!(task.status, TaskStatus::Pending);
        assert_eq!(task.updated_at, at(8, 0));

        task.resume(at(8, 20));
        assert_eq!(task.status, TaskStatus::Pending);
        assert_eq!(task.start_time, None);
    }

    #[test]
    fn complete_while_paused_keeps_accumulated_time() {
        let mut task = Task::new("read", Score::new(0, 1, 5), at(8, 0));
        task.start(at(8, 0));
        task.pause(at(8, 20));
        task.complete(at(9, 0));
        assert_eq!(task.actual_duration(), Duration::minutes(20));
    }

    #[test]
    fn canonical_hour_bounds() {
        let prime = CanonicalHour {
            name: "Prime".into(),
            start_time: "09:00".into(),
            end_time: "12:00".into(),
            description: None,
            purpose: None,
            default_score: Score::default(),
        };
        assert!(prime.is_active(&at(9, 0)));
        assert!(prime.is_active(&at(11, 59)));
        assert!(!prime.is_active(&at(12, 0)));
        assert!(!prime.is_active(&at(8, 59)));
        assert_eq!(prime.duration(), Some(Duration::hours(3)));
    }

    #[test]
    fn block_ending_at_midnight_matches_late_evening() {
        let late = CanonicalHour {
            name: "Nocturns".into(),
            start_time: "22:00".into(),
            end_time: "24:00".into(),
            description: None,
            purpose: None,
            default_score: Score::default(),
        };
        assert!(late.is_active(&at(22, 0)));
        assert!(late.is_active(&at(23, 59)));
        assert!(!late.is_active(&at(21, 59)));
        assert!(!late.is_active(&at(0, 0)));
        assert_eq!(late.duration(), Some(Duration::hours(2)));
    }

    #[test]
    fn canonical_hour_with_bad_bounds_never_matches() {
        let broken = CanonicalHour {
            name: "Broken".into(),
            start_time: "nine".into(),
            end_time: "12:00".into(),
            description: None,
            purpose: None,
            default_score: Score::default(),
        };
        assert!(!broken.is_active(&at(10, 0)));
        assert_eq!(broken.duration(), None);
    }

    #[test]
    fn schedule_lookup() {
        let schedule = default_schedule();
        assert_eq!(schedule.current_hour(&at(7, 30)).map(|h| h.name.as_str()), Some("Lauds"));
        assert_eq!(schedule.current_hour(&at(10, 30)).map(|h| h.name.as_str()), Some("Prime"));
        assert!(schedule.current_hour(&at(5, 59)).is_none());
        assert!(schedule.current_hour(&at(20, 0)).is_none());
        assert_eq!(
            schedule.hour_by_name("Vespers").map(|h| h.default_score),
            Some(Score::new(2, 2, 5))
        );
        assert!(schedule.hour_by_name("Nocturns").is_none());
    }

    #[test]
    fn default_schedule_is_contiguous() {
        let schedule = default_schedule();
        assert_eq!(schedule.hours.len(), 8);
        assert_eq!(schedule.hours[0].start_time, "06:00");
        assert_eq!(schedule.hours[7].end_time, "20:00");
        for pair in schedule.hours.windows(2) {
            assert_eq!(pair[0].end_time, pair[1].start_time);
        }
        assert!(schedule.hours.iter().all(|h| h.default_score.is_valid()));
    }

    #[test]
    fn completion_rate() {
        let mut stats = DailyStats::empty(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(stats.completion_rate(), 0.0);
        stats.total_tasks = 10;
        stats.completed_tasks = 7;
        assert_eq!(stats.completion_rate(), 70.0);
    }

    #[test]
    fn parse_hhmm_rejects_garbage() {
        assert_eq!(parse_hhmm("06:30"), Some(390));
        assert_eq!(parse_hhmm("24:00"), Some(1440));
        assert_eq!(parse_hhmm("24:01"), None);
        assert_eq!(parse_hhmm("12:60"), None);
        assert_eq!(parse_hhmm("0630"), None);
    }
}

/*
Stats aggregation logic.
Kept independent of the file store so it can be tested with plain values;
the store passes in a loader for per-day records.
*/

use chrono::{Days, NaiveDate};

use crate::error::Result;
use crate::models::{DailyStats, Schedule, Score, Task, TaskStatus, WeeklyStats};

// Days in a stats week, start date included
pub const WEEK_DAYS: u64 = 7;

/// Fold seven consecutive days starting at `start` into a WeeklyStats.
///
/// - `load` is called once per day, in date order
/// - the first failing load aborts the whole aggregation
/// - weekly average is the per-component total divided by 7, truncating
pub fn weekly_stats<F>(start: NaiveDate, mut load: F) -> Result<WeeklyStats>
where
    F: FnMut(NaiveDate) -> Result<DailyStats>,
{
    let end = start + Days::new(WEEK_DAYS - 1);

    let mut daily_stats = Vec::with_capacity(WEEK_DAYS as usize);
    let mut weekly_total = Score::default();
    let mut total_time = 0;

    for day in start.iter_days().take(WEEK_DAYS as usize) {
        let stats = load(day)?;
        weekly_total += stats.total_score;
        total_time += stats.time_spent_secs;
        daily_stats.push(stats);
    }

    Ok(WeeklyStats {
        start_date: start,
        end_date: end,
        daily_stats,
        weekly_total,
        weekly_average: weekly_total.div_trunc(WEEK_DAYS as i64),
        total_time_spent_secs: total_time,
    })
}

// Calendar-date match on creation, scheduled or completion time
pub fn touches_date(task: &Task, date: NaiveDate) -> bool {
    task.created_at.date_naive() == date
        || task.scheduled_time.is_some_and(|t| t.date_naive() == date)
        || task.completed_at.is_some_and(|t| t.date_naive() == date)
}

fn completed_on(task: &Task, date: NaiveDate) -> bool {
    task.status == TaskStatus::Completed
        && task.completed_at.map(|t| t.date_naive()) == Some(date)
}

// Which schedule block a task counts towards.
// Explicit canonical_hour first, then the block containing its start or scheduled time.
fn hour_for_task(task: &Task, schedule: &Schedule) -> Option<String> {
    if let Some(name) = &task.canonical_hour {
        return Some(name.clone());
    }
    let when = task.start_time.or(task.scheduled_time).or(task.completed_at)?;
    schedule.current_hour(&when).map(|h| h.name.clone())
}

/// Derive a day's stats from the tasks that touch it.
///
/// Rules:
/// - total counts every task touching `date` (cancelled ones excluded)
/// - scores and time spent come only from tasks completed on `date`, so a task
///   created one day and finished another is credited once
/// - average_score is the per-component mean over completed tasks, truncating
pub fn daily_stats_from_tasks(date: NaiveDate, tasks: &[Task], schedule: &Schedule) -> DailyStats {
    let mut stats = DailyStats::empty(date);

    for task in tasks.iter().filter(|t| touches_date(t, date)) {
        if task.status == TaskStatus::Cancelled {
            continue;
        }
        stats.total_tasks += 1;

        if !completed_on(task, date) {
            continue;
        }
        stats.completed_tasks += 1;
        stats.total_score += task.score;
        stats.time_spent_secs += task.actual_secs.unwrap_or(0);

        if let Some(hour) = hour_for_task(task, schedule) {
            *stats.hourly_breakdown.entry(hour).or_default() += task.score;
        }
    }

    stats.average_score = stats.total_score.div_trunc(stats.completed_tasks);
    stats
}

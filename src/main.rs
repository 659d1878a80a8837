// Status summary for the current moment:
// canonical hour, today's stats and the week so far.
// The TUI and full CLI sit on top of the same Storage calls.

use std::process::ExitCode;

use chrono::{Datelike, Days};
use qomoboro::store::now_fixed_offset;
use qomoboro::{Config, FileStore, Storage, logging};

fn main() -> ExitCode {
    let config = Config::from_env();
    logging::init(&config.log_level);

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "qomoboro failed");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: &Config) -> qomoboro::Result<()> {
    let store = FileStore::open(&config.data_dir)?;
    let now = now_fixed_offset();
    let today = now.date_naive();

    let schedule = store.get_schedule()?;
    match schedule.current_hour(&now) {
        Some(hour) => println!(
            "  Now:   {} ({}-{}) suggested work {} / play {} / learn {}",
            hour.name,
            hour.start_time,
            hour.end_time,
            hour.default_score.work,
            hour.default_score.play,
            hour.default_score.learn
        ),
        None => println!("  Now:   outside the {} schedule", schedule.name),
    }

    let stats = store.refresh_daily_stats(today)?;
    println!(
        "  Today: {} tasks, {} completed ({:.0}%), work {} / play {} / learn {}, {} min",
        stats.total_tasks,
        stats.completed_tasks,
        stats.completion_rate(),
        stats.total_score.work,
        stats.total_score.play,
        stats.total_score.learn,
        stats.time_spent().num_minutes()
    );

    // weeks start on Monday
    let offset = u64::from(today.weekday().num_days_from_monday());
    let monday = today - Days::new(offset);
    let week = store.get_weekly_stats(monday)?;
    println!(
        "  Week:  {} to {}, work {} / play {} / learn {} (avg {} / {} / {}), {} min",
        week.start_date,
        week.end_date,
        week.weekly_total.work,
        week.weekly_total.play,
        week.weekly_total.learn,
        week.weekly_average.work,
        week.weekly_average.play,
        week.weekly_average.learn,
        week.total_time_spent().num_minutes()
    );

    Ok(())
}

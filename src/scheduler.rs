use crate::alerts::{AlertFeed, AlertRuleEngine, AlertSchedule};
use crate::config::Config;
use anyhow::{Context, Result};
use chrono::Weekday;
use std::sync::Arc;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::info;

/// Initialize and start the scheduler running daily and weekly alert rules
pub async fn start_scheduler(
    config: &Config,
    engine: Arc<AlertRuleEngine>,
    feed: AlertFeed,
) -> Result<JobScheduler> {
    let scheduler = JobScheduler::new().await?;

    let weekday: Weekday = config
        .weekly_alert_day
        .parse()
        .map_err(|_| anyhow::anyhow!("Invalid WEEKLY_ALERT_DAY: {}", config.weekly_alert_day))?;

    let jobs = [
        (AlertSchedule::Daily, time_to_cron(&config.daily_alert_time, None)?),
        (
            AlertSchedule::Weekly,
            time_to_cron(&config.daily_alert_time, Some(weekday))?,
        ),
    ];

    for (schedule, cron_expr) in jobs {
        info!("Scheduling {:?} alert rules (cron: {})", schedule, cron_expr);

        let engine_clone = Arc::clone(&engine);
        let feed_clone = feed.clone();

        let job = Job::new_async(cron_expr.as_str(), move |_uuid, _l| {
            let engine = Arc::clone(&engine_clone);
            let feed = feed_clone.clone();

            Box::pin(async move {
                info!("⏰ Scheduled {:?} alert run triggered", schedule);
                let alerts = engine.run_scheduled(schedule).await;
                info!("Scheduled run produced {} alerts", alerts.len());
                feed.publish(alerts);
            })
        })
        .with_context(|| format!("Invalid cron expression: {}", cron_expr))?;

        scheduler.add(job).await?;
    }

    scheduler.start().await?;
    info!("✓ Scheduler started");

    Ok(scheduler)
}

/// Run every enabled rule now and publish the result (for `POST /api/alerts/run`)
pub async fn trigger_alerts(engine: &AlertRuleEngine, feed: &AlertFeed) -> usize {
    let alerts = engine.run_all_alerts().await;
    let count = alerts.len();
    feed.publish(alerts);
    count
}

/// Convert a UTC time string (HH:MM) to a cron expression, optionally
/// restricted to one day of the week
fn time_to_cron(time: &str, weekday: Option<Weekday>) -> Result<String> {
    let parts: Vec<&str> = time.split(':').collect();
    if parts.len() != 2 {
        anyhow::bail!("Invalid time format: {}. Expected HH:MM", time);
    }

    let hour: u8 = parts[0].parse()?;
    let minute: u8 = parts[1].parse()?;
    if hour > 23 || minute > 59 {
        anyhow::bail!("Invalid time: {}. Hour must be 0-23 and minute 0-59", time);
    }

    // Cron format: "second minute hour day month day_of_week"
    let day_of_week = weekday.map_or_else(|| "*".to_string(), |day| day.to_string());
    Ok(format!("0 {} {} * * {}", minute, hour, day_of_week))
}

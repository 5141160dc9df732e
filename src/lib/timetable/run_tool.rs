use log::{debug, info, warn};

use super::{
    date_provider::{current_week_start_or_fallback, Clock},
    errors::TimetableError,
    groups_getter::GroupsGetter,
    helpers::{
        read_previous_schedule, read_selected_group, schedule_diff, write_failures, write_groups,
        write_schedule, write_selected_group,
    },
    models::{lesson_model::WeekReport, Args},
    schedule_getter::DayFetcher,
    weekly::build_week,
};

/// What one fetch-and-persist cycle produced.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub groups_count: usize,
    pub group: Option<String>,
    pub report: Option<WeekReport>,
    pub schedule_changed: bool,
}

pub async fn run<C: Clock, GG: GroupsGetter, DF: DayFetcher>(
    clock: &C,
    groups_getter: &GG,
    day_fetcher: &DF,
    args: &Args,
) -> Result<RunSummary, TimetableError> {
    let groups = groups_getter.get_groups().await?;
    write_groups(&args.groups_json_path, &groups)?;

    let group = match &args.group {
        Some(group) => Some(group.clone()),
        None => read_selected_group(&args.selected_group_json_path)?,
    };
    let Some(group) = group else {
        info!("No group selected yet, skipping schedule");
        return Ok(RunSummary {
            groups_count: groups.len(),
            ..Default::default()
        });
    };
    if !groups.is_empty() && !groups.contains(&group) {
        warn!("Group {} is not in the group directory", group);
    }

    let week_start = current_week_start_or_fallback(clock).await;
    let report = build_week(day_fetcher, &group, week_start).await;
    if report.failures.len() == report.schedule.len() {
        /* keep the previous schedule and selection rather than replace them with an empty week */
        return Err(TimetableError::PartialSchedule {
            failed_dates: report.failed_dates(),
        });
    }

    let previous = read_previous_schedule(&args.schedule_json_path);
    let diff = schedule_diff(&previous, &report.schedule)?;
    if let Some(diff) = &diff {
        info!("Schedule of {} changed", group);
        debug!("{}", diff);
    }
    write_schedule(&args.schedule_json_path, &report.schedule)?;
    write_failures(&args.failures_json_path, &report.failures)?;
    /* the selection only moves once its schedule is on disk */
    if args.group.is_some() {
        write_selected_group(&args.selected_group_json_path, &group)?;
    }
    if !report.is_complete() {
        warn!(
            "Schedule persisted without {}",
            report.failed_dates().join(", ")
        );
    }

    Ok(RunSummary {
        groups_count: groups.len(),
        group: Some(group),
        report: Some(report),
        schedule_changed: diff.is_some(),
    })
}

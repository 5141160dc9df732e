use chrono::NaiveDate;
use futures::future;
use log::{info, warn};

use super::{
    date_provider::week_dates,
    errors::TimetableError,
    lesson_extractor::extract,
    models::lesson_model::{Lesson, WeekReport},
    schedule_getter::DayFetcher,
};

async fn fetch_and_extract<F: DayFetcher>(
    fetcher: &F,
    date: NaiveDate,
    group: &str,
) -> Result<Vec<Lesson>, TimetableError> {
    let html = fetcher.fetch_day(date, group).await?;
    extract(&html, &date.format("%Y-%m-%d").to_string())
}

/// Fetches all 7 days of the week starting at `week_start` concurrently.
///
/// A day that fails maps to an empty list and its error lands in
/// [`WeekReport::failures`]; the other days are unaffected.
pub async fn build_week<F: DayFetcher>(
    fetcher: &F,
    group: &str,
    week_start: NaiveDate,
) -> WeekReport {
    let dates = week_dates(week_start);
    /* join_all keeps the input order, whatever order the requests finish in */
    let results = future::join_all(
        dates
            .iter()
            .map(|&date| fetch_and_extract(fetcher, date, group)),
    )
    .await;

    let mut report = WeekReport::default();
    for (date, result) in dates.iter().zip(results) {
        let key = date.format("%Y-%m-%d").to_string();
        let lessons = match result {
            Ok(lessons) => lessons,
            Err(e) => {
                warn!("Could not get {} for {}: {}", key, group, e);
                report.failures.insert(key.clone(), e.to_string());
                Vec::new()
            }
        };
        report.schedule.insert(key, lessons);
    }
    info!(
        "Collected {} lessons of {} for the week of {}, {} days failed",
        report.lessons_count(),
        group,
        week_start,
        report.failures.len()
    );
    report
}

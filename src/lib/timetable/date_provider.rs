use chrono::{Datelike, Duration, FixedOffset, Local, NaiveDate, Offset, Utc};
use log::{info, warn};
use reqwest::Client;
use serde::Deserialize;

use super::errors::TimetableError;

/// A trait, necessary for every entity that can tell today's date.
#[allow(async_fn_in_trait)]
pub trait Clock {
    async fn today(&self) -> Result<NaiveDate, TimetableError>;

    /// Date to anchor the week on when [`Clock::today`] fails.
    fn fallback_today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// The machine's own clock, in local time.
pub struct LocalClock;

impl Clock for LocalClock {
    async fn today(&self) -> Result<NaiveDate, TimetableError> {
        Ok(Local::now().date_naive())
    }
}

#[derive(Deserialize, Debug)]
struct TimeApiResponse {
    year: i32,
    month: u32,
    day: u32,
}

/// Remote time service answering `{day, month, year}` for a given time zone.
/// When the service is down, the system clock shifted to `fallback_offset` stands in.
pub struct TimeApiClock {
    http_client: Client,
    url: String,
    time_zone: String,
    fallback_offset: FixedOffset,
}

impl TimeApiClock {
    pub fn new(http_client: Client, url: &str, time_zone: &str) -> Self {
        TimeApiClock {
            http_client,
            url: url.to_owned(),
            time_zone: time_zone.to_owned(),
            fallback_offset: Local::now().offset().fix(),
        }
    }

    pub fn with_fallback_offset(mut self, offset: FixedOffset) -> Self {
        self.fallback_offset = offset;
        self
    }

    async fn fetch(&self) -> Result<NaiveDate, String> {
        let response = self
            .http_client
            .get(&self.url)
            .query(&[("timeZone", self.time_zone.as_str())])
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| e.to_string())?;
        let body = response.text().await.map_err(|e| e.to_string())?;
        let now: TimeApiResponse = serde_json::from_str(&body).map_err(|e| e.to_string())?;
        NaiveDate::from_ymd_opt(now.year, now.month, now.day)
            .ok_or_else(|| format!("{}-{}-{} is not a date", now.year, now.month, now.day))
    }
}

impl Clock for TimeApiClock {
    async fn today(&self) -> Result<NaiveDate, TimetableError> {
        let today = self
            .fetch()
            .await
            .map_err(TimetableError::TimeSourceUnavailable)?;
        info!("Time service at {} says today is {}", self.url, today);
        Ok(today)
    }

    fn fallback_today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.fallback_offset).date_naive()
    }
}

/// Clock picked at startup from args and config.
pub enum ClockSource {
    Local(LocalClock),
    TimeApi(TimeApiClock),
}

impl Clock for ClockSource {
    async fn today(&self) -> Result<NaiveDate, TimetableError> {
        match self {
            ClockSource::Local(clock) => clock.today().await,
            ClockSource::TimeApi(clock) => clock.today().await,
        }
    }

    fn fallback_today(&self) -> NaiveDate {
        match self {
            ClockSource::Local(clock) => clock.fallback_today(),
            ClockSource::TimeApi(clock) => clock.fallback_today(),
        }
    }
}

/// Monday of the week `date` belongs to.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

/// The 7 dates from Monday `start` through Sunday.
pub fn week_dates(start: NaiveDate) -> [NaiveDate; 7] {
    std::array::from_fn(|offset| start + Duration::days(offset as i64))
}

pub async fn current_week_start<C: Clock>(clock: &C) -> Result<NaiveDate, TimetableError> {
    Ok(week_start(clock.today().await?))
}

/// Like [`current_week_start`], but anchors on [`Clock::fallback_today`] when `clock` fails.
pub async fn current_week_start_or_fallback<C: Clock>(clock: &C) -> NaiveDate {
    match current_week_start(clock).await {
        Ok(start) => start,
        Err(e) => {
            warn!("{}, falling back to system clock", e);
            week_start(clock.fallback_today())
        }
    }
}

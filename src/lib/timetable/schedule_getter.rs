use chrono::{Datelike, NaiveDate};
use log::debug;
use reqwest::Client;
use serde::Deserialize;

use super::{config::Config, errors::TimetableError};

/// A trait, necessary for every entity that will be used for getting one day of the schedule.
#[allow(async_fn_in_trait)]
pub trait DayFetcher {
    /// Returns the HTML fragment describing `group`'s lessons on `date`.
    async fn fetch_day(&self, date: NaiveDate, group: &str) -> Result<String, TimetableError>;
}

/// HTTP access to rgsu.net, shared by the timetable and the group directory requests.
pub struct RgsuClient {
    pub(super) http_client: Client,
    pub(super) config: Config,
}

impl RgsuClient {
    pub fn new(http_client: Client, config: Config) -> Self {
        RgsuClient {
            http_client,
            config,
        }
    }
}

#[derive(Deserialize, Debug)]
struct DayResponse {
    #[serde(default)]
    html: Option<String>,
}

/// Form body of a timetable request, fields in the order the site sends them.
pub fn day_form(config: &Config, date: NaiveDate, group: &str) -> Vec<(&'static str, String)> {
    vec![
        ("place", config.place.clone()),
        ("group", group.to_owned()),
        ("mode", config.mode.clone()),
        ("date", date.format("%Y-%m-%d").to_string()),
        ("filial", config.filial.clone()),
        ("week", date.iso_week().week().to_string()),
        ("month", date.month().to_string()),
        ("year", date.year().to_string()),
    ]
}

/// Pulls the `html` fragment out of a timetable response body.
/// A body without `html` means no lessons and yields an empty fragment.
pub fn parse_day_response(endpoint: &str, body: &str) -> Result<String, TimetableError> {
    let response: DayResponse =
        serde_json::from_str(body).map_err(|e| TimetableError::malformed(endpoint, e))?;
    Ok(response.html.unwrap_or_default())
}

impl DayFetcher for RgsuClient {
    async fn fetch_day(&self, date: NaiveDate, group: &str) -> Result<String, TimetableError> {
        debug!("Getting timetable of {} for {}", group, date);
        let response = self
            .http_client
            .post(&self.config.timetable_url)
            .form(&day_form(&self.config, date, group))
            .send()
            .await?
            .error_for_status()?;
        let body = response.text().await?;
        parse_day_response(&self.config.timetable_url, &body)
    }
}

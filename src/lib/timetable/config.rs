use std::{path::Path, time::Duration};

use chrono::{FixedOffset, Offset, Utc};
use figment::{
    providers::{Env, Format, Json, Serialized},
    Figment,
};
use log::info;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::errors::TimetableError;

/// A model for describing configuration of the tool.
/// Consists of:
/// 1. Endpoints of the timetable, the group directory and the time service
/// 2. Time zone sent to the time service, and its UTC offset in minutes for when the service is down
/// 3. Browser User-Agent sent with every request
/// 4. Fixed form fields of the timetable request (place, mode, filial)
/// 5. Transport settings: timeout and certificate policy
/// 6. Whether the week is anchored on the time service or on the local clock
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub timetable_url: String,
    pub groups_url: String,
    pub time_api_url: String,
    pub time_zone: String,
    pub fallback_utc_offset_minutes: i32,
    pub user_agent: String,
    pub place: String,
    pub mode: String,
    pub filial: String,
    pub request_timeout_secs: u64,
    pub accept_invalid_certs: bool,
    pub use_time_api: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            timetable_url: "https://rgsu.net/for-students/timetable/timetable/novyy-format-den-json.html?filial=%D0%92%D0%A3%D0%97&isNaked=1".to_owned(),
            groups_url: "https://rgsu.net/for-students/timetable/timetable/novyy-format-group-json.html?filial=%D0%92%D0%A3%D0%97&isNaked=1".to_owned(),
            time_api_url: "https://timeapi.io/api/time/current/zone".to_owned(),
            time_zone: "Europe/Moscow".to_owned(),
            fallback_utc_offset_minutes: 3 * 60,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) Chrome/120.0.0.0 Safari/537.36".to_owned(),
            place: "first".to_owned(),
            mode: "day".to_owned(),
            filial: "ВУЗ".to_owned(),
            request_timeout_secs: 10,
            accept_invalid_certs: true,
            use_time_api: true,
        }
    }
}

impl Config {
    /// Offset of `time_zone` used to read the system clock; out-of-range values mean UTC.
    pub fn fallback_offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.fallback_utc_offset_minutes * 60).unwrap_or_else(|| Utc.fix())
    }
}

/// Defaults, then the JSON file (if present), then `RGSU_*` environment variables.
pub fn load_config(config_json_path: &Path) -> Result<Config, figment::Error> {
    if config_json_path.exists() {
        info!("Reading config from {}", config_json_path.display());
    }
    Figment::from(Serialized::defaults(Config::default()))
        .merge(Json::file(config_json_path))
        .merge(Env::prefixed("RGSU_"))
        .extract()
}

pub fn build_http_client(config: &Config) -> Result<Client, TimetableError> {
    let client = Client::builder()
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .user_agent(config.user_agent.as_str())
        .danger_accept_invalid_certs(config.accept_invalid_certs)
        .build()?;
    Ok(client)
}

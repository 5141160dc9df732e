use log::info;
use serde::Deserialize;

use super::{errors::TimetableError, schedule_getter::RgsuClient};

/// A trait, necessary for every entity that will be used for getting the group directory.
#[allow(async_fn_in_trait)]
pub trait GroupsGetter {
    async fn get_groups(&self) -> Result<Vec<String>, TimetableError>;
}

#[derive(Deserialize, Debug)]
struct GroupsResponse {
    #[serde(default)]
    suggestions: Option<Vec<String>>,
}

/// Reads the `suggestions` array of a directory response, keeping source order.
/// A body without `suggestions` is an empty directory.
pub fn parse_groups_response(endpoint: &str, body: &str) -> Result<Vec<String>, TimetableError> {
    let response: GroupsResponse =
        serde_json::from_str(body).map_err(|e| TimetableError::malformed(endpoint, e))?;
    Ok(response.suggestions.unwrap_or_default())
}

impl GroupsGetter for RgsuClient {
    async fn get_groups(&self) -> Result<Vec<String>, TimetableError> {
        info!("Getting group directory from {}", self.config.groups_url);
        let response = self
            .http_client
            .post(&self.config.groups_url)
            .send()
            .await?
            .error_for_status()?;
        let body = response.text().await?;
        let groups = parse_groups_response(&self.config.groups_url, &body)?;
        info!("Collected {} groups", groups.len());
        Ok(groups)
    }
}

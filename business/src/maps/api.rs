//! Listing endpoint for map versions.

use log::{debug, error};
use serde::Deserialize;
use thiserror::Error;

use super::model::MapVersion;
use super::params::ListParams;
use crate::http::Client;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MapsApiError {
    #[error("{0}")]
    Transport(String),
    #[error("server responded with status {0}")]
    Status(u16),
    #[error("unexpected response body: {0}")]
    Decode(String),
}

#[derive(Debug, Deserialize)]
struct ListMapsResponse {
    data: Vec<MapVersion>,
    #[serde(default, alias = "totalCount")]
    total: Option<u64>,
}

/// One page of rows plus the server's row count across all pages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MapPage {
    pub rows: Vec<MapVersion>,
    pub total: u64,
}

impl From<ListMapsResponse> for MapPage {
    fn from(response: ListMapsResponse) -> Self {
        let total = response.total.unwrap_or(response.data.len() as u64);
        Self {
            rows: response.data,
            total,
        }
    }
}

/// Join base url and endpoint path without doubling the slash.
pub fn maps_url(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

pub async fn list_maps(url: &str, params: &ListParams) -> Result<MapPage, MapsApiError> {
    debug!("GET {url} page={} results={}", params.page, params.page_size);

    let response = Client::get(url)
        .header("Accept", "application/json")
        .query(params.to_query())
        .send()
        .await
        .map_err(|err| MapsApiError::Transport(err.to_string()))?;

    if !response.is_success() {
        error!("listing {url} failed with status {}", response.status);
        return Err(MapsApiError::Status(response.status));
    }

    response
        .json::<ListMapsResponse>()
        .map(MapPage::from)
        .map_err(|err| {
            let content_type = response.header("content-type").unwrap_or("unknown");
            error!("listing {url} returned an undecodable {content_type} body: {err}");
            MapsApiError::Decode(err.to_string())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::maps::model::MapStatus;

    #[test]
    fn maps_url_joins_single_slash() {
        assert_eq!(
            maps_url("http://localhost:8080/", "/management/maps"),
            "http://localhost:8080/management/maps"
        );
        assert_eq!(maps_url("", "/management/maps"), "/management/maps");
    }

    #[test]
    fn total_falls_back_to_row_count() {
        let response: ListMapsResponse = serde_json::from_str(
            r#"{"data": [{"mapVersionId": "v1"}, {"mapVersionId": 2}]}"#,
        )
        .unwrap();

        let page = MapPage::from(response);
        assert_eq!(page.total, 2);
        assert_eq!(page.rows[1].map_version_id, "2");
    }

    #[test]
    fn total_count_alias_is_accepted() {
        let response: ListMapsResponse =
            serde_json::from_str(r#"{"data": [], "totalCount": 42}"#).unwrap();

        assert_eq!(MapPage::from(response).total, 42);
    }

    #[test]
    fn unexpected_status_keeps_every_row() {
        let response: ListMapsResponse = serde_json::from_str(
            r#"{"data":[{"mapVersionId":"v1","mapStatus":0},{"mapVersionId":"v2","mapStatus":3},{"mapVersionId":"v3","mapStatus":"0"}]}"#,
        )
        .unwrap();

        let page = MapPage::from(response);
        assert_eq!(page.rows.len(), 3);
        assert_eq!(page.rows[0].map_status, Some(MapStatus::Online));
        assert_eq!(page.rows[1].map_status, None);
        assert_eq!(page.rows[2].map_status, Some(MapStatus::Online));
    }

    #[test]
    fn missing_data_is_rejected() {
        assert!(serde_json::from_str::<ListMapsResponse>(r#"{"total": 1}"#).is_err());
    }
}

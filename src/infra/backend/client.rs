use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Url;
use tracing::{debug, info};

use crate::config::Settings;
use crate::fetch::{ApiKey, BasicClient, HttpClient, fetch_bytes};
use crate::services::trip_source::TripSource;

/// REST client for the scheduling backend's trip listing.
pub struct ScheduleApiClient<C> {
    http: C,
    base_url: String,
    trips_path: String,
}

impl<C: HttpClient> ScheduleApiClient<C> {
    pub fn new(http: C, base_url: impl Into<String>, trips_path: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            trips_path: trips_path.into(),
        }
    }

    /// `{base_url}{trips_path}?date=YYYY-MM-DD`
    pub fn trips_url(&self, date: NaiveDate) -> Result<Url> {
        let mut url = Url::parse(&format!("{}{}", self.base_url, self.trips_path))?;
        url.query_pairs_mut()
            .append_pair("date", &date.format("%Y-%m-%d").to_string());
        Ok(url)
    }
}

impl ScheduleApiClient<Arc<dyn HttpClient>> {
    /// Builds a client from settings, adding the bearer token when one is
    /// configured.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let base_url = settings
            .api_url
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("TIMELINE_API_URL must be set to fetch from the backend"))?;

        let basic = BasicClient::new()?;
        let http: Arc<dyn HttpClient> = match settings.api_token.as_deref() {
            Some(token) => Arc::new(ApiKey::bearer(basic, token)?),
            None => {
                info!("No TIMELINE_API_TOKEN set, calling backend without credentials");
                Arc::new(basic)
            }
        };

        Ok(Self::new(http, base_url, settings.trips_path.as_str()))
    }
}

#[async_trait]
impl<C: HttpClient> TripSource for ScheduleApiClient<C> {
    async fn trips_for_date(&self, date: NaiveDate) -> Result<Vec<u8>> {
        let url = self.trips_url(date)?;
        debug!(%url, "Requesting trip table");

        let bytes = fetch_bytes(&self.http, url.as_str()).await?;
        debug!(bytes = bytes.len(), %date, "Trip table received");
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 10).unwrap()
    }

    #[test]
    fn test_trips_url() {
        let client = ScheduleApiClient::new(
            BasicClient::new().unwrap(),
            "https://api.example.com/",
            "/calendar/trips",
        );
        assert_eq!(
            client.trips_url(date()).unwrap().as_str(),
            "https://api.example.com/calendar/trips?date=2024-06-10"
        );
    }

    #[tokio::test]
    async fn test_fetches_with_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/calendar/trips"))
            .and(query_param("date", "2024-06-10"))
            .and(header("authorization", "Bearer t0ken"))
            .respond_with(ResponseTemplate::new(200).set_body_string("[]"))
            .expect(1)
            .mount(&server)
            .await;

        let http = ApiKey::bearer(BasicClient::new().unwrap(), "t0ken").unwrap();
        let client = ScheduleApiClient::new(http, server.uri(), "/calendar/trips");

        let body = client.trips_for_date(date()).await.unwrap();
        assert_eq!(body, b"[]");
    }

    #[tokio::test]
    async fn test_server_error_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let client = ScheduleApiClient::new(BasicClient::new().unwrap(), server.uri(), "/calendar/trips");

        let err = client.trips_for_date(date()).await.unwrap_err();
        assert!(err.to_string().contains("500"));
        assert!(err.to_string().contains("boom"));
    }
}

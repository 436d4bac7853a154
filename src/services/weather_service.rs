use std::time::Duration;

use reqwest::Client;
use tracing::debug;

use crate::config::Site;
use crate::errors::WeatherError;
use crate::models::weather::{CurrentWeatherResponse, WeatherSample};

/// Current-weather fields requested from Open-Meteo, in request order.
pub const CURRENT_FIELDS: [&str; 4] = [
    "temperature_2m",
    "shortwave_radiation",
    "direct_radiation",
    "diffuse_radiation",
];

/// Source of the latest weather observation for the configured site.
pub trait WeatherSource {
    async fn fetch_current(&self) -> Result<WeatherSample, WeatherError>;
}

/// Open-Meteo forecast API client
pub struct OpenMeteoClient {
    client: Client,
    base_url: String,
    latitude: f64,
    longitude: f64,
}

impl OpenMeteoClient {
    pub fn new(base_url: &str, site: &Site, timeout: Duration) -> Result<Self, WeatherError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.to_string(),
            latitude: site.latitude,
            longitude: site.longitude,
        })
    }
}

impl WeatherSource for OpenMeteoClient {
    /// One GET per call; no retry.
    async fn fetch_current(&self) -> Result<WeatherSample, WeatherError> {
        let resp = self
            .client
            .get(&self.base_url)
            .query(&[
                ("latitude", self.latitude.to_string()),
                ("longitude", self.longitude.to_string()),
                ("current", CURRENT_FIELDS.join(",")),
                ("timezone", "auto".to_string()),
            ])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(WeatherError::Status(status));
        }

        let body = resp.text().await?;
        let parsed: CurrentWeatherResponse = serde_json::from_str(&body)?;
        debug!(time = %parsed.current.time, ghi = parsed.current.shortwave_radiation, "current weather received");

        parsed.into_sample()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client_for(server: &MockServer) -> OpenMeteoClient {
        let url = format!("{}/v1/forecast", server.uri());
        OpenMeteoClient::new(&url, &Site::lisbon(), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn requests_the_four_current_fields() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .and(query_param("latitude", "38.736946"))
            .and(query_param("longitude", "-9.142685"))
            .and(query_param("current", "temperature_2m,shortwave_radiation,direct_radiation,diffuse_radiation"))
            .and(query_param("timezone", "auto"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "utc_offset_seconds": 0,
                "current": {
                    "time": "2025-01-23T12:00",
                    "interval": 900,
                    "temperature_2m": 14.1,
                    "shortwave_radiation": 420.0,
                    "direct_radiation": 300.0,
                    "diffuse_radiation": 120.0
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let sample = client_for(&server).await.fetch_current().await.unwrap();
        assert_eq!(sample.ghi, 420.0);
        assert_eq!(sample.dni, 300.0);
        assert_eq!(sample.dhi, 120.0);
        assert_eq!(sample.temp_air, Some(14.1));
    }

    #[tokio::test]
    async fn partial_response_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "current": { "time": "2025-01-23T12:00", "temperature_2m": 14.1 }
            })))
            .mount(&server)
            .await;

        let err = client_for(&server).await.fetch_current().await.unwrap_err();
        assert!(matches!(err, WeatherError::Decode(_)));
    }

    #[tokio::test]
    async fn server_error_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = client_for(&server).await.fetch_current().await.unwrap_err();
        assert!(matches!(err, WeatherError::Status(s) if s.as_u16() == 503));
    }
}

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::{collections::BTreeMap, fmt::Debug, time::Duration};
use tracing::warn;

use crate::{
    config::Config,
    model::{AirQualityForecast, AirQualityReading, Coordinate, ForecastPoint},
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Source of live air quality data for a coordinate.
///
/// Both operations return `None` on any remote failure (non-200 status,
/// transport error, malformed payload). Absence is the expected degraded
/// mode when the network or API is unavailable; callers must never treat
/// it as fatal. There are no retries: the user's next interaction is the
/// implicit retry trigger.
#[async_trait]
pub trait AirQualitySource: Send + Sync + Debug {
    async fn current(&self, coord: Coordinate) -> Option<AirQualityReading>;
    async fn forecast(&self, coord: Coordinate) -> Option<AirQualityForecast>;
}

/// Client for the OpenWeatherMap air pollution endpoints.
#[derive(Debug, Clone)]
pub struct AirQualityClient {
    api_key: String,
    base_url: String,
    timeout: Duration,
    http: Client,
}

impl AirQualityClient {
    pub fn new(api_key: String, base_url: String) -> Self {
        Self { api_key, base_url, timeout: REQUEST_TIMEOUT, http: Client::new() }
    }

    /// Override the per-request timeout; mainly useful for tests.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let api_key = config.api_key().ok_or_else(|| {
            anyhow!(
                "No API key configured for OpenWeatherMap.\n\
                 Hint: run `emissions configure` and enter your API key."
            )
        })?;

        Ok(Self::new(api_key.to_owned(), config.base_url().to_owned()))
    }

    async fn get_json(&self, path: &str, coord: Coordinate) -> Result<String> {
        let url = format!("{}/{path}", self.base_url);

        let res = self
            .http
            .get(&url)
            .timeout(self.timeout)
            .query(&[
                ("lat", coord.latitude.to_string()),
                ("lon", coord.longitude.to_string()),
                ("appid", self.api_key.clone()),
            ])
            .send()
            .await
            .with_context(|| format!("Failed to send request to {url}"))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .with_context(|| format!("Failed to read response body from {url}"))?;

        if !status.is_success() {
            return Err(anyhow!(
                "Request to {url} failed with status {status}: {}",
                truncate_body(&body),
            ));
        }

        Ok(body)
    }

    async fn try_fetch_current(&self, coord: Coordinate) -> Result<AirQualityReading> {
        let body = self.get_json("air_pollution", coord).await?;

        let parsed: AqCurrentResponse =
            serde_json::from_str(&body).context("Failed to parse air pollution JSON")?;

        let entry = parsed
            .list
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("Air pollution response contained no entries"))?;

        Ok(entry.components)
    }

    async fn try_fetch_forecast(&self, coord: Coordinate) -> Result<AirQualityForecast> {
        let body = self.get_json("air_pollution/forecast", coord).await?;

        let parsed: AqForecastResponse =
            serde_json::from_str(&body).context("Failed to parse air pollution forecast JSON")?;

        let points = parsed
            .list
            .into_iter()
            .map(|entry| ForecastPoint {
                timestamp: DateTime::from_timestamp(entry.dt, 0).unwrap_or_else(Utc::now),
                components: entry.components,
            })
            .collect();

        Ok(points)
    }
}

#[async_trait]
impl AirQualitySource for AirQualityClient {
    async fn current(&self, coord: Coordinate) -> Option<AirQualityReading> {
        match self.try_fetch_current(coord).await {
            Ok(reading) => Some(reading),
            Err(err) => {
                warn!("current air quality data unavailable: {err:#}");
                None
            }
        }
    }

    async fn forecast(&self, coord: Coordinate) -> Option<AirQualityForecast> {
        match self.try_fetch_forecast(coord).await {
            Ok(points) => Some(points),
            Err(err) => {
                warn!("air quality forecast data unavailable: {err:#}");
                None
            }
        }
    }
}

/// Air quality source with fixed responses, for tests and demos.
#[derive(Debug, Clone, Default)]
pub struct StaticAirQualitySource {
    pub current: Option<AirQualityReading>,
    pub forecast: Option<AirQualityForecast>,
}

#[async_trait]
impl AirQualitySource for StaticAirQualitySource {
    async fn current(&self, _coord: Coordinate) -> Option<AirQualityReading> {
        self.current.clone()
    }

    async fn forecast(&self, _coord: Coordinate) -> Option<AirQualityForecast> {
        self.forecast.clone()
    }
}

#[derive(Debug, Deserialize)]
struct AqCurrentEntry {
    components: BTreeMap<String, f64>,
}

#[derive(Debug, Deserialize)]
struct AqCurrentResponse {
    list: Vec<AqCurrentEntry>,
}

#[derive(Debug, Deserialize)]
struct AqForecastEntry {
    dt: i64,
    components: BTreeMap<String, f64>,
}

#[derive(Debug, Deserialize)]
struct AqForecastResponse {
    list: Vec<AqForecastEntry>,
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() <= MAX {
        return body.to_string();
    }

    // Back off to the nearest char boundary so multibyte bodies can't
    // panic the slice.
    let cut = (0..=MAX).rev().find(|i| body.is_char_boundary(*i)).unwrap_or(0);
    format!("{}...", &body[..cut])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{
        io::{Read, Write},
        net::TcpListener,
        thread,
    };

    fn coord() -> Coordinate {
        Coordinate::new(40.7128, -74.0060).unwrap()
    }

    /// Serve a single canned HTTP response on a local port.
    fn one_shot_server(status_line: &'static str, body: impl Into<String>) -> String {
        let body = body.into();
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind local listener");
        let addr = listener.local_addr().unwrap();

        thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                let mut buf = [0u8; 4096];
                let _ = stream.read(&mut buf);

                let response = format!(
                    "{status_line}\r\nContent-Type: application/json\r\n\
                     Content-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len(),
                );
                let _ = stream.write_all(response.as_bytes());
            }
        });

        format!("http://{addr}")
    }

    /// Accept a connection but never answer; the client's timeout must fire.
    fn silent_server() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind local listener");
        let addr = listener.local_addr().unwrap();

        thread::spawn(move || {
            if let Ok((stream, _)) = listener.accept() {
                thread::sleep(Duration::from_secs(2));
                drop(stream);
            }
        });

        format!("http://{addr}")
    }

    #[tokio::test]
    async fn current_parses_first_entry_components() {
        let base = one_shot_server(
            "HTTP/1.1 200 OK",
            r#"{"list":[{"dt":1700000000,"main":{"aqi":2},"components":{"co":201.94,"no2":0.77}}]}"#,
        );
        let client = AirQualityClient::new("KEY".to_string(), base);

        let reading = client.current(coord()).await.expect("reading should be present");
        assert_eq!(reading.get("co"), Some(&201.94));
        assert_eq!(reading.get("no2"), Some(&0.77));
    }

    #[tokio::test]
    async fn forecast_parses_all_entries_in_order() {
        let base = one_shot_server(
            "HTTP/1.1 200 OK",
            r#"{"list":[
                {"dt":1700000000,"components":{"co":100.0}},
                {"dt":1700010800,"components":{"co":110.0}}
            ]}"#,
        );
        let client = AirQualityClient::new("KEY".to_string(), base);

        let points = client.forecast(coord()).await.expect("forecast should be present");
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].timestamp, DateTime::from_timestamp(1_700_000_000, 0).unwrap());
        assert_eq!(points[1].components.get("co"), Some(&110.0));
    }

    #[tokio::test]
    async fn current_returns_none_on_http_500() {
        let base = one_shot_server("HTTP/1.1 500 Internal Server Error", "{}");
        let client = AirQualityClient::new("KEY".to_string(), base);

        assert!(client.current(coord()).await.is_none());
    }

    #[tokio::test]
    async fn forecast_returns_none_on_http_401() {
        let base = one_shot_server("HTTP/1.1 401 Unauthorized", r#"{"cod":401}"#);
        let client = AirQualityClient::new("KEY".to_string(), base);

        assert!(client.forecast(coord()).await.is_none());
    }

    #[tokio::test]
    async fn current_returns_none_on_http_500_with_multibyte_body() {
        // 199 ASCII bytes followed by a three-byte char: a naive byte
        // slice at 200 would land inside it.
        let body = format!("{}€", "a".repeat(199));
        let base = one_shot_server("HTTP/1.1 500 Internal Server Error", body);
        let client = AirQualityClient::new("KEY".to_string(), base);

        assert!(client.current(coord()).await.is_none());
    }

    #[tokio::test]
    async fn current_returns_none_on_timeout() {
        let client = AirQualityClient::new("KEY".to_string(), silent_server())
            .with_timeout(Duration::from_millis(100));

        assert!(client.current(coord()).await.is_none());
    }

    #[tokio::test]
    async fn forecast_returns_none_on_timeout() {
        let client = AirQualityClient::new("KEY".to_string(), silent_server())
            .with_timeout(Duration::from_millis(100));

        assert!(client.forecast(coord()).await.is_none());
    }

    #[test]
    fn truncate_body_cuts_on_a_char_boundary() {
        let body = format!("{}€trailing", "a".repeat(199));

        let truncated = truncate_body(&body);
        assert!(truncated.ends_with("..."));
        assert_eq!(truncated, format!("{}...", "a".repeat(199)));
    }

    #[tokio::test]
    async fn current_returns_none_on_transport_failure() {
        // Nothing listens here: connection is refused immediately.
        let client =
            AirQualityClient::new("KEY".to_string(), "http://127.0.0.1:1".to_string());

        assert!(client.current(coord()).await.is_none());
        assert!(client.forecast(coord()).await.is_none());
    }

    #[tokio::test]
    async fn current_returns_none_on_malformed_payload() {
        let base = one_shot_server("HTTP/1.1 200 OK", r#"{"list":[]}"#);
        let client = AirQualityClient::new("KEY".to_string(), base);

        assert!(client.current(coord()).await.is_none());
    }

    #[test]
    fn from_config_errors_when_missing_api_key() {
        let cfg = Config::default();
        let err = AirQualityClient::from_config(&cfg).unwrap_err();

        let msg = err.to_string();
        assert!(msg.contains("No API key configured"));
        assert!(msg.contains("Hint: run `emissions configure`"));
    }

    #[tokio::test]
    async fn static_source_returns_fixed_responses() {
        let source = StaticAirQualitySource {
            current: Some(AirQualityReading::from([("co".to_string(), 3.0)])),
            forecast: None,
        };

        assert!(source.current(coord()).await.is_some());
        assert!(source.forecast(coord()).await.is_none());
    }
}

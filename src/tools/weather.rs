//! 当前天气工具（OpenWeather）
//!
//! GET {base_url}/data/2.5/weather?q=city&appid=key&units=metric。
//! 未配置 api_key 时每次调用直接返回 Configuration 错误，不发请求、不消耗重试。

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Number;

use crate::config::WeatherSection;
use crate::core::{BuildError, ToolExecutionError};
use crate::plan::{Params, ToolKind};
use crate::tools::params::ParamReader;
use crate::tools::retry::{AttemptError, RetryPolicy};
use crate::tools::{ToolAdapter, ToolOutput, WeatherRecord};

#[derive(Debug, Deserialize)]
struct WeatherResponse {
    main: MainReading,
    #[serde(default)]
    weather: Vec<Condition>,
    wind: Wind,
}

#[derive(Debug, Deserialize)]
struct MainReading {
    temp: f64,
    feels_like: f64,
    humidity: Number,
}

#[derive(Debug, Deserialize)]
struct Condition {
    description: String,
}

#[derive(Debug, Deserialize)]
struct Wind {
    speed: Number,
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// 天气适配器
pub struct WeatherTool {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    units: String,
    retry: RetryPolicy,
}

impl WeatherTool {
    pub fn new(
        config: &WeatherSection,
        timeout: Duration,
        retry: RetryPolicy,
    ) -> Result<Self, BuildError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BuildError::HttpClient(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: format!("{}/data/2.5/weather", config.base_url.trim_end_matches('/')),
            api_key: config.resolved_api_key(),
            units: config.units.clone(),
            retry,
        })
    }

    pub async fn get_weather(&self, city: &str) -> Result<WeatherRecord, ToolExecutionError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| ToolExecutionError::Configuration {
                tool: ToolKind::Weather,
                message: "OPENWEATHER_API_KEY not configured".to_string(),
            })?;
        tracing::info!(city = %city, "weather lookup");
        self.retry
            .run(ToolKind::Weather, |_| self.fetch(city, api_key))
            .await
    }

    async fn fetch(&self, city: &str, api_key: &str) -> Result<WeatherRecord, AttemptError> {
        let resp = self
            .client
            .get(&self.endpoint)
            .query(&[("q", city), ("appid", api_key), ("units", self.units.as_str())])
            .send()
            .await
            .map_err(|e| AttemptError::Transient(format!("Request failed: {}", e)))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(AttemptError::Transient(format!("HTTP {}", status)));
        }

        let body: WeatherResponse = resp.json().await.map_err(|e| {
            if e.is_decode() {
                AttemptError::Fatal(format!("Invalid response body: {}", e))
            } else {
                AttemptError::Transient(format!("Read body: {}", e))
            }
        })?;

        let condition = body
            .weather
            .into_iter()
            .next()
            .map(|c| c.description)
            .ok_or_else(|| AttemptError::Fatal("Response has no weather condition".to_string()))?;

        Ok(WeatherRecord {
            city: city.to_string(),
            temperature_c: round1(body.main.temp),
            feels_like_c: round1(body.main.feels_like),
            humidity: body.main.humidity,
            condition,
            wind_speed_ms: body.wind.speed,
        })
    }
}

#[async_trait]
impl ToolAdapter for WeatherTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Weather
    }

    async fn invoke(&self, params: &Params) -> Result<ToolOutput, ToolExecutionError> {
        let reader = ParamReader::new(ToolKind::Weather, params, &["city"], &[])?;
        let city = reader.string("city")?;
        self.get_weather(&city).await.map(ToolOutput::Weather)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::params;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn tool_for(server: &MockServer, api_key: Option<&str>) -> WeatherTool {
        let config = WeatherSection {
            base_url: server.uri(),
            api_key: api_key.map(String::from),
            units: "metric".to_string(),
        };
        WeatherTool {
            api_key: api_key.map(String::from),
            ..WeatherTool::new(
                &config,
                Duration::from_secs(5),
                RetryPolicy::new(3, Duration::from_millis(1)),
            )
            .unwrap()
        }
    }

    fn sample_body() -> serde_json::Value {
        json!({
            "main": {"temp": 27.456, "feels_like": 29.04, "humidity": 74, "pressure": 1010},
            "weather": [{"main": "Clouds", "description": "scattered clouds"}],
            "wind": {"speed": 4.63, "deg": 250},
            "name": "Bengaluru"
        })
    }

    #[test]
    fn test_round1() {
        assert_eq!(round1(27.456), 27.5);
        assert_eq!(round1(29.04), 29.0);
        assert_eq!(round1(-3.26), -3.3);
    }

    #[tokio::test]
    async fn test_maps_weather_record() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .and(query_param("q", "Bangalore"))
            .and(query_param("appid", "owm-key"))
            .and(query_param("units", "metric"))
            .respond_with(ResponseTemplate::new(200).set_body_json(sample_body()))
            .expect(1)
            .mount(&server)
            .await;

        let out = tool_for(&server, Some("owm-key"))
            .invoke(&params(json!({"city": "Bangalore"})))
            .await
            .unwrap();

        let ToolOutput::Weather(record) = out else {
            panic!("expected weather record");
        };
        assert_eq!(record.city, "Bangalore");
        assert_eq!(record.temperature_c, 27.5);
        assert_eq!(record.feels_like_c, 29.0);
        assert_eq!(record.condition, "scattered clouds");
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["humidity"], json!(74));
        assert_eq!(value["wind_speed_ms"], json!(4.63));
    }

    #[tokio::test]
    async fn test_missing_api_key_fails_without_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(sample_body()))
            .expect(0)
            .mount(&server)
            .await;

        let err = tool_for(&server, None)
            .get_weather("Bangalore")
            .await
            .unwrap_err();
        assert!(matches!(err, ToolExecutionError::Configuration { .. }));
        assert_eq!(err.attempts(), 0);
        assert_eq!(
            err.to_string(),
            "weather is not configured: OPENWEATHER_API_KEY not configured"
        );
    }

    #[tokio::test]
    async fn test_recovers_after_transient_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(1)
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .respond_with(ResponseTemplate::new(200).set_body_json(sample_body()))
            .expect(1)
            .mount(&server)
            .await;

        let record = tool_for(&server, Some("owm-key"))
            .get_weather("Bangalore")
            .await
            .unwrap();
        assert_eq!(record.temperature_c, 27.5);
    }

    #[tokio::test]
    async fn test_missing_condition_is_fatal() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "main": {"temp": 10.0, "feels_like": 9.0, "humidity": 50},
                "weather": [],
                "wind": {"speed": 1.0}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let err = tool_for(&server, Some("owm-key"))
            .get_weather("Oslo")
            .await
            .unwrap_err();
        assert!(matches!(err, ToolExecutionError::Upstream { attempts: 1, .. }));
    }
}

use crate::domain::model::{Coordinate, Direction};
use crate::domain::ports::{ConfigProvider, ConversionBackend};
use crate::utils::error::{ReframeError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

/// Client for swisstopo's REFRAME service.
pub struct RestBackend {
    endpoint: String,
    client: Client,
}

impl RestBackend {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let endpoint = endpoint.into().trim_end_matches('/').to_string();
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ReframeError::ServiceError {
                endpoint: endpoint.clone(),
                message: format!("cannot build HTTP client: {}", e),
            })?;

        Ok(Self { endpoint, client })
    }

    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Self> {
        Self::new(config.rest_endpoint(), config.rest_timeout())
    }

    pub fn url_for(&self, direction: Direction) -> String {
        format!("{}/{}", self.endpoint, direction.service_path())
    }
}

/// The service has answered with both strings and numbers over time.
/// `"NaN"` and `"inf"` parse as f64 but are not coordinates.
fn parse_number(body: &Value, field: &str) -> Option<f64> {
    let value = match body.get(field)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    value.filter(|v| v.is_finite())
}

#[async_trait]
impl ConversionBackend for RestBackend {
    fn name(&self) -> &'static str {
        "rest"
    }

    async fn convert_point(&self, point: Coordinate, direction: Direction) -> Result<Coordinate> {
        let url = self.url_for(direction);
        let service_error = |message: String| ReframeError::ServiceError {
            endpoint: url.clone(),
            message,
        };

        let easting = format!("{:.14}", point.x);
        let northing = format!("{:.14}", point.y);

        tracing::debug!("GET {} easting={} northing={}", url, easting, northing);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("easting", easting.as_str()),
                ("northing", northing.as_str()),
                ("format", "json"),
            ])
            .send()
            .await
            .map_err(|e| service_error(e.to_string()))?;

        let status = response.status();
        tracing::debug!("REST response status: {}", status);
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(service_error(format!("HTTP {}: {}", status, body.trim())));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| service_error(format!("unparsable body: {}", e)))?;

        match (parse_number(&body, "easting"), parse_number(&body, "northing")) {
            (Some(x), Some(y)) => Ok(Coordinate::new(x, y)),
            _ => Err(service_error(format!("missing easting/northing in {}", body))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_url_for_strips_trailing_slash() {
        let backend = RestBackend::new("https://example.com/reframe/", Duration::from_secs(1)).unwrap();
        assert_eq!(
            backend.url_for(Direction::Wgs84ToLv03),
            "https://example.com/reframe/wgs84tolv03"
        );
        assert_eq!(
            backend.url_for(Direction::Lv03ToWgs84),
            "https://example.com/reframe/lv03towgs84"
        );
    }

    #[test]
    fn test_parse_number_accepts_strings_and_numbers() {
        let body = json!({"easting": "599998.2100", "northing": 199990.73, "altitude": null});
        assert_eq!(parse_number(&body, "easting"), Some(599998.21));
        assert_eq!(parse_number(&body, "northing"), Some(199990.73));
        assert_eq!(parse_number(&body, "altitude"), None);
        assert_eq!(parse_number(&body, "missing"), None);
    }

    #[test]
    fn test_parse_number_rejects_non_finite() {
        let body = json!({"easting": "NaN", "northing": "inf", "altitude": " -infinity "});
        assert_eq!(parse_number(&body, "easting"), None);
        assert_eq!(parse_number(&body, "northing"), None);
        assert_eq!(parse_number(&body, "altitude"), None);
    }
}

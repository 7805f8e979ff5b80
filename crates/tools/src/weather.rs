//! `getWeather`: stub that returns mock weather conditions for a city.

use async_trait::async_trait;
use loupe_core::error::ToolError;
use loupe_core::tool::Tool;
use serde::Serialize;
use tracing::debug;

use crate::stable_hash;

pub struct WeatherLookupTool;

#[async_trait]
impl Tool for WeatherLookupTool {
    fn name(&self) -> &str {
        "getWeather"
    }

    fn description(&self) -> &str {
        "Get weather conditions for a given city name."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "location": {
                    "type": "string",
                    "description": "City name such as 'Berlin', 'London', etc."
                }
            },
            "required": ["location"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<serde_json::Value, ToolError> {
        let location = arguments["location"]
            .as_str()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'location' argument".into()))?;

        debug!(location, "Weather lookup");
        let weather = mock_weather(location);
        serde_json::to_value(&weather).map_err(|e| ToolError::ExecutionFailed {
            tool_name: self.name().into(),
            reason: e.to_string(),
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WeatherReport {
    location: String,
    temperature_c: i32,
    conditions: &'static str,
    humidity: u32,
    wind_kph: u32,
}

const CONDITIONS: [&str; 8] = [
    "clear",
    "partly cloudy",
    "cloudy",
    "light rain",
    "heavy rain",
    "thunderstorms",
    "snow",
    "fog",
];

fn mock_weather(location: &str) -> WeatherReport {
    let hash = stable_hash(location);
    WeatherReport {
        location: location.to_string(),
        temperature_c: (hash % 40) as i32 - 5,
        conditions: CONDITIONS[(hash as usize / 7) % CONDITIONS.len()],
        humidity: 30 + (hash % 60),
        wind_kph: 5 + (hash % 30),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn lookup_returns_weather() {
        let result = WeatherLookupTool
            .execute(serde_json::json!({"location": "Berlin"}))
            .await
            .unwrap();

        assert_eq!(result["location"], "Berlin");
        assert!(result["temperatureC"].is_i64());
        assert!(result["conditions"].is_string());
    }

    #[tokio::test]
    async fn deterministic_results() {
        let args = serde_json::json!({"location": "London"});
        let r1 = WeatherLookupTool.execute(args.clone()).await.unwrap();
        let r2 = WeatherLookupTool.execute(args).await.unwrap();
        assert_eq!(r1, r2);
    }

    #[tokio::test]
    async fn temperature_in_plausible_range() {
        for city in ["Berlin", "Tokyo", "Lagos", "Reykjavik", "Lima"] {
            let result = WeatherLookupTool
                .execute(serde_json::json!({"location": city}))
                .await
                .unwrap();
            let t = result["temperatureC"].as_i64().unwrap();
            assert!((-5..35).contains(&t), "{city}: {t}");
        }
    }

    #[tokio::test]
    async fn missing_location_returns_error() {
        let result = WeatherLookupTool.execute(serde_json::json!({})).await;
        assert!(matches!(result, Err(ToolError::InvalidArguments(_))));

        let blank = WeatherLookupTool
            .execute(serde_json::json!({"location": "  "}))
            .await;
        assert!(blank.is_err());
    }

    #[test]
    fn tool_definition() {
        let def = WeatherLookupTool.to_definition();
        assert_eq!(def.name, "getWeather");
        assert_eq!(def.parameters["required"][0], "location");
    }
}

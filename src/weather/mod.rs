//! Current-weather lookup against OpenWeatherMap, and the tool that exposes it.

use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::ClimaConfig;
use crate::error::ClimaError;
use crate::http::shared_client;
use crate::tools::{FunctionTool, ToolParameters};

/// Function name the assistant uses to request a lookup.
pub const WEATHER_TOOL_NAME: &str = "get_weather";
pub const WEATHER_TOOL_DESCRIPTION: &str = "Obtiene el clima actual de una ciudad específica.";
pub const CITY_ARGUMENT: &str = "city";

const UNITS: &str = "metric";
const LANGUAGE: &str = "es";

#[derive(Debug, Deserialize)]
struct CurrentWeather {
    weather: Vec<Condition>,
    main: MainReadings,
}

#[derive(Debug, Deserialize)]
struct Condition {
    description: String,
}

#[derive(Debug, Deserialize)]
struct MainReadings {
    // Kept as a JSON number so it prints exactly as the provider sent it.
    temp: serde_json::Number,
}

pub struct WeatherClient {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl WeatherClient {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: shared_client().clone(),
        }
    }

    pub fn from_config(config: &ClimaConfig) -> Self {
        Self::new(
            config.weather_api_key.clone().unwrap_or_default(),
            config.weather_base_url.clone(),
        )
    }

    /// Describe the current weather in `city` as one Spanish sentence.
    ///
    /// A non-200 answer is not an error: it becomes a sentence saying the
    /// weather could not be fetched. Transport failures and unreadable
    /// bodies are errors.
    pub async fn lookup_weather(&self, city: &str) -> Result<String, ClimaError> {
        let url = format!("{}/data/2.5/weather", self.base_url);
        debug!(city, "weather lookup");

        let resp = self
            .client
            .get(&url)
            .query(&[
                ("q", city),
                ("appid", self.api_key.as_str()),
                ("units", UNITS),
                ("lang", LANGUAGE),
            ])
            .send()
            .await
            .map_err(redact)?;

        let status = resp.status().as_u16();
        if status != 200 {
            warn!(city, status, "weather provider refused lookup");
            return Ok(unavailable_sentence(city));
        }

        let body = resp.text().await.map_err(redact)?;
        let data: CurrentWeather = serde_json::from_str(&body)?;
        let condition = data
            .weather
            .first()
            .ok_or_else(|| ClimaError::api(status, "weather provider returned no conditions"))?;

        Ok(format!(
            "El clima en {city} es {} con una temperatura de {}°C.",
            condition.description, data.main.temp
        ))
    }
}

// The request URL carries the API key in its query string.
fn redact(err: reqwest::Error) -> ClimaError {
    ClimaError::Network(err.without_url())
}

fn unavailable_sentence(city: &str) -> String {
    format!("No se pudo obtener el clima de {city}.")
}

impl std::fmt::Debug for WeatherClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeatherClient")
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// The weather lookup as a callable tool taking a single `city` string.
pub fn weather_tool(client: Arc<WeatherClient>) -> FunctionTool {
    FunctionTool::new(
        WEATHER_TOOL_NAME,
        WEATHER_TOOL_DESCRIPTION,
        ToolParameters::object()
            .string(CITY_ARGUMENT, "", true)
            .build(),
        move |args, _ctx| {
            let client = Arc::clone(&client);
            async move {
                let city = args.get_str(CITY_ARGUMENT)?;
                let sentence = client.lookup_weather(city).await?;
                Ok(serde_json::Value::String(sentence))
            }
        },
    )
}

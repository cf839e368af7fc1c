//! Weather tool: mock current conditions for a city.
//!
//! A few cities have fixed readings. Every other city gets readings
//! derived from a hash of its name, so repeated lookups agree.

use async_trait::async_trait;
use serde::Serialize;
use troupe_core::error::ToolError;
use troupe_core::tool::{Tool, ToolResult};

pub struct WeatherTool;

#[async_trait]
impl Tool for WeatherTool {
    fn name(&self) -> &str {
        "weather"
    }

    fn description(&self) -> &str {
        "Look up the current weather for a city: conditions, temperature, humidity, and wind."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "city": {
                    "type": "string",
                    "description": "Name of the city, e.g. 'Beijing' or 'Shanghai'"
                }
            },
            "required": ["city"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let city = arguments["city"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'city' argument".into()))?;

        let report = report_for(city);
        let output = format!(
            "{} weather: {}, temperature {}°C, humidity {}%, wind {}",
            report.city, report.conditions, report.temperature, report.humidity, report.wind
        );

        Ok(ToolResult {
            call_id: String::new(),
            success: true,
            output,
            data: serde_json::to_value(&report).ok(),
        })
    }
}

#[derive(Debug, Serialize)]
struct WeatherReport {
    city: String,
    temperature: i32,
    conditions: &'static str,
    humidity: u32,
    wind: &'static str,
}

const PRESETS: &[(&str, i32, &str, u32, &str)] = &[
    ("beijing", 12, "Sunny", 35, "N force 3"),
    ("shanghai", 18, "Cloudy", 65, "E force 2"),
    ("guangzhou", 25, "Overcast", 80, "S force 2"),
    ("shenzhen", 26, "Light rain", 85, "SE force 3"),
    ("hangzhou", 16, "Cloudy", 60, "E force 2"),
    ("chengdu", 14, "Overcast", 70, "Breeze"),
];

fn report_for(city: &str) -> WeatherReport {
    let key = city.trim().to_lowercase();
    if let Some(&(_, temperature, conditions, humidity, wind)) =
        PRESETS.iter().find(|(name, ..)| *name == key)
    {
        return WeatherReport {
            city: city.to_string(),
            temperature,
            conditions,
            humidity,
            wind,
        };
    }

    let conditions_list = ["Sunny", "Cloudy", "Overcast", "Light rain", "Heavy rain", "Snow"];
    let winds = ["Breeze", "N force 2", "E force 3", "S force 2", "NW force 3"];

    let hash: u32 = key
        .bytes()
        .fold(0u32, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u32));

    WeatherReport {
        city: city.to_string(),
        temperature: (hash % 44) as i32 - 5, // -5 to 38°C
        conditions: conditions_list[(hash as usize / 7) % conditions_list.len()],
        humidity: 20 + (hash % 76),
        wind: winds[(hash as usize / 3) % winds.len()],
    }
}

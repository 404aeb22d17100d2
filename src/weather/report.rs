//! Weather report value
//!
//! Textual form (one frame payload):
//!
//! ```text
//! 2024-05-01 14:03:22 | Colombo | Temp: 31°C | Humidity: 78% | Sunny
//! ```

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;

use crate::error::Error;

/// Timestamp layout used on the wire
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const FIELD_SEPARATOR: &str = " | ";

/// One generated status message
///
/// Immutable once built; two reports with the same fields are equal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeatherReport {
    /// Local wall-clock time of generation, second precision
    pub timestamp: NaiveDateTime,
    /// City name
    pub city: String,
    /// Temperature in degrees Celsius
    pub temperature: i32,
    /// Relative humidity in percent
    pub humidity: u8,
    /// Condition label
    pub condition: String,
}

impl WeatherReport {
    /// Create a report
    pub fn new(
        timestamp: NaiveDateTime,
        city: impl Into<String>,
        temperature: i32,
        humidity: u8,
        condition: impl Into<String>,
    ) -> Self {
        Self {
            timestamp,
            city: city.into(),
            temperature,
            humidity,
            condition: condition.into(),
        }
    }

    /// Wire payload for this report
    pub fn to_payload(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for WeatherReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | {} | Temp: {}°C | Humidity: {}% | {}",
            self.timestamp.format(TIMESTAMP_FORMAT),
            self.city,
            self.temperature,
            self.humidity,
            self.condition
        )
    }
}

impl FromStr for WeatherReport {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::InvalidReport(s.to_string());

        let fields: Vec<&str> = s.split(FIELD_SEPARATOR).collect();
        let [timestamp, city, temp, humidity, condition] = fields[..] else {
            return Err(invalid());
        };

        let timestamp =
            NaiveDateTime::parse_from_str(timestamp, TIMESTAMP_FORMAT).map_err(|_| invalid())?;

        let temperature = temp
            .strip_prefix("Temp: ")
            .and_then(|t| t.strip_suffix("°C"))
            .and_then(|t| t.parse::<i32>().ok())
            .ok_or_else(invalid)?;

        let humidity = humidity
            .strip_prefix("Humidity: ")
            .and_then(|h| h.strip_suffix('%'))
            .and_then(|h| h.parse::<u8>().ok())
            .ok_or_else(invalid)?;

        if city.is_empty() || condition.is_empty() {
            return Err(invalid());
        }

        Ok(Self::new(timestamp, city, temperature, humidity, condition))
    }
}

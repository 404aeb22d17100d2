//! Report generation
//!
//! [`ReportGenerator`] is the seam between the broadcaster and whatever
//! produces content. [`RandomWeather`] samples every field uniformly and
//! independently; it keeps no state between calls.

use std::ops::RangeInclusive;

use chrono::{Local, NaiveDateTime, Timelike};
use rand::seq::IndexedRandom;
use rand::Rng;

use crate::error::{GenerateError, Result};

use super::report::WeatherReport;

/// Cities reported by default
pub const DEFAULT_CITIES: &[&str] = &["Colombo", "Kandy", "Galle", "Jaffna", "Trincomalee", "Matara"];

/// Condition labels reported by default
pub const DEFAULT_CONDITIONS: &[&str] =
    &["Sunny", "Cloudy", "Rain", "Storm", "Windy", "Foggy", "Snow"];

/// Default temperature range in °C
pub const DEFAULT_TEMPERATURE: RangeInclusive<i32> = -5..=40;

/// Default relative humidity range in percent
pub const DEFAULT_HUMIDITY: RangeInclusive<u8> = 20..=99;

/// Produces one report per call
pub trait ReportGenerator: Send + Sync + 'static {
    /// Generate a fresh report
    fn generate(&self) -> Result<WeatherReport>;
}

impl<F> ReportGenerator for F
where
    F: Fn() -> Result<WeatherReport> + Send + Sync + 'static,
{
    fn generate(&self) -> Result<WeatherReport> {
        self()
    }
}

/// Value sets the random generator draws from
#[derive(Debug, Clone)]
pub struct WeatherConfig {
    /// Cities to pick from
    pub cities: Vec<String>,

    /// Condition labels to pick from
    pub conditions: Vec<String>,

    /// Temperature range in °C
    pub temperature: RangeInclusive<i32>,

    /// Relative humidity range in percent
    pub humidity: RangeInclusive<u8>,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            cities: DEFAULT_CITIES.iter().map(|c| c.to_string()).collect(),
            conditions: DEFAULT_CONDITIONS.iter().map(|c| c.to_string()).collect(),
            temperature: DEFAULT_TEMPERATURE,
            humidity: DEFAULT_HUMIDITY,
        }
    }
}

impl WeatherConfig {
    /// Replace the city list
    pub fn cities<I, S>(mut self, cities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.cities = cities.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the condition list
    pub fn conditions<I, S>(mut self, conditions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.conditions = conditions.into_iter().map(Into::into).collect();
        self
    }

    /// Set the temperature range
    pub fn temperature(mut self, range: RangeInclusive<i32>) -> Self {
        self.temperature = range;
        self
    }

    /// Set the humidity range
    pub fn humidity(mut self, range: RangeInclusive<u8>) -> Self {
        self.humidity = range;
        self
    }
}

/// Uniform random weather
#[derive(Debug, Clone, Default)]
pub struct RandomWeather {
    config: WeatherConfig,
}

impl RandomWeather {
    /// Create a generator over the given value sets
    pub fn new(config: WeatherConfig) -> Self {
        Self { config }
    }

    /// Value sets in use
    pub fn config(&self) -> &WeatherConfig {
        &self.config
    }

    /// Generate a report stamped with `timestamp`
    pub fn generate_at(&self, timestamp: NaiveDateTime) -> Result<WeatherReport> {
        let config = &self.config;
        if config.temperature.is_empty() {
            return Err(GenerateError::EmptyRange("temperature").into());
        }
        if config.humidity.is_empty() {
            return Err(GenerateError::EmptyRange("humidity").into());
        }

        let mut rng = rand::rng();
        let city = config
            .cities
            .choose(&mut rng)
            .ok_or(GenerateError::EmptyCities)?;
        let condition = config
            .conditions
            .choose(&mut rng)
            .ok_or(GenerateError::EmptyConditions)?;
        let temperature = rng.random_range(config.temperature.clone());
        let humidity = rng.random_range(config.humidity.clone());

        Ok(WeatherReport::new(
            timestamp,
            city.as_str(),
            temperature,
            humidity,
            condition.as_str(),
        ))
    }
}

impl ReportGenerator for RandomWeather {
    fn generate(&self) -> Result<WeatherReport> {
        let now = Local::now().naive_local();
        // Drop sub-second precision so the value matches its wire form
        let now = now.with_nanosecond(0).unwrap_or(now);
        self.generate_at(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_default_value_sets() {
        let config = WeatherConfig::default();
        assert_eq!(config.cities.len(), 6);
        assert_eq!(config.conditions.len(), 7);
        assert_eq!(config.temperature, -5..=40);
        assert_eq!(config.humidity, 20..=99);
    }

    #[test]
    fn test_samples_stay_in_range() {
        let generator = RandomWeather::default();
        let config = generator.config().clone();

        for _ in 0..500 {
            let report = generator.generate().unwrap();
            assert!(config.temperature.contains(&report.temperature));
            assert!(config.humidity.contains(&report.humidity));
            assert!(config.cities.contains(&report.city));
            assert!(config.conditions.contains(&report.condition));
        }
    }

    #[test]
    fn test_generated_report_reparses() {
        let report = RandomWeather::default().generate().unwrap();
        let parsed: WeatherReport = report.to_payload().parse().unwrap();
        assert_eq!(parsed, report);
    }

    #[test]
    fn test_single_value_sets() {
        let config = WeatherConfig::default()
            .cities(["Galle"])
            .conditions(["Rain"])
            .temperature(12..=12)
            .humidity(55..=55);
        let report = RandomWeather::new(config).generate().unwrap();

        assert_eq!(report.city, "Galle");
        assert_eq!(report.condition, "Rain");
        assert_eq!(report.temperature, 12);
        assert_eq!(report.humidity, 55);
    }

    #[test]
    fn test_empty_cities() {
        let config = WeatherConfig::default().cities(Vec::<String>::new());
        let result = RandomWeather::new(config).generate();
        assert!(matches!(
            result,
            Err(Error::Generate(GenerateError::EmptyCities))
        ));
    }

    #[test]
    fn test_empty_conditions() {
        let config = WeatherConfig::default().conditions(Vec::<String>::new());
        let result = RandomWeather::new(config).generate();
        assert!(matches!(
            result,
            Err(Error::Generate(GenerateError::EmptyConditions))
        ));
    }

    #[test]
    #[allow(clippy::reversed_empty_ranges)]
    fn test_empty_temperature_range() {
        let config = WeatherConfig::default().temperature(10..=0);
        let result = RandomWeather::new(config).generate();
        assert!(matches!(
            result,
            Err(Error::Generate(GenerateError::EmptyRange("temperature")))
        ));
    }

    #[test]
    fn test_closure_generator() {
        let fixed = RandomWeather::default();
        let ts = Local::now().naive_local();
        let generator = move || fixed.generate_at(ts);
        assert_eq!(generator.generate().unwrap().timestamp, ts);
    }
}

//! Simulation configuration
//!
//! Loaded from `monitor.yaml`; every field has a default so an empty file
//! (or no file) gives the behavior of the realtime monitor screen:
//!
//! ```yaml
//! completion_probability: 0.3
//! duration_range: { min: 0.5, max: 5.5 }
//! cost_range: { min: 0.5, max: 2.5 }
//! credits_per_cost: 150
//! tick_interval: 1500ms
//! seed: 42
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// File names recognized as simulation config
pub const CONFIG_FILE_NAMES: &[&str] = &["monitor.yaml", "monitor.yml"];

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Completion probability must be within [0, 1], got {0}")]
    InvalidProbability(f64),

    #[error("Invalid {name} range: {min}..{max}")]
    InvalidRange {
        name: &'static str,
        min: f64,
        max: f64,
    },

    #[error("Invalid duration format: {0}")]
    InvalidDuration(String),

    #[error("Tick interval must be greater than zero")]
    ZeroInterval,
}

/// Inclusive numeric range used for sampling
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

impl ValueRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn midpoint(&self) -> f64 {
        (self.min + self.max) / 2.0
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    fn validate(&self, name: &'static str) -> Result<(), ConfigError> {
        if !self.min.is_finite() || !self.max.is_finite() || self.min < 0.0 || self.min > self.max {
            return Err(ConfigError::InvalidRange {
                name,
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Chance per tick that the running step completes
    pub completion_probability: f64,

    /// Seconds stamped on a step when it completes
    pub duration_range: ValueRange,

    /// Cost stamped on a step when it completes
    pub cost_range: ValueRange,

    /// Credits charged per unit of cost
    pub credits_per_cost: f64,

    /// Time between ticks, e.g. "1500ms" or "3s"
    #[serde(with = "duration_string")]
    pub tick_interval: Duration,

    /// Seed for the transition source; entropy when absent
    pub seed: Option<u64>,

    /// Stop the ticker after this many ticks
    pub max_ticks: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            completion_probability: 0.3,
            duration_range: ValueRange::new(0.5, 5.5),
            cost_range: ValueRange::new(0.5, 2.5),
            credits_per_cost: 150.0,
            tick_interval: Duration::from_millis(1500),
            seed: None,
            max_ticks: None,
        }
    }
}

impl SimulationConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        // An empty document deserializes to unit, not to an empty map
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Look for `monitor.yaml` / `monitor.yml` in a directory
    pub fn find_in(dir: &Path) -> Result<Option<Self>, ConfigError> {
        for name in CONFIG_FILE_NAMES {
            let path = dir.join(name);
            if path.is_file() {
                return Self::load(&path).map(Some);
            }
        }
        Ok(None)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.completion_probability) {
            return Err(ConfigError::InvalidProbability(self.completion_probability));
        }
        self.duration_range.validate("duration")?;
        self.cost_range.validate("cost")?;
        if !self.credits_per_cost.is_finite() || self.credits_per_cost < 0.0 {
            return Err(ConfigError::InvalidRange {
                name: "credits_per_cost",
                min: self.credits_per_cost,
                max: self.credits_per_cost,
            });
        }
        if self.tick_interval.is_zero() {
            return Err(ConfigError::ZeroInterval);
        }
        Ok(())
    }
}

/// Parse a duration string like "1h30m", "1500ms", "2s" or "3"
pub fn parse_duration(s: &str) -> Result<Duration, ConfigError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(ConfigError::InvalidDuration("empty string".to_string()));
    }

    let mut total = Duration::ZERO;
    let mut current_num = String::new();
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c.is_ascii_digit() || c == '.' {
            current_num.push(c);
            continue;
        }

        if current_num.is_empty() {
            return Err(ConfigError::InvalidDuration(format!(
                "expected number before unit '{}'",
                c
            )));
        }

        let num: f64 = current_num
            .parse()
            .map_err(|_| ConfigError::InvalidDuration(format!("invalid number: {}", current_num)))?;
        current_num.clear();

        let millis = match c {
            'd' => num * 24.0 * 60.0 * 60.0 * 1000.0,
            'h' => num * 60.0 * 60.0 * 1000.0,
            'm' if chars.peek() == Some(&'s') => {
                chars.next();
                num
            }
            'm' => num * 60.0 * 1000.0,
            's' => num * 1000.0,
            _ => {
                return Err(ConfigError::InvalidDuration(format!("unknown unit '{}'", c)));
            }
        };

        total = add_secs(total, millis / 1000.0, s)?;
    }

    // Trailing number without a unit is seconds
    if !current_num.is_empty() {
        let num: f64 = current_num
            .parse()
            .map_err(|_| ConfigError::InvalidDuration(format!("invalid number: {}", current_num)))?;
        total = add_secs(total, num, s)?;
    }

    Ok(total)
}

fn add_secs(total: Duration, secs: f64, input: &str) -> Result<Duration, ConfigError> {
    Duration::try_from_secs_f64(secs)
        .ok()
        .and_then(|d| total.checked_add(d))
        .ok_or_else(|| ConfigError::InvalidDuration(format!("out of range: {}", input)))
}

/// Format a duration the way `parse_duration` reads it back
pub fn format_duration(duration: Duration) -> String {
    format!("{}ms", duration.as_millis())
}

mod duration_string {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_duration(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Millis(u64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Millis(ms) => Ok(Duration::from_millis(ms)),
            Raw::Text(s) => super::parse_duration(&s).map_err(serde::de::Error::custom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("1h").unwrap(), Duration::from_secs(3600));
        assert_eq!(parse_duration("30m").unwrap(), Duration::from_secs(1800));
        assert_eq!(parse_duration("1h30m").unwrap(), Duration::from_secs(5400));
        assert_eq!(parse_duration("1500ms").unwrap(), Duration::from_millis(1500));
        assert_eq!(parse_duration("2s").unwrap(), Duration::from_secs(2));
        assert_eq!(parse_duration("1m30s").unwrap(), Duration::from_secs(90));
        assert_eq!(parse_duration("3").unwrap(), Duration::from_secs(3));
        assert!(parse_duration("").is_err());
        assert!(parse_duration("ms").is_err());
        assert!(parse_duration("5x").is_err());
    }

    #[test]
    fn test_parse_duration_out_of_range() {
        assert!(matches!(
            parse_duration("99999999999999999999999"),
            Err(ConfigError::InvalidDuration(_))
        ));
        assert!(matches!(
            parse_duration("99999999999999999999999d"),
            Err(ConfigError::InvalidDuration(_))
        ));
        assert!(matches!(
            parse_duration("18446744073709551615s18446744073709551615s"),
            Err(ConfigError::InvalidDuration(_))
        ));
        assert!(matches!(
            SimulationConfig::from_yaml("tick_interval: \"99999999999999999999999\"\n"),
            Err(ConfigError::Yaml(_))
        ));
    }

    #[test]
    fn test_defaults_match_realtime_monitor() {
        let config = SimulationConfig::default();
        assert_eq!(config.completion_probability, 0.3);
        assert_eq!(config.tick_interval, Duration::from_millis(1500));
        assert_eq!(config.duration_range, ValueRange::new(0.5, 5.5));
        assert_eq!(config.cost_range, ValueRange::new(0.5, 2.5));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = SimulationConfig::from_yaml("tick_interval: 3s\nseed: 7\n").unwrap();
        assert_eq!(config.tick_interval, Duration::from_secs(3));
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.completion_probability, 0.3);

        let config = SimulationConfig::from_yaml("tick_interval: 250\n").unwrap();
        assert_eq!(config.tick_interval, Duration::from_millis(250));
    }

    #[test]
    fn test_empty_yaml_is_default() {
        let config = SimulationConfig::from_yaml("  \n").unwrap();
        assert_eq!(config.completion_probability, 0.3);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            SimulationConfig::from_yaml("completion_probability: 1.5\n"),
            Err(ConfigError::InvalidProbability(_))
        ));
        assert!(matches!(
            SimulationConfig::from_yaml("cost_range: { min: 3, max: 1 }\n"),
            Err(ConfigError::InvalidRange { name: "cost", .. })
        ));
        assert!(matches!(
            SimulationConfig::from_yaml("tick_interval: 0ms\n"),
            Err(ConfigError::ZeroInterval)
        ));
    }
}

/// Background configuration
use std::collections::BTreeMap;

/// Name of the recurring accounting alarm
pub const TICK_ALARM: &str = "STG_TICK";

/// Knobs the background is constructed with
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub alarm_name: String,
    pub tick_period_minutes: f64,
    pub idle_detection_seconds: u32,
    /// Limits seeded on first run, in minutes per day
    pub default_limits: BTreeMap<String, u32>,
}

impl Default for Config {
    fn default() -> Self {
        let default_limits = [("youtube.com", 30), ("twitter.com", 20), ("reddit.com", 25)]
            .into_iter()
            .map(|(domain, minutes)| (domain.to_string(), minutes))
            .collect();

        Config {
            alarm_name: TICK_ALARM.to_string(),
            tick_period_minutes: 1.0,
            idle_detection_seconds: 60,
            default_limits,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.alarm_name, "STG_TICK");
        assert_eq!(config.tick_period_minutes, 1.0);
        assert_eq!(config.idle_detection_seconds, 60);
        assert_eq!(config.default_limits.get("youtube.com"), Some(&30));
        assert_eq!(config.default_limits.get("twitter.com"), Some(&20));
        assert_eq!(config.default_limits.get("reddit.com"), Some(&25));
    }

    #[test]
    fn test_override_keeps_other_defaults() {
        let config = Config {
            idle_detection_seconds: 120,
            ..Config::default()
        };

        assert_eq!(config.idle_detection_seconds, 120);
        assert_eq!(config.alarm_name, TICK_ALARM);
        assert_eq!(config.default_limits.len(), 3);
    }
}

//! Configuration validation.
//!
//! Validates all config fields before a simulation runs.

use crate::domain::error::TradesimError;
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;

const DECIMAL_KEYS: [&str; 4] = ["entry_buffer", "reward_ratio", "risk_per_trade", "stop_offset"];
const COUNT_KEYS: [&str; 4] = ["entry_cadence", "holding_period", "warmup_bars", "min_bars"];

pub fn validate_strategy_config(config: &dyn ConfigPort) -> Result<(), TradesimError> {
    validate_numeric_syntax(config)?;
    validate_entry_buffer(config)?;
    validate_reward_ratio(config)?;
    validate_risk_per_trade(config)?;
    validate_stop_offset(config)?;
    validate_counts(config)?;
    Ok(())
}

pub fn validate_data_config(config: &dyn ConfigPort) -> Result<(), TradesimError> {
    if let Some(date) = config.get_string("data", "date") {
        parse_session_date(&date, "data", "date")?;
    }
    if let Some(symbol) = config.get_string("data", "symbol") {
        if symbol.trim().is_empty() {
            return Err(invalid("data", "symbol", "symbol must not be empty"));
        }
    }
    Ok(())
}

pub fn parse_session_date(value: &str, section: &str, key: &str) -> Result<NaiveDate, TradesimError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| invalid(section, key, "invalid date format (expected YYYY-MM-DD)"))
}

fn invalid(section: &str, key: &str, reason: &str) -> TradesimError {
    TradesimError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

/// The typed getters fall back to defaults on garbage, so a present key must
/// parse before any range check reads it.
fn validate_numeric_syntax(config: &dyn ConfigPort) -> Result<(), TradesimError> {
    for key in DECIMAL_KEYS {
        if let Some(raw) = config.get_string("strategy", key) {
            raw.trim().parse::<f64>().map_err(|_| {
                invalid("strategy", key, &format!("'{raw}' is not a number"))
            })?;
        }
    }
    for key in COUNT_KEYS {
        if let Some(raw) = config.get_string("strategy", key) {
            raw.trim().parse::<i64>().map_err(|_| {
                invalid("strategy", key, &format!("'{raw}' is not a whole number"))
            })?;
        }
    }
    Ok(())
}

fn validate_entry_buffer(config: &dyn ConfigPort) -> Result<(), TradesimError> {
    let value = config.get_double("strategy", "entry_buffer", 0.10);
    if value < 0.0 || !value.is_finite() {
        return Err(invalid(
            "strategy",
            "entry_buffer",
            "entry_buffer must be non-negative",
        ));
    }
    Ok(())
}

fn validate_reward_ratio(config: &dyn ConfigPort) -> Result<(), TradesimError> {
    let value = config.get_double("strategy", "reward_ratio", 1.2);
    if value <= 0.0 || !value.is_finite() {
        return Err(invalid(
            "strategy",
            "reward_ratio",
            "reward_ratio must be positive",
        ));
    }
    Ok(())
}

fn validate_risk_per_trade(config: &dyn ConfigPort) -> Result<(), TradesimError> {
    let value = config.get_double("strategy", "risk_per_trade", 100.0);
    if value <= 0.0 || !value.is_finite() {
        return Err(invalid(
            "strategy",
            "risk_per_trade",
            "risk_per_trade must be positive",
        ));
    }
    Ok(())
}

fn validate_stop_offset(config: &dyn ConfigPort) -> Result<(), TradesimError> {
    let value = config.get_double("strategy", "stop_offset", 1.0);
    if value <= 0.0 || !value.is_finite() {
        return Err(TradesimError::InvalidRiskParameters {
            reason: format!("stop_offset must be positive, got {value}"),
        });
    }
    Ok(())
}

fn validate_counts(config: &dyn ConfigPort) -> Result<(), TradesimError> {
    for (key, default) in [("entry_cadence", 6), ("holding_period", 5)] {
        let value = config.get_int("strategy", key, default);
        if value < 1 {
            return Err(invalid("strategy", key, &format!("{key} must be at least 1")));
        }
    }
    for (key, default) in [("warmup_bars", 20), ("min_bars", 25)] {
        let value = config.get_int("strategy", key, default);
        if value < 0 {
            return Err(invalid("strategy", key, &format!("{key} must be non-negative")));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct MockConfig {
        values: HashMap<(String, String), String>,
    }

    impl MockConfig {
        fn new() -> Self {
            Self {
                values: HashMap::new(),
            }
        }

        fn with(mut self, section: &str, key: &str, value: &str) -> Self {
            self.values
                .insert((section.to_string(), key.to_string()), value.to_string());
            self
        }
    }

    impl ConfigPort for MockConfig {
        fn get_string(&self, section: &str, key: &str) -> Option<String> {
            self.values
                .get(&(section.to_string(), key.to_string()))
                .cloned()
        }

        fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
            self.get_string(section, key)
                .and_then(|v| v.parse().ok())
                .unwrap_or(default)
        }

        fn get_double(&self, section: &str, key: &str, default: f64) -> f64 {
            self.get_string(section, key)
                .and_then(|v| v.parse().ok())
                .unwrap_or(default)
        }

        fn get_bool(&self, _section: &str, _key: &str, default: bool) -> bool {
            default
        }
    }

    fn assert_invalid_key(result: Result<(), TradesimError>, expected: &str) {
        match result {
            Err(TradesimError::ConfigInvalid { key, .. }) => assert_eq!(key, expected),
            other => panic!("expected ConfigInvalid for {expected}, got {other:?}"),
        }
    }

    #[test]
    fn empty_config_uses_valid_defaults() {
        let config = MockConfig::new();
        assert!(validate_strategy_config(&config).is_ok());
        assert!(validate_data_config(&config).is_ok());
    }

    #[test]
    fn full_valid_config() {
        let config = MockConfig::new()
            .with("strategy", "entry_buffer", "0.10")
            .with("strategy", "reward_ratio", "1.2")
            .with("strategy", "risk_per_trade", "100")
            .with("strategy", "stop_offset", "1.0")
            .with("strategy", "entry_cadence", "6")
            .with("strategy", "holding_period", "5")
            .with("data", "symbol", "TSLA")
            .with("data", "date", "2025-04-08");
        assert!(validate_strategy_config(&config).is_ok());
        assert!(validate_data_config(&config).is_ok());
    }

    #[test]
    fn unparseable_decimal_rejected() {
        let config = MockConfig::new().with("strategy", "risk_per_trade", "1OO");
        assert_invalid_key(validate_strategy_config(&config), "risk_per_trade");

        let config = MockConfig::new().with("strategy", "reward_ratio", "1,5");
        assert_invalid_key(validate_strategy_config(&config), "reward_ratio");
    }

    #[test]
    fn fractional_count_rejected() {
        let config = MockConfig::new().with("strategy", "entry_cadence", "6.5");
        assert_invalid_key(validate_strategy_config(&config), "entry_cadence");
    }

    #[test]
    fn negative_entry_buffer_rejected() {
        let config = MockConfig::new().with("strategy", "entry_buffer", "-0.1");
        assert_invalid_key(validate_strategy_config(&config), "entry_buffer");
    }

    #[test]
    fn zero_reward_ratio_rejected() {
        let config = MockConfig::new().with("strategy", "reward_ratio", "0");
        assert_invalid_key(validate_strategy_config(&config), "reward_ratio");
    }

    #[test]
    fn negative_risk_per_trade_rejected() {
        let config = MockConfig::new().with("strategy", "risk_per_trade", "-100");
        assert_invalid_key(validate_strategy_config(&config), "risk_per_trade");
    }

    #[test]
    fn zero_stop_offset_is_a_risk_error() {
        let config = MockConfig::new().with("strategy", "stop_offset", "0");
        let err = validate_strategy_config(&config).unwrap_err();
        assert!(matches!(err, TradesimError::InvalidRiskParameters { .. }));
    }

    #[test]
    fn zero_cadence_rejected() {
        let config = MockConfig::new().with("strategy", "entry_cadence", "0");
        assert_invalid_key(validate_strategy_config(&config), "entry_cadence");
    }

    #[test]
    fn zero_holding_period_rejected() {
        let config = MockConfig::new().with("strategy", "holding_period", "0");
        assert_invalid_key(validate_strategy_config(&config), "holding_period");
    }

    #[test]
    fn negative_warmup_rejected() {
        let config = MockConfig::new().with("strategy", "warmup_bars", "-1");
        assert_invalid_key(validate_strategy_config(&config), "warmup_bars");
    }

    #[test]
    fn bad_session_date_rejected() {
        let config = MockConfig::new().with("data", "date", "08/04/2025");
        assert_invalid_key(validate_data_config(&config), "date");
    }

    #[test]
    fn blank_symbol_rejected() {
        let config = MockConfig::new().with("data", "symbol", "  ");
        assert_invalid_key(validate_data_config(&config), "symbol");
    }

    #[test]
    fn parse_session_date_trims() {
        let date = parse_session_date(" 2025-04-08 ", "data", "date").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2025, 4, 8).unwrap());
    }
}

//! Engine configuration

use chrono::Weekday;
use serde::{Deserialize, Serialize};

use core_kernel::{CoreError, PeriodType, DEFAULT_MONEY_DP};

use crate::error::PricingError;

/// Upper bound on money precision the engine accepts
pub const MAX_DECIMAL_PLACES: u32 = 10;

/// Tunables for `PricingService`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    /// Decimal places monetary results are rounded to
    pub decimal_places: u32,
    /// First day of a calendar week for weekly periods
    pub week_start: Weekday,
    /// Period used by restrictions and groups stored without one
    pub default_restriction_period: PeriodType,
}

impl PricingConfig {
    pub fn new() -> Self {
        Self {
            decimal_places: DEFAULT_MONEY_DP,
            week_start: Weekday::Mon,
            default_restriction_period: PeriodType::Yearly,
        }
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<(), PricingError> {
        if self.decimal_places > MAX_DECIMAL_PLACES {
            return Err(CoreError::configuration(format!(
                "decimal_places must be at most {}, got {}",
                MAX_DECIMAL_PLACES, self.decimal_places
            ))
            .into());
        }
        Ok(())
    }
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PricingConfig::default();
        assert_eq!(config.decimal_places, 2);
        assert_eq!(config.week_start, Weekday::Mon);
        assert_eq!(config.default_restriction_period, PeriodType::Yearly);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_excessive_precision() {
        let config = PricingConfig {
            decimal_places: 11,
            ..PricingConfig::default()
        };
        assert!(matches!(config.validate(), Err(PricingError::Core(CoreError::Configuration(_)))));
    }

    #[test]
    fn test_partial_deserialization_keeps_defaults() {
        let config: PricingConfig = serde_json::from_str(r#"{"week_start": "Sun"}"#).unwrap();
        assert_eq!(config.week_start, Weekday::Sun);
        assert_eq!(config.decimal_places, 2);
    }
}

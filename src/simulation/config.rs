// src/simulation/config.rs

use crate::error::ConfigError;
use crate::model::types::Day;
use serde::Deserialize;

/// Parameters fixed at simulation start.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub total_days: u32,
    /// Minimum days between a customer request and its due date for us to bid.
    pub lead_time: u32,
    /// Days at the end of the game that cannot be produced for.
    pub pipeline_tail_margin: u32,
    pub days_before_void: u32,
    /// First day priced from bid history instead of random discounts.
    pub exploration_cutoff: Day,
    pub price_discount_factor: f64,
    pub supplier_lead_time: u32,
    /// How far above the cheapest supplier offer we still buy.
    pub supplier_price_tolerance: f64,
    pub rng_seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            total_days: 220,
            lead_time: 6,
            pipeline_tail_margin: 2,
            days_before_void: 5,
            exploration_cutoff: 40,
            price_discount_factor: 0.2,
            supplier_lead_time: 2,
            supplier_price_tolerance: 1.1,
            rng_seed: 42,
        }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.total_days == 0 {
            return Err(ConfigError::NoDays);
        }
        if self.lead_time + self.pipeline_tail_margin >= self.total_days {
            return Err(ConfigError::LeadTimeTooLong {
                lead_time: self.lead_time,
                total_days: self.total_days,
            });
        }
        if !(0.0..=1.0).contains(&self.price_discount_factor) {
            return Err(ConfigError::DiscountOutOfRange(self.price_discount_factor));
        }
        if !(self.supplier_price_tolerance >= 1.0) {
            return Err(ConfigError::ToleranceBelowOne(self.supplier_price_tolerance));
        }
        if self.days_before_void < 2 {
            return Err(ConfigError::VoidWindowTooShort(self.days_before_void));
        }
        Ok(())
    }

    /// Latest due date still worth bidding on.
    pub fn last_biddable_due_date(&self) -> Day {
        self.total_days as Day - self.pipeline_tail_margin as Day
    }

    /// Orders due on or before this day can no longer be delivered.
    pub fn void_threshold(&self, current_day: Day) -> Day {
        current_day - self.days_before_void as Day + 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = SimulationConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.last_biddable_due_date(), 218);
        assert_eq!(config.void_threshold(10), 7);
    }

    #[test]
    fn rejects_bad_parameters() {
        let config = SimulationConfig {
            supplier_price_tolerance: 0.9,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ToleranceBelowOne(0.9)));

        let config = SimulationConfig {
            total_days: 5,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::LeadTimeTooLong { .. })
        ));

        let config = SimulationConfig {
            price_discount_factor: 1.5,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::DiscountOutOfRange(1.5)));
    }
}

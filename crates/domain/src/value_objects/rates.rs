use std::str::FromStr;

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::warn;

use crate::{
    entities::config_entries::ConfigEntryEntity,
    value_objects::{
        enums::vehicle_categories::VehicleCategory,
        money::{from_minor, to_minor},
    },
};

pub const RATES_CATEGORY: &str = "Rates";
pub const CAR_PER_HOUR_KEY: &str = "Rates.CarPerHour";
pub const MOTORCYCLE_PER_HOUR_KEY: &str = "Rates.MotorcyclePerHour";
pub const CAR_PER_MINUTE_KEY: &str = "Rates.CarPerMinute";
pub const MOTORCYCLE_PER_MINUTE_KEY: &str = "Rates.MotorcyclePerMinute";

pub const DEFAULT_CAR_PER_HOUR_MINOR: i64 = 200_000;
pub const DEFAULT_MOTORCYCLE_PER_HOUR_MINOR: i64 = 100_000;
pub const DEFAULT_CAR_PER_MINUTE_MINOR: i64 = 7_000;
pub const DEFAULT_MOTORCYCLE_PER_MINUTE_MINOR: i64 = 7_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RateTier {
    pub per_hour_minor: i64,
    pub per_minute_minor: i64,
}

/// The four rate parameters the fee calculator needs, in minor units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RateCard {
    pub car: RateTier,
    pub motorcycle: RateTier,
}

impl Default for RateCard {
    fn default() -> Self {
        Self {
            car: RateTier {
                per_hour_minor: DEFAULT_CAR_PER_HOUR_MINOR,
                per_minute_minor: DEFAULT_CAR_PER_MINUTE_MINOR,
            },
            motorcycle: RateTier {
                per_hour_minor: DEFAULT_MOTORCYCLE_PER_HOUR_MINOR,
                per_minute_minor: DEFAULT_MOTORCYCLE_PER_MINUTE_MINOR,
            },
        }
    }
}

impl RateCard {
    pub fn tier(&self, category: VehicleCategory) -> RateTier {
        match category {
            VehicleCategory::Car => self.car,
            VehicleCategory::Motorcycle => self.motorcycle,
        }
    }

    /// Overlays stored `Rates.*` entries on the defaults. Entries that are
    /// missing or do not parse as a non-negative amount keep the default.
    pub fn from_entries(entries: &[ConfigEntryEntity]) -> Self {
        let mut card = Self::default();

        for entry in entries {
            let slot = match entry.key.as_str() {
                CAR_PER_HOUR_KEY => &mut card.car.per_hour_minor,
                MOTORCYCLE_PER_HOUR_KEY => &mut card.motorcycle.per_hour_minor,
                CAR_PER_MINUTE_KEY => &mut card.car.per_minute_minor,
                MOTORCYCLE_PER_MINUTE_KEY => &mut card.motorcycle.per_minute_minor,
                _ => continue,
            };

            match parse_rate(&entry.value) {
                Some(amount_minor) => *slot = amount_minor,
                None => warn!(
                    key = %entry.key,
                    value = %entry.value,
                    "rates: unparsable rate value, keeping default"
                ),
            }
        }

        card
    }

    /// Key/value pairs as they are stored in the configuration table.
    pub fn to_entries(&self) -> [(&'static str, String); 4] {
        [
            (CAR_PER_HOUR_KEY, rate_value(self.car.per_hour_minor)),
            (MOTORCYCLE_PER_HOUR_KEY, rate_value(self.motorcycle.per_hour_minor)),
            (CAR_PER_MINUTE_KEY, rate_value(self.car.per_minute_minor)),
            (MOTORCYCLE_PER_MINUTE_KEY, rate_value(self.motorcycle.per_minute_minor)),
        ]
    }
}

fn parse_rate(value: &str) -> Option<i64> {
    let amount = Decimal::from_str(value.trim()).ok()?;
    if amount.is_sign_negative() {
        return None;
    }
    to_minor(amount)
}

fn rate_value(amount_minor: i64) -> String {
    from_minor(amount_minor).normalize().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn entry(key: &str, value: &str) -> ConfigEntryEntity {
        ConfigEntryEntity {
            id: Uuid::new_v4(),
            key: key.to_string(),
            value: value.to_string(),
            value_type: Some("decimal".to_string()),
            description: None,
            created_at: Utc::now(),
            updated_at: None,
            updated_by: None,
        }
    }

    #[test]
    fn missing_entries_use_defaults() {
        assert_eq!(RateCard::from_entries(&[]), RateCard::default());
    }

    #[test]
    fn stored_entries_override_defaults() {
        let card = RateCard::from_entries(&[
            entry(CAR_PER_HOUR_KEY, "2500"),
            entry(MOTORCYCLE_PER_MINUTE_KEY, "40.5"),
        ]);

        assert_eq!(card.car.per_hour_minor, 250_000);
        assert_eq!(card.car.per_minute_minor, DEFAULT_CAR_PER_MINUTE_MINOR);
        assert_eq!(card.motorcycle.per_minute_minor, 4_050);
        assert_eq!(card.motorcycle.per_hour_minor, DEFAULT_MOTORCYCLE_PER_HOUR_MINOR);
    }

    #[test]
    fn unparsable_or_negative_values_fall_back() {
        let card = RateCard::from_entries(&[
            entry(CAR_PER_HOUR_KEY, "two thousand"),
            entry(CAR_PER_MINUTE_KEY, "-5"),
            entry("Rates.TruckPerHour", "9000"),
        ]);

        assert_eq!(card, RateCard::default());
    }

    #[test]
    fn oversized_values_fall_back() {
        let card = RateCard::from_entries(&[
            entry(CAR_PER_HOUR_KEY, "1000000000000000000000000000"),
            entry(MOTORCYCLE_PER_HOUR_KEY, "90000000000000000"),
        ]);

        assert_eq!(card, RateCard::default());
    }

    #[test]
    fn entries_round_trip_through_storage_format() {
        let values = RateCard::default().to_entries();
        assert_eq!(values[0], (CAR_PER_HOUR_KEY, "2000".to_string()));
        assert_eq!(values[3], (MOTORCYCLE_PER_MINUTE_KEY, "70".to_string()));
    }
}

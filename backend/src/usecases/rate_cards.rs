use anyhow::Result;
use domain::{
    repositories::config_entries::ConfigEntryRepository,
    value_objects::rates::{RATES_CATEGORY, RateCard},
};
use std::sync::Arc;
use tracing::debug;

/// Builds the current rate card from the `Rates.*` configuration entries.
pub struct RateCardResolver<C>
where
    C: ConfigEntryRepository + Send + Sync + 'static,
{
    config_entry_repo: Arc<C>,
}

impl<C> RateCardResolver<C>
where
    C: ConfigEntryRepository + Send + Sync + 'static,
{
    pub fn new(config_entry_repo: Arc<C>) -> Self {
        Self { config_entry_repo }
    }

    pub async fn current(&self) -> Result<RateCard> {
        let entries = self
            .config_entry_repo
            .list(Some(RATES_CATEGORY.to_string()))
            .await?;
        let rate_card = RateCard::from_entries(&entries);

        debug!(
            entries = entries.len(),
            car_per_hour_minor = rate_card.car.per_hour_minor,
            motorcycle_per_hour_minor = rate_card.motorcycle.per_hour_minor,
            "rate_cards: rate card resolved"
        );

        Ok(rate_card)
    }
}

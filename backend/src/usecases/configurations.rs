use std::collections::BTreeSet;

use axum::http::StatusCode;
use chrono::Utc;
use domain::{
    entities::config_entries::{InsertConfigEntryEntity, UpdateConfigEntryEntity},
    repositories::{
        config_entries::ConfigEntryRepository,
        errors::{CONFIG_KEY_KEY, duplicate_constraint},
    },
    value_objects::{
        configurations::{
            ConfigEntryDto, ConfigEntryForm, ConfigListDto, ConfigListQuery, MAX_DESCRIPTION_LEN,
            MAX_KEY_LEN, MAX_VALUE_LEN, RatesDto, RatesForm, category_of,
        },
        enums::config_value_types::ConfigValueType,
        rates::{RateCard, RateTier},
        validation::{FieldErrors, optional_text, parse_amount, required_text},
    },
};
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::{axum_http::error_responses::UseCaseError, usecases::rate_cards::RateCardResolver};

#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("please correct the highlighted fields")]
    Validation(FieldErrors),
    #[error("a configuration entry with key {key} already exists")]
    DuplicateKey { key: String, field_errors: FieldErrors },
    #[error("configuration entry not found")]
    EntryNotFound,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl UseCaseError for ConfigurationError {
    fn status_code(&self) -> StatusCode {
        match self {
            ConfigurationError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ConfigurationError::DuplicateKey { .. } => StatusCode::CONFLICT,
            ConfigurationError::EntryNotFound => StatusCode::NOT_FOUND,
            ConfigurationError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            ConfigurationError::Validation(errors)
            | ConfigurationError::DuplicateKey {
                field_errors: errors,
                ..
            } => Some(errors),
            _ => None,
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, ConfigurationError>;

fn duplicate_key(key: String) -> ConfigurationError {
    ConfigurationError::DuplicateKey {
        key,
        field_errors: FieldErrors::single("key", "another entry already uses this key"),
    }
}

struct ValidatedEntry {
    key: String,
    value: String,
    value_type: Option<String>,
    description: Option<String>,
}

fn validate_entry(form: &ConfigEntryForm) -> UseCaseResult<ValidatedEntry> {
    let mut errors = FieldErrors::new();

    let key = required_text("key", &form.key, MAX_KEY_LEN, &mut errors);
    if key.as_deref().is_some_and(|key| key.contains(char::is_whitespace)) {
        errors.add("key", "must not contain spaces");
    }
    let value = required_text("value", &form.value, MAX_VALUE_LEN, &mut errors);
    let value_type = match form.value_type.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => match ConfigValueType::from_str(&raw.to_lowercase()) {
            Some(value_type) => Some(value_type.to_string()),
            None => {
                errors.add("value_type", "unknown value type");
                None
            }
        },
        _ => None,
    };
    let description = optional_text(
        "description",
        form.description.as_deref(),
        MAX_DESCRIPTION_LEN,
        &mut errors,
    );

    match (key, value) {
        (Some(key), Some(value)) if errors.is_empty() => Ok(ValidatedEntry {
            key,
            value,
            value_type,
            description,
        }),
        _ => Err(ConfigurationError::Validation(errors)),
    }
}

fn validate_rates(form: &RatesForm) -> UseCaseResult<RateCard> {
    let mut errors = FieldErrors::new();

    let car_per_hour = parse_amount("car_per_hour", &form.car_per_hour, &mut errors);
    let motorcycle_per_hour =
        parse_amount("motorcycle_per_hour", &form.motorcycle_per_hour, &mut errors);
    let car_per_minute = parse_amount("car_per_minute", &form.car_per_minute, &mut errors);
    let motorcycle_per_minute =
        parse_amount("motorcycle_per_minute", &form.motorcycle_per_minute, &mut errors);

    match (
        car_per_hour,
        motorcycle_per_hour,
        car_per_minute,
        motorcycle_per_minute,
    ) {
        (
            Some(car_per_hour),
            Some(motorcycle_per_hour),
            Some(car_per_minute),
            Some(motorcycle_per_minute),
        ) => Ok(RateCard {
            car: RateTier {
                per_hour_minor: car_per_hour,
                per_minute_minor: car_per_minute,
            },
            motorcycle: RateTier {
                per_hour_minor: motorcycle_per_hour,
                per_minute_minor: motorcycle_per_minute,
            },
        }),
        _ => Err(ConfigurationError::Validation(errors)),
    }
}

pub struct ConfigurationUseCase<C>
where
    C: ConfigEntryRepository + Send + Sync + 'static,
{
    config_entry_repo: Arc<C>,
    rate_cards: RateCardResolver<C>,
}

impl<C> ConfigurationUseCase<C>
where
    C: ConfigEntryRepository + Send + Sync + 'static,
{
    pub fn new(config_entry_repo: Arc<C>) -> Self {
        Self {
            rate_cards: RateCardResolver::new(Arc::clone(&config_entry_repo)),
            config_entry_repo,
        }
    }

    pub async fn list(&self, query: &ConfigListQuery) -> UseCaseResult<ConfigListDto> {
        let category = query
            .category
            .as_deref()
            .map(str::trim)
            .filter(|category| !category.is_empty())
            .map(str::to_string);

        let entries = self
            .config_entry_repo
            .list(category.clone())
            .await
            .map_err(|err| {
                error!(db_error = ?err, "configurations: failed to list entries");
                ConfigurationError::Internal(err)
            })?;

        Ok(ConfigListDto {
            category,
            categories: self.categories().await?,
            entries: entries.into_iter().map(ConfigEntryDto::from).collect(),
        })
    }

    /// Distinct key prefixes, sorted.
    pub async fn categories(&self) -> UseCaseResult<Vec<String>> {
        let entries = self.config_entry_repo.list(None).await.map_err(|err| {
            error!(db_error = ?err, "configurations: failed to list categories");
            ConfigurationError::Internal(err)
        })?;

        let categories: BTreeSet<String> = entries
            .iter()
            .map(|entry| category_of(&entry.key).to_string())
            .collect();

        Ok(categories.into_iter().collect())
    }

    pub async fn get(&self, entry_id: Uuid) -> UseCaseResult<ConfigEntryDto> {
        let entry = self
            .config_entry_repo
            .find_by_id(entry_id)
            .await
            .map_err(|err| {
                error!(%entry_id, db_error = ?err, "configurations: failed to load entry");
                ConfigurationError::Internal(err)
            })?
            .ok_or(ConfigurationError::EntryNotFound)?;

        Ok(ConfigEntryDto::from(entry))
    }

    pub async fn create(
        &self,
        user_id: Uuid,
        form: &ConfigEntryForm,
    ) -> UseCaseResult<ConfigEntryDto> {
        let entry = validate_entry(form)?;
        let key = entry.key.clone();

        let insert_entry_entity = InsertConfigEntryEntity {
            key: entry.key,
            value: entry.value,
            value_type: entry.value_type,
            description: entry.description,
            created_at: Utc::now(),
            updated_by: Some(user_id),
        };

        let created = self
            .config_entry_repo
            .create(insert_entry_entity)
            .await
            .map_err(|err| match duplicate_constraint(&err) {
                Some(CONFIG_KEY_KEY) => {
                    warn!(%user_id, key = %key, "configurations: duplicate key refused");
                    duplicate_key(key.clone())
                }
                _ => {
                    error!(%user_id, key = %key, db_error = ?err, "configurations: failed to create entry");
                    ConfigurationError::Internal(err)
                }
            })?;

        info!(%user_id, entry_id = %created.id, key = %created.key, "configurations: entry created");

        Ok(ConfigEntryDto::from(created))
    }

    pub async fn update(
        &self,
        user_id: Uuid,
        entry_id: Uuid,
        form: &ConfigEntryForm,
    ) -> UseCaseResult<ConfigEntryDto> {
        let entry = validate_entry(form)?;
        let key = entry.key.clone();
        let now = Utc::now();

        let update_entry_entity = UpdateConfigEntryEntity {
            key: entry.key,
            value: entry.value,
            value_type: entry.value_type,
            description: entry.description,
            updated_at: Some(now),
            updated_by: Some(user_id),
        };

        let updated = self
            .config_entry_repo
            .update(entry_id, update_entry_entity)
            .await
            .map_err(|err| match duplicate_constraint(&err) {
                Some(CONFIG_KEY_KEY) => {
                    warn!(%user_id, %entry_id, key = %key, "configurations: key change collides with another entry");
                    duplicate_key(key.clone())
                }
                _ => {
                    error!(%user_id, %entry_id, db_error = ?err, "configurations: failed to update entry");
                    ConfigurationError::Internal(err)
                }
            })?
            .ok_or(ConfigurationError::EntryNotFound)?;

        info!(%user_id, %entry_id, key = %updated.key, "configurations: entry updated");

        Ok(ConfigEntryDto::from(updated))
    }

    pub async fn delete(&self, user_id: Uuid, entry_id: Uuid) -> UseCaseResult<()> {
        let deleted = self
            .config_entry_repo
            .delete(entry_id)
            .await
            .map_err(|err| {
                error!(%user_id, %entry_id, db_error = ?err, "configurations: failed to delete entry");
                ConfigurationError::Internal(err)
            })?;

        if !deleted {
            return Err(ConfigurationError::EntryNotFound);
        }

        info!(%user_id, %entry_id, "configurations: entry deleted");
        Ok(())
    }

    pub async fn rates(&self) -> UseCaseResult<RatesDto> {
        let rate_card = self.rate_cards.current().await.map_err(|err| {
            error!(db_error = ?err, "configurations: failed to resolve rates");
            ConfigurationError::Internal(err)
        })?;

        Ok(RatesDto::from(rate_card))
    }

    pub async fn update_rates(&self, user_id: Uuid, form: &RatesForm) -> UseCaseResult<RatesDto> {
        let rate_card = validate_rates(form)?;
        let now = Utc::now();

        let entries = rate_card
            .to_entries()
            .into_iter()
            .map(|(key, value)| InsertConfigEntryEntity {
                key: key.to_string(),
                value,
                value_type: Some(ConfigValueType::Decimal.to_string()),
                description: None,
                created_at: now,
                updated_by: Some(user_id),
            })
            .collect();

        self.config_entry_repo
            .upsert_many(entries)
            .await
            .map_err(|err| {
                error!(%user_id, db_error = ?err, "configurations: failed to save rates");
                ConfigurationError::Internal(err)
            })?;

        info!(
            %user_id,
            car_per_hour_minor = rate_card.car.per_hour_minor,
            car_per_minute_minor = rate_card.car.per_minute_minor,
            motorcycle_per_hour_minor = rate_card.motorcycle.per_hour_minor,
            motorcycle_per_minute_minor = rate_card.motorcycle.per_minute_minor,
            "configurations: rates updated"
        );

        Ok(RatesDto::from(rate_card))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::{
        entities::config_entries::ConfigEntryEntity,
        repositories::{
            config_entries::MockConfigEntryRepository, errors::DuplicateRecord,
        },
        value_objects::rates::{CAR_PER_HOUR_KEY, MOTORCYCLE_PER_MINUTE_KEY},
    };
    use rust_decimal::Decimal;

    fn stored(key: &str, value: &str) -> ConfigEntryEntity {
        ConfigEntryEntity {
            id: Uuid::new_v4(),
            key: key.to_string(),
            value: value.to_string(),
            value_type: None,
            description: None,
            created_at: Utc::now(),
            updated_at: None,
            updated_by: None,
        }
    }

    fn entry_form(key: &str, value: &str) -> ConfigEntryForm {
        ConfigEntryForm {
            key: key.to_string(),
            value: value.to_string(),
            value_type: None,
            description: None,
        }
    }

    #[tokio::test]
    async fn categories_are_distinct_key_prefixes() {
        let mut config_repo = MockConfigEntryRepository::new();
        config_repo.expect_list().returning(|_| {
            Box::pin(async {
                Ok(vec![
                    stored("CompanyName", "Parqueadero Central"),
                    stored("Rates.CarPerHour", "2000"),
                    stored("Rates.CarPerMinute", "70"),
                    stored("Receipt.Footer", "Gracias"),
                ])
            })
        });

        let usecase = ConfigurationUseCase::new(Arc::new(config_repo));
        let categories = usecase.categories().await.unwrap();

        assert_eq!(categories, vec!["CompanyName", "Rates", "Receipt"]);
    }

    #[tokio::test]
    async fn duplicate_key_is_a_field_error() {
        let mut config_repo = MockConfigEntryRepository::new();
        config_repo.expect_create().returning(|_| {
            Box::pin(async { Err(anyhow::Error::new(DuplicateRecord::new(CONFIG_KEY_KEY))) })
        });

        let usecase = ConfigurationUseCase::new(Arc::new(config_repo));
        let result = usecase
            .create(Uuid::new_v4(), &entry_form("CompanyName", "Otro"))
            .await;

        match result {
            Err(err @ ConfigurationError::DuplicateKey { .. }) => {
                assert_eq!(err.status_code(), StatusCode::CONFLICT);
                assert!(err.field_errors().and_then(|e| e.get("key")).is_some());
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn renaming_onto_existing_key_is_a_field_error() {
        let mut config_repo = MockConfigEntryRepository::new();
        config_repo.expect_update().returning(|_, _| {
            Box::pin(async { Err(anyhow::Error::new(DuplicateRecord::new(CONFIG_KEY_KEY))) })
        });

        let usecase = ConfigurationUseCase::new(Arc::new(config_repo));
        let result = usecase
            .update(Uuid::new_v4(), Uuid::new_v4(), &entry_form("Rates.CarPerHour", "1"))
            .await;

        assert!(matches!(result, Err(ConfigurationError::DuplicateKey { .. })));
    }

    #[tokio::test]
    async fn update_of_unknown_entry_is_not_found() {
        let mut config_repo = MockConfigEntryRepository::new();
        config_repo
            .expect_update()
            .returning(|_, _| Box::pin(async { Ok(None) }));

        let usecase = ConfigurationUseCase::new(Arc::new(config_repo));
        let result = usecase
            .update(Uuid::new_v4(), Uuid::new_v4(), &entry_form("CompanyName", "X"))
            .await;

        assert!(matches!(result, Err(ConfigurationError::EntryNotFound)));
    }

    #[tokio::test]
    async fn delete_of_unknown_entry_is_not_found() {
        let mut config_repo = MockConfigEntryRepository::new();
        config_repo
            .expect_delete()
            .returning(|_| Box::pin(async { Ok(false) }));

        let usecase = ConfigurationUseCase::new(Arc::new(config_repo));

        assert!(matches!(
            usecase.delete(Uuid::new_v4(), Uuid::new_v4()).await,
            Err(ConfigurationError::EntryNotFound)
        ));
    }

    #[tokio::test]
    async fn blank_key_and_bad_type_are_rejected() {
        let usecase = ConfigurationUseCase::new(Arc::new(MockConfigEntryRepository::new()));
        let form = ConfigEntryForm {
            key: "  ".to_string(),
            value: "x".to_string(),
            value_type: Some("json".to_string()),
            description: None,
        };

        match usecase.create(Uuid::new_v4(), &form).await {
            Err(ConfigurationError::Validation(errors)) => {
                assert!(errors.get("key").is_some());
                assert!(errors.get("value_type").is_some());
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn rates_apply_defaults_for_missing_entries() {
        let mut config_repo = MockConfigEntryRepository::new();
        config_repo.expect_list().returning(|_| {
            Box::pin(async { Ok(vec![stored(CAR_PER_HOUR_KEY, "2500")]) })
        });

        let usecase = ConfigurationUseCase::new(Arc::new(config_repo));
        let rates = usecase.rates().await.unwrap();

        assert_eq!(rates.car_per_hour, Decimal::new(2500, 0));
        assert_eq!(rates.car_per_minute, Decimal::new(70, 0));
    }

    #[tokio::test]
    async fn rates_are_upserted_as_decimals() {
        let mut config_repo = MockConfigEntryRepository::new();
        config_repo
            .expect_upsert_many()
            .withf(|entries| {
                entries.len() == 4
                    && entries
                        .iter()
                        .all(|entry| entry.value_type.as_deref() == Some("decimal"))
                    && entries
                        .iter()
                        .any(|entry| entry.key == CAR_PER_HOUR_KEY && entry.value == "2500")
                    && entries
                        .iter()
                        .any(|entry| entry.key == MOTORCYCLE_PER_MINUTE_KEY && entry.value == "40.5")
            })
            .times(1)
            .returning(|_| Box::pin(async { Ok(()) }));

        let usecase = ConfigurationUseCase::new(Arc::new(config_repo));
        let form = RatesForm {
            car_per_hour: "2500".to_string(),
            motorcycle_per_hour: "1000".to_string(),
            car_per_minute: "70".to_string(),
            motorcycle_per_minute: "40.5".to_string(),
        };

        let rates = usecase.update_rates(Uuid::new_v4(), &form).await.unwrap();
        assert_eq!(rates.car_per_hour, Decimal::new(2500, 0));
    }

    #[tokio::test]
    async fn negative_rate_is_rejected() {
        let usecase = ConfigurationUseCase::new(Arc::new(MockConfigEntryRepository::new()));
        let form = RatesForm {
            car_per_hour: "-1".to_string(),
            motorcycle_per_hour: "1000".to_string(),
            car_per_minute: "70".to_string(),
            motorcycle_per_minute: "70".to_string(),
        };

        match usecase.update_rates(Uuid::new_v4(), &form).await {
            Err(ConfigurationError::Validation(errors)) => {
                assert!(errors.get("car_per_hour").is_some());
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}

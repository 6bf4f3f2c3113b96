use thiserror::Error;

pub const VEHICLE_PLATE_KEY: &str = "vehicles_plate_key";
pub const SESSION_BARCODE_KEY: &str = "parking_sessions_barcode_key";
pub const ONE_ACTIVE_SESSION_PER_VEHICLE: &str = "parking_sessions_one_active_per_vehicle";
pub const ONE_COMPLETED_PAYMENT_PER_SESSION: &str = "payments_one_completed_per_session";
pub const CLOSING_DATE_KEY: &str = "cash_closings_closing_date_key";
pub const CONFIG_KEY_KEY: &str = "config_entries_key_key";
pub const USERNAME_KEY: &str = "app_users_username_key";
pub const USER_DOCUMENT_KEY: &str = "app_users_document_key";

/// A write hit a unique constraint. Repositories return it inside `anyhow::Error`
/// so callers can `downcast_ref` and turn it into a conflict.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unique constraint `{constraint}` violated")]
pub struct DuplicateRecord {
    pub constraint: String,
}

impl DuplicateRecord {
    pub fn new(constraint: impl Into<String>) -> Self {
        Self {
            constraint: constraint.into(),
        }
    }
}

/// Name of the violated constraint when `err` is a [`DuplicateRecord`].
pub fn duplicate_constraint(err: &anyhow::Error) -> Option<&str> {
    err.downcast_ref::<DuplicateRecord>()
        .map(|duplicate| duplicate.constraint.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_is_recoverable_from_anyhow() {
        let err = anyhow::Error::new(DuplicateRecord::new(SESSION_BARCODE_KEY));
        assert_eq!(duplicate_constraint(&err), Some(SESSION_BARCODE_KEY));

        let other = anyhow::anyhow!("connection refused");
        assert_eq!(duplicate_constraint(&other), None);
    }
}

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use domain::repositories::errors::DuplicateRecord;

/// Unique violations become [`DuplicateRecord`]; everything else passes through.
pub fn into_repository_error(err: DieselError) -> anyhow::Error {
    match err {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            let constraint = info.constraint_name().unwrap_or_default().to_string();
            anyhow::Error::new(DuplicateRecord::new(constraint))
        }
        other => anyhow::Error::new(other),
    }
}

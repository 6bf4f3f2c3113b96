use thiserror::Error;

pub const MAX_PLATE_LEN: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlateError {
    #[error("plate is required")]
    Empty,
    #[error("plate must be at most {MAX_PLATE_LEN} characters")]
    TooLong,
}

/// Trims and uppercases a plate as typed at the gate.
pub fn normalize_plate(raw: &str) -> Result<String, PlateError> {
    let plate = raw.trim().to_uppercase();
    if plate.is_empty() {
        return Err(PlateError::Empty);
    }
    if plate.chars().count() > MAX_PLATE_LEN {
        return Err(PlateError::TooLong);
    }
    Ok(plate)
}

/// Same as [`normalize_plate`] but for optional query/form fields: blank means absent.
pub fn normalize_optional_plate(raw: Option<&str>) -> Result<Option<String>, PlateError> {
    match raw.map(normalize_plate) {
        None | Some(Err(PlateError::Empty)) => Ok(None),
        Some(result) => result.map(Some),
    }
}

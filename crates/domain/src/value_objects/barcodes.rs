use chrono::{DateTime, Local};
use rand::Rng;

pub const BARCODE_PREFIX: &str = "PARQ";
pub const MAX_BARCODE_LEN: usize = 50;

/// `PARQ` + local timestamp + a 4-digit random suffix.
///
/// Two entries in the same second can collide; the unique index on
/// `parking_sessions.barcode` catches that and the caller regenerates.
pub fn generate_barcode(now: DateTime<Local>) -> String {
    let suffix: u16 = rand::thread_rng().gen_range(1000..=9999);
    format!("{BARCODE_PREFIX}{}{suffix}", now.format("%Y%m%d%H%M%S"))
}

pub fn normalize_barcode(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

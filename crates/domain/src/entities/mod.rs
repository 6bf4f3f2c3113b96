pub mod app_users;
pub mod cash_closings;
pub mod cash_movements;
pub mod config_entries;
pub mod parking_sessions;
pub mod payments;
pub mod vehicles;

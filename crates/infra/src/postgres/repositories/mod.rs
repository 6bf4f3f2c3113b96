pub mod cash_register;
pub mod config_entries;
pub mod parking;
pub mod payments;
pub mod users;

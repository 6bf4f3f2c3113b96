pub mod account;
pub mod cash_register;
pub mod configurations;
pub mod dashboard;
pub mod parking;
pub mod payments;
pub mod users;

pub mod barcodes;
pub mod business_days;
pub mod cash_register;
pub mod configurations;
pub mod dashboard;
pub mod enums;
pub mod fees;
pub mod money;
pub mod parking;
pub mod payments;
pub mod plates;
pub mod rates;
pub mod users;
pub mod validation;

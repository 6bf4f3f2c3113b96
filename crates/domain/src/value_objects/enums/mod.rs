pub mod closing_statuses;
pub mod config_value_types;
pub mod movement_types;
pub mod payment_methods;
pub mod payment_statuses;
pub mod user_roles;
pub mod vehicle_categories;

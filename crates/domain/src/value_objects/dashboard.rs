use serde::Serialize;

use crate::value_objects::parking::ActiveSessionDto;

#[derive(Debug, Clone, Serialize)]
pub struct DashboardDto {
    pub active_vehicles: usize,
    pub active_cars: usize,
    pub active_motorcycles: usize,
    pub income_today_minor: i64,
    pub income_month_minor: i64,
    pub pending_payments: usize,
    pub pending_amount_minor: i64,
    pub recent_active: Vec<ActiveSessionDto>,
}

pub mod savings;
pub mod schedule;
pub mod smart_light;
pub mod units;
pub mod validation;

pub mod duration;
pub mod month_day;
pub mod period;
pub mod row;

pub mod accounts;
pub mod calendar;
pub mod dashboard;
pub mod servers;
pub mod trades;

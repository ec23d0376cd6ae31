pub mod coerce;
pub mod employee;
pub mod inventory;
pub mod sale;

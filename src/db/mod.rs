pub mod activities;
pub mod audit;
pub mod dashboard;
pub mod leads;
pub mod users;

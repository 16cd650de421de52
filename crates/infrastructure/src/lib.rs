pub mod database;
pub mod names;
pub mod repositories;

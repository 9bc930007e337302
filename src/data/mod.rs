pub mod configuration;
pub mod dbconnector;
pub mod migrations;
pub mod store;

pub mod errors;
pub mod guard;
pub mod jwt_driver;
pub mod models;
pub mod ports;
pub mod providers;
pub mod service;
pub mod token_service;

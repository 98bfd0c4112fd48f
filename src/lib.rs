pub mod adapters;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod inventory;
pub mod ports;
pub mod services;
pub mod use_cases;

//! payout-service: Transfer-method validation and bulk pay-and-submit for
//! ERP Payment Entries.

pub mod config;
pub mod dtos;
pub mod handlers;
pub mod models;
pub mod services;
pub mod startup;
pub mod utils;
pub mod workers;

pub use startup::Application;

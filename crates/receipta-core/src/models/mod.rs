//! Data models: extracted records, expenses and configuration.

pub mod config;
pub mod expense;
pub mod invoice;

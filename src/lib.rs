// Public API for integration tests and potential library usage

pub mod aggregate;
pub mod api;
pub mod app;
pub mod broker;
pub mod config;
pub mod error;
pub mod protocol;
pub mod store;
pub mod types;
pub mod visibility;
pub mod ws;

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod handlers;
pub mod nobl9;
pub mod project;
pub mod server;
pub mod services;
pub mod types;

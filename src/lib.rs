pub mod api;
pub mod bridge;
pub mod cli;
pub mod config;
pub mod error;
pub mod gateway;
pub mod menu;
pub mod router;
pub mod session;

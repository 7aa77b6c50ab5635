pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod idp;
pub mod middleware;
pub mod random;
pub mod services;
pub mod state;

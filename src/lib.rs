pub mod api;
pub mod app;
pub mod cli;
pub mod config;
pub mod infra;
pub mod logging;
pub mod screens;

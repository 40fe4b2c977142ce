pub mod commands;
pub mod config;
pub mod errors;
pub mod models;
pub mod playback;
pub mod schedule;
pub mod services;
pub mod sources;
pub mod streaming;
pub mod utils;

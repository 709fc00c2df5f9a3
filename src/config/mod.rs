/// Database configuration and connection management
pub mod database;

/// Seed catalogue loading from config.toml
pub mod seed;

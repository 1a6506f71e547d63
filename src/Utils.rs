//! different utility modules used throughout the project
/// solver settings from a TOML file
pub mod config;
/// tiny module to start terminal and file logging
pub mod logger;

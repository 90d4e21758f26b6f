// src/core/mod.rs
//! Infrastructure shared by every feature: configuration, database, file system

pub mod config_manager;
pub mod database;
pub mod fs_ops;

pub use config_manager::ConfigManager;
pub use database::Database;
pub use fs_ops::FsOps;

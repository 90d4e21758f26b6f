// src/lib.rs
//! Joblyst: personal job-application tracker service.

pub mod auth;
pub mod cli;
pub mod core;
pub mod domain;
pub mod export;
pub mod link_parser;
pub mod notifications;
pub mod repository;
pub mod storage;
pub mod utils;
pub mod web;

pub use web::{build_rocket, start_web_server, AppState};

/// Log through `tracing` with a level keyword first: `app_log!(info, "...")`.
#[macro_export]
macro_rules! app_log {
    (trace, $($arg:tt)+) => { ::tracing::trace!($($arg)+) };
    (debug, $($arg:tt)+) => { ::tracing::debug!($($arg)+) };
    (info, $($arg:tt)+) => { ::tracing::info!($($arg)+) };
    (warn, $($arg:tt)+) => { ::tracing::warn!($($arg)+) };
    (error, $($arg:tt)+) => { ::tracing::error!($($arg)+) };
}

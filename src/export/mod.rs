// src/export/mod.rs
//! CSV and PDF reports over a list of applications.

pub mod csv_export;
pub mod format;
pub mod pdf_report;

pub use csv_export::{csv_file_name, to_csv};
pub use pdf_report::{pdf_file_name, ReportGenerator};

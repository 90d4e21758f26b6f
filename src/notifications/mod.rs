// src/notifications/mod.rs
//! Reminder emails: composition, delivery and the scheduled jobs that send them.

pub mod email;
pub mod jobs;
pub mod mailer;
pub mod scheduler;
pub mod signature;

pub use email::{compose, EmailContext, EmailMessage, EmailType};
pub use jobs::{run_job, JobReport, NotificationJob};
pub use mailer::{mailer_from_settings, LogMailer, Mailer, MemoryMailer, ResendMailer};
pub use signature::SignatureVerifier;

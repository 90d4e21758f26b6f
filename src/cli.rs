// src/cli.rs
use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use sqlx::SqlitePool;
use std::path::PathBuf;

use crate::app_log;
use crate::core::{ConfigManager, Database, FsOps};
use crate::domain::{current_month, filter_by_month, month_range, today_utc};
use crate::export::{csv_file_name, to_csv};
use crate::notifications::{mailer_from_settings, run_job, NotificationJob};
use crate::repository::{ApplicationRepository, UserRepository};
use crate::utils::validate_file_extension;
use crate::web::start_web_server;

#[derive(Parser)]
#[command(name = "joblyst")]
#[command(about = "Track job applications, CVs and follow-up reminders")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(long, env = "JOBLYST_CONFIG", default_value = "config.yaml", global = true)]
    pub config: PathBuf,

    /// Emit logs as JSON lines
    #[arg(long, env = "JOBLYST_LOG_JSON", global = true)]
    pub log_json: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the HTTP API (and the scheduler when enabled)
    Serve,
    /// Run one notification job immediately
    Notify {
        #[arg(value_enum)]
        job: NotificationJob,
    },
    /// Write one user's applications to a CSV file
    Export {
        #[arg(long)]
        email: String,
        /// Restrict to a month: YYYY-MM or `current`
        #[arg(long)]
        month: Option<String>,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Inspect registered users
    Users {
        #[command(subcommand)]
        command: UserCommand,
    },
}

#[derive(Subcommand)]
pub enum UserCommand {
    /// List all registered users
    List,
}

pub async fn run(cli: Cli) -> Result<()> {
    let config = ConfigManager::load_from(&cli.config)?;

    match cli.command {
        Command::Serve => start_web_server(config).await,

        Command::Notify { job } => {
            let db = Database::new(&config.environment.database_path).await?;
            let mailer = mailer_from_settings(&config.mail)?;
            let report = run_job(job, db.pool(), mailer.as_ref(), today_utc()).await?;

            app_log!(
                info,
                "{}: {} users scanned, {} emails sent, {} failures",
                report.job,
                report.users_scanned,
                report.emails_sent,
                report.failures
            );
            Ok(())
        }

        Command::Export { email, month, out } => {
            let today = today_utc();
            let out = out.unwrap_or_else(|| PathBuf::from(csv_file_name(today)));
            validate_file_extension(&out.to_string_lossy(), &["csv"])?;

            let month = month.map(|m| parse_month_arg(&m, today)).transpose()?;

            let db = Database::new(&config.environment.database_path).await?;
            let csv = export_user_csv(db.pool(), &email, month.as_deref()).await?;
            FsOps::write_file_safe(&out, &csv).await?;

            app_log!(info, "Export written to {}", out.display());
            Ok(())
        }

        Command::Users {
            command: UserCommand::List,
        } => {
            let db = Database::new(&config.environment.database_path).await?;
            list_users(db.pool()).await
        }
    }
}

/// CSV bytes for the user registered under `email`, optionally narrowed to `month`.
pub async fn export_user_csv(pool: &SqlitePool, email: &str, month: Option<&str>) -> Result<Vec<u8>> {
    let user = UserRepository::new(pool)
        .find_by_email(email)
        .await?
        .with_context(|| format!("No user registered with email {}", email))?;

    let records = ApplicationRepository::new(pool)
        .list_for_user(&user.id)
        .await?;
    let records = match month {
        Some(month) => filter_by_month(&records, month)?,
        None => records,
    };

    app_log!(info, "Exporting {} applications for {}", records.len(), user.email);
    to_csv(&records)
}

async fn list_users(pool: &SqlitePool) -> Result<()> {
    let users = UserRepository::new(pool).list().await?;
    if users.is_empty() {
        app_log!(info, "No users registered.");
        return Ok(());
    }

    app_log!(info, "{:<38} {:<30} {:<20} {:<10} {:<16}", "ID", "Email", "Name", "Verified", "Created");
    app_log!(info, "{}", "-".repeat(118));
    for user in users {
        app_log!(
            info,
            "{:<38} {:<30} {:<20} {:<10} {:<16}",
            user.id,
            user.email,
            user.name,
            if user.email_verified { "yes" } else { "no" },
            user.created_at.format("%Y-%m-%d %H:%M")
        );
    }
    Ok(())
}

/// Accept `YYYY-MM` or `current`.
pub fn parse_month_arg(month: &str, today: NaiveDate) -> Result<String> {
    let month = month.trim();
    if month == "current" {
        return Ok(current_month(today));
    }
    month_range(month)?;
    Ok(month.to_string())
}

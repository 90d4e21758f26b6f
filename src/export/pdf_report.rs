// src/export/pdf_report.rs
//! Landscape PDF report rendered through the `typst` CLI.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use tokio::process::Command;

use super::format;
use crate::app_log;
use crate::core::FsOps;
use crate::domain::{stats, Application, DomainError};

const COLUMNS: [&str; 9] = [
    "Company",
    "Job Title",
    "Location",
    "Type",
    "Status",
    "Date",
    "Source",
    "Salary",
    "Response",
];

const PREAMBLE: &str = r##"#set page(
  paper: "a4",
  flipped: true,
  margin: 1cm,
  footer: context align(center, text(size: 8pt)[
    Page #counter(page).display() of #counter(page).final().first()
  ]),
)
#set text(size: 8pt)
"##;

const TABLE_OPEN: &str = r##"#table(
  columns: (2fr, 2fr, 1.5fr, 1.2fr, 1.2fr, 1.4fr, 1.2fr, 1.8fr, 1fr),
  stroke: none,
  fill: (_, y) => if y == 0 { rgb("#3b82f6") } else if calc.odd(y) { rgb("#f5f5f5") },
"##;

/// Quote a value as a Typst string literal.
fn typst_str(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => {}
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Build the Typst document for `records`.
pub fn report_source(records: &[Application], generated_on: NaiveDate) -> String {
    let overview = stats::overview(records);
    let mut source = String::from(PREAMBLE);

    source.push_str("#align(center, text(size: 16pt, weight: \"bold\")[Applications Report])\n");
    source.push_str(&format!(
        "#align(center, text(size: 10pt, {}))\n",
        typst_str(&format!("Generated: {}", format::date(generated_on)))
    ));
    source.push_str(&format!(
        "#align(center, text(size: 9pt, {}))\n\n",
        typst_str(&format!(
            "Total: {} | Applied: {} | Interviews: {} | Offers: {} | Rejected: {}",
            overview.total, overview.applied, overview.interviews, overview.offers, overview.rejected
        ))
    ));

    source.push_str(TABLE_OPEN);
    let header: Vec<String> = COLUMNS
        .iter()
        .map(|h| format!("text(fill: white, weight: \"bold\", {})", typst_str(h)))
        .collect();
    source.push_str(&format!("  table.header({}),\n", header.join(", ")));

    for app in records {
        let cells = [
            app.company.clone(),
            app.job_title.clone(),
            app.location.clone(),
            app.job_type.label().to_string(),
            app.status.label().to_string(),
            format::date(app.date_applied),
            app.source.as_str().to_string(),
            format::salary_range(app),
            format::yes_no(app.response_received).to_string(),
        ];
        let row: Vec<String> = cells.iter().map(|c| typst_str(c)).collect();
        source.push_str(&format!("  {},\n", row.join(", ")));
    }
    source.push_str(")\n");

    source
}

pub fn pdf_file_name(today: NaiveDate) -> String {
    format::dated_file_name("applications", today, "pdf")
}

/// Compiles report sources inside a scratch directory under the reports path.
#[derive(Debug, Clone)]
pub struct ReportGenerator {
    workspace: PathBuf,
}

impl ReportGenerator {
    pub fn new(reports_path: PathBuf) -> Self {
        Self {
            workspace: reports_path,
        }
    }

    pub async fn render(&self, records: &[Application], today: NaiveDate) -> Result<Vec<u8>> {
        if records.is_empty() {
            return Err(DomainError::NothingToExport.into());
        }

        let job_dir = self.workspace.join(uuid::Uuid::new_v4().to_string());
        let pdf = self.render_job(&job_dir, records, today).await?;
        app_log!(info, "Rendered PDF report with {} rows", records.len());
        Ok(pdf)
    }

    /// Render inside `job_dir` and remove it afterwards, whatever the outcome.
    async fn render_job(&self, job_dir: &Path, records: &[Application], today: NaiveDate) -> Result<Vec<u8>> {
        let pdf = self.render_in(job_dir, records, today).await;

        if job_dir.exists() {
            if let Err(e) = tokio::fs::remove_dir_all(job_dir).await {
                app_log!(warn, "Failed to clean report dir {}: {}", job_dir.display(), e);
            }
        }
        pdf
    }

    async fn render_in(&self, job_dir: &Path, records: &[Application], today: NaiveDate) -> Result<Vec<u8>> {
        let source_path = job_dir.join("report.typ");
        let output_path = job_dir.join("report.pdf");

        FsOps::write_file_safe(&source_path, report_source(records, today).as_bytes()).await?;
        self.compile(&source_path, &output_path).await?;
        FsOps::read_file_bytes(&output_path).await
    }

    async fn compile(&self, source: &Path, output: &Path) -> Result<()> {
        let output_result = Command::new("typst")
            .arg("compile")
            .arg(source)
            .arg(output)
            .output()
            .await
            .context("Failed to execute typst command")?;

        if !output_result.status.success() {
            let stderr = String::from_utf8_lossy(&output_result.stderr);
            let stdout = String::from_utf8_lossy(&output_result.stdout);
            anyhow::bail!(
                "Typst compilation failed: stderr={}, stdout={}",
                stderr,
                stdout
            );
        }

        Ok(())
    }
}

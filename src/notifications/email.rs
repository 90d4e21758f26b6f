// src/notifications/email.rs
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::{Application, DomainError, WeeklySummary};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EmailType {
    #[serde(rename = "interview-24h")]
    Interview24h,
    #[serde(rename = "no-response-7d")]
    NoResponse7d,
    WeeklySummary,
    NewOffer,
}

impl EmailType {
    pub const ALL: [EmailType; 4] = [
        EmailType::Interview24h,
        EmailType::NoResponse7d,
        EmailType::WeeklySummary,
        EmailType::NewOffer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EmailType::Interview24h => "interview-24h",
            EmailType::NoResponse7d => "no-response-7d",
            EmailType::WeeklySummary => "weekly-summary",
            EmailType::NewOffer => "new-offer",
        }
    }
}

impl FromStr for EmailType {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        EmailType::ALL
            .into_iter()
            .find(|t| t.as_str() == value.trim())
            .ok_or_else(|| DomainError::UnknownVariant {
                kind: "email type",
                value: value.to_string(),
            })
    }
}

impl fmt::Display for EmailType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Data interpolated into a message. Missing fields fall back to placeholders.
#[derive(Debug, Clone, Default)]
pub struct EmailContext {
    pub company: Option<String>,
    pub job_title: Option<String>,
    pub interview_date: Option<NaiveDateTime>,
    pub date_applied: Option<NaiveDate>,
    pub summary: Option<WeeklySummary>,
}

impl EmailContext {
    pub fn for_application(app: &Application) -> Self {
        Self {
            company: Some(app.company.clone()),
            job_title: Some(app.job_title.clone()),
            interview_date: app.interview_date,
            date_applied: Some(app.date_applied),
            summary: None,
        }
    }

    pub fn for_summary(summary: WeeklySummary) -> Self {
        Self {
            summary: Some(summary),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html: String,
}

fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

fn card(color: &str, background: &str, heading: &str, lines: &[String], footer: &str) -> String {
    let body: String = lines.iter().map(|l| format!("<p>{}</p>", l)).collect();
    format!(
        r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">
  <h2 style="color: {color};">{heading}</h2>
  <div style="background: {background}; padding: 16px; border-radius: 8px; margin: 16px 0;">{body}</div>
  <p>{footer}</p>
</div>"#
    )
}

/// Build the subject and HTML body for `email_type`.
pub fn compose(email_type: EmailType, to: &str, ctx: &EmailContext) -> EmailMessage {
    let company = escape_html(ctx.company.as_deref().unwrap_or("Company"));
    let job_title = escape_html(ctx.job_title.as_deref().unwrap_or("Position"));
    let headline = vec![format!("<strong>{}</strong>", company), job_title];

    let (subject, html) = match email_type {
        EmailType::Interview24h => {
            let when = ctx
                .interview_date
                .map(|dt| dt.format("%B %-d, %Y at %H:%M").to_string())
                .unwrap_or_else(|| "Soon".to_string());
            let mut lines = headline;
            lines.push(format!("<strong>{}</strong>", when));
            (
                "Reminder: upcoming interview".to_string(),
                card("#2563eb", "#f3f4f6", "You have an interview coming up", &lines, "Good luck with your interview!"),
            )
        }
        EmailType::NoResponse7d => {
            let applied = ctx
                .date_applied
                .map(|d| d.format("%B %-d, %Y").to_string())
                .unwrap_or_else(|| "N/A".to_string());
            let mut lines = headline;
            lines.push(format!("Applied on: <strong>{}</strong>", applied));
            (
                "No response in 7 days - consider a follow-up".to_string(),
                card(
                    "#ea580c",
                    "#fef3c7",
                    "A week has passed since you applied",
                    &lines,
                    "A friendly follow-up can put your application back on the radar.",
                ),
            )
        }
        EmailType::NewOffer => (
            "Congratulations! You have an offer".to_string(),
            card(
                "#16a34a",
                "#dcfce7",
                "Great news!",
                &headline,
                "Congratulations on reaching this stage.",
            ),
        ),
        EmailType::WeeklySummary => {
            let summary = ctx.summary.unwrap_or_default();
            let lines = vec![
                format!("Applications this week: <strong>{}</strong>", summary.this_week),
                format!("Interviews in progress: <strong>{}</strong>", summary.total_interviews),
                format!("Offers received: <strong>{}</strong>", summary.total_offers),
                format!("Total applications: <strong>{}</strong>", summary.total_applied),
            ];
            (
                "Your Joblyst weekly summary".to_string(),
                card("#2563eb", "#f3f4f6", "Your weekly summary", &lines, "Keep going!"),
            )
        }
    };

    EmailMessage {
        to: to.to_string(),
        subject,
        html,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::application::fixtures::application;
    use crate::domain::ApplicationStatus;

    #[test]
    fn test_email_type_wire_names() {
        for email_type in EmailType::ALL {
            let json = serde_json::to_string(&email_type).unwrap();
            assert_eq!(json, format!("\"{}\"", email_type.as_str()));
            assert_eq!(email_type.as_str().parse::<EmailType>().unwrap(), email_type);
        }
        assert!("daily-digest".parse::<EmailType>().is_err());
    }

    #[test]
    fn test_compose_escapes_user_content() {
        let mut app = application("<Acme & Co>", ApplicationStatus::Offer, "2025-01-05");
        app.job_title = "Dev".to_string();
        let message = compose(
            EmailType::NewOffer,
            "ana@example.com",
            &EmailContext::for_application(&app),
        );

        assert_eq!(message.to, "ana@example.com");
        assert!(message.html.contains("&lt;Acme &amp; Co&gt;"));
        assert!(!message.html.contains("<Acme"));
    }

    #[test]
    fn test_compose_weekly_summary() {
        let summary = WeeklySummary {
            total_applied: 12,
            total_interviews: 3,
            total_offers: 1,
            this_week: 4,
        };
        let message = compose(
            EmailType::WeeklySummary,
            "ana@example.com",
            &EmailContext::for_summary(summary),
        );
        assert!(message.subject.contains("weekly summary"));
        assert!(message.html.contains("Applications this week: <strong>4</strong>"));
        assert!(message.html.contains("Total applications: <strong>12</strong>"));
    }

    #[test]
    fn test_compose_without_context_uses_placeholders() {
        let message = compose(EmailType::Interview24h, "a@b.c", &EmailContext::default());
        assert!(message.html.contains("Company"));
        assert!(message.html.contains("Soon"));
    }
}

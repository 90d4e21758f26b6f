// src/link_parser.rs
//! Pre-fill an application from a job posting URL using its OpenGraph tags.

use anyhow::{Context, Result};
use regex::Regex;
use reqwest::Client;
use scraper::{Html, Selector};
use serde::Serialize;
use std::sync::LazyLock;
use url::Url;

use crate::app_log;
use crate::domain::DomainError;

const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

fn pattern(source: &str) -> Regex {
    Regex::new(source).expect("invalid built-in pattern")
}

static SITE_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| pattern(r"(?i)\s*\|\s*(LinkedIn|Indeed|Glassdoor|Job|Position|Role).*$"));
static HIRING_FOR: LazyLock<Regex> = LazyLock::new(|| pattern(r"(?i)hiring\s+for\s+([^,|–—\n]+)"));
static HIRING_IN: LazyLock<Regex> = LazyLock::new(|| pattern(r"(?i)hiring\s+(.+?)\s+in\s+"));
static TITLE_SPLIT: LazyLock<Regex> = LazyLock::new(|| pattern(r"(?i)\s+(?:at|in|-)\s+"));
static COMPANY_HIRING: LazyLock<Regex> = LazyLock::new(|| pattern(r"(?i)^([^|]+?)\s+hiring\s+"));
static COMPANY_AT: LazyLock<Regex> = LazyLock::new(|| pattern(r"(?i)\bat\s+([^,|–—\n]+)"));
static COMPANY_DASH: LazyLock<Regex> = LazyLock::new(|| pattern(r"-\s+([^,|–—\n]+)"));
static COMPANY_PIPE: LazyLock<Regex> = LazyLock::new(|| pattern(r"\|\s*([^,|–—\n]+)"));
static COMPANY_IN: LazyLock<Regex> = LazyLock::new(|| pattern(r"(?i)\bin\s+([^,|–—\n]+),"));
static SINGLE_WORD: LazyLock<Regex> = LazyLock::new(|| pattern(r"^[A-Z][a-z]+$"));
static DESC_HIRING_FOR: LazyLock<Regex> =
    LazyLock::new(|| pattern(r"(?i)^([^|]+?)\s+hiring\s+for"));
static DESC_AT_WITH: LazyLock<Regex> =
    LazyLock::new(|| pattern(r"\b(?:at|with)\s+([A-Z][a-zA-Z0-9\s&]+?)(?:\s+in|\.|,|$)"));
static LOCATION_IN: LazyLock<Regex> = LazyLock::new(|| {
    pattern(r"\b[Ii]n\s+([A-Z][a-zA-Z]+(?:,\s*[A-Z][a-zA-Z]+(?:\s[A-Z][a-zA-Z]+)*)?)")
});
static CITY_STATE: LazyLock<Regex> = LazyLock::new(|| pattern(r"[A-Z][a-z]+,\s*[A-Z]{2}\b"));
static SALARY: LazyLock<Regex> = LazyLock::new(|| pattern(r"\$[\d,]+(?:\s*-\s*\$[\d,]+)?"));

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageMetadata {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParsedJobLink {
    pub job_title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub salary: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub link: String,
}

/// Only absolute http(s) URLs are fetched.
pub fn validate_url(raw: &str) -> Result<Url, DomainError> {
    let url = Url::parse(raw.trim()).map_err(|_| DomainError::InvalidUrl(raw.to_string()))?;
    match url.scheme() {
        "http" | "https" if url.host_str().is_some() => Ok(url),
        _ => Err(DomainError::InvalidUrl(raw.to_string())),
    }
}

pub fn extract_metadata(html: &str) -> PageMetadata {
    let document = Html::parse_document(html);
    PageMetadata {
        title: og_property(&document, "og:title"),
        description: og_property(&document, "og:description"),
        image: og_property(&document, "og:image"),
    }
}

fn og_property(document: &Html, property: &str) -> Option<String> {
    let selector = Selector::parse(&format!("meta[property=\"{}\"]", property)).ok()?;
    document
        .select(&selector)
        .filter_map(|el| el.value().attr("content"))
        .map(str::trim)
        .find(|content| !content.is_empty())
        .map(str::to_string)
}

fn strip_site_suffix(title: &str) -> String {
    SITE_SUFFIX.replace(title, "").trim().to_string()
}

fn capture(re: &Regex, text: &str) -> Option<String> {
    re.captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
}

fn plausible_company(candidate: String, min_len: usize) -> Option<String> {
    if candidate.chars().count() > min_len && !candidate.eq_ignore_ascii_case("linkedin") {
        Some(candidate)
    } else {
        None
    }
}

pub fn extract_job_title(title: &str) -> String {
    let cleaned = strip_site_suffix(title);

    if let Some(job) = capture(&HIRING_FOR, &cleaned) {
        return job;
    }

    if let Some(job) = capture(&HIRING_IN, &cleaned) {
        if job.chars().count() > 2 && !job.to_lowercase().contains("hiring") {
            return job;
        }
    }

    TITLE_SPLIT
        .split(&cleaned)
        .next()
        .map(|part| part.trim().to_string())
        .unwrap_or(cleaned)
}

pub fn extract_company_from_title(title: &str) -> Option<String> {
    let cleaned = strip_site_suffix(title);

    [&*COMPANY_HIRING, &*COMPANY_AT, &*COMPANY_DASH, &*COMPANY_PIPE]
        .into_iter()
        .find_map(|re| capture(re, &cleaned).and_then(|c| plausible_company(c, 1)))
        .or_else(|| {
            capture(&COMPANY_IN, &cleaned)
                .filter(|c| !SINGLE_WORD.is_match(c))
                .and_then(|c| plausible_company(c, 2))
        })
}

pub fn extract_location_from_text(text: &str) -> Option<String> {
    CITY_STATE
        .find(text)
        .map(|m| m.as_str().to_string())
        .or_else(|| capture(&LOCATION_IN, text))
}

pub fn extract_salary(text: &str) -> Option<String> {
    SALARY.find(text).map(|m| m.as_str().to_string())
}

fn company_from_description(description: &str) -> Option<String> {
    capture(&DESC_HIRING_FOR, description).or_else(|| capture(&DESC_AT_WITH, description))
}

/// Combine the heuristics over title and description.
pub fn interpret(metadata: &PageMetadata, link: &str) -> ParsedJobLink {
    let title = metadata.title.as_deref().unwrap_or("");
    let description = metadata.description.as_deref().unwrap_or("");

    let company = extract_company_from_title(title)
        .or_else(|| {
            title
                .split_once(" at ")
                .map(|(_, rest)| rest.split(" | ").next().unwrap_or(rest).trim().to_string())
                .filter(|c| !c.is_empty())
        })
        .or_else(|| company_from_description(description));

    let location = extract_location_from_text(title)
        .or_else(|| extract_location_from_text(description));

    ParsedJobLink {
        job_title: metadata
            .title
            .as_deref()
            .map(extract_job_title)
            .filter(|t| !t.is_empty()),
        company,
        location,
        salary: extract_salary(description),
        description: metadata.description.clone(),
        image: metadata.image.clone(),
        link: link.to_string(),
    }
}

pub struct LinkParser {
    client: Client,
}

impl LinkParser {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(std::time::Duration::from_secs(15))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }

    pub async fn parse(&self, url: &Url) -> Result<ParsedJobLink> {
        app_log!(info, "Fetching job link: {}", url);

        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .context("Failed to fetch job link")?;

        if !response.status().is_success() {
            anyhow::bail!("HTTP error: {}", response.status());
        }

        let html = response
            .text()
            .await
            .context("Failed to read response body")?;

        let parsed = interpret(&extract_metadata(&html), url.as_str());
        app_log!(
            info,
            "Parsed job link: title={:?} company={:?}",
            parsed.job_title,
            parsed.company
        );
        Ok(parsed)
    }
}

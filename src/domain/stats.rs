// src/domain/stats.rs
//! Aggregates for the dashboard cards and charts.

use std::collections::BTreeMap;

use chrono::Datelike;
use serde::Serialize;

use super::{Application, ApplicationStatus, JobType};

/// Number of most recent months kept in the timeline.
pub const TIMELINE_MONTHS: usize = 6;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Overview {
    pub total: usize,
    pub applied: usize,
    pub interviews: usize,
    pub offers: usize,
    pub rejected: usize,
    /// Percentage of records that got any answer, rounded.
    pub response_rate: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DistributionEntry {
    pub key: &'static str,
    pub label: &'static str,
    pub value: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub applied: usize,
    pub interview: usize,
    pub offer: usize,
    pub rejected: usize,
}

impl StatusCounts {
    fn bump(&mut self, status: ApplicationStatus) {
        match status {
            ApplicationStatus::Applied => self.applied += 1,
            ApplicationStatus::Interview => self.interview += 1,
            ApplicationStatus::Offer => self.offer += 1,
            ApplicationStatus::Rejected => self.rejected += 1,
        }
    }

    fn get(&self, status: ApplicationStatus) -> usize {
        match status {
            ApplicationStatus::Applied => self.applied,
            ApplicationStatus::Interview => self.interview,
            ApplicationStatus::Offer => self.offer,
            ApplicationStatus::Rejected => self.rejected,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelinePoint {
    pub month: String,
    #[serde(flatten)]
    pub counts: StatusCounts,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub overview: Overview,
    pub status_distribution: Vec<DistributionEntry>,
    pub job_type_distribution: Vec<DistributionEntry>,
    pub timeline: Vec<TimelinePoint>,
}

pub fn overview(records: &[Application]) -> Overview {
    let mut counts = StatusCounts::default();
    for app in records {
        counts.bump(app.status);
    }

    let total = records.len();
    let answered = counts.interview + counts.offer + counts.rejected;
    let response_rate = if total == 0 {
        0
    } else {
        ((answered as f64 / total as f64) * 100.0).round() as u32
    };

    Overview {
        total,
        applied: counts.applied,
        interviews: counts.interview,
        offers: counts.offer,
        rejected: counts.rejected,
        response_rate,
    }
}

/// Per-status counts, zero entries dropped.
pub fn status_distribution(records: &[Application]) -> Vec<DistributionEntry> {
    let mut counts = StatusCounts::default();
    for app in records {
        counts.bump(app.status);
    }

    [
        ApplicationStatus::Applied,
        ApplicationStatus::Interview,
        ApplicationStatus::Rejected,
        ApplicationStatus::Offer,
    ]
    .into_iter()
    .map(|status| DistributionEntry {
        key: status.as_str(),
        label: status.label(),
        value: counts.get(status),
    })
    .filter(|entry| entry.value > 0)
    .collect()
}

/// Per-job-type counts, always all four types.
pub fn job_type_distribution(records: &[Application]) -> Vec<DistributionEntry> {
    JobType::ALL
        .iter()
        .map(|job_type| DistributionEntry {
            key: job_type.as_str(),
            label: job_type.label(),
            value: records.iter().filter(|a| a.job_type == *job_type).count(),
        })
        .collect()
}

/// Monthly status counts for the latest months that have data, oldest first.
pub fn timeline(records: &[Application]) -> Vec<TimelinePoint> {
    let mut by_month: BTreeMap<String, StatusCounts> = BTreeMap::new();
    for app in records {
        let key = format!("{:04}-{:02}", app.date_applied.year(), app.date_applied.month());
        by_month.entry(key).or_default().bump(app.status);
    }

    let skip = by_month.len().saturating_sub(TIMELINE_MONTHS);
    by_month
        .into_iter()
        .skip(skip)
        .map(|(month, counts)| TimelinePoint { month, counts })
        .collect()
}

pub fn compute(records: &[Application]) -> Stats {
    Stats {
        overview: overview(records),
        status_distribution: status_distribution(records),
        job_type_distribution: job_type_distribution(records),
        timeline: timeline(records),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::application::fixtures::application;

    #[test]
    fn test_overview_response_rate() {
        let records = vec![
            application("A", ApplicationStatus::Applied, "2025-01-02"),
            application("B", ApplicationStatus::Interview, "2025-01-06"),
            application("C", ApplicationStatus::Rejected, "2025-01-09"),
        ];
        let overview = overview(&records);
        assert_eq!(overview.total, 3);
        assert_eq!(overview.applied, 1);
        assert_eq!(overview.response_rate, 67);

        assert_eq!(super::overview(&[]), Overview::default());
    }

    #[test]
    fn test_distributions() {
        let mut contract = application("B", ApplicationStatus::Offer, "2025-01-06");
        contract.job_type = JobType::Contract;
        let records = vec![application("A", ApplicationStatus::Applied, "2025-01-02"), contract];

        let status = status_distribution(&records);
        let keys: Vec<_> = status.iter().map(|e| e.key).collect();
        assert_eq!(keys, vec!["applied", "offer"]);

        let job_types = job_type_distribution(&records);
        assert_eq!(job_types.len(), 4);
        assert_eq!(job_types[0].value, 1);
        assert_eq!(job_types[2].key, "contract");
        assert_eq!(job_types[2].value, 1);
        assert_eq!(job_types[3].value, 0);
    }

    #[test]
    fn test_timeline_keeps_last_six_months_sorted() {
        let records: Vec<_> = [
            "2024-12-03", "2024-05-01", "2024-08-09", "2024-07-01", "2024-09-15", "2024-10-20",
            "2024-11-11", "2024-11-12",
        ]
        .iter()
        .map(|d| application("X", ApplicationStatus::Applied, d))
        .collect();

        let points = timeline(&records);
        let months: Vec<_> = points.iter().map(|p| p.month.as_str()).collect();
        assert_eq!(
            months,
            vec!["2024-07", "2024-08", "2024-09", "2024-10", "2024-11", "2024-12"]
        );
        assert_eq!(points[4].counts.applied, 2);
    }
}

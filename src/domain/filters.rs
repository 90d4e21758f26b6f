// src/domain/filters.rs
//! Advanced filter: independent predicates combined with AND.

use serde::Deserialize;

use super::{Application, ApplicationStatus, JobSource, JobType};

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FilterCriteria {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub status: Option<ApplicationStatus>,
    #[serde(default)]
    pub job_type: Option<JobType>,
    #[serde(default)]
    pub source: Option<JobSource>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub salary_min: Option<i64>,
    #[serde(default)]
    pub salary_max: Option<i64>,
    #[serde(default)]
    pub only_favorites: bool,
}

impl FilterCriteria {
    pub fn is_empty(&self) -> bool {
        self.search().is_none()
            && self.status.is_none()
            && self.job_type.is_none()
            && self.source.is_none()
            && self.location().is_none()
            && self.salary_min().is_none()
            && self.salary_max().is_none()
            && !self.only_favorites
    }

    fn search(&self) -> Option<String> {
        active_text(&self.search)
    }

    fn location(&self) -> Option<String> {
        active_text(&self.location)
    }

    fn salary_min(&self) -> Option<i64> {
        self.salary_min.filter(|v| *v != 0)
    }

    fn salary_max(&self) -> Option<i64> {
        self.salary_max.filter(|v| *v != 0)
    }

    /// True iff `app` satisfies every active criterion.
    pub fn matches(&self, app: &Application) -> bool {
        if let Some(search) = self.search() {
            if !app.company.to_lowercase().contains(&search)
                && !app.job_title.to_lowercase().contains(&search)
            {
                return false;
            }
        }

        if self.status.is_some_and(|status| app.status != status) {
            return false;
        }

        if self.job_type.is_some_and(|job_type| app.job_type != job_type) {
            return false;
        }

        if self.source.is_some_and(|source| app.source != source) {
            return false;
        }

        if let Some(location) = self.location() {
            if !app.location.to_lowercase().contains(&location) {
                return false;
            }
        }

        // A stored salary of 0 means none was given.
        let offered_min = app.salary_min.filter(|v| *v != 0);
        let offered_max = app.salary_max.filter(|v| *v != 0);

        if let (Some(wanted_min), Some(offered_max)) = (self.salary_min(), offered_max) {
            if offered_max < wanted_min {
                return false;
            }
        }

        if let (Some(wanted_max), Some(offered_min)) = (self.salary_max(), offered_min) {
            if offered_min > wanted_max {
                return false;
            }
        }

        if self.only_favorites && !app.is_favorite {
            return false;
        }

        true
    }
}

fn active_text(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_lowercase)
}

pub fn apply_filters(records: &[Application], criteria: &FilterCriteria) -> Vec<Application> {
    if criteria.is_empty() {
        return records.to_vec();
    }

    records
        .iter()
        .filter(|app| criteria.matches(app))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::application::fixtures::application;

    fn sample() -> Vec<Application> {
        let mut acme = application("Acme", ApplicationStatus::Applied, "2025-01-03");
        acme.job_title = "Rust Engineer".to_string();
        acme.location = "Remote".to_string();
        acme.salary_min = Some(40000);
        acme.salary_max = Some(50000);

        let mut globex = application("Globex", ApplicationStatus::Offer, "2025-01-10");
        globex.job_type = JobType::Contract;
        globex.source = JobSource::Referral;
        globex.salary_min = Some(70000);
        globex.salary_max = Some(90000);
        globex.is_favorite = true;

        let mut initech = application("Initech", ApplicationStatus::Offer, "2025-01-12");
        initech.job_title = "Platform Engineer".to_string();
        initech.location = "Córdoba, AR".to_string();

        vec![acme, globex, initech]
    }

    fn companies(records: &[Application]) -> Vec<&str> {
        records.iter().map(|a| a.company.as_str()).collect()
    }

    #[test]
    fn test_empty_criteria_is_identity() {
        let records = sample();
        assert_eq!(apply_filters(&records, &FilterCriteria::default()), records);

        let blank = FilterCriteria {
            search: Some("   ".to_string()),
            location: Some(String::new()),
            salary_min: Some(0),
            ..Default::default()
        };
        assert!(blank.is_empty());
        assert_eq!(apply_filters(&records, &blank), records);
    }

    #[test]
    fn test_status_only() {
        let records = sample();
        let criteria = FilterCriteria {
            status: Some(ApplicationStatus::Offer),
            ..Default::default()
        };
        let result = apply_filters(&records, &criteria);
        assert!(result.iter().all(|a| a.status == ApplicationStatus::Offer));
        assert_eq!(companies(&result), vec!["Globex", "Initech"]);
    }

    #[test]
    fn test_search_matches_company_or_title() {
        let records = sample();
        let by_company = FilterCriteria {
            search: Some("GLOB".to_string()),
            ..Default::default()
        };
        assert_eq!(companies(&apply_filters(&records, &by_company)), vec!["Globex"]);

        let by_title = FilterCriteria {
            search: Some("platform".to_string()),
            ..Default::default()
        };
        assert_eq!(companies(&apply_filters(&records, &by_title)), vec!["Initech"]);
    }

    #[test]
    fn test_salary_overlap() {
        let records = sample();

        let too_high = FilterCriteria {
            salary_min: Some(60000),
            ..Default::default()
        };
        let result = apply_filters(&records, &too_high);
        assert!(!companies(&result).contains(&"Acme"));
        // No salary on record: the salary criterion does not apply.
        assert!(companies(&result).contains(&"Initech"));

        let reachable = FilterCriteria {
            salary_min: Some(40000),
            ..Default::default()
        };
        assert!(companies(&apply_filters(&records, &reachable)).contains(&"Acme"));

        let inclusive = FilterCriteria {
            salary_min: Some(50000),
            ..Default::default()
        };
        assert!(companies(&apply_filters(&records, &inclusive)).contains(&"Acme"));

        let mut unpaid = application("Hooli", ApplicationStatus::Applied, "2025-01-12");
        unpaid.salary_min = Some(0);
        unpaid.salary_max = Some(0);
        let zero_is_unset = apply_filters(&[unpaid], &reachable);
        assert_eq!(companies(&zero_is_unset), vec!["Hooli"]);

        let ceiling = FilterCriteria {
            salary_max: Some(60000),
            ..Default::default()
        };
        assert!(!companies(&apply_filters(&records, &ceiling)).contains(&"Globex"));
    }

    #[test]
    fn test_criteria_combine_with_and() {
        let records = sample();
        let criteria = FilterCriteria {
            status: Some(ApplicationStatus::Offer),
            job_type: Some(JobType::Contract),
            source: Some(JobSource::Referral),
            only_favorites: true,
            ..Default::default()
        };
        assert_eq!(companies(&apply_filters(&records, &criteria)), vec!["Globex"]);

        let location = FilterCriteria {
            location: Some("córdoba".to_string()),
            status: Some(ApplicationStatus::Applied),
            ..Default::default()
        };
        assert!(apply_filters(&records, &location).is_empty());
    }
}

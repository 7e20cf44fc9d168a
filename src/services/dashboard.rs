//! In-memory search, filter and sort over a bounded issue list.
//!
//! The admin dashboard works on the most recent issues only, so a plain
//! filter-then-sort pass is enough; there is no index behind it.

use crate::models::{IssueModel, IssueStatus};
use crate::services::issue::IssueRecord;
use std::cmp::Ordering;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    CreatedAt,
    UpdatedAt,
    Title,
    Status,
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" | "createdAt" => Ok(SortKey::CreatedAt),
            "updatedAt" => Ok(SortKey::UpdatedAt),
            "title" => Ok(SortKey::Title),
            "status" => Ok(SortKey::Status),
            other => Err(format!(
                "sortBy must be one of: createdAt, updatedAt, title, status (got '{}')",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "" | "desc" => Ok(SortOrder::Desc),
            other => Err(format!("sortOrder must be asc or desc (got '{}')", other)),
        }
    }
}

/// Exact status match, or everything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(IssueStatus),
}

impl FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" | "all" => Ok(StatusFilter::All),
            other => other.parse().map(StatusFilter::Only),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct IssueQuery {
    pub search: Option<String>,
    pub status: StatusFilter,
    pub sort_by: SortKey,
    pub sort_order: SortOrder,
}

/// Apply search, status filter and sort, in that order.
pub fn apply(records: Vec<IssueRecord>, query: &IssueQuery) -> Vec<IssueRecord> {
    let needle = query
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase);

    let mut filtered: Vec<IssueRecord> = records
        .into_iter()
        .filter(|r| needle.as_deref().map_or(true, |n| matches_search(&r.issue, n)))
        .filter(|r| match query.status {
            StatusFilter::All => true,
            StatusFilter::Only(status) => r.issue.status == status,
        })
        .collect();

    // Stable: records comparing equal keep their incoming order.
    filtered.sort_by(|a, b| {
        let ord = compare(&a.issue, &b.issue, query.sort_by);
        match query.sort_order {
            SortOrder::Asc => ord,
            SortOrder::Desc => ord.reverse(),
        }
    });

    filtered
}

/// `needle` must already be lowercase.
fn matches_search(issue: &IssueModel, needle: &str) -> bool {
    let contains = |field: &str| field.to_lowercase().contains(needle);

    contains(issue.report_id.as_str())
        || contains(issue.title.as_str())
        || issue.reporter_name.as_deref().is_some_and(contains)
        || issue.reporter_email.as_deref().is_some_and(contains)
}

fn compare(a: &IssueModel, b: &IssueModel, key: SortKey) -> Ordering {
    match key {
        SortKey::CreatedAt => a.created_at.cmp(&b.created_at),
        SortKey::UpdatedAt => a.updated_at.cmp(&b.updated_at),
        SortKey::Title => a.title.cmp(&b.title),
        SortKey::Status => a.status.as_str().cmp(b.status.as_str()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{IssueCategory, IssueUrgency};
    use chrono::NaiveDate;

    fn record(
        id: i32,
        report_id: &str,
        title: &str,
        status: IssueStatus,
        name: Option<&str>,
        email: Option<&str>,
        day: u32,
    ) -> IssueRecord {
        let at = NaiveDate::from_ymd_opt(2025, 3, day)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        IssueRecord {
            issue: IssueModel {
                id,
                report_id: report_id.to_string(),
                title: title.to_string(),
                description: "desc".to_string(),
                category: IssueCategory::Road,
                location: "Main St".to_string(),
                urgency: IssueUrgency::Medium,
                status,
                photo: None,
                reporter_name: name.map(str::to_string),
                reporter_email: email.map(str::to_string),
                reporter_phone: None,
                state: None,
                pincode: None,
                urgency_reason: None,
                created_at: at,
                updated_at: at,
            },
            updates: vec![],
        }
    }

    fn sample() -> Vec<IssueRecord> {
        vec![
            record(1, "CR-2025-000111", "Broken streetlight", IssueStatus::Submitted, Some("Asha Rao"), Some("asha@example.com"), 3),
            record(2, "CR-2025-000222", "Pothole near school", IssueStatus::Resolved, None, None, 1),
            record(3, "CR-2025-000333", "Garbage pile", IssueStatus::InProgress, Some("Vikram"), Some("VIK@mail.test"), 5),
            record(4, "CR-2025-000444", "pothole on ring road", IssueStatus::Submitted, None, Some("x@y.z"), 2),
        ]
    }

    fn ids(records: &[IssueRecord]) -> Vec<i32> {
        records.iter().map(|r| r.issue.id).collect()
    }

    #[test]
    fn default_query_sorts_newest_first() {
        let out = apply(sample(), &IssueQuery::default());
        assert_eq!(ids(&out), vec![3, 1, 4, 2]);
    }

    #[test]
    fn search_is_case_insensitive_over_any_field() {
        let q = IssueQuery {
            search: Some("POTHOLE".into()),
            ..Default::default()
        };
        let out = apply(sample(), &q);
        assert_eq!(ids(&out), vec![4, 2]);

        let by_email = IssueQuery {
            search: Some("vik@".into()),
            ..Default::default()
        };
        assert_eq!(ids(&apply(sample(), &by_email)), vec![3]);

        let by_id = IssueQuery {
            search: Some("000111".into()),
            ..Default::default()
        };
        assert_eq!(ids(&apply(sample(), &by_id)), vec![1]);
    }

    #[test]
    fn every_result_contains_the_term() {
        for term in ["a", "ro", "example", "cr-2025", "zzz"] {
            let q = IssueQuery {
                search: Some(term.into()),
                ..Default::default()
            };
            for r in apply(sample(), &q) {
                let i = &r.issue;
                let hay = [
                    Some(i.report_id.as_str()),
                    Some(i.title.as_str()),
                    i.reporter_name.as_deref(),
                    i.reporter_email.as_deref(),
                ];
                assert!(hay
                    .iter()
                    .flatten()
                    .any(|f| f.to_lowercase().contains(&term.to_lowercase())));
            }
        }
    }

    #[test]
    fn blank_search_keeps_everything() {
        let q = IssueQuery {
            search: Some("   ".into()),
            ..Default::default()
        };
        assert_eq!(apply(sample(), &q).len(), 4);
    }

    #[test]
    fn status_filter_is_exact() {
        let q = IssueQuery {
            status: StatusFilter::Only(IssueStatus::Submitted),
            ..Default::default()
        };
        assert_eq!(ids(&apply(sample(), &q)), vec![1, 4]);
    }

    #[test]
    fn title_sort_is_lexical() {
        let q = IssueQuery {
            sort_by: SortKey::Title,
            sort_order: SortOrder::Asc,
            ..Default::default()
        };
        let out = apply(sample(), &q);
        // Uppercase sorts before lowercase in byte order.
        assert_eq!(ids(&out), vec![1, 3, 2, 4]);
        for pair in out.windows(2) {
            assert!(pair[0].issue.title <= pair[1].issue.title);
        }
    }

    #[test]
    fn status_sort_uses_wire_names() {
        let q = IssueQuery {
            sort_by: SortKey::Status,
            sort_order: SortOrder::Desc,
            ..Default::default()
        };
        let out = apply(sample(), &q);
        let names: Vec<&str> = out.iter().map(|r| r.issue.status.as_str()).collect();
        assert_eq!(names, vec!["submitted", "submitted", "resolved", "in-progress"]);
        // Equal keys keep their incoming order.
        assert_eq!(ids(&out[..2]), vec![1, 4]);
    }

    #[test]
    fn sort_params_parse() {
        assert_eq!("".parse::<SortKey>(), Ok(SortKey::CreatedAt));
        assert_eq!("updatedAt".parse::<SortKey>(), Ok(SortKey::UpdatedAt));
        assert!("priority".parse::<SortKey>().is_err());
        assert_eq!("ASC".parse::<SortOrder>(), Ok(SortOrder::Asc));
        assert!("up".parse::<SortOrder>().is_err());
    }

    #[test]
    fn status_filter_parsing() {
        assert_eq!("all".parse::<StatusFilter>(), Ok(StatusFilter::All));
        assert_eq!("".parse::<StatusFilter>(), Ok(StatusFilter::All));
        assert_eq!(
            "in-progress".parse::<StatusFilter>(),
            Ok(StatusFilter::Only(IssueStatus::InProgress))
        );
        assert!("closed".parse::<StatusFilter>().is_err());
    }
}

//! History thinning for the monthly and yearly modes.

use std::collections::HashMap;

use chrono::{DateTime, Datelike};

use crate::platform::CommitRecord;

use super::types::SamplingMode;

/// Keep the most recent commit per calendar period.
///
/// Releases and tags pass through untouched and relative order is
/// preserved. Commits whose date cannot be parsed cannot be placed in a
/// period and are dropped outside [`SamplingMode::Full`].
pub fn sample_history(records: Vec<CommitRecord>, mode: SamplingMode) -> Vec<CommitRecord> {
    if mode == SamplingMode::Full {
        return records;
    }

    let period = |record: &CommitRecord| -> Option<(i32, u32)> {
        let date = DateTime::parse_from_rfc3339(&record.date).ok()?;
        Some(match mode {
            SamplingMode::Monthly => (date.year(), date.month()),
            _ => (date.year(), 0),
        })
    };

    // Index of the latest commit per period; ties go to the first seen.
    let mut latest: HashMap<(i32, u32), usize> = HashMap::new();
    for (index, record) in records.iter().enumerate() {
        if !record.is_commit() {
            continue;
        }
        let Some(key) = period(record) else {
            continue;
        };
        latest
            .entry(key)
            .and_modify(|best| {
                if records[*best].date < record.date {
                    *best = index;
                }
            })
            .or_insert(index);
    }

    records
        .into_iter()
        .enumerate()
        .filter(|(index, record)| {
            !record.is_commit() || period(record).is_some_and(|key| latest[&key] == *index)
        })
        .map(|(_, record)| record)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn commit(date: &str, sha: &str) -> CommitRecord {
        CommitRecord::commit("r", Some(date), Some("msg"), sha, None)
    }

    fn shas(records: &[CommitRecord]) -> Vec<&str> {
        records.iter().map(|r| r.sha.as_str()).collect()
    }

    fn history() -> Vec<CommitRecord> {
        vec![
            commit("2024-03-20T10:00:00Z", "mar-late"),
            commit("2024-03-02T10:00:00Z", "mar-early"),
            commit("2024-02-11T10:00:00Z", "feb"),
            commit("2023-12-31T23:59:59Z", "dec"),
            commit("2023-06-01T00:00:00Z", "jun"),
            CommitRecord::release("r", None, "v1", "mar-early", None),
            CommitRecord::tag("r", None, "v0", "jun", None),
        ]
    }

    #[test]
    fn full_mode_keeps_everything() {
        let records = sample_history(history(), SamplingMode::Full);
        assert_eq!(records.len(), 7);
    }

    #[test]
    fn monthly_keeps_latest_commit_per_month() {
        let records = sample_history(history(), SamplingMode::Monthly);
        assert_eq!(
            shas(&records),
            vec!["mar-late", "feb", "dec", "jun", "mar-early", "jun"]
        );
    }

    #[test]
    fn yearly_keeps_latest_commit_per_year() {
        let records = sample_history(history(), SamplingMode::Yearly);
        assert_eq!(shas(&records), vec!["mar-late", "dec", "mar-early", "jun"]);
    }

    #[test]
    fn latest_wins_regardless_of_api_order() {
        let records = vec![
            commit("2024-01-01T00:00:00Z", "old"),
            commit("2024-01-31T00:00:00Z", "new"),
        ];
        assert_eq!(shas(&sample_history(records, SamplingMode::Monthly)), vec!["new"]);
    }

    #[test]
    fn undated_commits_are_dropped_when_sampling() {
        let records = vec![
            CommitRecord::commit("r", None, Some("no date"), "x", None),
            commit("2024-01-01T00:00:00Z", "dated"),
        ];
        assert_eq!(
            shas(&sample_history(records.clone(), SamplingMode::Yearly)),
            vec!["dated"]
        );
        assert_eq!(sample_history(records, SamplingMode::Full).len(), 2);
    }

    #[test]
    fn sampling_mode_parses() {
        assert_eq!("Monthly".parse::<SamplingMode>(), Ok(SamplingMode::Monthly));
        assert_eq!("yearly".parse::<SamplingMode>(), Ok(SamplingMode::Yearly));
        assert!("weekly".parse::<SamplingMode>().is_err());
        assert_eq!(SamplingMode::default().to_string(), "full");
    }
}

use crate::kind::simplify_submission_kind;
use crate::types::{Dimension, Record, TurnaroundMeanRow, TurnaroundSummary};
use crate::util::{average, days_diff, median, round2};
use chrono::{Datelike, Duration, NaiveDate};
use std::collections::{BTreeMap, HashMap};

/// A reviewed record together with its turnaround in whole days.
#[derive(Debug, Clone, PartialEq)]
pub struct Turnaround<'a> {
    pub record: &'a Record,
    pub submitted_on: NaiveDate,
    pub reviewed_on: NaiveDate,
    pub days: i64,
}

/// Turnaround for every record that has both timestamps.
///
/// Both sides are truncated to the calendar date before subtracting, and a
/// review dated before its submission counts as zero days.
pub fn compute_turnaround(records: &[Record]) -> Vec<Turnaround<'_>> {
    records
        .iter()
        .filter_map(|record| {
            let submitted_on = record.submitted_at?.date();
            let reviewed_on = record.reviewed_at?.date();
            let days = days_diff(submitted_on, reviewed_on).max(0);
            Some(Turnaround {
                record,
                submitted_on,
                reviewed_on,
                days,
            })
        })
        .collect()
}

pub fn summarize(items: &[Turnaround<'_>]) -> TurnaroundSummary {
    let days: Vec<f64> = items.iter().map(|t| t.days as f64).collect();
    TurnaroundSummary {
        reviews: items.len(),
        mean_days: round2(average(&days)),
        median_days: round2(median(days.clone())),
        min_days: items.iter().map(|t| t.days).min().unwrap_or(0),
        max_days: items.iter().map(|t| t.days).max().unwrap_or(0),
    }
}

/// Number of reviews per turnaround value, ascending by days.
pub fn distribution(items: &[Turnaround<'_>]) -> Vec<(i64, usize)> {
    let mut counts: BTreeMap<i64, usize> = BTreeMap::new();
    for t in items {
        *counts.entry(t.days).or_insert(0) += 1;
    }
    counts.into_iter().collect()
}

/// Mean turnaround per category, highest mean first. Records without a
/// value for the dimension are left out of every group.
pub fn mean_by_dimension(items: &[Turnaround<'_>], dimension: Dimension) -> Vec<TurnaroundMeanRow> {
    let mut groups: HashMap<String, Vec<f64>> = HashMap::new();
    for t in items {
        let key = match dimension {
            Dimension::SimplifiedKind | Dimension::SubmissionKind => t
                .record
                .submission_kind
                .as_deref()
                .map(simplify_submission_kind),
            other => other.value(t.record),
        };
        if let Some(key) = key {
            groups.entry(key).or_default().push(t.days as f64);
        }
    }
    let mut rows: Vec<TurnaroundMeanRow> = groups
        .into_iter()
        .map(|(group, days)| TurnaroundMeanRow {
            group,
            reviews: days.len(),
            mean_days: round2(average(&days)),
        })
        .collect();
    rows.sort_by(|a, b| {
        b.mean_days
            .partial_cmp(&a.mean_days)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.group.cmp(&b.group))
    });
    rows
}

/// Mean turnaround per submission week (Monday start), chronological.
/// Labels read `S{iso week}-{mm}-{yy}` of the Monday.
pub fn mean_by_week(items: &[Turnaround<'_>]) -> Vec<TurnaroundMeanRow> {
    mean_by_period(items, |d| {
        let monday = d - Duration::days(d.weekday().num_days_from_monday() as i64);
        (monday, monday.format("S%V-%m-%y").to_string())
    })
}

/// Mean turnaround per submission month, chronological, labeled `mm-yy`.
pub fn mean_by_month(items: &[Turnaround<'_>]) -> Vec<TurnaroundMeanRow> {
    mean_by_period(items, |d| {
        let first = d.with_day(1).unwrap_or(d);
        (first, first.format("%m-%y").to_string())
    })
}

fn mean_by_period<F>(items: &[Turnaround<'_>], period: F) -> Vec<TurnaroundMeanRow>
where
    F: Fn(NaiveDate) -> (NaiveDate, String),
{
    let mut groups: BTreeMap<NaiveDate, (String, Vec<f64>)> = BTreeMap::new();
    for t in items {
        let (start, label) = period(t.submitted_on);
        groups
            .entry(start)
            .or_insert_with(|| (label, Vec::new()))
            .1
            .push(t.days as f64);
    }
    groups
        .into_values()
        .map(|(group, days)| TurnaroundMeanRow {
            group,
            reviews: days.len(),
            mean_days: round2(average(&days)),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ProcessType;
    use chrono::NaiveDateTime;

    fn ts(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn rec(sub: Option<NaiveDateTime>, rev: Option<NaiveDateTime>, code: &'static str) -> Record {
        Record {
            submitted_at: sub,
            reviewed_at: rev,
            process_type: ProcessType::Recognized(code),
            submission_kind: Some("1º envio (Primeira vez)".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn time_of_day_does_not_shift_day_count() {
        // late submission, early review: still 8 calendar days
        let rows = vec![rec(Some(ts(2024, 1, 2, 23)), Some(ts(2024, 1, 10, 1)), "LI")];
        let out = compute_turnaround(&rows);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].days, 8);
    }

    #[test]
    fn missing_timestamps_are_dropped_and_inversions_clamped() {
        let rows = vec![
            rec(Some(ts(2024, 1, 2, 9)), None, "LI"),
            rec(None, Some(ts(2024, 1, 2, 9)), "LI"),
            rec(Some(ts(2024, 1, 5, 9)), Some(ts(2024, 1, 3, 9)), "LO"),
        ];
        let out = compute_turnaround(&rows);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].days, 0);
    }

    #[test]
    fn grouped_means_are_rounded() {
        let rows = vec![
            rec(Some(ts(2024, 1, 1, 9)), Some(ts(2024, 1, 2, 9)), "LI"),
            rec(Some(ts(2024, 1, 1, 9)), Some(ts(2024, 1, 3, 9)), "LI"),
            rec(Some(ts(2024, 1, 1, 9)), Some(ts(2024, 1, 3, 9)), "LI"),
            rec(Some(ts(2024, 2, 1, 9)), Some(ts(2024, 2, 11, 9)), "LO"),
        ];
        let items = compute_turnaround(&rows);
        let by_type = mean_by_dimension(&items, Dimension::ProcessType);
        assert_eq!(by_type[0].group, "LO");
        assert_eq!(by_type[0].mean_days, 10.0);
        assert_eq!(by_type[1].mean_days, 1.67);

        let by_kind = mean_by_dimension(&items, Dimension::SimplifiedKind);
        assert_eq!(by_kind.len(), 1);
        assert_eq!(by_kind[0].group, "1º Envio");

        let by_month = mean_by_month(&items);
        assert_eq!(by_month.len(), 2);
        assert_eq!(by_month[0].group, "01-24");
        assert_eq!(by_month[1].group, "02-24");

        let by_week = mean_by_week(&items);
        assert_eq!(by_week[0].group, "S01-01-24");
        // 2024-02-01 is a Thursday; its week starts Monday 29/01
        assert_eq!(by_week[1].group, "S05-01-24");

        let summary = summarize(&items);
        assert_eq!(summary.reviews, 4);
        assert_eq!(summary.median_days, 2.0);
        assert_eq!(summary.max_days, 10);
        assert_eq!(distribution(&items), vec![(1, 1), (2, 2), (10, 1)]);
    }
}

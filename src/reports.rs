use crate::kind::{simplify_submission_kind, SubmissionKind};
use crate::types::{
    CorrectionRow, CountRow, CrossCountRow, Dimension, Record, RepeatSubmissionRow, SeriesRow,
    TimeBucket, TimestampColumn,
};
use crate::util::{days_diff, format_number, linear_trend};
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap, HashSet};

pub const CORRECTION_STATUS: &str = "Correção";

/// Frequency of each value of `dimension`, most frequent first.
pub fn count_by(data: &[Record], dimension: Dimension) -> Vec<CountRow> {
    let mut map: HashMap<String, usize> = HashMap::new();
    for r in data {
        if let Some(v) = dimension.value(r) {
            *map.entry(v).or_insert(0) += 1;
        }
    }
    let total: usize = map.values().sum();
    let mut rows: Vec<CountRow> = map
        .into_iter()
        .map(|(value, count)| CountRow {
            value,
            count,
            share_pct: format_number(count as f64 * 100.0 / total.max(1) as f64, 2),
        })
        .collect();
    rows.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.value.cmp(&b.value)));
    rows
}

/// Long-form contingency table, e.g. reviewer × submission kind.
pub fn cross_counts(data: &[Record], rows: Dimension, columns: Dimension) -> Vec<CrossCountRow> {
    let mut map: BTreeMap<(String, String), usize> = BTreeMap::new();
    for r in data {
        if let (Some(row), Some(column)) = (rows.value(r), columns.value(r)) {
            *map.entry((row, column)).or_insert(0) += 1;
        }
    }
    map.into_iter()
        .map(|((row, column), count)| CrossCountRow { row, column, count })
        .collect()
}

/// Monthly count per simplified submission kind, chronological within each
/// kind, with a least-squares trend value for every point.
pub fn monthly_series(data: &[Record], column: TimestampColumn) -> Vec<SeriesRow> {
    series(data, column, |b| {
        ((b.year, b.month), format!("{:02}/{}", b.month, b.year))
    })
}

/// Weekly variant of `monthly_series`, keyed on ISO week.
pub fn weekly_series(data: &[Record], column: TimestampColumn) -> Vec<SeriesRow> {
    series(data, column, |b| {
        ((b.year, b.week), format!("{}-S{:02}", b.year, b.week))
    })
}

/// Weekly series restricted to new work (first submissions and priorities),
/// which is what the throughput charts plot.
pub fn weekly_new_work(data: &[Record], column: TimestampColumn) -> Vec<SeriesRow> {
    let new_work: Vec<Record> = data
        .iter()
        .filter(|r| {
            r.submission_kind
                .as_deref()
                .is_some_and(|k| SubmissionKind::classify(k).is_new_work())
        })
        .cloned()
        .collect();
    weekly_series(&new_work, column)
}

fn series<F>(data: &[Record], column: TimestampColumn, period: F) -> Vec<SeriesRow>
where
    F: Fn(TimeBucket) -> ((i32, u32), String),
{
    #[derive(Default)]
    struct Acc {
        points: BTreeMap<(i32, u32), (String, usize)>,
    }
    let mut map: BTreeMap<String, Acc> = BTreeMap::new();
    for r in data {
        let (Some(bucket), Some(kind)) = (column.bucket(r), r.submission_kind.as_deref()) else {
            continue;
        };
        let (key, label) = period(bucket);
        let e = map
            .entry(simplify_submission_kind(kind))
            .or_default()
            .points
            .entry(key)
            .or_insert_with(|| (label, 0));
        e.1 += 1;
    }

    let mut rows = Vec::new();
    for (kind, acc) in map {
        let counts: Vec<f64> = acc.points.values().map(|(_, c)| *c as f64).collect();
        let trend = linear_trend(&counts);
        for ((label, count), t) in acc.points.into_values().zip(trend) {
            rows.push(SeriesRow {
                period: label,
                kind: kind.clone(),
                count,
                trend: format_number(t, 2),
            });
        }
    }
    rows
}

/// Process groups submitted more than once, one row per group and analyst.
pub fn repeat_submissions(data: &[Record]) -> Vec<RepeatSubmissionRow> {
    let mut seen: HashSet<(String, String)> = HashSet::new();
    let mut rows: Vec<RepeatSubmissionRow> = Vec::new();
    for r in data {
        let Some(code) = r.group_code.as_ref() else {
            continue;
        };
        if r.group_count < 2 {
            continue;
        }
        let analyst = r.analyst.clone().unwrap_or_default();
        if !seen.insert((code.clone(), analyst.clone())) {
            continue;
        }
        rows.push(RepeatSubmissionRow {
            group_code: code.clone(),
            analyst,
            group_count: r.group_count,
            group_count_by_analyst: r.group_count_by_analyst,
        });
    }
    rows.sort_by(|a, b| {
        b.group_count
            .cmp(&a.group_count)
            .then_with(|| a.group_code.cmp(&b.group_code))
            .then_with(|| b.group_count_by_analyst.cmp(&a.group_count_by_analyst))
    });
    rows
}

/// Reviews sent back for correction, with how long ago the review happened.
/// Sorted by reviewer, then the oldest reviews first.
pub fn pending_corrections(data: &[Record], today: NaiveDate) -> Vec<CorrectionRow> {
    let mut rows: Vec<CorrectionRow> = data
        .iter()
        .filter(|r| r.post_review_status.as_deref() == Some(CORRECTION_STATUS))
        .filter_map(|r| {
            let reviewed_on = r.reviewed_at?.date();
            Some(CorrectionRow {
                reviewer: r.reviewer.clone().unwrap_or_default(),
                analyst: r.analyst.clone().unwrap_or_default(),
                process_identifier: r.process_identifier.clone().unwrap_or_default(),
                reviewed_on,
                days_since_review: days_diff(reviewed_on, today),
            })
        })
        .collect();
    rows.sort_by(|a, b| {
        a.reviewer
            .cmp(&b.reviewer)
            .then_with(|| b.days_since_review.cmp(&a.days_since_review))
    });
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(kind: &str, month: u32, reviewer: &str) -> Record {
        Record {
            submission_kind: Some(kind.to_string()),
            reviewer: Some(reviewer.to_string()),
            submission_bucket: Some(TimeBucket { year: 2024, month, week: month * 4 }),
            ..Default::default()
        }
    }

    #[test]
    fn counts_sorted_by_frequency() {
        let rows = vec![
            rec("Prioridades", 1, "R1"),
            rec("1º envio (Primeira vez)", 1, "R1"),
            rec("Prioridades", 2, "R2"),
        ];
        let counts = count_by(&rows, Dimension::SimplifiedKind);
        assert_eq!(counts[0].value, "Prioridades");
        assert_eq!(counts[0].count, 2);
        assert_eq!(counts[0].share_pct, "66.67");
        assert_eq!(counts[1].value, "1º Envio");

        let cross = cross_counts(&rows, Dimension::Reviewer, Dimension::SimplifiedKind);
        assert_eq!(cross.len(), 3);
        assert_eq!((cross[0].row.as_str(), cross[0].column.as_str(), cross[0].count), ("R1", "1º Envio", 1));
    }

    #[test]
    fn monthly_series_has_trend_per_kind() {
        let rows = vec![
            rec("Prioridades", 1, "R1"),
            rec("Prioridades", 2, "R1"),
            rec("Prioridades", 2, "R1"),
            rec("Prioridades", 3, "R1"),
            rec("Prioridades", 3, "R1"),
            rec("Prioridades", 3, "R1"),
        ];
        let series = monthly_series(&rows, TimestampColumn::Submission);
        let periods: Vec<&str> = series.iter().map(|s| s.period.as_str()).collect();
        assert_eq!(periods, vec!["01/2024", "02/2024", "03/2024"]);
        let trend: Vec<&str> = series.iter().map(|s| s.trend.as_str()).collect();
        assert_eq!(trend, vec!["1.00", "2.00", "3.00"]);
        assert!(weekly_series(&rows, TimestampColumn::Review).is_empty());
    }

    #[test]
    fn new_work_series_skips_resubmissions_and_cancellations() {
        let rows = vec![
            rec("1º envio (Primeira vez)", 1, "R1"),
            rec("Prioridades", 1, "R1"),
            rec("Reenvio após correções", 1, "R1"),
            rec("Prioridades - cancelado", 1, "R1"),
        ];
        let series = weekly_new_work(&rows, TimestampColumn::Submission);
        let kinds: Vec<&str> = series.iter().map(|s| s.kind.as_str()).collect();
        assert_eq!(kinds, vec!["1º Envio", "Prioridades"]);
        assert!(series.iter().all(|s| s.count == 1 && s.period == "2024-S04"));
    }

    #[test]
    fn corrections_list_oldest_first_per_reviewer() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let mut a = rec("Prioridades", 1, "R1");
        a.post_review_status = Some(CORRECTION_STATUS.to_string());
        a.reviewed_at = NaiveDate::from_ymd_opt(2024, 2, 20).and_then(|d| d.and_hms_opt(0, 0, 0));
        let mut b = a.clone();
        b.reviewed_at = NaiveDate::from_ymd_opt(2024, 2, 1).and_then(|d| d.and_hms_opt(0, 0, 0));
        let mut c = a.clone();
        c.post_review_status = Some("Aprovado".to_string());

        let rows = pending_corrections(&[a, b, c], today);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].days_since_review, 29);
        assert_eq!(rows[1].days_since_review, 10);
    }

    #[test]
    fn repeats_need_more_than_one_submission() {
        let mut a = rec("Prioridades", 1, "R1");
        a.group_code = Some("123456".to_string());
        a.group_count = 2;
        a.group_count_by_analyst = 2;
        let mut b = a.clone();
        b.group_code = Some("654321".to_string());
        b.group_count = 1;
        let rows = repeat_submissions(&[a.clone(), a, b]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].group_code, "123456");
    }
}

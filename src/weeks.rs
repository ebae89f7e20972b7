// Week multiselect options.
use crate::types::{Record, TimestampColumn, WeekRange};
use chrono::{Duration, NaiveDate, Weekday};
use log::warn;
use std::collections::BTreeSet;

/// Labeled week ranges for the `(year, week)` pairs present in `records`,
/// most recent first. Pairs that do not name a real ISO week are skipped.
pub fn format_week_ranges(records: &[Record], column: TimestampColumn) -> Vec<WeekRange> {
    let pairs: BTreeSet<(i32, u32)> = records
        .iter()
        .filter_map(|r| column.bucket(r))
        .map(|b| (b.year, b.week))
        .collect();
    label_pairs(pairs)
}

/// Review-side variant: the year comes from the hand-typed year column,
/// coerced to a number (rows where it is not numeric are dropped), and the
/// week from the review timestamp. The pairs line up with what
/// `PeriodSource::ReviewLog` filters on.
pub fn format_review_week_ranges(records: &[Record]) -> Vec<WeekRange> {
    let pairs: BTreeSet<(i32, u32)> = records
        .iter()
        .filter_map(|r| {
            let year = r.typed_review_year()?;
            let week = r.review_bucket?.week;
            Some((year, week))
        })
        .collect();
    label_pairs(pairs)
}

pub fn week_label(year: i32, week: u32) -> Option<String> {
    let start = NaiveDate::from_isoywd_opt(year, week, Weekday::Mon)?;
    let end = start + Duration::days(6);
    Some(format!(
        "Semana {} - {} a {}",
        week,
        start.format("%d/%m/%y"),
        end.format("%d/%m/%y")
    ))
}

fn label_pairs(pairs: BTreeSet<(i32, u32)>) -> Vec<WeekRange> {
    let mut out = Vec::new();
    for (year, week) in pairs.into_iter().rev() {
        if year == 0 || week == 0 {
            continue;
        }
        match week_label(year, week) {
            Some(label) => out.push(WeekRange { year, week, label }),
            None => warn!("week {week} of year {year} is not a valid ISO week; skipped"),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TimeBucket;

    fn with_bucket(year: i32, week: u32) -> Record {
        Record {
            submission_bucket: Some(TimeBucket { year, month: 1, week }),
            ..Default::default()
        }
    }

    #[test]
    fn first_week_of_2024() {
        let label = week_label(2024, 1).unwrap();
        assert_eq!(label, "Semana 1 - 01/01/24 a 07/01/24");
    }

    #[test]
    fn sorted_most_recent_first_and_deduplicated() {
        let rows = vec![with_bucket(2023, 50), with_bucket(2024, 2), with_bucket(2024, 10), with_bucket(2024, 2)];
        let weeks: Vec<(i32, u32)> = format_week_ranges(&rows, TimestampColumn::Submission)
            .into_iter()
            .map(|w| (w.year, w.week))
            .collect();
        assert_eq!(weeks, vec![(2024, 10), (2024, 2), (2023, 50)]);
    }

    #[test]
    fn invalid_and_zero_weeks_are_skipped() {
        // 2023 has no ISO week 53
        let rows = vec![with_bucket(2023, 53), with_bucket(0, 5), with_bucket(2024, 0), with_bucket(2020, 53)];
        let weeks = format_week_ranges(&rows, TimestampColumn::Submission);
        assert_eq!(weeks.len(), 1);
        assert_eq!((weeks[0].year, weeks[0].week), (2020, 53));
        assert!(weeks[0].label.starts_with("Semana 53 - 28/12/20"));
    }

    #[test]
    fn late_december_lists_under_week_one_of_its_calendar_year() {
        let rows = vec![with_bucket(2024, 1)];
        let dec = crate::buckets::bucket_of(
            NaiveDate::from_ymd_opt(2024, 12, 30).unwrap().and_hms_opt(9, 0, 0).unwrap(),
        );
        assert_eq!((dec.year, dec.week), (2024, 1));
        let weeks = format_week_ranges(&rows, TimestampColumn::Submission);
        assert_eq!(weeks[0].label, "Semana 1 - 01/01/24 a 07/01/24");
    }

    #[test]
    fn review_side_drops_non_numeric_years() {
        let bucket = Some(TimeBucket { year: 2024, month: 2, week: 6 });
        let rows = vec![
            Record { review_year_raw: Some("2024".into()), review_bucket: bucket, ..Default::default() },
            Record { review_year_raw: Some("n/a".into()), review_bucket: bucket, ..Default::default() },
            Record { review_year_raw: Some("2024.0".into()), review_bucket: None, ..Default::default() },
        ];
        let weeks = format_review_week_ranges(&rows);
        assert_eq!(weeks.len(), 1);
        assert_eq!(weeks[0].label, "Semana 6 - 05/02/24 a 11/02/24");
    }
}

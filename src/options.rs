// Option lists and default picks for the view-layer filter widgets.
use crate::filter::Selection;
use crate::types::{Dimension, Record, TimestampColumn};
use std::collections::BTreeSet;

/// Distinct years present in the chosen bucket, newest first. Unknown
/// buckets never appear.
pub fn available_years(records: &[Record], column: TimestampColumn) -> Vec<i32> {
    let years: BTreeSet<i32> = records
        .iter()
        .filter_map(|r| column.bucket(r))
        .map(|b| b.year)
        .filter(|y| *y != 0)
        .collect();
    years.into_iter().rev().collect()
}

pub fn available_months(records: &[Record], column: TimestampColumn) -> Vec<u32> {
    let months: BTreeSet<u32> = records
        .iter()
        .filter_map(|r| column.bucket(r))
        .map(|b| b.month)
        .filter(|m| *m != 0)
        .collect();
    months.into_iter().rev().collect()
}

/// Years from the hand-typed review year column, numeric values only.
/// `PeriodSource::ReviewLog` filters on the same values.
pub fn available_review_years(records: &[Record]) -> Vec<i32> {
    distinct_desc(records.iter().filter_map(Record::typed_review_year))
}

pub fn available_review_months(records: &[Record]) -> Vec<u32> {
    distinct_desc(records.iter().filter_map(Record::typed_review_month))
}

fn distinct_desc<T: Ord>(values: impl Iterator<Item = T>) -> Vec<T> {
    let values: BTreeSet<T> = values.collect();
    values.into_iter().rev().collect()
}

/// Sorted distinct non-missing values of a categorical column.
pub fn distinct_values(records: &[Record], dimension: Dimension) -> Vec<String> {
    let values: BTreeSet<String> = records.iter().filter_map(|r| dimension.value(r)).collect();
    values.into_iter().collect()
}

/// Pre-select the current period when the data has it, otherwise show
/// everything.
pub fn default_selection<T: Ord + Copy>(options: &[T], current: T) -> Selection<T> {
    if options.contains(&current) {
        Selection::single(current)
    } else {
        Selection::All
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TimeBucket;

    fn rec(year: i32, month: u32, analyst: Option<&str>) -> Record {
        Record {
            analyst: analyst.map(str::to_string),
            submission_bucket: Some(TimeBucket { year, month, week: 1 }),
            ..Default::default()
        }
    }

    #[test]
    fn years_and_months_descending_without_unknowns() {
        let rows = vec![rec(2023, 5, None), rec(2024, 1, None), rec(2024, 5, None), Record::default()];
        assert_eq!(available_years(&rows, TimestampColumn::Submission), vec![2024, 2023]);
        assert_eq!(available_months(&rows, TimestampColumn::Submission), vec![5, 1]);
        assert!(available_years(&rows, TimestampColumn::Review).is_empty());
    }

    #[test]
    fn review_years_coerce_text() {
        let rows = vec![
            Record { review_year_raw: Some("2024".into()), ..Default::default() },
            Record { review_year_raw: Some("2023.0".into()), ..Default::default() },
            Record { review_year_raw: Some("-".into()), ..Default::default() },
            Record { review_year_raw: Some("0".into()), ..Default::default() },
        ];
        assert_eq!(available_review_years(&rows), vec![2024, 2023]);
    }

    #[test]
    fn review_months_coerce_text() {
        let rows = vec![
            Record { review_month_raw: Some("3".into()), ..Default::default() },
            Record { review_month_raw: Some("11.0".into()), ..Default::default() },
            Record { review_month_raw: Some("março".into()), ..Default::default() },
            Record { review_month_raw: Some("-1".into()), ..Default::default() },
            Record { review_month_raw: Some("3".into()), ..Default::default() },
        ];
        assert_eq!(available_review_months(&rows), vec![11, 3]);
    }

    #[test]
    fn distinct_values_skip_missing() {
        let rows = vec![rec(2024, 1, Some("Bia")), rec(2024, 1, Some("Ana")), rec(2024, 1, None), rec(2024, 1, Some("Ana"))];
        assert_eq!(distinct_values(&rows, Dimension::Analyst), vec!["Ana", "Bia"]);
    }

    #[test]
    fn default_is_current_period_when_present() {
        assert_eq!(default_selection(&[2024, 2023], 2024), Selection::single(2024));
        assert_eq!(default_selection(&[2023], 2024), Selection::All);
    }
}

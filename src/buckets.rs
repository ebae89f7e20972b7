use crate::types::{Record, TimeBucket, TimestampColumn};
use chrono::{Datelike, NaiveDateTime};

/// Calendar year paired with the ISO week number, the way the spreadsheet
/// reads them. Late-December days in ISO week 1 (2024-12-30) therefore share
/// `(2024, 1)` with the first days of January 2024.
pub fn bucket_of(ts: NaiveDateTime) -> TimeBucket {
    TimeBucket {
        year: ts.year(),
        month: ts.month(),
        week: ts.iso_week().week(),
    }
}

/// Derive year/month/ISO-week buckets from `column`. Records whose timestamp
/// is missing get no bucket; `TimeBucket::or_zero` turns that into the `0`
/// sentinel when a view needs plain integers.
pub fn annotate_time_buckets(records: &[Record], column: TimestampColumn) -> Vec<Record> {
    records
        .iter()
        .map(|r| {
            let bucket = column.timestamp(r).map(bucket_of);
            let mut out = r.clone();
            match column {
                TimestampColumn::Submission => out.submission_bucket = bucket,
                TimestampColumn::Review => out.review_bucket = bucket,
            }
            out
        })
        .collect()
}

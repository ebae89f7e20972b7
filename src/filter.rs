//! Cascading row filters for the dashboard views.
//!
//! Every dimension is an independent row predicate and the configuration is
//! their conjunction, so the order of application never matters and applying
//! the same configuration twice is the same as applying it once.

use crate::kind::is_canceled;
use crate::types::{Record, TimestampColumn};
use log::debug;
use std::collections::BTreeSet;

/// One entry picked in a multiselect widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Choice<T> {
    All,
    Value(T),
}

/// The effective filter for one dimension.
///
/// `Only` with an empty set matches nothing, the same as a multiselect with
/// every entry removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection<T: Ord> {
    All,
    Only(BTreeSet<T>),
}

impl<T: Ord> Default for Selection<T> {
    fn default() -> Self {
        Selection::All
    }
}

impl<T: Ord> Selection<T> {
    /// Build a selection from widget choices. `All` anywhere in the list
    /// disables the dimension, whatever else was picked alongside it.
    pub fn from_choices<I>(choices: I) -> Self
    where
        I: IntoIterator<Item = Choice<T>>,
    {
        let mut values = BTreeSet::new();
        for choice in choices {
            match choice {
                Choice::All => return Selection::All,
                Choice::Value(v) => {
                    values.insert(v);
                }
            }
        }
        Selection::Only(values)
    }

    pub fn only<I: IntoIterator<Item = T>>(values: I) -> Self {
        Selection::Only(values.into_iter().collect())
    }

    pub fn single(value: T) -> Self {
        Selection::only([value])
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Selection::All)
    }

    /// Missing values only pass when the dimension is disabled.
    pub fn matches(&self, value: Option<&T>) -> bool {
        match self {
            Selection::All => true,
            Selection::Only(set) => value.is_some_and(|v| set.contains(v)),
        }
    }
}

impl Selection<String> {
    fn matches_str(&self, value: Option<&str>) -> bool {
        match self {
            Selection::All => true,
            Selection::Only(set) => value.is_some_and(|v| set.contains(v)),
        }
    }
}

/// Where the year, month and week dimensions take their values from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodSource {
    /// Buckets derived from one of the timestamp columns.
    Bucket(TimestampColumn),
    /// The reviewer view: year and month as typed into the review log
    /// (`ANO`/`MÊS`), week from the review timestamp. These are the same
    /// values `available_review_years` and `format_review_week_ranges` offer.
    ReviewLog,
}

impl Default for PeriodSource {
    fn default() -> Self {
        PeriodSource::Bucket(TimestampColumn::Submission)
    }
}

impl PeriodSource {
    pub fn year(self, r: &Record) -> Option<i32> {
        match self {
            PeriodSource::Bucket(column) => column.bucket(r).map(|b| b.year),
            PeriodSource::ReviewLog => r.typed_review_year(),
        }
    }

    pub fn month(self, r: &Record) -> Option<u32> {
        match self {
            PeriodSource::Bucket(column) => column.bucket(r).map(|b| b.month),
            PeriodSource::ReviewLog => r.typed_review_month(),
        }
    }

    pub fn week(self, r: &Record) -> Option<u32> {
        let column = match self {
            PeriodSource::Bucket(column) => column,
            PeriodSource::ReviewLog => TimestampColumn::Review,
        };
        column.bucket(r).map(|b| b.week)
    }
}

/// Filter state for one view, passed explicitly into the pipeline.
///
/// `period` picks what the year/month/week dimensions read: submission
/// views filter on when items were sent, review views on when they were
/// reviewed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterConfig {
    pub period: PeriodSource,
    pub year: Selection<i32>,
    pub month: Selection<u32>,
    pub week: Selection<u32>,
    pub submission_kind: Selection<String>,
    pub process_type: Selection<String>,
    pub technical_info: Selection<String>,
    pub analyst: Selection<String>,
    pub reviewer: Selection<String>,
}

impl FilterConfig {
    pub fn matches(&self, r: &Record) -> bool {
        self.year.matches(self.period.year(r).as_ref())
            && self.month.matches(self.period.month(r).as_ref())
            && self.week.matches(self.period.week(r).as_ref())
            && self.submission_kind.matches_str(r.submission_kind.as_deref())
            && self.process_type.matches_str(Some(r.process_type.as_str()))
            && self.technical_info.matches_str(r.technical_info.as_deref())
            && self.analyst.matches_str(r.analyst.as_deref())
            && self.reviewer.matches_str(r.reviewer.as_deref())
    }
}

pub fn is_canceled_record(r: &Record) -> bool {
    r.submission_kind.as_deref().is_some_and(is_canceled)
}

pub fn drop_canceled(records: &[Record]) -> Vec<Record> {
    records
        .iter()
        .filter(|r| !is_canceled_record(r))
        .cloned()
        .collect()
}

/// Working subset for a view: canceled items are always removed, then every
/// configured dimension is applied.
pub fn apply_filters(records: &[Record], filters: &FilterConfig) -> Vec<Record> {
    let out: Vec<Record> = records
        .iter()
        .filter(|r| !is_canceled_record(r) && filters.matches(r))
        .cloned()
        .collect();
    debug!("filters kept {} of {} records", out.len(), records.len());
    out
}

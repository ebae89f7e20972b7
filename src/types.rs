use crate::util::parse_i32_safe;
use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::fmt;
use tabled::Tabled;

/// One row of the uploaded survey export.
///
/// Raw fields come straight from the CSV (trimmed, empty cells become `None`).
/// The derived fields are filled in by the annotators in `process` and
/// `buckets` and are never read from the input.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    pub process_identifier: Option<String>,
    pub submitted_at: Option<NaiveDateTime>,
    pub reviewed_at: Option<NaiveDateTime>,
    pub submission_kind: Option<String>,
    pub technical_info: Option<String>,
    pub analyst: Option<String>,
    pub reviewer: Option<String>,
    pub post_review_status: Option<String>,
    pub enterprise_type: Option<String>,
    /// Manually typed review year/month, kept as text; coerced on use.
    pub review_year_raw: Option<String>,
    pub review_month_raw: Option<String>,

    pub process_type: ProcessType,
    pub group_code: Option<String>,
    pub group_count: usize,
    pub group_count_by_analyst: usize,
    pub submission_bucket: Option<TimeBucket>,
    pub review_bucket: Option<TimeBucket>,
}

impl Record {
    /// Review year as typed into the log; non-numeric and zero count as missing.
    pub fn typed_review_year(&self) -> Option<i32> {
        parse_i32_safe(self.review_year_raw.as_deref()).filter(|y| *y != 0)
    }

    pub fn typed_review_month(&self) -> Option<u32> {
        parse_i32_safe(self.review_month_raw.as_deref())
            .and_then(|m| u32::try_from(m).ok())
            .filter(|m| *m != 0)
    }
}

/// Canonical process-type acronym, or `Other` when none could be extracted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ProcessType {
    Recognized(&'static str),
    #[default]
    Other,
}

impl ProcessType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessType::Recognized(code) => code,
            ProcessType::Other => "Other",
        }
    }
}

impl fmt::Display for ProcessType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Calendar buckets derived from a timestamp. `week` is the ISO-8601 week
/// number and `year` the calendar year, matching how the survey team reads
/// their spreadsheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimeBucket {
    pub year: i32,
    pub month: u32,
    pub week: u32,
}

impl TimeBucket {
    /// Flatten an optional bucket into the `(year, month, week)` integers
    /// shown to users, with `0` standing for "unknown".
    pub fn or_zero(bucket: Option<TimeBucket>) -> (i32, u32, u32) {
        bucket.map_or((0, 0, 0), |b| (b.year, b.month, b.week))
    }
}

/// Which timestamp a time-based operation is keyed on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TimestampColumn {
    #[default]
    Submission,
    Review,
}

impl TimestampColumn {
    pub fn timestamp(self, r: &Record) -> Option<NaiveDateTime> {
        match self {
            TimestampColumn::Submission => r.submitted_at,
            TimestampColumn::Review => r.reviewed_at,
        }
    }

    pub fn bucket(self, r: &Record) -> Option<TimeBucket> {
        match self {
            TimestampColumn::Submission => r.submission_bucket,
            TimestampColumn::Review => r.review_bucket,
        }
    }
}

/// Categorical columns that views group by and filter on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    SubmissionKind,
    SimplifiedKind,
    ProcessType,
    TechnicalInfo,
    Analyst,
    Reviewer,
    EnterpriseType,
    GroupCode,
}

impl Dimension {
    pub fn value(self, r: &Record) -> Option<String> {
        match self {
            Dimension::SubmissionKind => r.submission_kind.clone(),
            Dimension::SimplifiedKind => r
                .submission_kind
                .as_deref()
                .map(crate::kind::simplify_submission_kind),
            Dimension::ProcessType => Some(r.process_type.as_str().to_string()),
            Dimension::TechnicalInfo => r.technical_info.clone(),
            Dimension::Analyst => r.analyst.clone(),
            Dimension::Reviewer => r.reviewer.clone(),
            Dimension::EnterpriseType => r.enterprise_type.clone(),
            Dimension::GroupCode => r.group_code.clone(),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Dimension::SubmissionKind => "SubmissionKind",
            Dimension::SimplifiedKind => "Kind",
            Dimension::ProcessType => "ProcessType",
            Dimension::TechnicalInfo => "TechnicalInfo",
            Dimension::Analyst => "Analyst",
            Dimension::Reviewer => "Reviewer",
            Dimension::EnterpriseType => "EnterpriseType",
            Dimension::GroupCode => "GroupCode",
        }
    }
}

/// One entry of the week multiselect: `("Semana 3 - 15/01/24 a 21/01/24")`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Tabled)]
pub struct WeekRange {
    #[serde(rename = "Year")]
    #[tabled(rename = "Year")]
    pub year: i32,
    #[serde(rename = "Week")]
    #[tabled(rename = "Week")]
    pub week: u32,
    #[serde(rename = "Label")]
    #[tabled(rename = "Label")]
    pub label: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct CountRow {
    #[serde(rename = "Value")]
    #[tabled(rename = "Value")]
    pub value: String,
    #[serde(rename = "Count")]
    #[tabled(rename = "Count")]
    pub count: usize,
    #[serde(rename = "SharePct")]
    #[tabled(rename = "SharePct")]
    pub share_pct: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct CrossCountRow {
    #[serde(rename = "Row")]
    #[tabled(rename = "Row")]
    pub row: String,
    #[serde(rename = "Column")]
    #[tabled(rename = "Column")]
    pub column: String,
    #[serde(rename = "Count")]
    #[tabled(rename = "Count")]
    pub count: usize,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct SeriesRow {
    #[serde(rename = "Period")]
    #[tabled(rename = "Period")]
    pub period: String,
    #[serde(rename = "Kind")]
    #[tabled(rename = "Kind")]
    pub kind: String,
    #[serde(rename = "Count")]
    #[tabled(rename = "Count")]
    pub count: usize,
    #[serde(rename = "Trend")]
    #[tabled(rename = "Trend")]
    pub trend: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct RepeatSubmissionRow {
    #[serde(rename = "GroupCode")]
    #[tabled(rename = "GroupCode")]
    pub group_code: String,
    #[serde(rename = "Analyst")]
    #[tabled(rename = "Analyst")]
    pub analyst: String,
    #[serde(rename = "GroupCount")]
    #[tabled(rename = "GroupCount")]
    pub group_count: usize,
    #[serde(rename = "GroupCountByAnalyst")]
    #[tabled(rename = "GroupCountByAnalyst")]
    pub group_count_by_analyst: usize,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct CorrectionRow {
    #[serde(rename = "Reviewer")]
    #[tabled(rename = "Reviewer")]
    pub reviewer: String,
    #[serde(rename = "Analyst")]
    #[tabled(rename = "Analyst")]
    pub analyst: String,
    #[serde(rename = "Process")]
    #[tabled(rename = "Process")]
    pub process_identifier: String,
    #[serde(rename = "ReviewedOn")]
    #[tabled(rename = "ReviewedOn")]
    pub reviewed_on: NaiveDate,
    #[serde(rename = "DaysSinceReview")]
    #[tabled(rename = "DaysSinceReview")]
    pub days_since_review: i64,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct TurnaroundMeanRow {
    #[serde(rename = "Group")]
    #[tabled(rename = "Group")]
    pub group: String,
    #[serde(rename = "Reviews")]
    #[tabled(rename = "Reviews")]
    pub reviews: usize,
    #[serde(rename = "MeanDays")]
    #[tabled(rename = "MeanDays")]
    pub mean_days: f64,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct TurnaroundSummary {
    pub reviews: usize,
    pub mean_days: f64,
    pub median_days: f64,
    pub min_days: i64,
    pub max_days: i64,
}

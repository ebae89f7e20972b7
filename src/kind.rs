// Submission-kind vocabulary.
//
// The survey offers a fixed set of long labels plus free text; these helpers
// classify them without caring about the exact wording of the long form.
use once_cell::sync::Lazy;
use regex::Regex;

static CANCELED: Lazy<Regex> = Lazy::new(|| {
    // cancelado, cancelada(s), cancelados, cancelar
    Regex::new(r"(?i)\bcancel(?:ad|ar)").expect("canceled-kind regex must compile")
});

pub const FIRST_SUBMISSION: &str = "1º Envio";
pub const PRIORITY: &str = "Prioridades";
pub const RESUBMISSION: &str = "Reenvios";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SubmissionKind {
    FirstSubmission,
    Priority,
    Resubmission,
    Canceled,
    Other(String),
}

impl SubmissionKind {
    pub fn classify(raw: &str) -> Self {
        if is_canceled(raw) {
            return SubmissionKind::Canceled;
        }
        match simplify_submission_kind(raw).as_str() {
            FIRST_SUBMISSION => SubmissionKind::FirstSubmission,
            PRIORITY => SubmissionKind::Priority,
            RESUBMISSION => SubmissionKind::Resubmission,
            _ => SubmissionKind::Other(raw.to_string()),
        }
    }

    /// First submissions and priorities are the "new work" the weekly charts
    /// track; resubmissions are reworked items.
    pub fn is_new_work(&self) -> bool {
        matches!(self, SubmissionKind::FirstSubmission | SubmissionKind::Priority)
    }
}

pub fn is_canceled(kind: &str) -> bool {
    CANCELED.is_match(kind)
}

/// Map the long survey labels onto their short chart names. Unknown labels
/// are returned unchanged.
pub fn simplify_submission_kind(kind: &str) -> String {
    let lower = kind.to_lowercase();
    if lower.contains("1º envio") {
        FIRST_SUBMISSION.to_string()
    } else if lower.contains("reenvio após correções") {
        RESUBMISSION.to_string()
    } else if lower.contains("prioridades") {
        PRIORITY.to_string()
    } else {
        kind.to_string()
    }
}

// Process-type and process-group extraction from the free-text identifier.
//
// Precedence of the extraction rules:
//   1. the letters right after the "TEC" marker (optionally "/" or "-"),
//      accepted only when they are exactly a recognized acronym;
//   2. otherwise the first recognized acronym, in `RECOGNIZED` order, that
//      appears anywhere as a whole word, ignoring case;
//   3. otherwise `ProcessType::Other`.
use crate::types::{ProcessType, Record};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

pub const RECOGNIZED: [&str; 13] = [
    "LP", "LPpe", "LI", "LIO", "LO", "LRO", "LA", "AE", "ATO", "LS", "RLO", "RLS", "LPpr",
];

pub const UNKNOWN_GROUP: &str = "Unknown";

static TEC_ANCHORED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"TEC[/-]*([A-Z]{2,5})").expect("TEC-anchored regex must compile"));

static WHOLE_WORD: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    RECOGNIZED
        .iter()
        .map(|code| {
            let re = Regex::new(&format!(r"(?i)\b{}\b", regex::escape(code)))
                .expect("acronym regex must compile");
            (re, *code)
        })
        .collect()
});

// Six digits with a "TEC" marker somewhere after them.
static GROUP_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([0-9]{6}).*TEC").expect("group-code regex must compile"));

pub fn extract_process_type(identifier: &str) -> ProcessType {
    if let Some(caps) = TEC_ANCHORED.captures(identifier) {
        let letters = &caps[1];
        if let Some(code) = RECOGNIZED.iter().find(|c| **c == letters) {
            return ProcessType::Recognized(*code);
        }
    }
    WHOLE_WORD
        .iter()
        .find(|(re, _)| re.is_match(identifier))
        .map_or(ProcessType::Other, |(_, code)| ProcessType::Recognized(*code))
}

/// Missing identifiers classify as `Other`.
pub fn extract_process_type_opt(identifier: Option<&str>) -> ProcessType {
    identifier.map_or(ProcessType::Other, extract_process_type)
}

pub fn extract_group_code(identifier: &str) -> Option<String> {
    GROUP_CODE
        .captures(identifier)
        .map(|caps| caps[1].to_string())
}

pub fn annotate_process_types(records: &[Record]) -> Vec<Record> {
    records
        .iter()
        .map(|r| Record {
            process_type: extract_process_type_opt(r.process_identifier.as_deref()),
            ..r.clone()
        })
        .collect()
}

/// Attach the six-digit group code and the dense per-group counts.
///
/// Records without a code share the `Unknown` group for counting purposes.
pub fn annotate_group(records: &[Record]) -> Vec<Record> {
    let mut out: Vec<Record> = records
        .iter()
        .map(|r| Record {
            group_code: r.process_identifier.as_deref().and_then(extract_group_code),
            ..r.clone()
        })
        .collect();

    let mut by_group: HashMap<String, usize> = HashMap::new();
    let mut by_group_analyst: HashMap<(String, Option<String>), usize> = HashMap::new();
    for r in &out {
        let code = group_key(r);
        *by_group.entry(code.clone()).or_insert(0) += 1;
        *by_group_analyst.entry((code, r.analyst.clone())).or_insert(0) += 1;
    }
    for r in &mut out {
        let code = group_key(r);
        r.group_count = by_group.get(&code).copied().unwrap_or(0);
        r.group_count_by_analyst = by_group_analyst
            .get(&(code, r.analyst.clone()))
            .copied()
            .unwrap_or(0);
    }
    out
}

fn group_key(r: &Record) -> String {
    r.group_code.clone().unwrap_or_else(|| UNKNOWN_GROUP.to_string())
}

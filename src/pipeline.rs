// Load-and-annotate pipeline plus the per-session dataset cache.
use crate::buckets::annotate_time_buckets;
use crate::config::ColumnConfig;
use crate::error::{DashboardError, Result};
use crate::loader::{load_path, LoadReport};
use crate::process::{annotate_group, annotate_process_types};
use crate::types::{Record, TimestampColumn};
use log::info;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

#[derive(Debug, Clone)]
pub struct Dataset {
    pub records: Vec<Record>,
    pub report: LoadReport,
}

/// Run every annotator over freshly loaded records.
pub fn prepare(records: &[Record]) -> Vec<Record> {
    let annotated = annotate_process_types(records);
    let annotated = annotate_group(&annotated);
    let annotated = annotate_time_buckets(&annotated, TimestampColumn::Submission);
    annotate_time_buckets(&annotated, TimestampColumn::Review)
}

pub fn load_prepared(path: &Path, cfg: &ColumnConfig) -> Result<Dataset> {
    let (records, report) = load_path(path, cfg)?;
    Ok(Dataset {
        records: prepare(&records),
        report,
    })
}

/// Identity of an uploaded file: same path, size and modification time
/// means the cached dataset is still valid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceId {
    pub path: PathBuf,
    pub len: u64,
    pub modified: Option<SystemTime>,
}

impl SourceId {
    pub fn of(path: &Path) -> Result<Self> {
        let meta = std::fs::metadata(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            len: meta.len(),
            modified: meta.modified().ok(),
        })
    }
}

/// In-memory session state. A new or changed file replaces the whole
/// dataset; there is no partial invalidation, and a failed load leaves the
/// session empty rather than serving the previous file.
#[derive(Debug, Default)]
pub struct Session {
    source: Option<SourceId>,
    dataset: Option<Dataset>,
}

impl Session {
    pub fn load(&mut self, path: &Path, cfg: &ColumnConfig) -> Result<&Dataset> {
        let id = SourceId::of(path)?;
        let fresh = self.source.as_ref() == Some(&id) && self.dataset.is_some();
        if !fresh {
            self.clear();
            let dataset = load_prepared(path, cfg)?;
            info!("session dataset replaced from {}", path.display());
            self.source = Some(id);
            self.dataset = Some(dataset);
        }
        self.dataset.as_ref().ok_or(DashboardError::EmptyDataset)
    }

    pub fn dataset(&self) -> Option<&Dataset> {
        self.dataset.as_ref()
    }

    pub fn clear(&mut self) {
        self.source = None;
        self.dataset = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ProcessType;
    use std::io::Write;

    #[test]
    fn prepare_fills_every_derived_field() {
        let records = vec![Record {
            process_identifier: Some("123456/TEC-LI".into()),
            submitted_at: crate::util::parse_submission_timestamp(Some("02/01/2024 10:00:00")),
            reviewed_at: crate::util::parse_day_first(Some("10/01/2024")),
            ..Default::default()
        }];
        let out = prepare(&records);
        assert_eq!(out[0].process_type, ProcessType::Recognized("LI"));
        assert_eq!(out[0].group_code.as_deref(), Some("123456"));
        assert_eq!(out[0].group_count, 1);
        assert_eq!(out[0].submission_bucket.map(|b| b.week), Some(1));
        assert_eq!(out[0].review_bucket.map(|b| b.week), Some(2));
    }

    #[test]
    fn session_reuses_until_file_changes() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Carimbo de data/hora,Qual o tipo de envio?").unwrap();
        writeln!(file, "02/01/2024 10:00:00,Prioridades").unwrap();
        file.flush().unwrap();

        let cfg = ColumnConfig::default();
        let mut session = Session::default();
        assert_eq!(session.load(file.path(), &cfg).unwrap().records.len(), 1);

        writeln!(file, "03/01/2024 10:00:00,1º envio").unwrap();
        file.flush().unwrap();
        // size changed, so the cache must be rebuilt
        assert_eq!(session.load(file.path(), &cfg).unwrap().records.len(), 2);

        session.clear();
        assert!(session.dataset().is_none());
    }
}

// Column configuration.
//
// The header text is a fixed contract with the upstream survey tool, so it
// lives here as data rather than being scattered across the loader.
use crate::error::{DashboardError, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ColumnConfig {
    pub submission_timestamp: String,
    pub process_identifier: String,
    pub submission_kind: String,
    pub technical_info: String,
    pub analyst: String,
    pub reviewer: String,
    pub review_timestamp: String,
    pub post_review_status: String,
    pub enterprise_type: String,
    pub review_year: String,
    pub review_month: String,
}

impl Default for ColumnConfig {
    fn default() -> Self {
        Self {
            submission_timestamp: "Carimbo de data/hora".to_string(),
            process_identifier: "Número do Processo a ser revisado (Caso seja Reenvio, coloque a Inicial do revisor-CORRIGIDO-NúmeroDoProcesso)".to_string(),
            submission_kind: "Qual o tipo de envio?".to_string(),
            technical_info: "Informação Técnica".to_string(),
            analyst: "Analista (você)".to_string(),
            reviewer: "Revisado por".to_string(),
            review_timestamp: "Revisado em".to_string(),
            post_review_status: "Status do processo pós revisão".to_string(),
            enterprise_type: "Tipo de empreendimento".to_string(),
            review_year: "ANO".to_string(),
            review_month: "MÊS".to_string(),
        }
    }
}

impl ColumnConfig {
    /// Load header overrides from a JSON object. Keys that are not present
    /// keep their default header text.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(|e| DashboardError::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_override_keeps_defaults() {
        let cfg = ColumnConfig::from_json_str(r#"{"analyst": "Analyst"}"#).unwrap();
        assert_eq!(cfg.analyst, "Analyst");
        assert_eq!(cfg.reviewer, "Revisado por");
        assert_eq!(cfg.submission_timestamp, "Carimbo de data/hora");
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        let err = ColumnConfig::from_json_str("{not json").unwrap_err();
        assert!(matches!(err, DashboardError::Config(_)));
    }
}

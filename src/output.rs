use crate::error::Result;
use serde::Serialize;
use std::path::Path;
use tabled::{settings::Style, Table, Tabled};

pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

/// Markdown preview of the first `max_rows` rows, for console output.
pub fn render_table<T>(rows: &[T], max_rows: usize) -> String
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().take(max_rows).cloned().collect();
    if slice.is_empty() {
        return "(no rows)".to_string();
    }
    Table::new(slice).with(Style::markdown()).to_string()
}

pub fn preview_table<T>(title: &str, note: Option<&str>, rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    println!("\n{}", title);
    if let Some(n) = note {
        println!("({})", n);
    }
    println!();
    println!("{}\n", render_table(rows, max_rows));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CountRow;

    fn rows() -> Vec<CountRow> {
        vec![
            CountRow { value: "LI".into(), count: 3, share_pct: "75.00".into() },
            CountRow { value: "LO".into(), count: 1, share_pct: "25.00".into() },
        ]
    }

    #[test]
    fn render_truncates_and_handles_empty() {
        let out = render_table(&rows(), 1);
        assert!(out.contains("| LI"));
        assert!(!out.contains("LO"));
        assert_eq!(render_table::<CountRow>(&[], 5), "(no rows)");
    }

    #[test]
    fn csv_export_uses_serde_headers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("counts.csv");
        write_csv(&path, &rows()).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("Value,Count,SharePct\n"));
        assert!(written.contains("LI,3,75.00"));
    }
}

//! Score history persisted between runs, for trend tracking in CI.

use std::fs;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::compare::{ReportComparison, compare_reports};
use crate::quality::QualityReport;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub label: String,
    /// Seconds since the Unix epoch.
    pub recorded_at: u64,
    pub report: QualityReport,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityHistory {
    #[serde(default)]
    pub entries: Vec<HistoryEntry>,
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

impl QualityHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a history file. A missing file is an empty history.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent()
            && !dir.as_os_str().is_empty()
        {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create directory {}", dir.display()))?;
        }
        let json = serde_json::to_string_pretty(self).context("Failed to serialize history")?;
        fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
    }

    pub fn record(&mut self, label: impl Into<String>, report: QualityReport) -> &HistoryEntry {
        self.record_at(label, report, now_secs())
    }

    pub fn record_at(
        &mut self,
        label: impl Into<String>,
        report: QualityReport,
        recorded_at: u64,
    ) -> &HistoryEntry {
        self.entries.push(HistoryEntry {
            label: label.into(),
            recorded_at,
            report,
        });
        &self.entries[self.entries.len() - 1]
    }

    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.entries.last()
    }

    /// Most recent entry with the given label.
    pub fn latest_for(&self, label: &str) -> Option<&HistoryEntry> {
        self.entries.iter().rev().find(|entry| entry.label == label)
    }

    /// Comparison of the last two entries.
    pub fn trend(&self) -> Option<ReportComparison> {
        let [.., previous, current] = self.entries.as_slice() else {
            return None;
        };
        Some(compare_reports(&previous.report, &current.report))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{PositionedNode, ViewportSize};
    use crate::quality::evaluate;
    use tempfile::TempDir;

    fn report(offset: f64) -> QualityReport {
        let nodes = vec![
            PositionedNode::new("a", 0.0, 0.0, 100.0, 100.0),
            PositionedNode::new("b", offset, 0.0, 100.0, 100.0),
        ];
        evaluate(&nodes, &[], ViewportSize::default())
    }

    #[test]
    fn missing_file_is_empty_history() {
        let dir = TempDir::new().unwrap();
        let history = QualityHistory::load(&dir.path().join("none.json")).unwrap();
        assert!(history.is_empty());
        assert!(history.trend().is_none());
    }

    #[test]
    fn save_then_load_keeps_entries() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("history.json");

        let mut history = QualityHistory::new();
        history.record_at("baseline", report(200.0), 1_700_000_000);
        history.record_at("candidate", report(50.0), 1_700_000_060);
        history.save(&path).unwrap();

        let loaded = QualityHistory::load(&path).unwrap();
        assert_eq!(loaded, history);
        assert_eq!(loaded.latest().map(|e| e.label.as_str()), Some("candidate"));
        assert_eq!(loaded.latest_for("baseline").map(|e| e.recorded_at), Some(1_700_000_000));
    }

    #[test]
    fn trend_compares_last_two() {
        let mut history = QualityHistory::new();
        history.record("one", report(200.0));
        assert!(history.trend().is_none());
        history.record("two", report(50.0));
        let trend = history.trend().unwrap();
        assert!(trend.is_regression(0.5));
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("history.json");
        std::fs::write(&path, "not json").unwrap();
        let err = QualityHistory::load(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse"));
    }
}

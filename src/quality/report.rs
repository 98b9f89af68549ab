use serde::{Deserialize, Serialize};
use std::fmt;

use crate::geometry::{Point, Rect};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
    F,
}

impl Grade {
    pub fn from_score(score: f64) -> Self {
        if score >= 90.0 {
            Grade::A
        } else if score >= 80.0 {
            Grade::B
        } else if score >= 70.0 {
            Grade::C
        } else if score >= 60.0 {
            Grade::D
        } else {
            Grade::F
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlapViolation {
    pub node1: String,
    pub node2: String,
    pub overlap_area: f64,
    /// Share of the smaller node covered by the intersection.
    pub overlap_percentage: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlapMetric {
    pub count: usize,
    pub violations: Vec<OverlapViolation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeCrossing {
    pub edge1: String,
    pub edge2: String,
    pub point: Point,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrossingMetric {
    pub count: usize,
    pub crossings: Vec<EdgeCrossing>,
    /// Edges whose endpoints both resolved in this snapshot.
    pub evaluated_edges: usize,
    /// Edges skipped because an endpoint is absent from the snapshot.
    pub dropped_edges: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpacingViolation {
    pub node1: String,
    pub node2: String,
    pub gap: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpacingMetric {
    /// 1 = perfectly uniform sibling spacing, 0 = highly irregular.
    pub consistency: f64,
    pub mean_gap: f64,
    pub violations: Vec<SpacingViolation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainmentViolation {
    pub child_id: String,
    pub parent_id: String,
    pub overflow_amount: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainmentMetric {
    /// Child/parent pairs that were actually checked.
    pub checked: usize,
    pub violations: Vec<ContainmentViolation>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AspectMetric {
    pub aspect_ratio: f64,
    pub aspect_ratio_score: f64,
    pub viewport_utilization: f64,
    pub utilization_score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_bounds: Option<Rect>,
}

/// Normalised per-metric scores, each in [0, 100].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubScores {
    pub overlap: f64,
    pub crossings: f64,
    pub spacing: f64,
    pub containment: f64,
    pub aspect: f64,
}

impl SubScores {
    pub fn entries(&self) -> [(&'static str, f64); 5] {
        [
            ("overlap", self.overlap),
            ("containment", self.containment),
            ("crossings", self.crossings),
            ("spacing", self.spacing),
            ("aspect", self.aspect),
        ]
    }
}

/// Result of one evaluation. Stable, JSON-serialisable shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityReport {
    /// No placeable nodes were supplied.
    pub is_empty: bool,
    pub node_count: usize,
    pub edge_count: usize,
    pub overlaps: OverlapMetric,
    pub edge_crossings: CrossingMetric,
    pub spacing: SpacingMetric,
    pub containment: ContainmentMetric,
    pub aspect: AspectMetric,
    pub scores: SubScores,
    pub weighted_score: f64,
    pub grade: Grade,
}

impl QualityReport {
    /// The "no diagram" report: zero score, grade F, nothing recorded.
    pub fn empty(node_count: usize, edge_count: usize) -> Self {
        Self {
            is_empty: true,
            node_count,
            edge_count,
            overlaps: OverlapMetric::default(),
            edge_crossings: CrossingMetric::default(),
            spacing: SpacingMetric::default(),
            containment: ContainmentMetric::default(),
            aspect: AspectMetric::default(),
            scores: SubScores::default(),
            weighted_score: 0.0,
            grade: Grade::F,
        }
    }

    pub fn overlap_count(&self) -> usize {
        self.overlaps.count
    }

    pub fn edge_crossing_count(&self) -> usize {
        self.edge_crossings.count
    }

    pub fn spacing_violation_count(&self) -> usize {
        self.spacing.violations.len()
    }

    pub fn containment_violation_count(&self) -> usize {
        self.containment.violations.len()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Short human-readable digest, one finding per line.
    pub fn summary_lines(&self) -> Vec<String> {
        if self.is_empty {
            return vec!["no diagram: nothing to score".to_string()];
        }
        let mut lines = vec![format!(
            "score {:.2} (grade {}) over {} nodes, {} edges",
            self.weighted_score, self.grade, self.node_count, self.edge_count
        )];
        for (name, value) in self.scores.entries() {
            lines.push(format!("  {name:<12} {value:>6.2}"));
        }
        for v in &self.overlaps.violations {
            lines.push(format!(
                "overlap: {} / {} ({:.1}% of the smaller node)",
                v.node1, v.node2, v.overlap_percentage
            ));
        }
        for v in &self.containment.violations {
            lines.push(format!(
                "containment: {} escapes {} by {:.1}px",
                v.child_id, v.parent_id, v.overflow_amount
            ));
        }
        for c in &self.edge_crossings.crossings {
            lines.push(format!(
                "crossing: {} x {} at ({:.1}, {:.1})",
                c.edge1, c.edge2, c.point.x, c.point.y
            ));
        }
        for v in &self.spacing.violations {
            lines.push(format!("spacing: {} / {} only {:.1}px apart", v.node1, v.node2, v.gap));
        }
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grade_thresholds() {
        assert_eq!(Grade::from_score(100.0), Grade::A);
        assert_eq!(Grade::from_score(90.0), Grade::A);
        assert_eq!(Grade::from_score(89.99), Grade::B);
        assert_eq!(Grade::from_score(80.0), Grade::B);
        assert_eq!(Grade::from_score(70.0), Grade::C);
        assert_eq!(Grade::from_score(60.0), Grade::D);
        assert_eq!(Grade::from_score(59.99), Grade::F);
        assert_eq!(Grade::from_score(0.0), Grade::F);
    }

    #[test]
    fn grade_serialises_as_letter() {
        assert_eq!(serde_json::to_string(&Grade::B).unwrap(), "\"B\"");
    }

    #[test]
    fn empty_report_json_shape() {
        let json = serde_json::to_value(QualityReport::empty(0, 0)).unwrap();
        assert_eq!(json["weightedScore"], 0.0);
        assert_eq!(json["grade"], "F");
        assert_eq!(json["isEmpty"], true);
        assert!(json["overlaps"]["violations"].as_array().unwrap().is_empty());
        assert!(json["containment"]["violations"].as_array().unwrap().is_empty());
    }

    #[test]
    fn report_survives_json_round_trip() {
        let mut report = QualityReport::empty(2, 1);
        report.is_empty = false;
        report.overlaps.count = 1;
        report.overlaps.violations.push(OverlapViolation {
            node1: "a".into(),
            node2: "b".into(),
            overlap_area: 25.0,
            overlap_percentage: 25.0,
        });
        let json = report.to_json().unwrap();
        let parsed: QualityReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, report);
    }

    #[test]
    fn summary_mentions_findings() {
        let mut report = QualityReport::empty(2, 0);
        report.is_empty = false;
        report.containment.violations.push(ContainmentViolation {
            child_id: "db".into(),
            parent_id: "backend".into(),
            overflow_amount: 10.0,
        });
        let lines = report.summary_lines();
        assert!(lines.iter().any(|l| l.contains("db escapes backend by 10.0px")));
    }
}

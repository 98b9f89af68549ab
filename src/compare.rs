use serde::{Deserialize, Serialize};

use crate::quality::{Grade, QualityReport};

/// Change in a single sub-score between two reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricDelta {
    pub metric: String,
    pub previous: f64,
    pub current: f64,
    /// `current - previous`; positive is an improvement.
    pub delta: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportComparison {
    pub previous_score: f64,
    pub current_score: f64,
    pub delta: f64,
    pub previous_grade: Grade,
    pub current_grade: Grade,
    pub breakdown: Vec<MetricDelta>,
}

impl ReportComparison {
    /// The weighted score dropped by more than `threshold` points.
    pub fn is_regression(&self, threshold: f64) -> bool {
        self.delta < -threshold.abs()
    }

    pub fn improved(&self) -> bool {
        self.delta > 0.0
    }

    pub fn grade_changed(&self) -> bool {
        self.previous_grade != self.current_grade
    }

    /// Metric with the largest drop, if any metric got worse.
    pub fn worst_metric(&self) -> Option<&MetricDelta> {
        self.breakdown
            .iter()
            .filter(|entry| entry.delta < 0.0)
            .min_by(|a, b| a.delta.total_cmp(&b.delta))
    }
}

pub fn compare_reports(previous: &QualityReport, current: &QualityReport) -> ReportComparison {
    let breakdown = previous
        .scores
        .entries()
        .into_iter()
        .zip(current.scores.entries())
        .map(|((metric, before), (_, after))| MetricDelta {
            metric: metric.to_string(),
            previous: before,
            current: after,
            delta: after - before,
        })
        .collect();

    ReportComparison {
        previous_score: previous.weighted_score,
        current_score: current.weighted_score,
        delta: current.weighted_score - previous.weighted_score,
        previous_grade: previous.grade,
        current_grade: current.grade,
        breakdown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{PositionedNode, ViewportSize};
    use crate::quality::evaluate;

    fn grid(overlapping: bool) -> QualityReport {
        let mut nodes = vec![
            PositionedNode::new("a", 0.0, 0.0, 100.0, 100.0),
            PositionedNode::new("b", 200.0, 0.0, 100.0, 100.0),
            PositionedNode::new("c", 0.0, 200.0, 100.0, 100.0),
            PositionedNode::new("d", 200.0, 200.0, 100.0, 100.0),
        ];
        if overlapping {
            nodes[1].position = nodes[0].position;
        }
        evaluate(&nodes, &[], ViewportSize::new(1920.0, 1080.0))
    }

    #[test]
    fn identical_reports_have_zero_delta() {
        let report = grid(false);
        let cmp = compare_reports(&report, &report);
        assert_eq!(cmp.breakdown.len(), 5);
        assert_eq!(cmp.delta, 0.0);
        assert!(!cmp.is_regression(0.0));
        assert!(!cmp.grade_changed());
        assert!(cmp.worst_metric().is_none());
    }

    #[test]
    fn detects_regression() {
        let cmp = compare_reports(&grid(false), &grid(true));
        assert!(cmp.delta < 0.0);
        assert!(cmp.is_regression(1.0));
        assert!(!cmp.is_regression(50.0));
        let overlap = cmp.breakdown.iter().find(|m| m.metric == "overlap");
        assert_eq!(overlap.map(|m| m.delta), Some(-25.0));
        // stacking two nodes also collapses sibling spacing
        assert_eq!(cmp.worst_metric().map(|m| m.metric.as_str()), Some("spacing"));
    }

    #[test]
    fn detects_improvement() {
        let cmp = compare_reports(&grid(true), &grid(false));
        assert!(cmp.improved());
        assert!(!cmp.is_regression(0.0));
    }
}

//! Layout quality scoring.
//!
//! [`evaluate`] takes a positioned snapshot (nodes, edges, viewport) and returns a
//! [`QualityReport`]. Evaluation is pure: the same input always yields the same
//! report, and malformed input degrades to a defined default instead of failing.

mod aspect;
mod composite;
mod containment;
mod crossing;
mod index;
mod overlap;
mod report;
mod spacing;

use std::fmt;

use tracing::{debug, trace, warn};

use crate::config::QualityConfig;
use crate::error::ConfigError;
use crate::ir::{DiagramSnapshot, Edge, PositionedNode, ViewportSize};
use crate::observer::ReportObserver;

pub use report::{
    AspectMetric, ContainmentMetric, ContainmentViolation, CrossingMetric, EdgeCrossing, Grade,
    OverlapMetric, OverlapViolation, QualityReport, SpacingMetric, SpacingViolation, SubScores,
};

use index::NodeIndex;

/// Evaluate with the default configuration.
pub fn evaluate(nodes: &[PositionedNode], edges: &[Edge], viewport: ViewportSize) -> QualityReport {
    score(nodes, edges, viewport, &QualityConfig::default())
}

/// Evaluate with a caller-supplied configuration. The configuration is not
/// validated here; see [`QualityEvaluator::try_new`].
pub fn evaluate_with_config(
    nodes: &[PositionedNode],
    edges: &[Edge],
    viewport: ViewportSize,
    config: &QualityConfig,
) -> QualityReport {
    score(nodes, edges, viewport, config)
}

/// A configured evaluator that forwards each report to its subscribers.
pub struct QualityEvaluator {
    config: QualityConfig,
    observers: Vec<Box<dyn ReportObserver>>,
}

impl fmt::Debug for QualityEvaluator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QualityEvaluator")
            .field("config", &self.config)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl Default for QualityEvaluator {
    fn default() -> Self {
        Self::new(QualityConfig::default())
    }
}

impl QualityEvaluator {
    pub fn new(config: QualityConfig) -> Self {
        Self {
            config,
            observers: Vec::new(),
        }
    }

    pub fn try_new(config: QualityConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::new(config))
    }

    pub fn config(&self) -> &QualityConfig {
        &self.config
    }

    pub fn subscribe(&mut self, observer: impl ReportObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    pub fn evaluate(
        &self,
        nodes: &[PositionedNode],
        edges: &[Edge],
        viewport: ViewportSize,
    ) -> QualityReport {
        let report = score(nodes, edges, viewport, &self.config);
        for observer in &self.observers {
            observer.on_report(&report);
        }
        report
    }

    pub fn evaluate_snapshot(&self, snapshot: &DiagramSnapshot) -> QualityReport {
        self.evaluate(&snapshot.nodes, &snapshot.edges, snapshot.viewport)
    }
}

fn score(
    nodes: &[PositionedNode],
    edges: &[Edge],
    viewport: ViewportSize,
    config: &QualityConfig,
) -> QualityReport {
    let index = NodeIndex::build(nodes);
    if index.skipped() > 0 {
        warn!(
            skipped = index.skipped(),
            "ignoring nodes with non-finite geometry"
        );
    }
    if index.is_empty() {
        debug!(nodes = nodes.len(), "no placeable nodes; returning empty report");
        return QualityReport::empty(nodes.len(), edges.len());
    }

    let overlaps = overlap::detect_overlaps(&index, config.max_ancestor_depth);
    let overlap_score = overlap::overlap_score(&overlaps, index.len());
    trace!(count = overlaps.count, score = overlap_score, "overlap");

    let edge_crossings = crossing::count_crossings(edges, &index);
    if edge_crossings.dropped_edges > 0 {
        warn!(
            dropped = edge_crossings.dropped_edges,
            "edges reference nodes missing from the snapshot"
        );
    }
    let crossing_score = crossing::crossing_score(&edge_crossings, config.crossing_penalty);
    trace!(count = edge_crossings.count, score = crossing_score, "crossings");

    let spacing = spacing::analyze_spacing(&index, config);
    let spacing_score = spacing::spacing_score(&spacing, config.spacing_violation_penalty);
    trace!(
        consistency = spacing.consistency,
        violations = spacing.violations.len(),
        score = spacing_score,
        "spacing"
    );

    let containment = containment::validate_containment(&index, config.containment_tolerance);
    let containment_score =
        containment::containment_score(&containment, config.containment_penalty);
    trace!(
        checked = containment.checked,
        violations = containment.violations.len(),
        score = containment_score,
        "containment"
    );

    let aspect = aspect::score_aspect(&index, viewport, config);
    let aspect_score = aspect::aspect_score(&aspect, config.utilization_weight);
    trace!(
        ratio = aspect.aspect_ratio,
        utilization = aspect.viewport_utilization,
        score = aspect_score,
        "aspect"
    );

    let scores = SubScores {
        overlap: composite::sanitize(overlap_score),
        crossings: composite::sanitize(crossing_score),
        spacing: composite::sanitize(spacing_score),
        containment: composite::sanitize(containment_score),
        aspect: composite::sanitize(aspect_score),
    };
    let weighted_score = composite::weighted_score(&scores, &config.weights);
    let grade = composite::grade(weighted_score);
    debug!(
        nodes = nodes.len(),
        edges = edges.len(),
        score = weighted_score,
        grade = %grade,
        "layout evaluated"
    );

    QualityReport {
        is_empty: false,
        node_count: nodes.len(),
        edge_count: edges.len(),
        overlaps,
        edge_crossings,
        spacing,
        containment,
        aspect,
        scores,
        weighted_score,
        grade,
    }
}

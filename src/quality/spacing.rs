use std::collections::BTreeMap;

use crate::config::{GapMeasure, QualityConfig};
use crate::geometry::{Rect, rect_gap};

use super::index::NodeIndex;
use super::report::{SpacingMetric, SpacingViolation};

const MEAN_EPS: f64 = 1e-9;

fn gap(a: &Rect, b: &Rect, measure: GapMeasure) -> f64 {
    match measure {
        GapMeasure::EdgeToEdge => rect_gap(a, b),
        GapMeasure::CenterToCenter => a.center().distance_to(b.center()),
    }
}

/// Running mean that cannot overflow for non-negative inputs.
fn mean_of(values: &[f64]) -> f64 {
    values
        .iter()
        .enumerate()
        .fold(0.0, |mean, (i, v)| mean + (v - mean) / (i + 1) as f64)
}

/// 1 - coefficient of variation, clamped to [0, 1].
fn group_consistency(gaps: &[f64]) -> f64 {
    let mean = mean_of(gaps);
    if mean <= MEAN_EPS {
        let spread = gaps.iter().fold(0.0_f64, |acc, g| acc.max((g - mean).abs()));
        return if spread <= MEAN_EPS { 1.0 } else { 0.0 };
    }
    // CV is scale-free; normalising by the mean keeps the squares finite.
    let variance = mean_of(
        &gaps
            .iter()
            .map(|g| (g / mean - 1.0).powi(2))
            .collect::<Vec<_>>(),
    );
    let consistency = 1.0 - variance.sqrt();
    if consistency.is_finite() {
        consistency.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Sibling spacing statistics. Siblings share a `parentId` (or have none);
/// degenerate nodes are ignored.
pub(crate) fn analyze_spacing(index: &NodeIndex<'_>, config: &QualityConfig) -> SpacingMetric {
    let mut groups: BTreeMap<Option<&str>, Vec<usize>> = BTreeMap::new();
    for (idx, entry) in index.entries().iter().enumerate() {
        if entry.rect.is_degenerate() {
            continue;
        }
        groups
            .entry(entry.node.parent_id.as_deref())
            .or_default()
            .push(idx);
    }

    let entries = index.entries();
    let mut violations = Vec::new();
    let mut weighted = 0.0;
    let mut weight = 0usize;
    let mut all_gaps = Vec::new();

    for members in groups.values() {
        if members.len() < 2 {
            continue;
        }
        let mut nearest = vec![f64::INFINITY; members.len()];
        for (i, &a) in members.iter().enumerate() {
            for (j, &b) in members.iter().enumerate().skip(i + 1) {
                let ra = &entries[a].rect;
                let rb = &entries[b].rect;
                let measured = gap(ra, rb, config.gap_measure);
                nearest[i] = nearest[i].min(measured);
                nearest[j] = nearest[j].min(measured);

                let edge_gap = rect_gap(ra, rb);
                if edge_gap < config.min_spacing {
                    violations.push(SpacingViolation {
                        node1: entries[a].id().to_string(),
                        node2: entries[b].id().to_string(),
                        gap: edge_gap,
                    });
                }
            }
        }
        weighted += group_consistency(&nearest) * members.len() as f64;
        weight += members.len();
        all_gaps.extend(nearest);
    }

    let consistency = if weight == 0 {
        1.0
    } else {
        weighted / weight as f64
    };
    let mean_gap = mean_of(&all_gaps);

    SpacingMetric {
        consistency,
        mean_gap,
        violations,
    }
}

pub(crate) fn spacing_score(metric: &SpacingMetric, penalty: f64) -> f64 {
    (metric.consistency * 100.0 - penalty * metric.violations.len() as f64).clamp(0.0, 100.0)
}

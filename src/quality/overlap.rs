use crate::geometry::overlap_area;

use super::index::NodeIndex;
use super::report::{OverlapMetric, OverlapViolation};

/// Pairwise overlap scan. Pairs where one node sits on the other's parent
/// chain are expected to overlap and are skipped.
pub(crate) fn detect_overlaps(index: &NodeIndex<'_>, max_ancestor_depth: usize) -> OverlapMetric {
    let entries = index.entries();
    let mut violations = Vec::new();
    for i in 0..entries.len() {
        for j in (i + 1)..entries.len() {
            let a = &entries[i];
            let b = &entries[j];
            let area = overlap_area(&a.rect, &b.rect);
            if area <= 0.0 {
                continue;
            }
            if index.is_ancestor(i, j, max_ancestor_depth)
                || index.is_ancestor(j, i, max_ancestor_depth)
            {
                continue;
            }
            let smaller = a.rect.area().min(b.rect.area());
            let overlap_percentage = if smaller > 0.0 {
                (area / smaller * 100.0).min(100.0)
            } else {
                0.0
            };
            violations.push(OverlapViolation {
                node1: a.id().to_string(),
                node2: b.id().to_string(),
                overlap_area: area,
                overlap_percentage,
            });
        }
    }
    OverlapMetric {
        count: violations.len(),
        violations,
    }
}

pub(crate) fn overlap_score(metric: &OverlapMetric, node_count: usize) -> f64 {
    if node_count == 0 {
        return 0.0;
    }
    100.0 * (1.0 - metric.count as f64 / node_count as f64).max(0.0)
}

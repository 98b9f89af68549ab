use crate::geometry::{containment_overflow, rectangle_contains};

use super::index::NodeIndex;
use super::report::{ContainmentMetric, ContainmentViolation};

/// Check each resolvable child against its direct parent. Parents missing
/// from the snapshot (collapsed or filtered views) are skipped.
pub(crate) fn validate_containment(index: &NodeIndex<'_>, tolerance: f64) -> ContainmentMetric {
    let mut checked = 0;
    let mut violations = Vec::new();
    for (idx, entry) in index.entries().iter().enumerate() {
        let Some(parent) = index.parent(idx) else {
            continue;
        };
        checked += 1;
        let outer = index.rect(parent);
        if rectangle_contains(&outer, &entry.rect, tolerance) {
            continue;
        }
        violations.push(ContainmentViolation {
            child_id: entry.id().to_string(),
            parent_id: index.entries()[parent].id().to_string(),
            overflow_amount: containment_overflow(&outer, &entry.rect),
        });
    }
    ContainmentMetric {
        checked,
        violations,
    }
}

pub(crate) fn containment_score(metric: &ContainmentMetric, penalty: f64) -> f64 {
    (100.0 - penalty * metric.violations.len() as f64).clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::PositionedNode;

    fn validate(nodes: &[PositionedNode]) -> ContainmentMetric {
        validate_containment(&NodeIndex::build(nodes), 2.0)
    }

    #[test]
    fn nested_child_passes() {
        let nodes = vec![
            PositionedNode::new("parent", 0.0, 0.0, 100.0, 100.0),
            PositionedNode::new("child", 25.0, 25.0, 50.0, 50.0).with_parent("parent"),
        ];
        let metric = validate(&nodes);
        assert_eq!(metric.checked, 1);
        assert!(metric.violations.is_empty());
        assert_eq!(containment_score(&metric, 25.0), 100.0);
    }

    #[test]
    fn child_poking_out_by_ten_pixels() {
        let nodes = vec![
            PositionedNode::new("parent", 0.0, 0.0, 100.0, 100.0),
            PositionedNode::new("child", 60.0, 25.0, 50.0, 50.0).with_parent("parent"),
        ];
        let metric = validate(&nodes);
        assert_eq!(metric.violations.len(), 1);
        let v = &metric.violations[0];
        assert_eq!(v.child_id, "child");
        assert_eq!(v.parent_id, "parent");
        assert_eq!(v.overflow_amount, 10.0);
        assert_eq!(containment_score(&metric, 25.0), 75.0);
    }

    #[test]
    fn jitter_inside_tolerance_is_accepted() {
        let nodes = vec![
            PositionedNode::new("parent", 0.0, 0.0, 100.0, 100.0),
            PositionedNode::new("child", -1.0, 51.5, 50.0, 50.0).with_parent("parent"),
        ];
        assert!(validate(&nodes).violations.is_empty());
    }

    #[test]
    fn missing_parent_is_skipped() {
        let nodes =
            vec![PositionedNode::new("child", 500.0, 500.0, 50.0, 50.0).with_parent("hidden")];
        let metric = validate(&nodes);
        assert_eq!(metric.checked, 0);
        assert!(metric.violations.is_empty());
    }

    #[test]
    fn zero_size_child_is_still_checked() {
        let nodes = vec![
            PositionedNode::new("parent", 0.0, 0.0, 100.0, 100.0),
            PositionedNode::new("anchor", 150.0, 50.0, 0.0, 0.0).with_parent("parent"),
        ];
        let metric = validate(&nodes);
        assert_eq!(metric.violations.len(), 1);
        assert_eq!(metric.violations[0].overflow_amount, 50.0);
    }

    #[test]
    fn zero_size_parent_contains_only_an_identical_point() {
        let nodes = vec![
            PositionedNode::new("anchor", 50.0, 50.0, 0.0, 0.0),
            PositionedNode::new("same", 50.0, 50.0, 0.0, 0.0).with_parent("anchor"),
            PositionedNode::new("nudged", 51.0, 50.0, 0.0, 0.0).with_parent("anchor"),
        ];
        let metric = validate(&nodes);
        assert_eq!(metric.checked, 2);
        // 1px is inside the 2px tolerance, but a point parent has no room to tolerate
        assert_eq!(metric.violations.len(), 1);
        assert_eq!(metric.violations[0].child_id, "nudged");
        assert_eq!(metric.violations[0].overflow_amount, 1.0);
    }

    #[test]
    fn score_drops_sharply_and_floors() {
        let mut nodes = vec![PositionedNode::new("parent", 0.0, 0.0, 10.0, 10.0)];
        for i in 0..5 {
            let child = PositionedNode::new(format!("c{i}"), 100.0, 100.0, 10.0, 10.0);
            nodes.push(child.with_parent("parent"));
        }
        let metric = validate(&nodes);
        assert_eq!(metric.violations.len(), 5);
        assert_eq!(containment_score(&metric, 25.0), 0.0);
    }
}

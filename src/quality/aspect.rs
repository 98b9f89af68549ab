use crate::config::QualityConfig;
use crate::geometry::Rect;
use crate::ir::ViewportSize;

use super::index::NodeIndex;
use super::report::AspectMetric;

/// Score a value against a comfort band: 100 inside, proportional decay
/// below `min`, inverse decay above `max`.
fn band_score(value: f64, min: f64, max: f64) -> f64 {
    if value < min {
        100.0 * (value / min).max(0.0)
    } else if value > max {
        100.0 * (max / value).min(1.0)
    } else {
        100.0
    }
}

/// Utilization decays linearly toward 0 when sparse and toward a completely
/// filled viewport when cramped.
fn utilization_score(utilization: f64, min: f64, max: f64) -> f64 {
    if utilization < min {
        100.0 * (utilization / min).max(0.0)
    } else if utilization > max {
        let headroom = 1.0 - max;
        if headroom <= 0.0 {
            return 100.0;
        }
        100.0 * ((1.0 - utilization) / headroom).clamp(0.0, 1.0)
    } else {
        100.0
    }
}

fn content_bounds(index: &NodeIndex<'_>) -> Option<Rect> {
    index
        .entries()
        .iter()
        .map(|entry| entry.rect)
        .reduce(|acc, rect| acc.union(&rect))
}

pub(crate) fn score_aspect(
    index: &NodeIndex<'_>,
    viewport: ViewportSize,
    config: &QualityConfig,
) -> AspectMetric {
    let Some(bounds) = content_bounds(index) else {
        return AspectMetric::default();
    };

    let aspect_ratio = if bounds.height > 0.0 {
        (bounds.width / bounds.height).min(f64::MAX)
    } else {
        bounds.width
    };
    let aspect_ratio_score = band_score(aspect_ratio, config.aspect_min, config.aspect_max);

    let viewport_area = viewport.area();
    let viewport_utilization = if viewport_area > 0.0 {
        (bounds.area() / viewport_area).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let utilization_score = utilization_score(
        viewport_utilization,
        config.utilization_min,
        config.utilization_max,
    );

    AspectMetric {
        aspect_ratio,
        aspect_ratio_score,
        viewport_utilization,
        utilization_score,
        content_bounds: Some(bounds),
    }
}

pub(crate) fn aspect_score(metric: &AspectMetric, utilization_weight: f64) -> f64 {
    let w = utilization_weight.clamp(0.0, 1.0);
    ((1.0 - w) * metric.aspect_ratio_score + w * metric.utilization_score).clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::PositionedNode;

    fn score(nodes: &[PositionedNode], viewport: ViewportSize) -> AspectMetric {
        score_aspect(&NodeIndex::build(nodes), viewport, &QualityConfig::default())
    }

    #[test]
    fn square_content_scores_full_aspect() {
        let nodes = vec![
            PositionedNode::new("a", 0.0, 0.0, 100.0, 100.0),
            PositionedNode::new("b", 200.0, 200.0, 100.0, 100.0),
        ];
        let metric = score(&nodes, ViewportSize::new(1920.0, 1080.0));
        assert_eq!(metric.aspect_ratio, 1.0);
        assert_eq!(metric.aspect_ratio_score, 100.0);
        assert_eq!(metric.content_bounds, Some(Rect::new(0.0, 0.0, 300.0, 300.0)));
        let expected = 90_000.0 / (1920.0 * 1080.0);
        assert!((metric.viewport_utilization - expected).abs() < 1e-12);
    }

    #[test]
    fn wide_strip_decays() {
        let nodes = vec![PositionedNode::new("a", 0.0, 0.0, 1200.0, 100.0)];
        let metric = score(&nodes, ViewportSize::new(1920.0, 1080.0));
        assert_eq!(metric.aspect_ratio, 12.0);
        assert_eq!(metric.aspect_ratio_score, 25.0);
    }

    #[test]
    fn zero_height_uses_width_as_ratio() {
        let nodes = vec![PositionedNode::new("a", 0.0, 0.0, 600.0, 0.0)];
        let metric = score(&nodes, ViewportSize::new(1920.0, 1080.0));
        assert_eq!(metric.aspect_ratio, 600.0);
        assert!(metric.aspect_ratio_score < 1.0);
    }

    #[test]
    fn utilization_band() {
        assert_eq!(utilization_score(0.5, 0.1, 0.85), 100.0);
        assert_eq!(utilization_score(0.05, 0.1, 0.85), 50.0);
        assert_eq!(utilization_score(1.0, 0.1, 0.85), 0.0);
        assert!(utilization_score(0.9, 0.1, 0.85) < 100.0);
    }

    #[test]
    fn content_larger_than_viewport_clamps() {
        let nodes = vec![PositionedNode::new("a", 0.0, 0.0, 4000.0, 4000.0)];
        let metric = score(&nodes, ViewportSize::new(1000.0, 1000.0));
        assert_eq!(metric.viewport_utilization, 1.0);
        assert_eq!(metric.utilization_score, 0.0);
    }

    #[test]
    fn bad_viewport_means_no_utilization() {
        let nodes = vec![PositionedNode::new("a", 0.0, 0.0, 100.0, 100.0)];
        let metric = score(&nodes, ViewportSize::new(0.0, 1080.0));
        assert_eq!(metric.viewport_utilization, 0.0);
        assert_eq!(metric.utilization_score, 0.0);
    }

    #[test]
    fn sliver_content_ratio_stays_finite() {
        let nodes = vec![
            PositionedNode::new("a", 0.0, 0.0, 1e300, 1e-300),
            PositionedNode::new("b", 0.0, 0.0, 1.0, 1e-300),
        ];
        let metric = score(&nodes, ViewportSize::new(1920.0, 1080.0));
        assert_eq!(metric.aspect_ratio, f64::MAX);
        assert!(metric.aspect_ratio_score < 1e-300);
    }

    #[test]
    fn blended_score() {
        let metric = AspectMetric {
            aspect_ratio_score: 100.0,
            utilization_score: 50.0,
            ..AspectMetric::default()
        };
        assert!((aspect_score(&metric, 0.3) - 85.0).abs() < 1e-9);
    }
}

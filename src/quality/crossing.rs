use std::collections::HashMap;

use crate::geometry::{
    Point, intersection_point, same_point, segments_collinear, segments_intersect,
};
use crate::ir::Edge;

use super::index::NodeIndex;
use super::report::{CrossingMetric, EdgeCrossing};

/// Collinear overlap shorter than this is a single shared point.
const COLLINEAR_OVERLAP_EPS: f64 = 1e-6;
/// Hits between the same two edges closer than this are one crossing.
const POINT_MERGE_EPS: f64 = 1e-6;

struct Polyline<'a> {
    edge: &'a Edge,
    source: usize,
    target: usize,
    points: Vec<Point>,
}

#[derive(Clone, Copy)]
struct Segment {
    polyline: usize,
    a: Point,
    b: Point,
    is_first: bool,
    is_last: bool,
}

/// Anchor each edge to its current node centres, with any supplied points as
/// intermediate control points. Edges with an unresolved endpoint are dropped.
fn resolve_polylines<'a>(
    edges: &'a [Edge],
    index: &NodeIndex<'_>,
) -> (Vec<Polyline<'a>>, usize) {
    let mut polylines = Vec::with_capacity(edges.len());
    let mut dropped = 0;
    for edge in edges {
        let source = index.get(&edge.source_id);
        let target = index.get(&edge.target_id);
        let (Some(source), Some(target)) = (source, target) else {
            dropped += 1;
            continue;
        };
        let mut points = vec![index.rect(source).center()];
        if let Some(control) = &edge.points {
            points.extend(control.iter().copied().filter(Point::is_finite));
        }
        points.push(index.rect(target).center());
        points.dedup_by(|next, prev| same_point(*next, *prev));
        polylines.push(Polyline {
            edge,
            source,
            target,
            points,
        });
    }
    (polylines, dropped)
}

fn segments_of(polylines: &[Polyline<'_>]) -> Vec<Segment> {
    let mut segments = Vec::new();
    for (idx, line) in polylines.iter().enumerate() {
        let count = line.points.len().saturating_sub(1);
        for (i, pair) in line.points.windows(2).enumerate() {
            segments.push(Segment {
                polyline: idx,
                a: pair[0],
                b: pair[1],
                is_first: i == 0,
                is_last: i + 1 == count,
            });
        }
    }
    segments
}

fn touches_declared_endpoint(
    seg: &Segment,
    line: &Polyline<'_>,
    node: usize,
    center: Point,
) -> bool {
    (seg.is_first && line.source == node && same_point(seg.a, center))
        || (seg.is_last && line.target == node && same_point(seg.b, center))
}

/// Length of the stretch two collinear segments share.
fn collinear_overlap_length(s: &Segment, t: &Segment) -> f64 {
    let horizontal = (s.b.x - s.a.x).abs() >= (s.b.y - s.a.y).abs();
    let project = |p: Point| if horizontal { p.x } else { p.y };
    let (s0, s1) = (project(s.a).min(project(s.b)), project(s.a).max(project(s.b)));
    let (t0, t1) = (project(t.a).min(project(t.b)), project(t.a).max(project(t.b)));
    (s1.min(t1) - s0.max(t0)).max(0.0)
}

/// Whether the only contact between the two segments is a node centre both
/// edges declare as an endpoint.
fn meets_only_at_shared_endpoint(
    s: &Segment,
    t: &Segment,
    lines: &[Polyline<'_>],
    index: &NodeIndex<'_>,
) -> bool {
    let ls = &lines[s.polyline];
    let lt = &lines[t.polyline];
    for node in [ls.source, ls.target] {
        if node != lt.source && node != lt.target {
            continue;
        }
        let center = index.rect(node).center();
        if !touches_declared_endpoint(s, ls, node, center)
            || !touches_declared_endpoint(t, lt, node, center)
        {
            continue;
        }
        if !segments_collinear(s.a, s.b, t.a, t.b)
            || collinear_overlap_length(s, t) <= COLLINEAR_OVERLAP_EPS
        {
            return true;
        }
    }
    false
}

/// Count intersecting segment pairs drawn from different edges. A polyline
/// bending exactly on another edge hits it once, not once per segment.
pub(crate) fn count_crossings(edges: &[Edge], index: &NodeIndex<'_>) -> CrossingMetric {
    let (lines, dropped) = resolve_polylines(edges, index);
    let segments = segments_of(&lines);
    let mut crossings = Vec::new();
    let mut seen: HashMap<(usize, usize), Vec<Point>> = HashMap::new();

    for i in 0..segments.len() {
        for j in (i + 1)..segments.len() {
            let s = &segments[i];
            let t = &segments[j];
            if s.polyline == t.polyline {
                continue;
            }
            if !segments_intersect(s.a, s.b, t.a, t.b) {
                continue;
            }
            if meets_only_at_shared_endpoint(s, t, &lines, index) {
                continue;
            }
            let point = intersection_point(s.a, s.b, t.a, t.b);
            if !point.is_finite() {
                continue;
            }
            let hits = seen.entry((s.polyline, t.polyline)).or_default();
            if hits.iter().any(|hit| hit.distance_to(point) <= POINT_MERGE_EPS) {
                continue;
            }
            hits.push(point);
            crossings.push(EdgeCrossing {
                edge1: lines[s.polyline].edge.id.clone(),
                edge2: lines[t.polyline].edge.id.clone(),
                point,
            });
        }
    }

    CrossingMetric {
        count: crossings.len(),
        crossings,
        evaluated_edges: lines.len(),
        dropped_edges: dropped,
    }
}

pub(crate) fn crossing_score(metric: &CrossingMetric, penalty: f64) -> f64 {
    let ratio = metric.count as f64 / metric.evaluated_edges.max(1) as f64;
    100.0 * (1.0 - penalty * ratio).clamp(0.0, 1.0)
}

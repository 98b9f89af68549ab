use serde::{Deserialize, Serialize};

use crate::geometry::{Point, Rect, Size};

/// A node as placed by the external layout engine. `position` is the
/// top-left corner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionedNode {
    pub id: String,
    pub position: Point,
    pub size: Size,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub kind: String,
}

impl PositionedNode {
    pub fn new(id: impl Into<String>, x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            id: id.into(),
            position: Point::new(x, y),
            size: Size::new(width, height),
            parent_id: None,
            kind: String::new(),
        }
    }

    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = kind.into();
        self
    }

    /// Sanitised bounding box, or `None` when the node has non-finite
    /// geometry. Negative sizes clamp to zero. A box whose far edges or area
    /// overflow `f64` is unplaceable too.
    pub fn rect(&self) -> Option<Rect> {
        let Size { width, height } = self.size;
        if !self.position.is_finite() || !width.is_finite() || !height.is_finite() {
            return None;
        }
        let rect = Rect::new(
            self.position.x,
            self.position.y,
            width.max(0.0),
            height.max(0.0),
        );
        if !rect.right().is_finite() || !rect.bottom().is_finite() || !rect.area().is_finite() {
            return None;
        }
        Some(rect)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub id: String,
    pub source_id: String,
    pub target_id: String,
    /// Intermediate routing points. Endpoints are always re-anchored to the
    /// current node centres.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points: Option<Vec<Point>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Edge {
    pub fn new(
        id: impl Into<String>,
        source_id: impl Into<String>,
        target_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            source_id: source_id.into(),
            target_id: target_id.into(),
            points: None,
            label: None,
        }
    }

    pub fn with_points(mut self, points: Vec<Point>) -> Self {
        self.points = Some(points);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportSize {
    pub width: f64,
    pub height: f64,
}

impl ViewportSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Usable area, 0 for non-finite or non-positive dimensions.
    pub fn area(&self) -> f64 {
        if !self.width.is_finite() || !self.height.is_finite() {
            return 0.0;
        }
        self.width.max(0.0) * self.height.max(0.0)
    }
}

impl Default for ViewportSize {
    fn default() -> Self {
        Self::new(1920.0, 1080.0)
    }
}

/// One layout pass worth of geometry, as handed over by the rendering layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagramSnapshot {
    #[serde(default)]
    pub nodes: Vec<PositionedNode>,
    #[serde(default)]
    pub edges: Vec<Edge>,
    #[serde(default)]
    pub viewport: ViewportSize,
}

impl DiagramSnapshot {
    pub fn from_json(input: &str) -> serde_json::Result<Self> {
        serde_json::from_str(input)
    }
}

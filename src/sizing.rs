//! Content-driven node sizing, run by the layout layer before positions are
//! assigned.

use crate::config::{SizeConstraints, SizingConfig};
use crate::geometry::Size;
use crate::text_metrics::{FontConfig, measure_text, wrap_text};

/// Size a node with the default sizing configuration.
pub fn calculate_node_size(
    title: &str,
    technology: Option<&str>,
    description: Option<&str>,
    kind: &str,
) -> Size {
    NodeSizer::default().size(title, technology, description, kind)
}

#[derive(Debug, Clone, Default)]
pub struct NodeSizer {
    config: SizingConfig,
}

impl NodeSizer {
    pub fn new(config: SizingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SizingConfig {
        &self.config
    }

    pub fn size(
        &self,
        title: &str,
        technology: Option<&str>,
        description: Option<&str>,
        kind: &str,
    ) -> Size {
        let constraints = self.config.constraints.for_kind(kind);
        let max_content = (constraints.max_width - constraints.padding_x * 2.0).max(1.0);

        let title_font = self.font(&self.config.title_font);
        let title_lines = wrap_text(title, max_content, &title_font);
        let mut blocks = vec![measure_text(&title_lines.join("\n"), &title_font)];

        if let Some(tech) = technology.map(str::trim).filter(|t| !t.is_empty()) {
            let font = self.font(&self.config.technology_font);
            let lines = wrap_text(&format!("[{tech}]"), max_content, &font);
            blocks.push(measure_text(&lines.join("\n"), &font));
        }

        if let Some(desc) = description.map(str::trim).filter(|d| !d.is_empty()) {
            let font = self.font(&self.config.description_font);
            let lines = wrap_text(desc, max_content, &font);
            blocks.push(measure_text(&lines.join("\n"), &font));
        }

        let content_width = blocks.iter().map(|b| b.width).fold(0.0, f64::max);
        let content_height: f64 = blocks.iter().map(|b| b.height).sum::<f64>()
            + self.config.line_gap * blocks.len().saturating_sub(1) as f64;

        fit(constraints, content_width, content_height)
    }

    fn font(&self, base: &FontConfig) -> FontConfig {
        FontConfig {
            fast_metrics: base.fast_metrics || self.config.fast_text_metrics,
            ..base.clone()
        }
    }
}

fn fit(constraints: &SizeConstraints, content_width: f64, content_height: f64) -> Size {
    let max_width = constraints.max_width.max(constraints.min_width);
    let width =
        (content_width + constraints.padding_x * 2.0).clamp(constraints.min_width, max_width);
    let height = (content_height + constraints.padding_y * 2.0 + constraints.icon_height)
        .max(constraints.min_height);
    Size::new(width.ceil(), height.ceil())
}

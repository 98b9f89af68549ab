use crate::error::ConfigError;
use crate::text_metrics::FontConfig;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

const WEIGHT_SUM_EPS: f64 = 1e-6;

/// Relative importance of each metric in the composite score. Must sum to 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreWeights {
    pub overlap: f64,
    pub containment: f64,
    pub crossings: f64,
    pub spacing: f64,
    pub aspect: f64,
}

impl ScoreWeights {
    /// Broken diagrams (overlaps, escaped children) dominate; aesthetics refine.
    pub fn balanced() -> Self {
        Self {
            overlap: 0.30,
            containment: 0.25,
            crossings: 0.20,
            spacing: 0.15,
            aspect: 0.10,
        }
    }

    /// For views where nesting correctness matters more than edge routing.
    pub fn structural() -> Self {
        Self {
            overlap: 0.35,
            containment: 0.35,
            crossings: 0.15,
            spacing: 0.10,
            aspect: 0.05,
        }
    }

    /// For presentation exports where visual rhythm matters.
    pub fn aesthetic() -> Self {
        Self {
            overlap: 0.25,
            containment: 0.20,
            crossings: 0.20,
            spacing: 0.20,
            aspect: 0.15,
        }
    }

    pub fn from_preset(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "balanced" | "default" => Some(Self::balanced()),
            "structural" => Some(Self::structural()),
            "aesthetic" => Some(Self::aesthetic()),
            _ => None,
        }
    }

    pub fn entries(&self) -> [(&'static str, f64); 5] {
        [
            ("overlap", self.overlap),
            ("containment", self.containment),
            ("crossings", self.crossings),
            ("spacing", self.spacing),
            ("aspect", self.aspect),
        ]
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut sum = 0.0;
        for (name, value) in self.entries() {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::NegativeWeight { name, value });
            }
            sum += value;
        }
        if (sum - 1.0).abs() > WEIGHT_SUM_EPS {
            return Err(ConfigError::WeightSum(sum));
        }
        Ok(())
    }
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self::balanced()
    }
}

/// How the spacing analyzer measures the distance between two siblings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GapMeasure {
    #[default]
    EdgeToEdge,
    CenterToCenter,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityConfig {
    /// Slack allowed when checking a child against its parent's box.
    pub containment_tolerance: f64,
    /// Sibling gaps below this (edge to edge) are spacing violations.
    pub min_spacing: f64,
    pub gap_measure: GapMeasure,
    pub aspect_min: f64,
    pub aspect_max: f64,
    pub utilization_min: f64,
    pub utilization_max: f64,
    /// Share of the aspect metric given to viewport utilization.
    pub utilization_weight: f64,
    pub crossing_penalty: f64,
    pub spacing_violation_penalty: f64,
    pub containment_penalty: f64,
    /// Bound on `parentId` walks; guards against cycles.
    pub max_ancestor_depth: usize,
    pub weights: ScoreWeights,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            containment_tolerance: 2.0,
            min_spacing: 20.0,
            gap_measure: GapMeasure::EdgeToEdge,
            aspect_min: 0.3,
            aspect_max: 3.0,
            utilization_min: 0.1,
            utilization_max: 0.85,
            utilization_weight: 0.3,
            crossing_penalty: 0.5,
            spacing_violation_penalty: 5.0,
            containment_penalty: 25.0,
            max_ancestor_depth: 10,
            weights: ScoreWeights::balanced(),
        }
    }
}

impl QualityConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.weights.validate()?;
        for (name, value) in [
            ("containmentTolerance", self.containment_tolerance),
            ("minSpacing", self.min_spacing),
            ("crossingPenalty", self.crossing_penalty),
            ("spacingViolationPenalty", self.spacing_violation_penalty),
            ("containmentPenalty", self.containment_penalty),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidValue { name, value });
            }
        }
        if !(0.0..=1.0).contains(&self.utilization_weight) {
            return Err(ConfigError::InvalidValue {
                name: "utilizationWeight",
                value: self.utilization_weight,
            });
        }
        check_band("aspect", self.aspect_min, self.aspect_max)?;
        check_band("utilization", self.utilization_min, self.utilization_max)?;
        if self.utilization_max > 1.0 {
            return Err(ConfigError::InvalidBand {
                name: "utilization",
                min: self.utilization_min,
                max: self.utilization_max,
            });
        }
        Ok(())
    }
}

fn check_band(name: &'static str, min: f64, max: f64) -> Result<(), ConfigError> {
    if !min.is_finite() || !max.is_finite() || min <= 0.0 || min > max {
        return Err(ConfigError::InvalidBand { name, min, max });
    }
    Ok(())
}

/// Size limits applied to one node kind by the sizing logic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SizeConstraints {
    pub min_width: f64,
    pub max_width: f64,
    pub min_height: f64,
    pub padding_x: f64,
    pub padding_y: f64,
    /// Extra vertical room reserved for a glyph above the title (people).
    pub icon_height: f64,
}

impl SizeConstraints {
    const fn new(min_width: f64, max_width: f64, min_height: f64) -> Self {
        Self {
            min_width,
            max_width,
            min_height,
            padding_x: 16.0,
            padding_y: 12.0,
            icon_height: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KindConstraints {
    pub person: SizeConstraints,
    pub system: SizeConstraints,
    pub container: SizeConstraints,
    pub component: SizeConstraints,
    pub datastore: SizeConstraints,
    pub queue: SizeConstraints,
    pub default: SizeConstraints,
}

impl Default for KindConstraints {
    fn default() -> Self {
        Self {
            person: SizeConstraints {
                icon_height: 40.0,
                ..SizeConstraints::new(160.0, 260.0, 160.0)
            },
            system: SizeConstraints::new(200.0, 320.0, 120.0),
            container: SizeConstraints::new(180.0, 280.0, 100.0),
            component: SizeConstraints::new(160.0, 260.0, 80.0),
            datastore: SizeConstraints {
                padding_y: 20.0,
                ..SizeConstraints::new(180.0, 280.0, 100.0)
            },
            queue: SizeConstraints {
                padding_x: 24.0,
                ..SizeConstraints::new(180.0, 300.0, 80.0)
            },
            default: SizeConstraints::new(160.0, 280.0, 80.0),
        }
    }
}

impl KindConstraints {
    /// Constraints for an opaque kind tag; unknown tags use `default`.
    pub fn for_kind(&self, kind: &str) -> &SizeConstraints {
        match kind.trim().to_ascii_lowercase().as_str() {
            "person" | "actor" => &self.person,
            "system" | "softwaresystem" => &self.system,
            "container" => &self.container,
            "component" => &self.component,
            "datastore" | "database" => &self.datastore,
            "queue" => &self.queue,
            _ => &self.default,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SizingConfig {
    pub title_font: FontConfig,
    pub technology_font: FontConfig,
    pub description_font: FontConfig,
    /// Vertical gap between the title, technology and description blocks.
    pub line_gap: f64,
    pub constraints: KindConstraints,
    /// Skip font loading and use the calibrated character table.
    pub fast_text_metrics: bool,
}

impl Default for SizingConfig {
    fn default() -> Self {
        Self {
            title_font: FontConfig {
                weight: 600,
                ..FontConfig::new(16.0)
            },
            technology_font: FontConfig::new(12.0),
            description_font: FontConfig::new(13.0),
            line_gap: 6.0,
            constraints: KindConstraints::default(),
            fast_text_metrics: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub quality: QualityConfig,
    pub sizing: SizingConfig,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    weights_preset: Option<String>,
    weights: Option<WeightsFile>,
    quality: Option<QualityConfigFile>,
    sizing: Option<SizingConfigFile>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct WeightsFile {
    overlap: Option<f64>,
    containment: Option<f64>,
    crossings: Option<f64>,
    spacing: Option<f64>,
    aspect: Option<f64>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct QualityConfigFile {
    containment_tolerance: Option<f64>,
    min_spacing: Option<f64>,
    gap_measure: Option<GapMeasure>,
    aspect_min: Option<f64>,
    aspect_max: Option<f64>,
    utilization_min: Option<f64>,
    utilization_max: Option<f64>,
    utilization_weight: Option<f64>,
    crossing_penalty: Option<f64>,
    spacing_violation_penalty: Option<f64>,
    containment_penalty: Option<f64>,
    max_ancestor_depth: Option<usize>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct SizingConfigFile {
    font_family: Option<String>,
    title_font: Option<FontConfig>,
    technology_font: Option<FontConfig>,
    description_font: Option<FontConfig>,
    line_gap: Option<f64>,
    constraints: Option<KindConstraints>,
    fast_text_metrics: Option<bool>,
}

/// Load a JSON5 config file and merge it onto the defaults. `None` yields
/// the defaults unchanged.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    parse_config(&contents)
}

pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let parsed: ConfigFile = json5::from_str(contents)?;
    let mut config = Config::default();

    if let Some(preset) = parsed.weights_preset.as_deref() {
        config.quality.weights = ScoreWeights::from_preset(preset)
            .ok_or_else(|| anyhow::anyhow!("unknown weights preset `{preset}`"))?;
    }
    if let Some(weights) = parsed.weights {
        let target = &mut config.quality.weights;
        if let Some(v) = weights.overlap {
            target.overlap = v;
        }
        if let Some(v) = weights.containment {
            target.containment = v;
        }
        if let Some(v) = weights.crossings {
            target.crossings = v;
        }
        if let Some(v) = weights.spacing {
            target.spacing = v;
        }
        if let Some(v) = weights.aspect {
            target.aspect = v;
        }
    }

    if let Some(file) = parsed.quality {
        let quality = &mut config.quality;
        if let Some(v) = file.containment_tolerance {
            quality.containment_tolerance = v;
        }
        if let Some(v) = file.min_spacing {
            quality.min_spacing = v;
        }
        if let Some(v) = file.gap_measure {
            quality.gap_measure = v;
        }
        if let Some(v) = file.aspect_min {
            quality.aspect_min = v;
        }
        if let Some(v) = file.aspect_max {
            quality.aspect_max = v;
        }
        if let Some(v) = file.utilization_min {
            quality.utilization_min = v;
        }
        if let Some(v) = file.utilization_max {
            quality.utilization_max = v;
        }
        if let Some(v) = file.utilization_weight {
            quality.utilization_weight = v;
        }
        if let Some(v) = file.crossing_penalty {
            quality.crossing_penalty = v;
        }
        if let Some(v) = file.spacing_violation_penalty {
            quality.spacing_violation_penalty = v;
        }
        if let Some(v) = file.containment_penalty {
            quality.containment_penalty = v;
        }
        if let Some(v) = file.max_ancestor_depth {
            quality.max_ancestor_depth = v;
        }
    }

    if let Some(file) = parsed.sizing {
        let sizing = &mut config.sizing;
        if let Some(family) = file.font_family {
            sizing.title_font.family = family.clone();
            sizing.technology_font.family = family.clone();
            sizing.description_font.family = family;
        }
        if let Some(v) = file.title_font {
            sizing.title_font = v;
        }
        if let Some(v) = file.technology_font {
            sizing.technology_font = v;
        }
        if let Some(v) = file.description_font {
            sizing.description_font = v;
        }
        if let Some(v) = file.line_gap {
            sizing.line_gap = v;
        }
        if let Some(v) = file.constraints {
            sizing.constraints = v;
        }
        if let Some(v) = file.fast_text_metrics {
            sizing.fast_text_metrics = v;
        }
    }

    config.quality.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_sum_to_one() {
        for weights in [
            ScoreWeights::balanced(),
            ScoreWeights::structural(),
            ScoreWeights::aesthetic(),
        ] {
            assert!(weights.validate().is_ok(), "{weights:?}");
        }
    }

    #[test]
    fn balanced_weights_favour_broken_layouts() {
        let w = ScoreWeights::balanced();
        assert!(w.overlap > w.spacing && w.overlap > w.aspect);
        assert!(w.containment > w.spacing && w.containment > w.aspect);
    }

    #[test]
    fn rejects_weights_that_do_not_sum_to_one() {
        let weights = ScoreWeights {
            aspect: 0.5,
            ..ScoreWeights::balanced()
        };
        assert!(matches!(weights.validate(), Err(ConfigError::WeightSum(_))));
    }

    #[test]
    fn rejects_negative_weight() {
        let weights = ScoreWeights {
            overlap: 0.5,
            aspect: -0.1,
            ..ScoreWeights::balanced()
        };
        assert!(matches!(
            weights.validate(),
            Err(ConfigError::NegativeWeight { name: "aspect", .. })
        ));
    }

    #[test]
    fn rejects_inverted_aspect_band() {
        let config = QualityConfig {
            aspect_min: 4.0,
            aspect_max: 3.0,
            ..QualityConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidBand { name: "aspect", .. })
        ));
    }

    #[test]
    fn default_config_is_valid() {
        assert!(QualityConfig::default().validate().is_ok());
    }

    #[test]
    fn parse_config_merges_partial_file() {
        let config = parse_config(
            r#"{
                // tighter nesting checks for the container view
                quality: { containmentTolerance: 0.5, gapMeasure: "centerToCenter" },
                weightsPreset: "structural",
                sizing: { fontFamily: "Inter", fastTextMetrics: true },
            }"#,
        )
        .unwrap();
        assert_eq!(config.quality.containment_tolerance, 0.5);
        assert_eq!(config.quality.gap_measure, GapMeasure::CenterToCenter);
        assert_eq!(config.quality.min_spacing, 20.0);
        assert_eq!(config.quality.weights, ScoreWeights::structural());
        assert_eq!(config.sizing.title_font.family, "Inter");
        assert_eq!(config.sizing.description_font.family, "Inter");
        assert!(config.sizing.fast_text_metrics);
    }

    #[test]
    fn parse_config_rejects_bad_weights() {
        let err = parse_config(r#"{ weights: { overlap: 0.9 } }"#).unwrap_err();
        assert!(err.to_string().contains("sum to 1.0"), "{err}");
    }

    #[test]
    fn parse_config_rejects_unknown_preset() {
        assert!(parse_config(r#"{ weightsPreset: "fancy" }"#).is_err());
    }

    #[test]
    fn load_config_without_path_uses_defaults() {
        let config = load_config(None).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn kind_lookup_is_case_insensitive() {
        let constraints = KindConstraints::default();
        assert_eq!(constraints.for_kind("Person"), &constraints.person);
        assert_eq!(constraints.for_kind("database"), &constraints.datastore);
        assert_eq!(constraints.for_kind("gizmo"), &constraints.default);
    }
}

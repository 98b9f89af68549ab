//! Layout quality scoring and node sizing for architecture diagrams.
//!
//! The scorer takes the positioned output of a layout pass and grades it on
//! overlaps, edge crossings, sibling spacing, parent containment and the overall
//! shape of the drawing. The sizing helpers measure text and compute node boxes
//! before layout runs.

#[cfg(feature = "cli")]
pub mod cli;
pub mod compare;
pub mod config;
pub mod error;
pub mod geometry;
pub mod history;
pub mod ir;
pub mod observer;
pub mod quality;
pub mod sizing;
pub mod text_metrics;

#[cfg(feature = "cli")]
pub use cli::run;
pub use compare::{ReportComparison, compare_reports};
pub use config::{Config, QualityConfig, ScoreWeights, SizingConfig, load_config, parse_config};
pub use error::ConfigError;
pub use ir::{DiagramSnapshot, Edge, PositionedNode, ViewportSize};
pub use observer::{RecordingObserver, ReportObserver};
pub use quality::{Grade, QualityEvaluator, QualityReport, evaluate, evaluate_with_config};
pub use sizing::{NodeSizer, calculate_node_size};
pub use text_metrics::{FontConfig, TextSize, measure_text};

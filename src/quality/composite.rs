use crate::config::ScoreWeights;

use super::report::{Grade, SubScores};

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// A sub-score in [0, 100]; anything non-finite counts as the worst score.
pub(crate) fn sanitize(score: f64) -> f64 {
    if score.is_finite() {
        score.clamp(0.0, 100.0)
    } else {
        0.0
    }
}

/// Weighted sum of the sub-scores, clamped to [0, 100] and rounded to two
/// decimals so repeated runs compare equal in JSON.
pub(crate) fn weighted_score(scores: &SubScores, weights: &ScoreWeights) -> f64 {
    let total = sanitize(scores.overlap) * weights.overlap
        + sanitize(scores.containment) * weights.containment
        + sanitize(scores.crossings) * weights.crossings
        + sanitize(scores.spacing) * weights.spacing
        + sanitize(scores.aspect) * weights.aspect;
    round2(sanitize(total))
}

pub(crate) fn grade(score: f64) -> Grade {
    Grade::from_score(score)
}

//! Running performance scores, one exponential-smoothing step per turn.
//!
//! Each new sample gets weight 0.3 so a single unusually good or bad answer
//! cannot dominate the running score, while the score still tracks a trend
//! across the interview. Values are NOT clamped during updates; clamping to
//! [0,100] happens only when scores are read for display or feedback.

use super::models::{AnalysisResult, PerformanceScores};

const CARRY_WEIGHT: f64 = 0.7;
const SAMPLE_WEIGHT: f64 = 0.3;
const DEPTH_PER_KEYWORD: f64 = 10.0;
const TECH_SIGNAL_PRESENT: f64 = 70.0;
const TECH_SIGNAL_ABSENT: f64 = 30.0;

/// Applies one turn's analysis to the running scores.
pub fn update(previous: &PerformanceScores, analysis: &AnalysisResult) -> PerformanceScores {
    let relevance_sample = analysis.relevance_score;
    let depth_sample = analysis.keywords.len() as f64 * DEPTH_PER_KEYWORD;
    let technical_sample = if analysis.keywords.is_empty() {
        TECH_SIGNAL_ABSENT
    } else {
        TECH_SIGNAL_PRESENT
    };

    PerformanceScores {
        clarity: blend(previous.clarity, relevance_sample),
        relevance: blend(previous.relevance, relevance_sample),
        depth: blend(previous.depth, depth_sample),
        communication: blend(previous.communication, relevance_sample),
        technical_accuracy: blend(previous.technical_accuracy, technical_sample),
    }
}

fn blend(previous: f64, sample: f64) -> f64 {
    CARRY_WEIGHT * previous + SAMPLE_WEIGHT * sample
}

/// Clamp for display: scores may transiently sit outside [0,100] internally.
pub fn normalize_score(value: f64) -> f64 {
    value.clamp(0.0, 100.0)
}

/// All five axes clamped for display.
pub fn clamped(scores: &PerformanceScores) -> PerformanceScores {
    PerformanceScores {
        clarity: normalize_score(scores.clarity),
        relevance: normalize_score(scores.relevance),
        depth: normalize_score(scores.depth),
        communication: normalize_score(scores.communication),
        technical_accuracy: normalize_score(scores.technical_accuracy),
    }
}

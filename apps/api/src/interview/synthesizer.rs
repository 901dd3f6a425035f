//! End-of-session feedback synthesis.
//!
//! The model writes the qualitative fields; the numbers are ours. Whatever
//! overall score the model volunteers is ignored — the authoritative overall
//! is always the rounded mean of the five clamped axes. On any model-path
//! failure the caller gets a fixed, well-formed fallback report.

use serde::Deserialize;
use uuid::Uuid;

use super::fallback::{generate_json_or, Parsed};
use super::models::{Feedback, Message, PerformanceScores, RadarPoint, Role};
use super::prompts::{FEEDBACK_PROMPT_TEMPLATE, FEEDBACK_SYSTEM};
use super::tracker;
use crate::llm_client::TextGenerator;

/// Fixed radar order for every report.
pub const RADAR_CATEGORIES: [&str; 5] = [
    "Clarity",
    "Relevance",
    "Depth",
    "Communication",
    "Technical Accuracy",
];

const FALLBACK_AXIS_SCORE: f64 = 65.0;
const FALLBACK_OVERALL: u8 = 65;

/// Qualitative fields from the model. The model's own overall score is
/// deliberately absent from this shape — it is never trusted.
#[derive(Debug, Deserialize)]
struct SynthesisDraft {
    #[serde(default)]
    strengths: Vec<String>,
    #[serde(default)]
    improvement_areas: Vec<String>,
    #[serde(default)]
    key_takeaways: Vec<String>,
}

/// Builds the final report from the transcript (system messages excluded)
/// and the final running scores. Never fails.
pub async fn synthesize(
    llm: &dyn TextGenerator,
    session_id: Uuid,
    history: &[Message],
    final_scores: &PerformanceScores,
) -> Feedback {
    let clamped = tracker::clamped(final_scores);
    let prompt = FEEDBACK_PROMPT_TEMPLATE
        .replace(
            "{scores_json}",
            &serde_json::to_string(&clamped).unwrap_or_default(),
        )
        .replace("{transcript}", &render_transcript(history));

    let draft = generate_json_or(llm, &prompt, FEEDBACK_SYSTEM, "feedback_synthesis", || {
        fallback_draft()
    })
    .await;

    let (scores, overall) = match &draft {
        Parsed::Generated(_) => (clamped, overall_score(&clamped)),
        Parsed::Fallback(_) => (fallback_axes(), FALLBACK_OVERALL),
    };
    let draft = draft.into_inner();

    Feedback {
        session_id,
        overall_score: overall,
        radar_chart_data: radar_points(&scores),
        scores,
        strengths: draft.strengths,
        improvement_areas: draft.improvement_areas,
        key_takeaways: draft.key_takeaways,
    }
}

/// Rounded mean of the five clamped axes.
pub fn overall_score(clamped: &PerformanceScores) -> u8 {
    let mean = (clamped.clarity
        + clamped.relevance
        + clamped.depth
        + clamped.communication
        + clamped.technical_accuracy)
        / 5.0;
    mean.round() as u8
}

fn radar_points(scores: &PerformanceScores) -> Vec<RadarPoint> {
    let values = [
        scores.clarity,
        scores.relevance,
        scores.depth,
        scores.communication,
        scores.technical_accuracy,
    ];
    RADAR_CATEGORIES
        .iter()
        .zip(values)
        .map(|(category, score)| RadarPoint {
            category: category.to_string(),
            score,
        })
        .collect()
}

/// Transcript as sent to the model: interviewer/candidate turns only. The
/// persona and any compression summaries carry the system role and stay out.
fn render_transcript(history: &[Message]) -> String {
    history
        .iter()
        .filter(|m| m.role != Role::System)
        .map(|m| match m.role {
            Role::Assistant => format!("Interviewer: {}", m.content),
            _ => format!("Candidate: {}", m.content),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn fallback_axes() -> PerformanceScores {
    PerformanceScores {
        clarity: FALLBACK_AXIS_SCORE,
        relevance: FALLBACK_AXIS_SCORE,
        depth: FALLBACK_AXIS_SCORE,
        communication: FALLBACK_AXIS_SCORE,
        technical_accuracy: FALLBACK_AXIS_SCORE,
    }
}

fn fallback_draft() -> SynthesisDraft {
    SynthesisDraft {
        strengths: vec![
            "You kept your answers on topic.".to_string(),
            "You maintained a steady, professional tone.".to_string(),
        ],
        improvement_areas: vec![
            "Support claims with concrete, quantified examples.".to_string(),
            "Structure longer answers: situation, action, result.".to_string(),
        ],
        key_takeaways: vec![
            "Lead with the outcome, then explain how you got there.".to_string(),
            "Prepare two or three stories you can adapt to most questions.".to_string(),
        ],
    }
}

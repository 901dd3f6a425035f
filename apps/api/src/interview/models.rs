//! Data model for the mock-interview engine: sessions, messages, running
//! scores, per-turn analysis, and the final feedback report.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    Assistant,
    User,
}

/// One entry in a session's conversation history. Immutable once appended;
/// insertion order is meaningful and never reordered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

/// How the simulated interviewer behaves. Immutable for the session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InterviewerStyle {
    Strict,
    #[default]
    Friendly,
    StressTest,
}

impl InterviewerStyle {
    /// Canonical tone directive injected into persona and question prompts.
    pub fn directive(&self) -> &'static str {
        match self {
            InterviewerStyle::Strict => {
                "Keep a formal, exacting tone. Ask precise questions, challenge vague \
                claims, and do not volunteer encouragement."
            }
            InterviewerStyle::Friendly => {
                "Keep a warm, encouraging tone. Put the candidate at ease, acknowledge \
                good points, and ask curious follow-ups."
            }
            InterviewerStyle::StressTest => {
                "Keep steady pressure on the candidate. Interrupt rambling, question \
                assumptions, and add constraints to their answers."
            }
        }
    }
}

/// Explicit session lifecycle. `Concluded` is terminal: further turns and a
/// second conclusion are rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Uninitialized,
    Active,
    Concluded,
}

/// Caller-supplied configuration for a new session.
#[derive(Debug, Clone, Deserialize)]
pub struct InterviewConfig {
    pub job_description: String,
    #[serde(default)]
    pub interviewer_style: InterviewerStyle,
    #[serde(default)]
    pub focus_areas: Vec<String>,
    #[serde(default)]
    pub resume_data: Option<String>,
}

/// Small mutable head of a session: everything except the conversation
/// history, running scores, and persona, which live under their own keys.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionMeta {
    pub session_id: Uuid,
    pub user_id: Uuid,
    pub status: SessionStatus,
    pub interviewer_style: InterviewerStyle,
    pub current_question: String,
    pub asked_questions: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Full session view returned to callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterviewSession {
    pub session_id: Uuid,
    pub user_id: Uuid,
    pub status: SessionStatus,
    pub interviewer_style: InterviewerStyle,
    pub interviewer_persona: String,
    pub current_question: String,
    pub asked_questions: Vec<String>,
    pub conversation_history: Vec<Message>,
    pub performance: PerformanceScores,
    pub created_at: DateTime<Utc>,
}

/// The five competency axes tracked across a session. Values settle in
/// [0,100] but are NOT clamped here — clamping happens only when scores are
/// read for display or feedback.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceScores {
    pub clarity: f64,
    pub relevance: f64,
    pub depth: f64,
    pub communication: f64,
    pub technical_accuracy: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    #[default]
    Neutral,
    Negative,
}

/// Structured analysis of one candidate answer. Produced fresh each turn,
/// consumed by the tracker and the follow-up generator, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub sentiment: Sentiment,
    #[serde(default)]
    pub suggestions: Vec<String>,
    pub relevance_score: f64,
}

/// One spoke of the feedback radar chart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RadarPoint {
    pub category: String,
    pub score: f64,
}

/// Final report produced once, at conclusion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feedback {
    pub session_id: Uuid,
    pub overall_score: u8,
    pub scores: PerformanceScores,
    pub strengths: Vec<String>,
    pub improvement_areas: Vec<String>,
    pub radar_chart_data: Vec<RadarPoint>,
    pub key_takeaways: Vec<String>,
}

/// What one processed turn hands back to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct TurnReply {
    pub follow_up_question: String,
    pub analysis: AnalysisResult,
}

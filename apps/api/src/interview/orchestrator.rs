//! Interview orchestrator — the session state machine.
//!
//! Mediates every read and write of session state: starts a session (persona
//! + opening question), processes each turn (compress → analyze → track →
//! follow-up → persist), and concludes it (synthesize → persist feedback).
//! The persona and opening calls are fatal by design; everything on the
//! per-turn path degrades to local fallbacks instead of failing the turn.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use super::models::{
    AnalysisResult, Feedback, InterviewConfig, InterviewSession, Message, PerformanceScores, Role,
    SessionMeta, SessionStatus, TurnReply,
};
use super::prompts::{
    FALLBACK_FOLLOW_UP, FOLLOW_UP_PROMPT_TEMPLATE, INTERVIEWER_SYSTEM, OPENING_PROMPT_TEMPLATE,
    PERSONA_PROMPT_TEMPLATE,
};
use super::{analyzer, compressor, synthesizer, tracker};
use crate::errors::AppError;
use crate::llm_client::TextGenerator;
use crate::store::{self, keys, SessionStore};

/// Trailing messages of context included in the follow-up prompt.
const FOLLOW_UP_CONTEXT_MESSAGES: usize = 4;

/// Renders the configured focus areas as a comma-separated list for prompt templates.
fn focus_areas(config: &InterviewConfig) -> String {
    config.focus_areas.join(", ")
}

pub struct InterviewOrchestrator {
    llm: Arc<dyn TextGenerator>,
    store: Arc<dyn SessionStore>,
    session_ttl_seconds: u64,
}

impl InterviewOrchestrator {
    pub fn new(
        llm: Arc<dyn TextGenerator>,
        store: Arc<dyn SessionStore>,
        session_ttl_seconds: u64,
    ) -> Self {
        Self {
            llm,
            store,
            session_ttl_seconds,
        }
    }

    /// Creates a session: generates the interviewer persona and the opening
    /// question, seeds history with both, zeroes the scores, and persists
    /// everything. Generation failures here propagate — there is no session
    /// to salvage without a persona.
    pub async fn start_interview(
        &self,
        config: InterviewConfig,
        user_id: Uuid,
    ) -> Result<InterviewSession, AppError> {
        let session_id = Uuid::new_v4();
        info!("Starting interview session {session_id} for user {user_id}");

        let persona = self.generate_persona(&config).await?;
        let opening = self.generate_opening(&persona, &config).await?;

        let history = vec![
            Message::new(Role::System, persona.clone()),
            Message::new(Role::Assistant, opening.clone()),
        ];
        let performance = PerformanceScores::default();
        let meta = SessionMeta {
            session_id,
            user_id,
            status: SessionStatus::Active,
            interviewer_style: config.interviewer_style,
            current_question: opening.clone(),
            asked_questions: vec![opening],
            created_at: Utc::now(),
        };

        store::set_json(
            &*self.store,
            &keys::persona(session_id),
            &persona,
            self.session_ttl_seconds,
        )
        .await?;
        self.persist(&meta, &history, &performance).await?;

        info!(
            "Interview session {session_id} started ({:?} interviewer)",
            meta.interviewer_style
        );
        Ok(assemble_session(meta, persona, history, performance))
    }

    /// Runs one turn: compresses history if it has outgrown its budget,
    /// analyzes the answer, folds the analysis into the running scores,
    /// generates a follow-up question, appends the exchange, and persists.
    pub async fn process_user_response(
        &self,
        session_id: Uuid,
        user_text: &str,
        user_id: Uuid,
    ) -> Result<TurnReply, AppError> {
        let mut meta = self.load_meta(session_id).await?;
        if meta.status != SessionStatus::Active {
            return Err(AppError::Validation(format!(
                "Interview session {session_id} is already concluded"
            )));
        }

        let mut history = compressor::compress(self.load_history(session_id).await?);
        let previous = self.load_performance(session_id).await?;

        let analysis = analyzer::analyze(&*self.llm, user_text).await;
        let performance = tracker::update(&previous, &analysis);
        let follow_up = self.generate_follow_up(&history, user_text, &analysis).await;

        history.push(Message::new(Role::User, user_text));
        history.push(Message::new(Role::Assistant, follow_up.clone()));
        meta.current_question = follow_up.clone();
        meta.asked_questions.push(follow_up.clone());

        self.persist(&meta, &history, &performance).await?;

        info!(
            "Processed turn for session {session_id} (user {user_id}): relevance={:.0}",
            analysis.relevance_score
        );
        Ok(TurnReply {
            follow_up_question: follow_up,
            analysis,
        })
    }

    /// Ends a session: synthesizes the feedback report from the latest
    /// persisted transcript and scores, marks the session concluded, and
    /// persists the report. Malformed model output cannot fail this — the
    /// synthesizer always returns a well-formed report.
    pub async fn conclude_interview(
        &self,
        session_id: Uuid,
        user_id: Uuid,
    ) -> Result<Feedback, AppError> {
        let mut meta = self.load_meta(session_id).await?;
        if meta.status == SessionStatus::Concluded {
            return Err(AppError::Validation(format!(
                "Interview session {session_id} is already concluded"
            )));
        }

        let history = self.load_history(session_id).await?;
        let performance = self.load_performance(session_id).await?;

        let feedback =
            synthesizer::synthesize(&*self.llm, session_id, &history, &performance).await;

        meta.status = SessionStatus::Concluded;
        store::set_json(
            &*self.store,
            &keys::feedback(session_id),
            &feedback,
            self.session_ttl_seconds,
        )
        .await?;
        self.persist(&meta, &history, &performance).await?;

        info!(
            "Concluded interview session {session_id} (user {user_id}): overall={}",
            feedback.overall_score
        );
        Ok(feedback)
    }

    /// Full session view for callers.
    pub async fn get_session(&self, session_id: Uuid) -> Result<InterviewSession, AppError> {
        let meta = self.load_meta(session_id).await?;
        let persona = store::get_json::<String>(&*self.store, &keys::persona(session_id))
            .await?
            .unwrap_or_default();
        let history = self.load_history(session_id).await?;
        let performance = self.load_performance(session_id).await?;
        Ok(assemble_session(meta, persona, history, performance))
    }

    /// The feedback report, if the session has been concluded.
    pub async fn get_feedback(&self, session_id: Uuid) -> Result<Feedback, AppError> {
        store::get_json(&*self.store, &keys::feedback(session_id))
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("No feedback for interview session {session_id}"))
            })
    }

    async fn generate_persona(&self, config: &InterviewConfig) -> Result<String, AppError> {
        let resume_section = match &config.resume_data {
            Some(resume) => format!("\nCANDIDATE BACKGROUND (for context only):\n{resume}\n"),
            None => String::new(),
        };
        let prompt = PERSONA_PROMPT_TEMPLATE
            .replace("{style_directive}", config.interviewer_style.directive())
            .replace("{focus_areas}", &focus_areas(config))
            .replace("{resume_section}", &resume_section)
            .replace("{job_description}", &config.job_description);

        let generation = self
            .llm
            .generate(&prompt, INTERVIEWER_SYSTEM, "interviewer_persona")
            .await
            .map_err(|e| AppError::Llm(format!("Persona generation failed: {e}")))?;
        Ok(generation.content.trim().to_string())
    }

    async fn generate_opening(
        &self,
        persona: &str,
        config: &InterviewConfig,
    ) -> Result<String, AppError> {
        let prompt = OPENING_PROMPT_TEMPLATE
            .replace("{persona}", persona)
            .replace("{focus_areas}", &focus_areas(config))
            .replace("{job_description}", &config.job_description);

        let generation = self
            .llm
            .generate(&prompt, INTERVIEWER_SYSTEM, "opening_question")
            .await
            .map_err(|e| AppError::Llm(format!("Opening question generation failed: {e}")))?;
        Ok(generation.content.trim().to_string())
    }

    /// Builds the next question from the trailing exchange, the fresh answer,
    /// and its analysis. A failed or empty generation degrades to a fixed
    /// probing question rather than aborting the turn.
    async fn generate_follow_up(
        &self,
        history: &[Message],
        answer: &str,
        analysis: &AnalysisResult,
    ) -> String {
        let prompt = FOLLOW_UP_PROMPT_TEMPLATE
            .replace("{persona}", persona_context(history))
            .replace("{recent_exchange}", &render_recent(history))
            .replace("{answer}", answer)
            .replace(
                "{analysis_json}",
                &serde_json::to_string(analysis).unwrap_or_default(),
            );

        match self
            .llm
            .generate(&prompt, INTERVIEWER_SYSTEM, "follow_up_question")
            .await
        {
            Ok(generation) if !generation.content.trim().is_empty() => {
                generation.content.trim().to_string()
            }
            Ok(_) => {
                warn!("follow_up_question: empty generation, using fallback question");
                FALLBACK_FOLLOW_UP.to_string()
            }
            Err(e) => {
                warn!("follow_up_question: generation failed, using fallback question: {e}");
                FALLBACK_FOLLOW_UP.to_string()
            }
        }
    }

    async fn load_meta(&self, session_id: Uuid) -> Result<SessionMeta, AppError> {
        store::get_json(&*self.store, &keys::meta(session_id))
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Interview session {session_id} not found"))
            })
    }

    async fn load_history(&self, session_id: Uuid) -> Result<Vec<Message>, AppError> {
        store::get_json(&*self.store, &keys::history(session_id))
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Interview session {session_id} not found"))
            })
    }

    async fn load_performance(&self, session_id: Uuid) -> Result<PerformanceScores, AppError> {
        store::get_json(&*self.store, &keys::performance(session_id))
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Interview session {session_id} not found"))
            })
    }

    /// Writes the mutable session fields and refreshes the shared expiry
    /// clock across every key the session owns.
    async fn persist(
        &self,
        meta: &SessionMeta,
        history: &[Message],
        performance: &PerformanceScores,
    ) -> Result<(), AppError> {
        let ttl = self.session_ttl_seconds;
        let id = meta.session_id;
        store::set_json(&*self.store, &keys::meta(id), meta, ttl).await?;
        store::set_json(&*self.store, &keys::history(id), &history, ttl).await?;
        store::set_json(&*self.store, &keys::performance(id), performance, ttl).await?;
        self.store.expire(&keys::persona(id), ttl).await?;
        self.store.expire(&keys::feedback(id), ttl).await?;
        Ok(())
    }
}

fn assemble_session(
    meta: SessionMeta,
    persona: String,
    history: Vec<Message>,
    performance: PerformanceScores,
) -> InterviewSession {
    InterviewSession {
        session_id: meta.session_id,
        user_id: meta.user_id,
        status: meta.status,
        interviewer_style: meta.interviewer_style,
        interviewer_persona: persona,
        current_question: meta.current_question,
        asked_questions: meta.asked_questions,
        conversation_history: history,
        performance,
        created_at: meta.created_at,
    }
}

/// Interviewer identity for prompt context: the first system message, which
/// is the persona — or, after compression, the summary that folds it in.
fn persona_context(history: &[Message]) -> &str {
    history
        .iter()
        .find(|m| m.role == Role::System)
        .map(|m| m.content.as_str())
        .unwrap_or_default()
}

fn render_recent(history: &[Message]) -> String {
    let start = history.len().saturating_sub(FOLLOW_UP_CONTEXT_MESSAGES);
    history[start..]
        .iter()
        .map(|m| match m.role {
            Role::Assistant => format!("Interviewer: {}", m.content),
            Role::User => format!("Candidate: {}", m.content),
            Role::System => format!("Context: {}", m.content),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interview::models::{InterviewerStyle, Sentiment};
    use crate::interview::testing::{MemoryStore, ScriptedGenerator};

    const ANALYSIS_REPLY: &str = r#"{"keywords": ["rust", "tokio", "latency"], "sentiment": "positive", "suggestions": ["Add numbers"], "relevance_score": 80}"#;
    const FEEDBACK_REPLY: &str = r#"{"overall_score": 10, "strengths": ["Clear examples"], "improvement_areas": ["Pacing"], "key_takeaways": ["Lead with outcomes"]}"#;

    fn fixture(
        replies: Vec<Result<&str, &str>>,
        ttl: u64,
    ) -> (InterviewOrchestrator, Arc<MemoryStore>, Arc<ScriptedGenerator>) {
        let store = Arc::new(MemoryStore::new());
        let llm = Arc::new(ScriptedGenerator::new(replies));
        let orchestrator = InterviewOrchestrator::new(llm.clone(), store.clone(), ttl);
        (orchestrator, store, llm)
    }

    fn friendly_config() -> InterviewConfig {
        InterviewConfig {
            job_description: "Backend engineer building payment APIs in Rust.".to_string(),
            interviewer_style: InterviewerStyle::Friendly,
            focus_areas: vec!["APIs".to_string()],
            resume_data: None,
        }
    }

    #[tokio::test]
    async fn test_start_interview_seeds_history_and_opening_question() {
        let (orchestrator, store, _) = fixture(
            vec![Ok("A warm senior engineer persona."), Ok("Tell me about an API you designed?")],
            3600,
        );
        let session = orchestrator
            .start_interview(friendly_config(), Uuid::new_v4())
            .await
            .unwrap();

        assert_eq!(session.conversation_history.len(), 2);
        assert_eq!(session.conversation_history[0].role, Role::System);
        assert_eq!(session.conversation_history[1].role, Role::Assistant);
        assert_eq!(session.asked_questions.len(), 1);
        assert_eq!(session.current_question, "Tell me about an API you designed?");
        assert_eq!(session.status, SessionStatus::Active);
        assert_eq!(session.performance, PerformanceScores::default());
        assert_eq!(store.ttl_of(&keys::meta(session.session_id)), Some(3600));
    }

    #[tokio::test]
    async fn test_start_interview_propagates_generation_failure() {
        let (orchestrator, _, _) = fixture(vec![Err("backend down")], 3600);
        let result = orchestrator
            .start_interview(friendly_config(), Uuid::new_v4())
            .await;
        assert!(matches!(result, Err(AppError::Llm(_))));
    }

    #[tokio::test]
    async fn test_each_turn_appends_exactly_two_messages() {
        let (orchestrator, _, _) = fixture(
            vec![
                Ok("Persona."),
                Ok("Opening?"),
                Ok(ANALYSIS_REPLY),
                Ok("First follow-up?"),
                Ok(ANALYSIS_REPLY),
                Ok("Second follow-up?"),
            ],
            3600,
        );
        let user_id = Uuid::new_v4();
        let session = orchestrator
            .start_interview(friendly_config(), user_id)
            .await
            .unwrap();

        orchestrator
            .process_user_response(session.session_id, "I built a rate limiter.", user_id)
            .await
            .unwrap();
        orchestrator
            .process_user_response(session.session_id, "It used a token bucket.", user_id)
            .await
            .unwrap();

        let session = orchestrator.get_session(session.session_id).await.unwrap();
        // opening pair plus two messages per turn
        assert_eq!(session.conversation_history.len(), 6);
        assert_eq!(session.asked_questions.len(), 3);
        assert_eq!(session.current_question, "Second follow-up?");
    }

    #[tokio::test]
    async fn test_turn_folds_analysis_into_running_scores() {
        let (orchestrator, _, _) = fixture(
            vec![
                Ok("Persona."),
                Ok("Opening?"),
                Ok(ANALYSIS_REPLY),
                Ok("Follow-up?"),
            ],
            3600,
        );
        let user_id = Uuid::new_v4();
        let session = orchestrator
            .start_interview(friendly_config(), user_id)
            .await
            .unwrap();
        let reply = orchestrator
            .process_user_response(session.session_id, "I tuned our tokio runtime.", user_id)
            .await
            .unwrap();

        assert_eq!(reply.analysis.sentiment, Sentiment::Positive);
        assert_eq!(reply.follow_up_question, "Follow-up?");

        let session = orchestrator.get_session(session.session_id).await.unwrap();
        // 0.7*0 + 0.3*80 on the relevance-driven axes, 0.3*(3*10) on depth
        assert!((session.performance.clarity - 24.0).abs() < 1e-9);
        assert!((session.performance.depth - 9.0).abs() < 1e-9);
        assert!((session.performance.technical_accuracy - 21.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_turn_on_unknown_session_is_not_found() {
        let (orchestrator, _, _) = fixture(vec![], 3600);
        let result = orchestrator
            .process_user_response(Uuid::new_v4(), "hello", Uuid::new_v4())
            .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_failed_follow_up_generation_degrades_to_fallback_question() {
        let (orchestrator, _, _) = fixture(
            vec![
                Ok("Persona."),
                Ok("Opening?"),
                Ok(ANALYSIS_REPLY),
                Err("backend down"),
            ],
            3600,
        );
        let user_id = Uuid::new_v4();
        let session = orchestrator
            .start_interview(friendly_config(), user_id)
            .await
            .unwrap();
        let reply = orchestrator
            .process_user_response(session.session_id, "I shipped the migration.", user_id)
            .await
            .unwrap();
        assert_eq!(reply.follow_up_question, FALLBACK_FOLLOW_UP);
    }

    #[tokio::test]
    async fn test_conclude_persists_feedback_and_seals_the_session() {
        let (orchestrator, _, _) = fixture(
            vec![Ok("Persona."), Ok("Opening?"), Ok(FEEDBACK_REPLY)],
            3600,
        );
        let user_id = Uuid::new_v4();
        let session = orchestrator
            .start_interview(friendly_config(), user_id)
            .await
            .unwrap();

        let feedback = orchestrator
            .conclude_interview(session.session_id, user_id)
            .await
            .unwrap();
        assert_eq!(feedback.strengths, vec!["Clear examples"]);
        // all axes are still zero, so the locally computed overall is too
        assert_eq!(feedback.overall_score, 0);

        let stored = orchestrator.get_feedback(session.session_id).await.unwrap();
        assert_eq!(stored.overall_score, feedback.overall_score);

        let session = orchestrator.get_session(session.session_id).await.unwrap();
        assert_eq!(session.status, SessionStatus::Concluded);
    }

    #[tokio::test]
    async fn test_concluded_session_rejects_further_turns_and_reconclusion() {
        let (orchestrator, _, _) = fixture(
            vec![Ok("Persona."), Ok("Opening?"), Ok(FEEDBACK_REPLY)],
            3600,
        );
        let user_id = Uuid::new_v4();
        let session = orchestrator
            .start_interview(friendly_config(), user_id)
            .await
            .unwrap();
        orchestrator
            .conclude_interview(session.session_id, user_id)
            .await
            .unwrap();

        let turn = orchestrator
            .process_user_response(session.session_id, "one more answer", user_id)
            .await;
        assert!(matches!(turn, Err(AppError::Validation(_))));

        let again = orchestrator
            .conclude_interview(session.session_id, user_id)
            .await;
        assert!(matches!(again, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_conclude_survives_malformed_model_output() {
        let (orchestrator, _, _) = fixture(
            vec![Ok("Persona."), Ok("Opening?"), Ok("Overall I'd say they did fine.")],
            3600,
        );
        let user_id = Uuid::new_v4();
        let session = orchestrator
            .start_interview(friendly_config(), user_id)
            .await
            .unwrap();
        let feedback = orchestrator
            .conclude_interview(session.session_id, user_id)
            .await
            .unwrap();
        assert_eq!(feedback.overall_score, 65);
        assert_eq!(feedback.radar_chart_data.len(), 5);
    }

    #[tokio::test]
    async fn test_feedback_read_before_conclusion_is_not_found() {
        let (orchestrator, _, _) = fixture(vec![Ok("Persona."), Ok("Opening?")], 3600);
        let session = orchestrator
            .start_interview(friendly_config(), Uuid::new_v4())
            .await
            .unwrap();
        let result = orchestrator.get_feedback(session.session_id).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_every_write_refreshes_the_shared_expiry_clock() {
        let (orchestrator, store, _) = fixture(
            vec![
                Ok("Persona."),
                Ok("Opening?"),
                Ok(ANALYSIS_REPLY),
                Ok("Follow-up?"),
            ],
            1234,
        );
        let user_id = Uuid::new_v4();
        let session = orchestrator
            .start_interview(friendly_config(), user_id)
            .await
            .unwrap();
        let id = session.session_id;
        assert_eq!(store.ttl_of(&keys::history(id)), Some(1234));
        assert_eq!(store.ttl_of(&keys::persona(id)), Some(1234));

        orchestrator
            .process_user_response(id, "An answer.", user_id)
            .await
            .unwrap();
        assert_eq!(store.ttl_of(&keys::meta(id)), Some(1234));
        assert_eq!(store.ttl_of(&keys::performance(id)), Some(1234));
        assert_eq!(store.ttl_of(&keys::persona(id)), Some(1234));
    }

    #[tokio::test]
    async fn test_follow_up_prompt_carries_recent_exchange_and_analysis() {
        let (orchestrator, _, llm) = fixture(
            vec![
                Ok("Persona."),
                Ok("Opening?"),
                Ok(ANALYSIS_REPLY),
                Ok("Follow-up?"),
            ],
            3600,
        );
        let user_id = Uuid::new_v4();
        let session = orchestrator
            .start_interview(friendly_config(), user_id)
            .await
            .unwrap();
        orchestrator
            .process_user_response(session.session_id, "I profiled the hot path.", user_id)
            .await
            .unwrap();

        let scenarios = llm.scenarios();
        assert_eq!(
            scenarios,
            vec![
                "interviewer_persona",
                "opening_question",
                "response_analysis",
                "follow_up_question"
            ]
        );
        let follow_up_prompt = &llm.prompts()[3];
        assert!(follow_up_prompt.contains("I profiled the hot path."));
        assert!(follow_up_prompt.contains("Interviewer: Opening?"));
        assert!(follow_up_prompt.contains("relevance_score"));
    }
}

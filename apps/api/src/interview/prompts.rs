// All LLM prompt constants for the interview engine.
// Plain-text prompts for interviewer speech, JSON-only prompts for analysis
// and feedback. Placeholders are replaced before sending.

/// System prompt for persona and question generation — the model speaks as
/// the interviewer, plain text only.
pub const INTERVIEWER_SYSTEM: &str =
    "You are simulating a job interviewer in a mock-interview practice session. \
    Stay in character. \
    Respond with plain text only — no markdown, no stage directions, no meta commentary.";

/// Persona generation prompt. Replace `{style_directive}`, `{focus_areas}`,
/// `{resume_section}`, `{job_description}`.
pub const PERSONA_PROMPT_TEMPLATE: &str = r#"Write a short persona description (3-5 sentences) for the interviewer you will play in a mock interview.

Tone for this interviewer: {style_directive}

The interview focuses on: {focus_areas}
{resume_section}
Describe who the interviewer is, their seniority, what they care about in candidates, and how they run an interview. Write in the third person.

JOB DESCRIPTION:
{job_description}"#;

/// Opening question prompt. Replace `{persona}`, `{focus_areas}`, `{job_description}`.
pub const OPENING_PROMPT_TEMPLATE: &str = r#"You are the interviewer described below, opening a mock interview.

YOUR PERSONA:
{persona}

Ask ONE open-ended opening question appropriate for the role and the focus areas ({focus_areas}). It should invite the candidate to talk about their background or a relevant experience — not a yes/no question, not a puzzle.

Return only the question text.

JOB DESCRIPTION:
{job_description}"#;

/// Follow-up question prompt. Replace `{persona}`, `{recent_exchange}`,
/// `{answer}`, `{analysis_json}`.
pub const FOLLOW_UP_PROMPT_TEMPLATE: &str = r#"You are the interviewer described below, mid-way through a mock interview.

YOUR PERSONA:
{persona}

RECENT EXCHANGE:
{recent_exchange}

The candidate just answered:
{answer}

A structured analysis of that answer:
{analysis_json}

Ask ONE follow-up question that references something specific the candidate said and probes one level deeper. Do not repeat an earlier question.

Return only the question text."#;

/// Asked when follow-up generation fails; keeps the turn moving without the model.
pub const FALLBACK_FOLLOW_UP: &str =
    "Can you walk me through that in more detail, focusing on the part you found most challenging?";

/// System prompt for answer analysis — enforces JSON-only output.
pub const ANALYSIS_SYSTEM: &str =
    "You are an expert interview coach analyzing a candidate's answer. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Answer analysis prompt. Replace `{answer}`.
pub const ANALYSIS_PROMPT_TEMPLATE: &str = r#"Analyze the following interview answer.

Return a JSON object with this EXACT schema (no extra fields):
{
  "keywords": ["kubernetes", "incident response"],
  "sentiment": "positive",
  "suggestions": ["Quantify the impact of the migration"],
  "relevance_score": 72
}

Rules:
- "keywords": the notable technical or domain terms the candidate actually used, most significant first
- "sentiment": exactly one of "positive", "neutral", "negative" — the overall confidence and tone of the answer
- "suggestions": 1-3 short, actionable improvements
- "relevance_score": 0-100, how directly the answer addresses a typical interview question on this topic

CANDIDATE ANSWER:
{answer}"#;

/// System prompt for feedback synthesis — enforces JSON-only output.
pub const FEEDBACK_SYSTEM: &str =
    "You are an expert interview coach writing a debrief after a mock interview. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Feedback synthesis prompt. Replace `{transcript}`, `{scores_json}`.
pub const FEEDBACK_PROMPT_TEMPLATE: &str = r#"Write debrief feedback for the mock interview below.

Return a JSON object with this EXACT schema (no extra fields):
{
  "overall_score": 70,
  "strengths": ["Grounded answers in concrete projects"],
  "improvement_areas": ["Answers drifted from the question under pressure"],
  "key_takeaways": ["Lead with the outcome, then explain how"]
}

Rules:
- "strengths": 2-4 specific things the candidate did well, citing the transcript
- "improvement_areas": 2-4 specific, fixable weaknesses
- "key_takeaways": 2-3 short pieces of advice the candidate should remember
- Base everything on the transcript; do not invent moments that did not happen

MEASURED COMPETENCY SCORES (0-100):
{scores_json}

TRANSCRIPT:
{transcript}"#;

//! Turn analysis — scores one candidate answer.
//!
//! The model path returns structured JSON; the deterministic fallback keeps
//! the turn pipeline alive when the model path fails, extracting keywords
//! straight from the answer text.

use super::fallback::generate_json_or;
use super::models::{AnalysisResult, Sentiment};
use super::prompts::{ANALYSIS_PROMPT_TEMPLATE, ANALYSIS_SYSTEM};
use crate::llm_client::TextGenerator;

const FALLBACK_RELEVANCE: f64 = 50.0;
const MAX_FALLBACK_KEYWORDS: usize = 5;
const MIN_KEYWORD_CHARS: usize = 4;

/// Tokens too common to carry signal in fallback keyword extraction.
const STOP_WORDS: &[&str] = &[
    "about", "after", "again", "also", "back", "because", "been", "before", "being", "between",
    "could", "doing", "down", "every", "first", "from", "going", "have", "here",
    "into", "just", "like", "made", "make", "more", "most", "much", "over", "place", "pretty",
    "quite", "really", "same", "should", "some", "such", "sure", "than", "that", "their", "them",
    "then", "there", "these", "they", "thing", "things", "this", "those", "through", "very",
    "well", "were", "what", "when", "where", "which", "while", "will", "with", "would", "your",
];

/// Analyzes one answer. Never fails: any model-path problem yields the
/// deterministic fallback. The relevance score is clamped to [0,100] on both
/// paths.
pub async fn analyze(llm: &dyn TextGenerator, answer: &str) -> AnalysisResult {
    let prompt = ANALYSIS_PROMPT_TEMPLATE.replace("{answer}", answer);
    let mut result = generate_json_or(llm, &prompt, ANALYSIS_SYSTEM, "response_analysis", || {
        fallback_analysis(answer)
    })
    .await
    .into_inner();

    result.relevance_score = result.relevance_score.clamp(0.0, 100.0);
    result
}

/// Deterministic stand-in analysis derived purely from the answer text.
pub(crate) fn fallback_analysis(answer: &str) -> AnalysisResult {
    AnalysisResult {
        keywords: extract_keywords(answer),
        sentiment: Sentiment::Neutral,
        suggestions: vec![
            "Structure your answer around one concrete example.".to_string(),
            "Quantify the outcome where you can.".to_string(),
        ],
        relevance_score: FALLBACK_RELEVANCE,
    }
}

/// Up to five distinct lowercase tokens longer than three characters,
/// stop words excluded, in order of first appearance.
fn extract_keywords(answer: &str) -> Vec<String> {
    let mut keywords: Vec<String> = Vec::new();
    for token in answer.split(|c: char| !c.is_alphanumeric()) {
        let token = token.to_lowercase();
        if token.chars().count() >= MIN_KEYWORD_CHARS
            && !STOP_WORDS.contains(&token.as_str())
            && !keywords.contains(&token)
        {
            keywords.push(token);
            if keywords.len() == MAX_FALLBACK_KEYWORDS {
                break;
            }
        }
    }
    keywords
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interview::testing::ScriptedGenerator;

    #[tokio::test]
    async fn test_model_analysis_is_used_when_valid() {
        let llm = ScriptedGenerator::new(vec![Ok(
            r#"{"keywords": ["rust", "tokio"], "sentiment": "positive", "suggestions": ["Mention numbers"], "relevance_score": 82}"#,
        )]);
        let analysis = analyze(&llm, "I rewrote the service in Rust on tokio.").await;
        assert_eq!(analysis.keywords, vec!["rust", "tokio"]);
        assert_eq!(analysis.sentiment, Sentiment::Positive);
        assert_eq!(analysis.relevance_score, 82.0);
    }

    #[tokio::test]
    async fn test_out_of_range_relevance_is_clamped() {
        let llm = ScriptedGenerator::new(vec![Ok(
            r#"{"keywords": [], "sentiment": "neutral", "suggestions": [], "relevance_score": 140}"#,
        )]);
        let analysis = analyze(&llm, "answer").await;
        assert_eq!(analysis.relevance_score, 100.0);
    }

    #[tokio::test]
    async fn test_missing_optional_fields_default() {
        let llm = ScriptedGenerator::new(vec![Ok(r#"{"relevance_score": 64}"#)]);
        let analysis = analyze(&llm, "answer").await;
        assert!(analysis.keywords.is_empty());
        assert_eq!(analysis.sentiment, Sentiment::Neutral);
        assert!(analysis.suggestions.is_empty());
        assert_eq!(analysis.relevance_score, 64.0);
    }

    #[tokio::test]
    async fn test_remote_failure_yields_deterministic_fallback() {
        let llm = ScriptedGenerator::failing();
        let analysis = analyze(
            &llm,
            "I migrated our payments pipeline to Kafka and cut latency in half.",
        )
        .await;
        assert_eq!(analysis.sentiment, Sentiment::Neutral);
        assert_eq!(analysis.relevance_score, 50.0);
        assert!(!analysis.keywords.is_empty());
        assert!(analysis.keywords.contains(&"kafka".to_string()));
        assert_eq!(analysis.suggestions.len(), 2);
    }

    #[test]
    fn test_fallback_keywords_skip_short_tokens_and_stop_words() {
        let keywords = extract_keywords("I think that this is a really good api design");
        assert!(!keywords.contains(&"that".to_string()));
        assert!(!keywords.contains(&"this".to_string()));
        assert!(!keywords.contains(&"api".to_string()), "3 chars is too short");
        assert!(keywords.contains(&"good".to_string()));
        assert!(keywords.contains(&"design".to_string()));
    }

    #[test]
    fn test_fallback_keywords_are_distinct_ordered_and_capped() {
        let keywords = extract_keywords(
            "kafka kafka redis postgres kubernetes terraform ansible prometheus",
        );
        assert_eq!(
            keywords,
            vec!["kafka", "redis", "postgres", "kubernetes", "terraform"]
        );
    }

    #[test]
    fn test_fallback_keywords_are_lowercased() {
        let keywords = extract_keywords("We used Kubernetes and GraphQL heavily");
        assert!(keywords.contains(&"kubernetes".to_string()));
        assert!(keywords.contains(&"graphql".to_string()));
    }
}

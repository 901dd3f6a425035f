//! Generate-and-parse with a guaranteed result.
//!
//! Model output is untrusted: the call can fail, and the "JSON" can be prose,
//! fenced, or the wrong shape. Every call site that must not abort the turn
//! goes through [`generate_json_or`], which tags whether the value came from
//! the model or from the caller's deterministic default.

use serde::de::DeserializeOwned;
use tracing::warn;

use crate::llm_client::{strip_json_fences, TextGenerator};

/// Outcome of a generation attempt that must always yield a usable value.
#[derive(Debug, Clone, PartialEq)]
pub enum Parsed<T> {
    /// The model produced valid JSON of the expected shape.
    Generated(T),
    /// The call failed or the output was unusable; a deterministic default
    /// stands in.
    Fallback(T),
}

impl<T> Parsed<T> {
    pub fn into_inner(self) -> T {
        match self {
            Parsed::Generated(value) | Parsed::Fallback(value) => value,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Parsed::Fallback(_))
    }
}

/// Runs one generation call and parses the output as JSON. Any failure —
/// transport, API, empty content, unparsable or mis-shaped JSON — is logged
/// and substituted with `default()`. Never returns an error.
pub async fn generate_json_or<T, F>(
    llm: &dyn TextGenerator,
    prompt: &str,
    system: &str,
    scenario: &str,
    default: F,
) -> Parsed<T>
where
    T: DeserializeOwned,
    F: FnOnce() -> T,
{
    let generation = match llm.generate(prompt, system, scenario).await {
        Ok(generation) => generation,
        Err(e) => {
            warn!("{scenario}: generation failed, using fallback: {e}");
            return Parsed::Fallback(default());
        }
    };

    match serde_json::from_str(strip_json_fences(&generation.content)) {
        Ok(value) => Parsed::Generated(value),
        Err(e) => {
            warn!("{scenario}: unparsable model output, using fallback: {e}");
            Parsed::Fallback(default())
        }
    }
}

//! In-memory fakes shared by the engine's unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::llm_client::{Generation, LlmError, TextGenerator, TokenUsage};
use crate::store::{SessionStore, StoreError};

/// Replays canned generations in order; errors once the script runs dry, so
/// `ScriptedGenerator::new(vec![])` doubles as an always-failing backend.
pub struct ScriptedGenerator {
    replies: Mutex<VecDeque<Result<String, String>>>,
    prompts: Mutex<Vec<String>>,
    scenarios: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    pub fn new(replies: Vec<Result<&str, &str>>) -> Self {
        Self {
            replies: Mutex::new(
                replies
                    .into_iter()
                    .map(|r| r.map(str::to_string).map_err(str::to_string))
                    .collect(),
            ),
            prompts: Mutex::new(Vec::new()),
            scenarios: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self::new(vec![])
    }

    /// Prompts observed so far, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    /// Scenario tags observed so far, in call order.
    pub fn scenarios(&self) -> Vec<String> {
        self.scenarios.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(
        &self,
        prompt: &str,
        _system: &str,
        scenario: &str,
    ) -> Result<Generation, LlmError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.scenarios.lock().unwrap().push(scenario.to_string());
        match self.replies.lock().unwrap().pop_front() {
            Some(Ok(content)) => Ok(Generation {
                content,
                usage: TokenUsage::default(),
            }),
            Some(Err(message)) => Err(LlmError::Api {
                status: 500,
                message,
            }),
            None => Err(LlmError::Api {
                status: 503,
                message: "script exhausted".to_string(),
            }),
        }
    }
}

/// Hash-map store that records the TTL of every write, so tests can assert
/// the shared expiry clock is refreshed.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, (String, u64)>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// TTL recorded by the most recent write or expire for this key.
    pub fn ttl_of(&self, key: &str) -> Option<u64> {
        self.entries.lock().unwrap().get(key).map(|(_, ttl)| *ttl)
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self
            .entries
            .lock()
            .unwrap()
            .get(key)
            .map(|(value, _)| value.clone()))
    }

    async fn set(&self, key: &str, value: String, ttl_seconds: u64) -> Result<(), StoreError> {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), (value, ttl_seconds));
        Ok(())
    }

    async fn expire(&self, key: &str, ttl_seconds: u64) -> Result<(), StoreError> {
        if let Some(entry) = self.entries.lock().unwrap().get_mut(key) {
            entry.1 = ttl_seconds;
        }
        Ok(())
    }
}

//! Memory extraction: a lightweight pass over each user message that asks
//! the generation call for one durable fact worth remembering.
//!
//! Extraction is advisory. Every failure mode (transport error, timeout,
//! malformed output, unknown kind) is logged and swallowed; message
//! delivery never depends on it.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;

use crate::domain::{GenerationError, MemoryFact, RoomId, TextGenerator};

/// Literal the generation call must answer when there is nothing to keep
const NOTHING_SENTINEL: &str = "null";

const EXTRACTION_SYSTEM_PROMPT: &str = "You identify at most one durable fact worth \
remembering from a chat message. Respond with a single JSON object with exactly three \
fields: \"kind\" (one of: decision, preference, goal, fact, constraint), \"key\" (a short \
identifier for the fact) and \"value\" (the fact itself). If the message contains nothing \
worth remembering, respond with the literal string null and nothing else.";

/// Bound on the extraction call; expiry is treated like any other failure
const EXTRACTION_TIMEOUT: Duration = Duration::from_secs(15);

/// In-process, session-scoped store of extracted facts, keyed by room and
/// ordered by insertion. Append-only within a room's list.
#[derive(Default)]
pub struct MemoryStore {
    facts: Mutex<HashMap<RoomId, Vec<MemoryFact>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn append(&self, room_id: RoomId, fact: MemoryFact) {
        self.facts.lock().await.entry(room_id).or_default().push(fact);
    }

    pub async fn facts_for(&self, room_id: RoomId) -> Vec<MemoryFact> {
        self.facts
            .lock()
            .await
            .get(&room_id)
            .cloned()
            .unwrap_or_default()
    }
}

pub struct MemoryExtractor {
    generator: Arc<dyn TextGenerator>,
    store: Arc<MemoryStore>,
    timeout: Duration,
}

impl MemoryExtractor {
    pub fn new(generator: Arc<dyn TextGenerator>, store: Arc<MemoryStore>) -> Self {
        Self {
            generator,
            store,
            timeout: EXTRACTION_TIMEOUT,
        }
    }

    /// Run one extraction pass for a user message and record the result.
    ///
    /// Spawned fire-and-forget by the message pipeline; never surfaces an
    /// error to the user.
    pub async fn process(&self, room_id: RoomId, message: &str) {
        match self.extract(message).await {
            Some(fact) => {
                tracing::debug!(
                    "Extracted {:?} fact '{}' for room {}",
                    fact.kind,
                    fact.key,
                    room_id
                );
                self.store.append(room_id, fact).await;
            }
            None => {
                tracing::debug!("No memory fact extracted for room {}", room_id);
            }
        }
    }

    async fn extract(&self, message: &str) -> Option<MemoryFact> {
        let call = self.generator.generate(EXTRACTION_SYSTEM_PROMPT, message);
        let raw = match tokio::time::timeout(self.timeout, call).await {
            Ok(Ok(raw)) => raw,
            Ok(Err(e)) => {
                tracing::debug!("Memory extraction call failed: {}", e);
                return None;
            }
            Err(_) => {
                tracing::debug!(
                    "Memory extraction call failed: {}",
                    GenerationError::Timeout(self.timeout)
                );
                return None;
            }
        };
        parse_fact(&raw)
    }
}

/// Parse the extraction output into a fact, or `None` for the sentinel and
/// for anything that is not well-formed.
pub fn parse_fact(raw: &str) -> Option<MemoryFact> {
    let cleaned = strip_fences(raw);
    if cleaned == NOTHING_SENTINEL {
        return None;
    }
    match serde_json::from_str::<MemoryFact>(cleaned) {
        Ok(fact) => Some(fact),
        Err(e) => {
            tracing::debug!("Discarding malformed extraction output: {}", e);
            None
        }
    }
}

/// Strip a surrounding markdown code fence, if any, and outer whitespace
fn strip_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    // Drop the info string on the opening fence line ("json", ...)
    let rest = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest,
    };
    rest.trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FactKind, MockTextGenerator};

    #[test]
    fn test_parse_fact_accepts_well_formed_payload() {
        let raw = r#"{"kind":"preference","key":"ui-theme","value":"dark mode"}"#;

        let fact = parse_fact(raw).unwrap();

        assert_eq!(fact.kind, FactKind::Preference);
        assert_eq!(fact.key, "ui-theme");
        assert_eq!(fact.value, "dark mode");
    }

    #[test]
    fn test_parse_fact_treats_null_as_nothing() {
        assert_eq!(parse_fact("null"), None);
        assert_eq!(parse_fact("  null\n"), None);
    }

    #[test]
    fn test_parse_fact_strips_code_fences() {
        let raw = "```json\n{\"kind\":\"goal\",\"key\":\"launch\",\"value\":\"ship friday\"}\n```";

        let fact = parse_fact(raw).unwrap();

        assert_eq!(fact.kind, FactKind::Goal);
    }

    #[test]
    fn test_parse_fact_strips_fenced_sentinel() {
        assert_eq!(parse_fact("```\nnull\n```"), None);
    }

    #[test]
    fn test_parse_fact_rejects_unknown_kind() {
        let raw = r#"{"kind":"vibe","key":"x","value":"y"}"#;

        assert_eq!(parse_fact(raw), None);
    }

    #[test]
    fn test_parse_fact_rejects_missing_and_extra_fields() {
        assert_eq!(parse_fact(r#"{"kind":"fact","key":"x"}"#), None);
        assert_eq!(
            parse_fact(r#"{"kind":"fact","key":"x","value":"y","confidence":0.9}"#),
            None
        );
    }

    #[test]
    fn test_parse_fact_rejects_prose() {
        assert_eq!(parse_fact("Sure! Here's a fact: they like dark mode."), None);
    }

    fn extractor_returning(response: &str) -> (MemoryExtractor, Arc<MemoryStore>) {
        let response = response.to_string();
        let mut generator = MockTextGenerator::new();
        generator
            .expect_generate()
            .returning(move |_, _| Ok(response.clone()));
        let store = Arc::new(MemoryStore::new());
        let extractor = MemoryExtractor::new(Arc::new(generator), store.clone());
        (extractor, store)
    }

    #[tokio::test]
    async fn test_process_records_extracted_preference() {
        let (extractor, store) = extractor_returning(
            r#"{"kind":"preference","key":"ui-theme","value":"prefers dark mode"}"#,
        );
        let room = RoomId::new(1);

        extractor.process(room, "I prefer dark mode").await;

        let facts = store.facts_for(room).await;
        assert_eq!(facts.len(), 1);
        assert_eq!(facts[0].kind, FactKind::Preference);
    }

    #[tokio::test]
    async fn test_process_records_nothing_for_sentinel() {
        let (extractor, store) = extractor_returning("null");
        let room = RoomId::new(1);

        extractor.process(room, "lol that's hilarious").await;

        assert!(store.facts_for(room).await.is_empty());
    }

    #[tokio::test]
    async fn test_process_swallows_generation_failure() {
        let mut generator = MockTextGenerator::new();
        generator
            .expect_generate()
            .returning(|_, _| Err(GenerationError::Request("connection refused".to_string())));
        let store = Arc::new(MemoryStore::new());
        let extractor = MemoryExtractor::new(Arc::new(generator), store.clone());
        let room = RoomId::new(1);

        extractor.process(room, "anything").await;

        assert!(store.facts_for(room).await.is_empty());
    }

    #[tokio::test]
    async fn test_process_facts_are_append_only_in_order() {
        let store = Arc::new(MemoryStore::new());
        let room = RoomId::new(1);
        for (i, kind) in [FactKind::Decision, FactKind::Constraint].iter().enumerate() {
            store
                .append(
                    room,
                    MemoryFact {
                        kind: *kind,
                        key: format!("k{i}"),
                        value: format!("v{i}"),
                    },
                )
                .await;
        }

        let facts = store.facts_for(room).await;

        assert_eq!(facts.len(), 2);
        assert_eq!(facts[0].kind, FactKind::Decision);
        assert_eq!(facts[1].kind, FactKind::Constraint);
    }
}

//! Test-only stub providers.

use crate::conversation::ConversationTurn;
use crate::embedding::Embedder;
use crate::error::{Result, TubechatError};
use crate::rag::Generator;
use crate::transcript_source::{SourceDocument, SourceKind, SourceMetadata, TranscriptSource};
use crate::vector_store::ScoredChunk;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Embeds text as counts of a fixed vocabulary, so similarity follows shared words.
pub struct KeywordEmbedder {
    vocabulary: Vec<String>,
    failing: AtomicBool,
    calls: AtomicUsize,
}

impl KeywordEmbedder {
    pub fn new(vocabulary: &[&str]) -> Self {
        Self {
            vocabulary: vocabulary.iter().map(|w| w.to_lowercase()).collect(),
            failing: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn vectorize(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0; self.vocabulary.len()];
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .map(|w| w.to_lowercase())
        {
            if let Some(pos) = self.vocabulary.iter().position(|v| *v == word) {
                vector[pos] += 1.0;
            }
        }
        vector
    }
}

#[async_trait]
impl Embedder for KeywordEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut batch = self.embed_batch(&[text.to_string()]).await?;
        Ok(batch.remove(0))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(TubechatError::EmbeddingProvider("mock embedding error".to_string()));
        }
        Ok(texts.iter().map(|t| self.vectorize(t)).collect())
    }

    fn dimensions(&self) -> usize {
        self.vocabulary.len()
    }
}

/// What a generator was asked.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub context: Vec<String>,
    pub recent_turns: Vec<ConversationTurn>,
    pub question: String,
}

/// Generator that replays scripted answers and records every request.
pub struct ScriptedGenerator {
    responses: Mutex<Vec<String>>,
    requests: Mutex<Vec<RecordedRequest>>,
    pub default_response: String,
    failing: AtomicBool,
    delay: Option<Duration>,
}

impl Default for ScriptedGenerator {
    fn default() -> Self {
        Self {
            responses: Mutex::new(Vec::new()),
            requests: Mutex::new(Vec::new()),
            default_response: "mock answer".to_string(),
            failing: AtomicBool::new(false),
            delay: None,
        }
    }
}

impl ScriptedGenerator {
    pub fn with_responses(responses: &[&str]) -> Self {
        Self {
            responses: Mutex::new(responses.iter().map(|r| r.to_string()).collect()),
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        let generator = Self::default();
        generator.set_failing(true);
        generator
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Generator for ScriptedGenerator {
    async fn generate(
        &self,
        context_chunks: &[ScoredChunk],
        recent_turns: &[ConversationTurn],
        question: &str,
    ) -> Result<String> {
        self.requests.lock().unwrap().push(RecordedRequest {
            context: context_chunks.iter().map(|c| c.chunk.text.clone()).collect(),
            recent_turns: recent_turns.to_vec(),
            question: question.to_string(),
        });

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(TubechatError::GenerationProvider("mock generation error".to_string()));
        }

        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            Ok(self.default_response.clone())
        } else {
            Ok(responses.remove(0))
        }
    }
}

/// Transcript source serving fixed texts by identifier.
#[derive(Default)]
pub struct StaticSource {
    documents: HashMap<String, SourceDocument>,
}

impl StaticSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_transcript(mut self, id: &str, title: &str, text: &str) -> Self {
        let metadata = SourceMetadata::new(id, title, SourceKind::Local, format!("memory://{}", id));
        self.documents
            .insert(id.to_string(), SourceDocument::new(text.to_string(), metadata));
        self
    }
}

#[async_trait]
impl TranscriptSource for StaticSource {
    fn name(&self) -> &'static str {
        "static"
    }

    fn can_handle(&self, input: &str) -> bool {
        self.documents.contains_key(input)
    }

    async fn fetch(&self, identifier: &str) -> Result<SourceDocument> {
        self.documents
            .get(identifier)
            .cloned()
            .ok_or_else(|| TubechatError::SourceUnavailable(format!("unknown transcript {}", identifier)))
    }
}

//! Pipeline coordination for Tubechat.
//!
//! A [`Pipeline`] owns the collaborators (transcript source, chunker, embedder,
//! answerer) and drives them against a caller-owned [`Session`], which holds the
//! active index and conversation memory.

use crate::chunking::{Chunk, ChunkingConfig, TextChunker};
use crate::config::{Prompts, Settings};
use crate::conversation::{ConversationMemory, ConversationTurn};
use crate::embedding::{Embedder, OpenAIEmbedder};
use crate::error::{Result, TubechatError};
use crate::rag::{AnswerResult, Answerer, Generator, OpenAIGenerator, RetrievalOptions};
use crate::transcript_source::{AutoSource, SourceMetadata, TranscriptSource};
use crate::vector_store::{IndexHandle, ScoredChunk, VectorIndex};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

/// State of one conversation: the indexed corpus and the turns asked against it.
#[derive(Debug)]
pub struct Session {
    id: Uuid,
    index: Option<IndexHandle>,
    memory: ConversationMemory,
    sources: Vec<SourceMetadata>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            index: None,
            memory: ConversationMemory::new(),
            sources: Vec::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The active index, if a corpus has been ingested.
    pub fn index(&self) -> Option<&IndexHandle> {
        self.index.as_ref()
    }

    pub fn has_index(&self) -> bool {
        self.index.is_some()
    }

    /// Sources making up the active corpus.
    pub fn sources(&self) -> &[SourceMetadata] {
        &self.sources
    }

    pub fn memory(&self) -> &ConversationMemory {
        &self.memory
    }

    pub fn history(&self) -> &[ConversationTurn] {
        self.memory.turns()
    }

    /// Forget the conversation but keep the corpus.
    pub fn clear_history(&mut self) {
        self.memory.clear();
    }
}

/// Result of ingesting one or more transcripts.
#[derive(Debug, Clone)]
pub struct IngestResult {
    /// Sources now making up the corpus.
    pub sources: Vec<SourceMetadata>,
    /// Number of chunks in the new index.
    pub chunks_indexed: usize,
}

/// The conversational pipeline.
pub struct Pipeline {
    source: Arc<dyn TranscriptSource>,
    chunker: TextChunker,
    embedder: Arc<dyn Embedder>,
    answerer: Answerer,
}

impl Pipeline {
    /// Create a pipeline with OpenAI providers and the automatic transcript source.
    pub fn new(settings: &Settings) -> Result<Self> {
        let chunking = ChunkingConfig::from(&settings.chunking);
        chunking.validate()?;

        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;

        let embedder = Arc::new(OpenAIEmbedder::from_settings(&settings.embedding)?);
        let generator = Arc::new(OpenAIGenerator::from_settings(&settings.generation, prompts)?);
        let source = Arc::new(AutoSource::new(&settings.source));

        Ok(Self::with_components(
            source,
            embedder,
            generator,
            chunking,
            RetrievalOptions::from(&settings.retrieval),
        ))
    }

    /// Create a pipeline with custom components.
    pub fn with_components(
        source: Arc<dyn TranscriptSource>,
        embedder: Arc<dyn Embedder>,
        generator: Arc<dyn Generator>,
        chunking: ChunkingConfig,
        options: RetrievalOptions,
    ) -> Self {
        Self {
            source,
            chunker: TextChunker::new(chunking),
            embedder,
            answerer: Answerer::new(generator, options),
        }
    }

    /// Retrieval options used for questions.
    pub fn options(&self) -> &RetrievalOptions {
        self.answerer.options()
    }

    /// Load a single transcript as the new corpus.
    pub async fn ingest(&self, session: &mut Session, identifier: &str) -> Result<IngestResult> {
        self.ingest_all(session, &[identifier]).await
    }

    /// Load several transcripts as one new corpus.
    ///
    /// The previous index and conversation are replaced only once the new index
    /// is fully built; any failure leaves the session untouched.
    #[instrument(skip(self, session, identifiers), fields(count = identifiers.len()))]
    pub async fn ingest_all<S: AsRef<str>>(
        &self,
        session: &mut Session,
        identifiers: &[S],
    ) -> Result<IngestResult> {
        if identifiers.is_empty() {
            return Err(TubechatError::InvalidArgument(
                "at least one transcript identifier is required".to_string(),
            ));
        }

        let mut chunks: Vec<Chunk> = Vec::new();
        let mut sources = Vec::with_capacity(identifiers.len());

        for identifier in identifiers {
            let identifier = identifier.as_ref();
            info!("Fetching transcript: {}", identifier);

            let document = self.source.fetch(identifier).await?;
            let document_chunks = self.chunker.chunk_document(&document)?;
            info!(
                "Split '{}' into {} chunks",
                document.metadata.title,
                document_chunks.len()
            );

            chunks.extend(document_chunks);
            sources.push(document.metadata);
        }

        let index = VectorIndex::build(chunks, Arc::clone(&self.embedder)).await?;
        let chunks_indexed = index.len();

        session.index = Some(index);
        session.sources = sources.clone();
        session.memory.clear();

        info!("Indexed {} chunks from {} sources", chunks_indexed, sources.len());

        Ok(IngestResult {
            sources,
            chunks_indexed,
        })
    }

    /// Answer a question against the session's corpus.
    #[instrument(skip(self, session, question), fields(session = %session.id))]
    pub async fn ask(&self, session: &mut Session, question: &str) -> Result<AnswerResult> {
        let index = session.index.clone().ok_or(TubechatError::EmptyIndex)?;
        self.answerer.answer(question, &index, &mut session.memory).await
    }

    /// Conversation so far, oldest first.
    pub fn history<'a>(&self, session: &'a Session) -> &'a [ConversationTurn] {
        session.history()
    }

    /// Search the session's corpus without generating an answer.
    pub async fn search(&self, session: &Session, query: &str, k: usize) -> Result<Vec<ScoredChunk>> {
        let index = session.index.as_ref().ok_or(TubechatError::EmptyIndex)?;
        index
            .search_with_threshold(query, k, self.options().min_score)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{KeywordEmbedder, ScriptedGenerator, StaticSource};
    use std::time::Duration;

    const VOCAB: &[&str] = &[
        "cats", "dogs", "fish", "mammals", "not", "too", "rust", "ownership", "races",
    ];
    const PETS: &str = "Cats are mammals. Dogs are mammals too. Fish are not mammals.";
    const RUST: &str = "Rust is a systems language. Ownership prevents data races.";

    struct Harness {
        pipeline: Pipeline,
        embedder: Arc<KeywordEmbedder>,
        generator: Arc<ScriptedGenerator>,
    }

    fn harness(generator: ScriptedGenerator) -> Harness {
        let source = Arc::new(
            StaticSource::new()
                .with_transcript("a", "Pets", PETS)
                .with_transcript("b", "Rust", RUST),
        );
        let embedder = Arc::new(KeywordEmbedder::new(VOCAB));
        let generator = Arc::new(generator);
        let pipeline = Pipeline::with_components(
            source,
            embedder.clone(),
            generator.clone(),
            ChunkingConfig::new(24, 0).unwrap(),
            RetrievalOptions {
                k: 2,
                history_window: 4,
                min_score: None,
            },
        );
        Harness {
            pipeline,
            embedder,
            generator,
        }
    }

    #[tokio::test]
    async fn test_cats_scenario() {
        let h = harness(ScriptedGenerator::with_responses(&["Yes, cats are mammals."]));
        let mut session = Session::new();

        let ingested = h.pipeline.ingest(&mut session, "a").await.unwrap();
        assert_eq!(ingested.chunks_indexed, 3);
        assert_eq!(ingested.sources[0].title, "Pets");
        assert!(session.has_index());

        let result = h.pipeline.ask(&mut session, "Are cats mammals?").await.unwrap();
        assert_eq!(result.answer_text, "Yes, cats are mammals.");
        assert_eq!(result.retrieved_chunk_references[0].content, "Cats are mammals. ");

        let history = h.pipeline.history(&session);
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].question, "Are cats mammals?");
    }

    #[tokio::test]
    async fn test_follow_up_sees_previous_turn() {
        let h = harness(ScriptedGenerator::with_responses(&["Yes.", "Also yes."]));
        let mut session = Session::new();
        h.pipeline.ingest(&mut session, "a").await.unwrap();

        h.pipeline.ask(&mut session, "Are cats mammals?").await.unwrap();
        h.pipeline.ask(&mut session, "What about dogs?").await.unwrap();

        let requests = h.generator.requests();
        assert_eq!(requests.len(), 2);
        assert!(requests[0].recent_turns.is_empty());
        assert_eq!(requests[1].recent_turns.len(), 1);
        assert_eq!(requests[1].recent_turns[0].question, "Are cats mammals?");
        assert_eq!(requests[1].recent_turns[0].answer, "Yes.");
        assert!(requests[1].context[0].starts_with("Dogs"));
        assert_eq!(session.history().len(), 2);
    }

    #[tokio::test]
    async fn test_ingest_replaces_corpus_and_clears_memory() {
        let h = harness(ScriptedGenerator::default());
        let mut session = Session::new();

        h.pipeline.ingest(&mut session, "a").await.unwrap();
        h.pipeline.ask(&mut session, "Are cats mammals?").await.unwrap();
        assert_eq!(session.history().len(), 1);

        h.pipeline.ingest(&mut session, "b").await.unwrap();
        assert!(session.history().is_empty());
        assert_eq!(session.sources().len(), 1);
        assert_eq!(session.sources()[0].id, "b");

        let results = h.pipeline.search(&session, "cats mammals", 10).await.unwrap();
        assert!(!results.is_empty());
        assert!(results.iter().all(|r| r.chunk.source.id == "b"));
    }

    #[tokio::test]
    async fn test_ask_before_ingest() {
        let h = harness(ScriptedGenerator::default());
        let mut session = Session::new();

        let err = h.pipeline.ask(&mut session, "Are cats mammals?").await.unwrap_err();
        assert!(matches!(err, TubechatError::EmptyIndex));
        assert!(session.history().is_empty());
        assert!(h.generator.requests().is_empty());

        let err = h.pipeline.search(&session, "cats", 2).await.unwrap_err();
        assert!(matches!(err, TubechatError::EmptyIndex));
    }

    #[tokio::test]
    async fn test_failed_generation_appends_nothing() {
        let h = harness(ScriptedGenerator::default());
        let mut session = Session::new();
        h.pipeline.ingest(&mut session, "a").await.unwrap();
        h.pipeline.ask(&mut session, "Are cats mammals?").await.unwrap();

        h.generator.set_failing(true);
        let err = h.pipeline.ask(&mut session, "What about dogs?").await.unwrap_err();
        assert!(matches!(err, TubechatError::GenerationProvider(_)));
        assert_eq!(session.history().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_ingest_keeps_previous_state() {
        let h = harness(ScriptedGenerator::default());
        let mut session = Session::new();
        h.pipeline.ingest(&mut session, "a").await.unwrap();
        h.pipeline.ask(&mut session, "Are cats mammals?").await.unwrap();

        let err = h.pipeline.ingest(&mut session, "missing").await.unwrap_err();
        assert!(matches!(err, TubechatError::SourceUnavailable(_)));

        h.embedder.set_failing(true);
        let err = h.pipeline.ingest(&mut session, "b").await.unwrap_err();
        assert!(matches!(err, TubechatError::EmbeddingProvider(_)));
        h.embedder.set_failing(false);

        assert_eq!(session.sources()[0].id, "a");
        assert_eq!(session.history().len(), 1);
        let results = h.pipeline.search(&session, "cats", 1).await.unwrap();
        assert!(results[0].chunk.text.starts_with("Cats"));
    }

    #[tokio::test]
    async fn test_ingest_all_builds_one_corpus() {
        let h = harness(ScriptedGenerator::default());
        let mut session = Session::new();

        let result = h.pipeline.ingest_all(&mut session, &["a", "b"]).await.unwrap();
        assert_eq!(result.sources.len(), 2);
        assert_eq!(result.chunks_indexed, session.index().unwrap().len());

        let results = h.pipeline.search(&session, "ownership", 1).await.unwrap();
        assert_eq!(results[0].chunk.source.id, "b");
        let results = h.pipeline.search(&session, "fish", 1).await.unwrap();
        assert_eq!(results[0].chunk.source.id, "a");

        let empty: [&str; 0] = [];
        let err = h.pipeline.ingest_all(&mut session, &empty).await.unwrap_err();
        assert!(matches!(err, TubechatError::InvalidArgument(_)));
        assert_eq!(session.sources().len(), 2);
    }

    #[tokio::test]
    async fn test_cancelled_ask_appends_nothing() {
        let h = harness(ScriptedGenerator::default().with_delay(Duration::from_millis(500)));
        let mut session = Session::new();
        h.pipeline.ingest(&mut session, "a").await.unwrap();

        let outcome = tokio::time::timeout(
            Duration::from_millis(20),
            h.pipeline.ask(&mut session, "Are cats mammals?"),
        )
        .await;

        assert!(outcome.is_err());
        assert!(session.history().is_empty());
    }

    #[tokio::test]
    async fn test_clear_history_keeps_corpus() {
        let h = harness(ScriptedGenerator::default());
        let mut session = Session::new();
        h.pipeline.ingest(&mut session, "a").await.unwrap();
        h.pipeline.ask(&mut session, "Are cats mammals?").await.unwrap();

        session.clear_history();
        assert!(session.history().is_empty());
        assert!(session.has_index());
        tokio_test::assert_ok!(h.pipeline.ask(&mut session, "What about fish?").await);
    }
}

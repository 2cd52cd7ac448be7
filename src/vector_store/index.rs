//! In-memory vector index.
//!
//! Built once per corpus and never mutated afterwards, so concurrent searches
//! need no locking.

use super::{cosine_similarity, IndexHandle, ScoredChunk};
use crate::chunking::Chunk;
use crate::embedding::Embedder;
use crate::error::{Result, TubechatError};
use std::sync::Arc;
use tracing::{debug, info, instrument};

struct IndexedChunk {
    chunk: Chunk,
    embedding: Vec<f32>,
}

/// Searchable collection of embedded chunks.
pub struct VectorIndex {
    entries: Vec<IndexedChunk>,
    dimensions: usize,
    embedder: Arc<dyn Embedder>,
}

impl std::fmt::Debug for VectorIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VectorIndex")
            .field("len", &self.entries.len())
            .field("dimensions", &self.dimensions)
            .finish_non_exhaustive()
    }
}

impl VectorIndex {
    /// Embed every chunk and build the index.
    ///
    /// Any provider failure abandons the whole build.
    #[instrument(skip_all, fields(chunks = chunks.len()))]
    pub async fn build(chunks: Vec<Chunk>, embedder: Arc<dyn Embedder>) -> Result<IndexHandle> {
        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let embeddings = embedder.embed_batch(&texts).await?;

        if embeddings.len() != chunks.len() {
            return Err(TubechatError::EmbeddingProvider(format!(
                "Expected {} embeddings, got {}",
                chunks.len(),
                embeddings.len()
            )));
        }

        let dimensions = embeddings
            .first()
            .map(|e| e.len())
            .unwrap_or_else(|| embedder.dimensions());

        if let Some(bad) = embeddings.iter().find(|e| e.len() != dimensions || e.is_empty()) {
            return Err(TubechatError::EmbeddingProvider(format!(
                "Embedding dimension mismatch: expected {}, got {}",
                dimensions,
                bad.len()
            )));
        }

        let entries: Vec<IndexedChunk> = chunks
            .into_iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| IndexedChunk { chunk, embedding })
            .collect();

        info!("Built index with {} chunks ({} dimensions)", entries.len(), dimensions);

        Ok(Arc::new(Self {
            entries,
            dimensions,
            embedder,
        }))
    }

    /// Number of indexed chunks.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Dimensionality shared by all stored vectors.
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Indexed chunks in insertion order.
    pub fn chunks(&self) -> impl Iterator<Item = &Chunk> {
        self.entries.iter().map(|e| &e.chunk)
    }

    /// Return the `k` chunks most similar to `query`, best first.
    pub async fn search(&self, query: &str, k: usize) -> Result<Vec<ScoredChunk>> {
        self.search_with_threshold(query, k, None).await
    }

    /// Like [`search`](Self::search), dropping results scoring below `min_score`.
    #[instrument(skip(self, query), fields(k = k))]
    pub async fn search_with_threshold(
        &self,
        query: &str,
        k: usize,
        min_score: Option<f32>,
    ) -> Result<Vec<ScoredChunk>> {
        if k == 0 {
            return Err(TubechatError::InvalidArgument(
                "k must be greater than 0".to_string(),
            ));
        }
        if self.entries.is_empty() {
            return Err(TubechatError::EmptyIndex);
        }

        let query_embedding = self.embedder.embed(query).await?;
        if query_embedding.len() != self.dimensions {
            return Err(TubechatError::EmbeddingProvider(format!(
                "Query embedding has {} dimensions, index has {}",
                query_embedding.len(),
                self.dimensions
            )));
        }

        let results = self.rank(&query_embedding, k, min_score);
        debug!("Search returned {} results", results.len());
        Ok(results)
    }

    /// Score all entries against a query vector.
    ///
    /// The sort is stable, so equal scores keep insertion order.
    fn rank(&self, query_embedding: &[f32], k: usize, min_score: Option<f32>) -> Vec<ScoredChunk> {
        let mut scored: Vec<(usize, f32)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, entry)| (i, cosine_similarity(query_embedding, &entry.embedding)))
            .filter(|(_, score)| min_score.map_or(true, |min| *score >= min))
            .collect();

        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(k);

        scored
            .into_iter()
            .map(|(i, score)| ScoredChunk {
                chunk: self.entries[i].chunk.clone(),
                score,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunking::chunk;
    use crate::testing::KeywordEmbedder;
    use crate::transcript_source::{SourceKind, SourceMetadata};

    const VOCAB: &[&str] = &["cats", "dogs", "fish", "mammals", "not", "too"];

    fn metadata() -> SourceMetadata {
        SourceMetadata::new("pets", "Pets", SourceKind::Local, "memory://pets")
    }

    fn pets_chunks() -> Vec<Chunk> {
        chunk(
            "Cats are mammals. Dogs are mammals too. Fish are not mammals.",
            metadata(),
            24,
            0,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_search_orders_by_score() {
        let embedder = Arc::new(KeywordEmbedder::new(VOCAB));
        let index = VectorIndex::build(pets_chunks(), embedder.clone()).await.unwrap();

        assert_eq!(index.len(), 3);
        assert_eq!(index.dimensions(), VOCAB.len());
        assert_eq!(embedder.calls(), 1);
        let indices: Vec<usize> = index.chunks().map(|c| c.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);

        let results = index.search("Are cats mammals?", 2).await.unwrap();
        assert_eq!(results.len(), 2);
        assert!(results[0].chunk.text.starts_with("Cats"));
        assert!((results[0].score - 1.0).abs() < 0.001);
        assert!(results[0].score >= results[1].score);

        let all = index.search("fish", 10).await.unwrap();
        assert_eq!(all.len(), 3);
        assert!(all[0].chunk.text.starts_with("Fish"));
        assert!(all.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[tokio::test]
    async fn test_duplicate_chunks_tie_in_insertion_order() {
        let mut chunks = chunk("Cats are mammals.", metadata(), 100, 0).unwrap();
        let mut duplicate = chunks[0].clone();
        duplicate.index = 1;
        chunks.push(duplicate);

        let embedder = Arc::new(KeywordEmbedder::new(VOCAB));
        let index = VectorIndex::build(chunks, embedder).await.unwrap();

        for _ in 0..3 {
            let results = index.search("cats", 2).await.unwrap();
            assert_eq!(results.len(), 2);
            assert_eq!(results[0].score, results[1].score);
            assert_eq!(results[0].chunk.index, 0);
            assert_eq!(results[1].chunk.index, 1);
        }
    }

    #[tokio::test]
    async fn test_search_with_threshold() {
        let embedder = Arc::new(KeywordEmbedder::new(VOCAB));
        let index = VectorIndex::build(pets_chunks(), embedder).await.unwrap();

        let results = index
            .search_with_threshold("cats", 10, Some(0.5))
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
        assert!(results[0].chunk.text.starts_with("Cats"));
    }

    #[tokio::test]
    async fn test_search_rejects_zero_k() {
        let embedder = Arc::new(KeywordEmbedder::new(VOCAB));
        let index = VectorIndex::build(pets_chunks(), embedder).await.unwrap();

        let err = index.search("cats", 0).await.unwrap_err();
        assert!(matches!(err, TubechatError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn test_search_on_empty_index() {
        let embedder = Arc::new(KeywordEmbedder::new(VOCAB));
        let index = VectorIndex::build(Vec::new(), embedder).await.unwrap();

        assert!(index.is_empty());
        let err = index.search("cats", 3).await.unwrap_err();
        assert!(matches!(err, TubechatError::EmptyIndex));
    }

    #[tokio::test]
    async fn test_build_fails_when_embedder_fails() {
        let embedder = Arc::new(KeywordEmbedder::new(VOCAB));
        embedder.set_failing(true);

        let err = VectorIndex::build(pets_chunks(), embedder).await.unwrap_err();
        assert!(matches!(err, TubechatError::EmbeddingProvider(_)));
    }

    #[tokio::test]
    async fn test_concurrent_searches() {
        let embedder = Arc::new(KeywordEmbedder::new(VOCAB));
        let index = VectorIndex::build(pets_chunks(), embedder).await.unwrap();

        let handles: Vec<_> = ["cats", "dogs", "fish"]
            .into_iter()
            .map(|query| {
                let index = Arc::clone(&index);
                tokio::spawn(async move { index.search(query, 1).await })
            })
            .collect();

        for (handle, expected) in handles.into_iter().zip(["Cats", "Dogs", "Fish"]) {
            let results = handle.await.unwrap().unwrap();
            assert!(results[0].chunk.text.starts_with(expected));
        }
    }
}

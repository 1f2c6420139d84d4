//! Fake collaborators shared by the integration tests

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use quiz_rag::config::RagConfig;
use quiz_rag::error::{Error, Result};
use quiz_rag::providers::{EmbeddingProvider, LlmProvider};
use quiz_rag::retrieval::ChunkStore;
use quiz_rag::server::state::AppState;

/// Embeds text as lowercase letter frequencies plus a constant bias term,
/// so every vector is non-zero and texts sharing words score higher.
pub struct LetterEmbedder;

#[async_trait]
impl EmbeddingProvider for LetterEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut vector = vec![0.0f32; 27];
        for c in text.chars().filter(|c| c.is_ascii_alphabetic()) {
            vector[(c.to_ascii_lowercase() as u8 - b'a') as usize] += 1.0;
        }
        vector[26] = 1.0;
        Ok(vector)
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    fn name(&self) -> &str {
        "letters"
    }
}

/// Embedder whose backend is always down
pub struct DownEmbedder;

#[async_trait]
impl EmbeddingProvider for DownEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        Err(Error::embedding("connection refused"))
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(false)
    }

    fn name(&self) -> &str {
        "down"
    }
}

/// Embeds document text like [`LetterEmbedder`] but fails on questions,
/// as a backend that dies after ingestion would
pub struct QueryFailingEmbedder;

#[async_trait]
impl EmbeddingProvider for QueryFailingEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if text.trim_end().ends_with('?') {
            return Err(Error::embedding("connection reset"));
        }
        LetterEmbedder.embed(text).await
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(false)
    }

    fn name(&self) -> &str {
        "query-failing"
    }
}

/// LLM that plays back queued replies, then a fallback
pub struct ScriptedLlm {
    replies: Mutex<VecDeque<Result<String>>>,
    fallback: Option<String>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedLlm {
    /// Always answers with `text`
    pub fn replying(text: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(VecDeque::new()),
            fallback: Some(text.into()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    /// Always fails as an unreachable backend would
    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(VecDeque::new()),
            fallback: None,
            prompts: Mutex::new(Vec::new()),
        })
    }

    /// Queue a reply ahead of the fallback
    pub fn push(&self, reply: Result<String>) {
        self.replies.lock().push_back(reply);
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().len()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().last().cloned()
    }
}

#[async_trait]
impl LlmProvider for ScriptedLlm {
    async fn complete(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().push(prompt.to_string());
        if let Some(reply) = self.replies.lock().pop_front() {
            return reply;
        }
        self.fallback
            .clone()
            .ok_or_else(|| Error::llm("model server unreachable"))
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(self.fallback.is_some())
    }

    fn name(&self) -> &str {
        "scripted"
    }

    fn model(&self) -> &str {
        "scripted-1"
    }
}

/// One 59-character sentence tagged `Segment NN`
pub fn segment_sentence(i: usize) -> String {
    let mut sentence = format!("Segment {:02} covers the topics", i);
    while sentence.len() < 58 {
        sentence.push_str(" x");
    }
    sentence.truncate(58);
    sentence.push('.');
    sentence
}

/// Text that chunks into exactly `n` one-sentence chunks under [`small_chunk_config`]
pub fn segmented_document(n: usize) -> String {
    (1..=n)
        .map(segment_sentence)
        .collect::<Vec<_>>()
        .join(" ")
}

/// 100-character windows without overlap
pub fn small_chunk_config() -> RagConfig {
    let mut config = RagConfig::default();
    config.chunking.chunk_size = 100;
    config.chunking.chunk_overlap = 0;
    config
}

/// Store holding `n` segment chunks
pub async fn segmented_store(config: &RagConfig, n: usize) -> Arc<ChunkStore> {
    let store = Arc::new(ChunkStore::new(&config.chunking, Arc::new(LetterEmbedder)));
    let count = store
        .ingest(&segmented_document(n))
        .await
        .expect("ingest with the letter embedder");
    assert_eq!(count, n);
    store
}

/// Application state over the fakes
pub fn app_state(config: RagConfig, llm: Arc<ScriptedLlm>) -> AppState {
    AppState::with_providers(config, Arc::new(LetterEmbedder), llm)
}

/// Count chunk tags in a prompt
pub fn segments_in(prompt: &str) -> usize {
    prompt.matches("Segment ").count()
}

/// Five well-formed delimited quiz lines
pub const FIVE_DELIMITED_LINES: &str = "\
A|What does segment one cover?|Topics|Nothing|Numbers|Colors|It covers topics
B|Which segment comes second?|First|Second|Third|Fourth|
C|How many letters are in 'cat'?|One|Two|Three|Four|Three letters
D|Which is last?|First|Second|Third|Fourth|
A|Is the text about topics?|Yes|No|Maybe|Unknown|Every segment says so";

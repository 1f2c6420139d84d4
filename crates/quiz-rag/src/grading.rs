//! Free-text answer grading
//!
//! An answer is correct when it matches the reference after trimming and
//! case folding, or when their embeddings are closer than the configured
//! cosine threshold. If the embedder cannot give a usable score, the exact
//! match result stands.

use std::sync::Arc;

use crate::config::AnswerCheckConfig;
use crate::providers::EmbeddingProvider;
use crate::retrieval::similarity::cosine_similarity;
use crate::types::request::AnswerSubmission;
use crate::types::{AnswerCheckResult, AnswerCheckSummary};

/// Similarity verdict for one answer pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Verdict {
    /// Similarity in [0, 1]
    pub similarity: f32,
    pub is_correct: bool,
}

impl Verdict {
    fn exact(matched: bool) -> Self {
        Self {
            similarity: if matched { 1.0 } else { 0.0 },
            is_correct: matched,
        }
    }
}

/// Grades answers with the chunk-index embedder
#[derive(Clone)]
pub struct AnswerChecker {
    embedder: Arc<dyn EmbeddingProvider>,
    threshold: f32,
}

impl AnswerChecker {
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, config: &AnswerCheckConfig) -> Self {
        Self {
            embedder,
            threshold: config.similarity_threshold,
        }
    }

    /// Similarity threshold (exclusive)
    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Grade one answer
    pub async fn check(&self, user_answer: &str, correct_answer: &str) -> Verdict {
        let user = user_answer.trim().to_lowercase();
        let correct = correct_answer.trim().to_lowercase();

        // Exact match skips the embedder entirely
        if user == correct {
            return Verdict::exact(true);
        }
        if user.is_empty() || correct.is_empty() {
            return Verdict::exact(false);
        }

        let embedded = match self.embedder.embed(user_answer).await {
            Ok(u) => self.embedder.embed(correct_answer).await.map(|c| (u, c)),
            Err(e) => Err(e),
        };

        let (user_vec, correct_vec) = match embedded {
            Ok(pair) => pair,
            Err(e) => {
                tracing::warn!("Answer embedding failed, using exact match: {}", e);
                return Verdict::exact(false);
            }
        };

        match cosine_similarity(&user_vec, &correct_vec) {
            Some(sim) => {
                // Opposed vectors score 0, not negative
                let similarity = sim.max(0.0);
                Verdict {
                    similarity,
                    is_correct: similarity > self.threshold,
                }
            }
            None => {
                tracing::warn!(
                    "Unusable answer embeddings ({} vs {} dims), using exact match",
                    user_vec.len(),
                    correct_vec.len()
                );
                Verdict::exact(false)
            }
        }
    }

    /// Grade a whole quiz
    pub async fn check_quiz_answers(&self, answers: &[AnswerSubmission]) -> AnswerCheckSummary {
        let mut results = Vec::with_capacity(answers.len());

        for answer in answers {
            let verdict = self.check(&answer.user_answer, &answer.correct_answer).await;
            tracing::debug!(
                "Q{}: similarity {:.2}, correct: {}",
                answer.question_id,
                verdict.similarity,
                verdict.is_correct
            );
            results.push(AnswerCheckResult {
                question_id: answer.question_id,
                user_answer: answer.user_answer.clone(),
                correct_answer: answer.correct_answer.clone(),
                similarity: verdict.similarity,
                is_correct: verdict.is_correct,
            });
        }

        let score = results.iter().filter(|r| r.is_correct).count();
        let total = results.len();
        let percentage = if total == 0 {
            0.0
        } else {
            score as f64 / total as f64 * 100.0
        };

        tracing::info!("Graded quiz: {}/{}", score, total);

        AnswerCheckSummary {
            results,
            score,
            total,
            percentage,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, Result};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Embedder with canned vectors; unknown text fails
    struct TableEmbedder {
        table: HashMap<&'static str, Vec<f32>>,
        calls: AtomicUsize,
    }

    impl TableEmbedder {
        fn new(entries: &[(&'static str, Vec<f32>)]) -> Self {
            Self {
                table: entries.iter().cloned().collect(),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl EmbeddingProvider for TableEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.table
                .get(text)
                .cloned()
                .ok_or_else(|| Error::embedding("unknown text"))
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(true)
        }

        fn name(&self) -> &str {
            "table"
        }
    }

    fn checker(entries: &[(&'static str, Vec<f32>)]) -> (AnswerChecker, Arc<TableEmbedder>) {
        let embedder = Arc::new(TableEmbedder::new(entries));
        (
            AnswerChecker::new(embedder.clone(), &AnswerCheckConfig::default()),
            embedder,
        )
    }

    #[tokio::test]
    async fn test_exact_match_skips_embedder() {
        let (checker, embedder) = checker(&[]);
        let verdict = checker.check("Paris", " paris ").await;
        assert_eq!(verdict, Verdict { similarity: 1.0, is_correct: true });
        assert_eq!(embedder.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_similar_answers_pass_threshold() {
        let (checker, _) = checker(&[
            ("The powerhouse of the cell", vec![1.0, 0.1, 0.0]),
            ("Powerhouse of a cell", vec![1.0, 0.12, 0.0]),
            ("A green pigment", vec![0.0, 0.0, 1.0]),
        ]);

        let close = checker
            .check("Powerhouse of a cell", "The powerhouse of the cell")
            .await;
        assert!(close.is_correct);
        assert!(close.similarity > 0.9);

        let far = checker.check("A green pigment", "The powerhouse of the cell").await;
        assert!(!far.is_correct);
        assert!(far.similarity < 0.1);
    }

    #[tokio::test]
    async fn test_negative_similarity_reported_as_zero() {
        let (checker, _) = checker(&[("up", vec![1.0, 0.0]), ("down", vec![-1.0, 0.0])]);
        let verdict = checker.check("up", "down").await;
        assert_eq!(verdict.similarity, 0.0);
        assert!(!verdict.is_correct);
    }

    #[tokio::test]
    async fn test_embedding_failure_falls_back() {
        let (checker, _) = checker(&[]);
        let verdict = checker.check("Rome", "Paris").await;
        assert_eq!(verdict, Verdict { similarity: 0.0, is_correct: false });
    }

    #[tokio::test]
    async fn test_degenerate_vectors_fall_back() {
        let (checker, _) = checker(&[("zero", vec![0.0, 0.0]), ("one", vec![1.0]), ("two", vec![1.0, 1.0])]);
        assert!(!checker.check("zero", "two").await.is_correct);
        assert!(!checker.check("one", "two").await.is_correct);
    }

    #[tokio::test]
    async fn test_empty_quiz_summary() {
        let (checker, _) = checker(&[]);
        let summary = checker.check_quiz_answers(&[]).await;
        assert!(summary.results.is_empty());
        assert_eq!(summary.score, 0);
        assert_eq!(summary.total, 0);
        assert_eq!(summary.percentage, 0.0);
    }

    #[tokio::test]
    async fn test_quiz_summary_percentage() {
        let (checker, _) = checker(&[]);
        let answers = vec![
            AnswerSubmission {
                question_id: 1,
                user_answer: "Paris".into(),
                correct_answer: "paris".into(),
            },
            AnswerSubmission {
                question_id: 2,
                user_answer: "Rome".into(),
                correct_answer: "Madrid".into(),
            },
            AnswerSubmission {
                question_id: 3,
                user_answer: "True".into(),
                correct_answer: "true".into(),
            },
            AnswerSubmission {
                question_id: 4,
                user_answer: "".into(),
                correct_answer: "Berlin".into(),
            },
        ];
        let summary = checker.check_quiz_answers(&answers).await;
        assert_eq!(summary.score, 2);
        assert_eq!(summary.total, 4);
        assert!((summary.percentage - 50.0).abs() < 1e-9);
        assert_eq!(summary.results[1].question_id, 2);
        assert!(!summary.results[1].is_correct);
    }
}

//! HTTP collaborator tests against a mock server

use quiz_rag::config::{LlmBackend, LlmConfig};
use quiz_rag::error::Error;
use quiz_rag::providers::{
    EmbeddingProvider, GeminiClient, LlmProvider, OllamaClient, OllamaEmbedder, OllamaLlm,
};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn ollama_config(server: &MockServer, max_retries: u32) -> LlmConfig {
    LlmConfig {
        base_url: server.uri(),
        embed_model: "test-embed".to_string(),
        generate_model: "test-gen".to_string(),
        timeout_secs: 5,
        max_retries,
        ..LlmConfig::default()
    }
}

fn gemini_config(server: &MockServer) -> LlmConfig {
    let mut config = LlmConfig {
        provider: LlmBackend::Gemini,
        timeout_secs: 5,
        ..LlmConfig::default()
    };
    config.gemini.base_url = server.uri();
    config.gemini.model = "test-model".to_string();
    config.gemini.api_key = Some("test-key".to_string());
    config
}

#[tokio::test]
async fn test_ollama_embed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/embeddings"))
        .and(body_partial_json(json!({"model": "test-embed", "prompt": "hello"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"embedding": [0.1, 0.2, 0.3]})))
        .expect(1)
        .mount(&server)
        .await;

    let embedder = OllamaEmbedder::new(&ollama_config(&server, 0)).unwrap();
    let vector = embedder.embed("hello").await.unwrap();
    assert_eq!(vector, vec![0.1, 0.2, 0.3]);
}

#[tokio::test]
async fn test_ollama_empty_embedding_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/embeddings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"embedding": []})))
        .mount(&server)
        .await;

    let embedder = OllamaEmbedder::new(&ollama_config(&server, 0)).unwrap();
    assert!(matches!(embedder.embed("hello").await, Err(Error::Embedding(_))));
}

#[tokio::test]
async fn test_ollama_generate() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .and(body_partial_json(json!({"model": "test-gen", "stream": false})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"response": "A|Q?|a|b|c|d", "done": true})),
        )
        .mount(&server)
        .await;

    let llm = OllamaLlm::new(&ollama_config(&server, 0)).unwrap();
    assert_eq!(llm.model(), "test-gen");
    assert_eq!(llm.complete("prompt").await.unwrap(), "A|Q?|a|b|c|d");
}

#[tokio::test]
async fn test_ollama_retries_then_succeeds() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(500).set_body_string("loading model"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"response": "ok"})))
        .mount(&server)
        .await;

    let client = OllamaClient::new(&ollama_config(&server, 1)).unwrap();
    assert_eq!(client.generate("prompt").await.unwrap(), "ok");
}

#[tokio::test]
async fn test_ollama_gives_up_after_retries() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(503))
        .expect(2)
        .mount(&server)
        .await;

    let client = OllamaClient::new(&ollama_config(&server, 1)).unwrap();
    assert!(matches!(client.generate("prompt").await, Err(Error::Llm(_))));
}

#[tokio::test]
async fn test_ollama_health_check() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"models": []})))
        .mount(&server)
        .await;

    let client = OllamaClient::new(&ollama_config(&server, 0)).unwrap();
    assert!(client.health_check().await.unwrap());
}

#[tokio::test]
async fn test_ollama_unreachable_is_unhealthy() {
    let config = LlmConfig {
        base_url: "http://127.0.0.1:9".to_string(),
        timeout_secs: 1,
        ..LlmConfig::default()
    };
    let client = OllamaClient::new(&config).unwrap();
    assert!(!client.health_check().await.unwrap_or(false));
}

#[tokio::test]
async fn test_gemini_generate_content() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/test-model:generateContent"))
        .and(header("x-goog-api-key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": {"parts": [{"text": "First half, "}, {"text": "second half."}]}
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let gemini = GeminiClient::new(&gemini_config(&server)).unwrap();
    assert_eq!(gemini.name(), "gemini");
    assert_eq!(gemini.complete("prompt").await.unwrap(), "First half, second half.");
}

#[tokio::test]
async fn test_gemini_without_candidates_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/test-model:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"candidates": []})))
        .mount(&server)
        .await;

    let gemini = GeminiClient::new(&gemini_config(&server)).unwrap();
    assert!(matches!(gemini.complete("prompt").await, Err(Error::Llm(_))));
}

#[tokio::test]
async fn test_gemini_http_error_is_an_llm_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/test-model:generateContent"))
        .respond_with(ResponseTemplate::new(429).set_body_string("quota exceeded"))
        .mount(&server)
        .await;

    let gemini = GeminiClient::new(&gemini_config(&server)).unwrap();
    let err = gemini.complete("prompt").await.unwrap_err();
    assert!(err.to_string().contains("429"));
}

#[test]
fn test_gemini_requires_api_key() {
    let config = LlmConfig {
        provider: LlmBackend::Gemini,
        ..LlmConfig::default()
    };
    assert!(matches!(GeminiClient::new(&config), Err(Error::Config(_))));
}

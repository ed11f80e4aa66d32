//! HTTP-level tests for the OpenAI-compatible provider

use std::sync::Arc;

use colloquy_core::prelude::*;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn completion_body(content: &str) -> serde_json::Value {
    json!({
        "id": "cmpl-1",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }],
        "usage": { "prompt_tokens": 12, "completion_tokens": 3, "total_tokens": 15 }
    })
}

#[tokio::test]
async fn test_successful_completion() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer secret"))
        .and(body_partial_json(json!({
            "model": "test-model",
            "temperature": 0.0,
            "max_tokens": 32,
            "messages": [
                { "role": "system", "content": "Be brief" },
                { "role": "user", "content": "Hello" }
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("Hi.")))
        .expect(1)
        .mount(&server)
        .await;

    let provider = TogetherProvider::new(Some("secret".to_string()), server.uri());
    let request = LLMRequest::new(
        "test-model",
        vec![Message::system("Be brief"), Message::user("Hello")],
    )
    .with_temperature(0.0)
    .with_max_tokens(32);

    let response = provider.generate_request(&request).await.unwrap();
    assert_eq!(response.content, "Hi.");

    let usage = response.usage.unwrap();
    assert_eq!(usage.prompt_tokens, 12);
    assert_eq!(usage.total_tokens, 15);
}

#[tokio::test]
async fn test_api_error_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": { "message": "Invalid API key", "type": "invalid_request_error" }
        })))
        .mount(&server)
        .await;

    let provider = TogetherProvider::new(Some("wrong".to_string()), server.uri());
    let request = LLMRequest::new("m", vec![Message::user("Hello")]);

    let err = provider.generate_request(&request).await.unwrap_err();
    match err {
        ColloquyError::Completion(message) => {
            assert!(message.contains("invalid_request_error"));
            assert!(message.contains("Invalid API key"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_plain_text_error_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream unavailable"))
        .mount(&server)
        .await;

    let provider = TogetherProvider::new(None, server.uri());
    let err = provider
        .generate_request(&LLMRequest::new("m", vec![Message::user("Hello")]))
        .await
        .unwrap_err();

    assert!(matches!(err, ColloquyError::Completion(ref m) if m.contains("upstream unavailable")));
}

#[tokio::test]
async fn test_empty_choices_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
        .mount(&server)
        .await;

    let provider = TogetherProvider::new(None, server.uri());
    let err = provider
        .generate_request(&LLMRequest::new("m", vec![Message::user("Hello")]))
        .await
        .unwrap_err();

    assert!(matches!(err, ColloquyError::Completion(ref m) if m.contains("no choices")));
}

#[tokio::test]
async fn test_malformed_body_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let provider = TogetherProvider::new(None, server.uri());
    let result = provider
        .generate_request(&LLMRequest::new("m", vec![Message::user("Hello")]))
        .await;

    assert!(matches!(result, Err(ColloquyError::Completion(_))));
}

#[tokio::test]
async fn test_manager_over_http() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("WHAT NOW?")))
        .expect(1)
        .mount(&server)
        .await;

    let config = ColloquyConfig::builder()
        .api_key("secret")
        .base_url(server.uri())
        .persona(Persona::AngryAssistant)
        .tokenizer(TokenizerKind::Heuristic)
        .build();

    let provider = LLMProviderFactory::create(&config);
    let mut manager = ConversationManager::new(
        &config,
        Arc::clone(&provider),
        Box::new(HeuristicTokenizer::default()),
    )
    .unwrap();

    let reply = manager.chat_completion("Hello", None, None).await.unwrap();
    assert_eq!(reply, "WHAT NOW?");
    assert_eq!(manager.history().len(), 3);
}

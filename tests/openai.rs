//! OpenAI-compatible model against a mock server

use std::sync::Arc;

use futures::StreamExt;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use turn_adapter::{
    config::{ModelProfile, ProviderType},
    services::openai::OpenAIChatModel,
    AdapterError, ContentPart, TurnAdapter,
};
use wiremock::{
    matchers::{body_partial_json, header, method, path},
    Mock, MockServer, ResponseTemplate,
};

fn sse_body(deltas: &[&str]) -> String {
    let mut body = String::new();
    body.push_str(
        "data: {\"id\":\"c1\",\"model\":\"gpt-4o-mini\",\"choices\":[{\"index\":0,\"delta\":{\"role\":\"assistant\",\"content\":\"\"}}]}\n\n",
    );
    for delta in deltas {
        let event = json!({
            "id": "c1",
            "model": "gpt-4o-mini",
            "choices": [{"index": 0, "delta": {"content": delta}, "finish_reason": null}]
        });
        body.push_str(&format!("data: {event}\n\n"));
    }
    body.push_str(
        "data: {\"id\":\"c1\",\"choices\":[{\"index\":0,\"delta\":{},\"finish_reason\":\"stop\"}]}\n\n",
    );
    body.push_str("data: [DONE]\n\n");
    body
}

fn profile(server: &MockServer) -> ModelProfile {
    let mut profile = ModelProfile::new(ProviderType::Custom, "vision-small");
    profile.base_url = Some(format!("{}/v1", server.uri()));
    profile.api_key = Some("sk-test".into());
    profile
}

#[tokio::test]
async fn streams_reply_for_multimodal_turn() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({"model": "vision-small", "stream": true})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(sse_body(&["A red", " square."]), "text/event-stream"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let llm = Arc::new(OpenAIChatModel::new(profile(&server)).unwrap());
    let adapter = TurnAdapter::builder(llm)
        .system_instruction("Be terse.")
        .build()
        .unwrap();

    let parts = vec![
        ContentPart::text("What is this?").with_role("user"),
        ContentPart::from_bytes("image/png", &b"\x89PNG"[..]).with_role("user"),
    ];
    let output: Vec<ContentPart> = adapter
        .process_parts(parts)
        .map(|part| part.unwrap())
        .collect()
        .await;

    let texts: Vec<_> = output.iter().map(|p| p.text_content().into_owned()).collect();
    assert_eq!(texts, vec!["A red", " square."]);
    assert!(output.iter().all(|p| p.metadata["model"] == "vision-small"));

    let requests = server.received_requests().await.unwrap();
    let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(
        body["messages"],
        json!([
            {"role": "system", "content": "Be terse."},
            {"role": "user", "content": [
                {"type": "text", "text": "What is this?"},
                {"type": "image_url", "image_url": {"url": "data:image/png;base64,iVBORw=="}}
            ]}
        ])
    );
}

#[tokio::test]
async fn templated_turn_is_sent_as_single_user_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(sse_body(&["ok"]), "text/event-stream"),
        )
        .mount(&server)
        .await;

    let llm = Arc::new(OpenAIChatModel::new(profile(&server)).unwrap());
    let adapter = TurnAdapter::builder(llm)
        .prompt_template("Summarise:\n{{ messages | transcript }}")
        .build()
        .unwrap();

    let output: Vec<_> = adapter
        .process_parts(vec![ContentPart::text("long story").with_role("user")])
        .collect()
        .await;
    assert_eq!(output.len(), 1);

    let requests = server.received_requests().await.unwrap();
    let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(
        body["messages"],
        json!([{"role": "user", "content": "Summarise:\nHuman: long story"}])
    );
}

#[tokio::test]
async fn http_error_propagates_as_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
        .mount(&server)
        .await;

    let llm = Arc::new(OpenAIChatModel::new(profile(&server)).unwrap());
    let adapter = TurnAdapter::builder(llm).build().unwrap();

    let output: Vec<_> = adapter
        .process_parts(vec![ContentPart::text("hi").with_role("user")])
        .collect()
        .await;

    assert_eq!(output.len(), 1);
    match &output[0] {
        Err(AdapterError::Api { provider, message }) => {
            assert_eq!(provider, "custom");
            assert!(message.contains("401"));
            assert!(message.contains("invalid api key"));
        }
        other => panic!("Expected API error, got {other:?}"),
    }
}

#[tokio::test]
async fn unsupported_input_never_reaches_the_server() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let llm = Arc::new(OpenAIChatModel::new(profile(&server)).unwrap());
    let adapter = TurnAdapter::builder(llm).build().unwrap();

    let output: Vec<_> = adapter
        .process_parts(vec![ContentPart::from_bytes(
            "audio/wav",
            &b"RIFF"[..],
        )])
        .collect()
        .await;
    assert!(matches!(
        output.as_slice(),
        [Err(AdapterError::UnsupportedMimetype { mimetype })] if mimetype == "audio/wav"
    ));
}

#[test]
fn missing_api_key_is_reported() {
    let mut profile = ModelProfile::new(ProviderType::Groq, "llama");
    profile.api_key = None;
    if std::env::var("GROQ_API_KEY").is_ok() {
        return;
    }
    assert!(matches!(
        OpenAIChatModel::new(profile),
        Err(AdapterError::MissingApiKey { .. })
    ));
}

use anyhow::Result;
use adcraft::builder::{AgentBuilder, BuildError};
use adcraft::providers::configs::{CredentialError, Credentials, API_KEY_VAR, BASE_URL_VAR};
use adcraft::providers::factory::{TEXT_MODEL, VISION_MODEL};
use adcraft::runtime::{RuntimeContext, RuntimeMode};
use serde_json::{json, Value};
use serial_test::serial;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const AGENT_MODEL: &str = "agent-model";

fn write_config() -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("agent_llm_config.json");
    let config = json!({
        "config": {"model": AGENT_MODEL, "temperature": 0.3, "thinking": "enabled"},
        "sp": "You are a marketing assistant."
    });
    fs::write(&path, config.to_string()).unwrap();
    (dir, path)
}

fn sse(chunks: &[Value]) -> ResponseTemplate {
    let body = chunks
        .iter()
        .map(|chunk| format!("data: {}\n\n", chunk))
        .collect::<String>()
        + "data: [DONE]\n\n";
    ResponseTemplate::new(200)
        .insert_header("content-type", "text/event-stream")
        .set_body_string(body)
}

fn completion(content: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "choices": [{"index": 0, "message": {"role": "assistant", "content": content}}],
        "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
    }))
}

fn tool_call_chunks(name: &str, arguments: &str) -> Vec<Value> {
    let (head, tail) = arguments.split_at(arguments.len() / 2);
    vec![
        json!({"choices": [{"index": 0, "delta": {"role": "assistant", "tool_calls": [
            {"index": 0, "id": "call_1", "type": "function", "function": {"name": name, "arguments": head}}
        ]}}]}),
        json!({"choices": [{"index": 0, "delta": {"tool_calls": [
            {"index": 0, "function": {"arguments": tail}}
        ]}}]}),
    ]
}

async fn mount_agent_turns(server: &MockServer, tool: &str, arguments: &str, answer: &str) {
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(json!({
            "model": AGENT_MODEL,
            "stream": true,
            "thinking": {"type": "enabled"}
        })))
        .respond_with(sse(&tool_call_chunks(tool, arguments)))
        .up_to_n_times(1)
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(json!({"model": AGENT_MODEL, "stream": true})))
        .respond_with(sse(&[
            json!({"choices": [{"index": 0, "delta": {"content": answer}}]}),
        ]))
        .expect(1)
        .mount(server)
        .await;
}

fn builder(server: &MockServer, config: &Path) -> AgentBuilder {
    AgentBuilder::new()
        .config_path(config)
        .credentials(Credentials::new("test-key", server.uri()))
        .context(RuntimeContext::new().with_header("x-run-id", "run-7"))
}

#[tokio::test]
async fn test_turn_with_content_creation() -> Result<()> {
    let server = MockServer::start().await;
    let (_dir, config) = write_config();

    mount_agent_turns(
        &server,
        "create_content",
        r#"{"content_type": "social_media", "topic": "oat latte launch"}"#,
        "Here is your post.",
    )
    .await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("x-run-id", "run-7"))
        .and(body_partial_json(json!({"model": TEXT_MODEL, "stream": false})))
        .respond_with(completion(json!(["Oat", "latte", "is", "here."])))
        .expect(1)
        .mount(&server)
        .await;

    let agent = builder(&server, &config).build()?;
    let answer = agent.invoke("session-1", "Write a post about our oat latte").await?;
    assert_eq!(answer, "Here is your post.");

    // The final agent request carries the normalized tool output back to the model
    let requests = server.received_requests().await.unwrap();
    let last: Value = requests.last().unwrap().body_json()?;
    let tool_message = last["messages"]
        .as_array()
        .unwrap()
        .iter()
        .find(|m| m["role"] == "tool")
        .cloned()
        .unwrap();
    assert_eq!(tool_message["tool_call_id"], "call_1");
    assert_eq!(tool_message["content"], "Oat latte is here.");
    Ok(())
}

#[tokio::test]
async fn test_turn_with_image_analysis() -> Result<()> {
    let server = MockServer::start().await;
    let (_dir, config) = write_config();
    let image_url = "https://cdn.example.com/products/latte.png?v=2";

    mount_agent_turns(
        &server,
        "analyze_image_for_marketing",
        &json!({"image_url": image_url, "target_platform": "xiaohongshu"}).to_string(),
        "Analysis ready.",
    )
    .await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(json!({"model": VISION_MODEL, "stream": false})))
        .respond_with(completion(json!("A cozy cafe counter.")))
        .expect(1)
        .mount(&server)
        .await;

    let agent = builder(&server, &config).build()?;
    assert_eq!(agent.invoke("s", "Analyze this image").await?, "Analysis ready.");

    let requests = server.received_requests().await.unwrap();
    let vision: Value = requests
        .iter()
        .map(|r| r.body_json::<Value>().unwrap())
        .find(|body| body["model"] == VISION_MODEL)
        .unwrap();
    let parts = vision["messages"][1]["content"].as_array().unwrap();
    assert_eq!(parts.len(), 2);
    assert_eq!(parts[0]["type"], "text");
    assert_eq!(parts[1]["type"], "image_url");
    assert_eq!(parts[1]["image_url"]["url"], image_url);
    Ok(())
}

#[tokio::test]
async fn test_failing_tool_keeps_conversation_going() -> Result<()> {
    let server = MockServer::start().await;
    let (_dir, config) = write_config();

    mount_agent_turns(
        &server,
        "optimize_content",
        r#"{"original_content": "Buy our coffee.", "optimization_goal": "shorten"}"#,
        "The optimizer is unavailable right now.",
    )
    .await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(json!({"model": TEXT_MODEL, "stream": false})))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let agent = builder(&server, &config).build()?;
    let answer = agent.invoke("s", "Shorten this").await?;
    assert_eq!(answer, "The optimizer is unavailable right now.");

    let requests = server.received_requests().await.unwrap();
    let last: Value = requests.last().unwrap().body_json()?;
    let tool_output = last["messages"]
        .as_array()
        .unwrap()
        .iter()
        .find(|m| m["role"] == "tool")
        .and_then(|m| m["content"].as_str())
        .unwrap()
        .to_string();
    assert!(tool_output.starts_with("Error: content optimization failed"));
    assert!(tool_output.contains("503"));
    Ok(())
}

#[tokio::test]
async fn test_malformed_tool_arguments_are_answered_in_place() -> Result<()> {
    let server = MockServer::start().await;
    let (_dir, config) = write_config();

    mount_agent_turns(
        &server,
        "create_content",
        r#"{"topic": "#,
        "Could you tell me the topic again?",
    )
    .await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(json!({"model": TEXT_MODEL})))
        .respond_with(completion(json!("unused")))
        .expect(0)
        .mount(&server)
        .await;

    let agent = builder(&server, &config).build()?;
    let answer = agent.invoke("s", "Write a post").await?;
    assert_eq!(answer, "Could you tell me the topic again?");

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
    let last: Value = requests.last().unwrap().body_json()?;
    let messages = last["messages"].as_array().unwrap();

    let assistant = messages.iter().find(|m| m["role"] == "assistant").unwrap();
    let calls = assistant["tool_calls"].as_array().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0]["id"], "call_1");
    assert_eq!(calls[0]["function"]["name"], "create_content");
    assert_eq!(calls[0]["function"]["arguments"], "{}");

    let tool_messages: Vec<&Value> = messages.iter().filter(|m| m["role"] == "tool").collect();
    assert_eq!(tool_messages.len(), 1);
    assert_eq!(tool_messages[0]["tool_call_id"], "call_1");
    assert!(tool_messages[0]["content"]
        .as_str()
        .unwrap()
        .contains("Invalid parameters"));
    Ok(())
}

#[tokio::test]
async fn test_checkpointed_mode_sends_history() -> Result<()> {
    let server = MockServer::start().await;
    let (_dir, config) = write_config();

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(sse(&[
            json!({"choices": [{"index": 0, "delta": {"content": "Noted."}}]}),
        ]))
        .expect(2)
        .mount(&server)
        .await;

    let agent = builder(&server, &config)
        .mode(RuntimeMode::Checkpointed)
        .build()?;
    agent.invoke("s", "Our brand color is teal.").await?;
    agent.invoke("s", "What is our brand color?").await?;

    let requests = server.received_requests().await.unwrap();
    let second: Value = requests[1].body_json()?;
    // system, first user turn, first answer, second user turn
    assert_eq!(second["messages"].as_array().unwrap().len(), 4);
    assert_eq!(second["messages"][1]["content"], "Our brand color is teal.");
    Ok(())
}

#[tokio::test]
#[serial]
async fn test_missing_credentials_never_reach_network() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let (_dir, config) = write_config();
    std::env::set_var(API_KEY_VAR, "test-key");
    std::env::remove_var(BASE_URL_VAR);

    let err = AgentBuilder::new()
        .config_path(&config)
        .build()
        .err()
        .unwrap();
    std::env::remove_var(API_KEY_VAR);

    assert!(matches!(
        err,
        BuildError::Credential(CredentialError::Missing { var: BASE_URL_VAR })
    ));
}

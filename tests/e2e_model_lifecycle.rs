//! End-to-End Test Suite: model lifecycle against a mock runner
//!
//! Resolves the endpoint from a context directory, then drives pull, list, inspect, tag,
//! chat and remove through the production executor.

use std::fs;

use mockito::{Matcher, Server, ServerGuard};
use modelrunner_client::{ClientConfig, ModelRunnerClient, Status};
use serde_json::json;
use tempfile::TempDir;

const PREFIX: &str = "/exp/vDD4.40";
const ID: &str = "sha256:0f3b7e1c9a2d4b6e8f0a1c3e5b7d9f1a3c5e7b9d1f3a5c7e9b1d3f5a7c9e1b3d";

fn route(path: &str) -> String {
    format!("{PREFIX}{path}")
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter("debug")
        .try_init();
}

/// Writes a context whose endpoint is the mock server and makes it current
fn context_dir_for(server: &ServerGuard) -> TempDir {
    let dir = TempDir::new().unwrap();
    let host = server.url().replacen("http://", "tcp://", 1);

    let meta = dir.path().join("contexts/meta/9f86d081884c7d65");
    fs::create_dir_all(&meta).unwrap();
    fs::write(
        meta.join("meta.json"),
        json!({
            "Name": "model-runner",
            "Metadata": {"Description": "local runner"},
            "Endpoints": {"docker": {"Host": host, "SkipTLSVerify": false}}
        })
        .to_string(),
    )
    .unwrap();
    fs::write(
        dir.path().join("config.json"),
        json!({"auths": {}, "currentContext": "model-runner"}).to_string(),
    )
    .unwrap();
    dir
}

fn catalog() -> String {
    json!([{
        "id": ID,
        "tags": ["ai/smollm2:latest"],
        "created": 1742816981,
        "config": {"format": "gguf", "quantization": "Q4_K_M", "parameters": "361.82 M", "architecture": "llama", "size": "256.35 MiB"}
    }])
    .to_string()
}

/// Full workflow: discover endpoint, check status, pull, inspect by short id, tag, chat
#[tokio::test]
async fn test_model_lifecycle_workflow() {
    init_tracing();
    let mut server = Server::new_async().await;
    let dir = context_dir_for(&server);

    std::env::set_var("DOCKER_CONFIG", dir.path());
    std::env::remove_var("DOCKER_AUTH_CONFIG");
    std::env::remove_var("DOCKER_HOST");
    std::env::remove_var("DOCKER_CONTEXT");
    let config = ClientConfig::from_context().unwrap();
    std::env::remove_var("DOCKER_CONFIG");

    assert_eq!(config.base_url, server.url());
    let client = ModelRunnerClient::from_config(&config).unwrap();

    let _list = server
        .mock("GET", route("/models").as_str())
        .with_status(200)
        .with_body(catalog())
        .create_async()
        .await;
    let _status = server
        .mock("GET", route("/engines/status").as_str())
        .with_status(200)
        .with_body("llama.cpp: running")
        .create_async()
        .await;
    let _pull = server
        .mock("POST", route("/models/create").as_str())
        .with_status(200)
        .with_body(concat!(
            "{\"type\":\"progress\",\"message\":\"Downloaded: 128.00 MB\"}\n",
            "{\"type\":\"progress\",\"message\":\"Downloaded: 256.35 MB\"}\n",
            "{\"type\":\"success\",\"message\":\"Model pulled successfully\"}\n",
        ))
        .create_async()
        .await;
    let _inspect = server
        .mock("GET", route(&format!("/models/{ID}")).as_str())
        .with_status(200)
        .with_body(json!({"id": ID, "tags": ["ai/smollm2:latest"], "created": 1742816981, "config": {}}).to_string())
        .create_async()
        .await;
    let tag = server
        .mock("POST", route(&format!("/models/{ID}/tag")).as_str())
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("repo".into(), "me/smollm2".into()),
            Matcher::UrlEncoded("tag".into(), "v1".into()),
        ]))
        .with_status(201)
        .with_body("Model tagged successfully")
        .create_async()
        .await;
    let chat = server
        .mock("POST", route("/engines/v1/chat/completions").as_str())
        .match_body(Matcher::PartialJson(json!({"model": ID, "stream": true})))
        .with_status(200)
        .with_body("data: {\"choices\":[{\"delta\":{\"content\":\"Hi \"},\"index\":0}]}\ndata: {\"choices\":[{\"delta\":{\"content\":\"there\"},\"index\":0}]}\ndata: [DONE]\n")
        .create_async()
        .await;

    assert!(matches!(client.status().await, Status::Running(ref s) if s == "llama.cpp: running"));

    let mut progress = Vec::new();
    let pulled = client
        .pull("ai/smollm2", |m| progress.push(m.to_string()))
        .await
        .unwrap();
    assert_eq!(pulled, "Model pulled successfully");
    assert_eq!(progress.len(), 2);

    let model = client.inspect("0f3b7e1c9a2d").await.unwrap();
    assert_eq!(model.id, ID);

    let openai = client.list().await.unwrap().to_openai();
    assert_eq!(openai.data[0].id, "ai/smollm2:latest");

    let tagged = client.tag("0f3b7e1c9a2d", "me/smollm2", "v1").await.unwrap();
    assert_eq!(tagged, "Model tagged successfully");
    tag.assert_async().await;

    let mut reply = String::new();
    client
        .chat("0f3b7e1c9a2d", "Hello", |d| reply.push_str(d))
        .await
        .unwrap();
    assert_eq!(reply, "Hi there");
    chat.assert_async().await;
}

/// Remove over [A, B, C] where B is missing stops after B and reports A only
#[tokio::test]
async fn test_remove_batch_stops_at_missing_model() {
    let mut server = Server::new_async().await;
    let a = server
        .mock("DELETE", route("/models/ai/model-a").as_str())
        .match_query(Matcher::UrlEncoded("force".into(), "false".into()))
        .with_status(200)
        .expect(1)
        .create_async()
        .await;
    let b = server
        .mock("DELETE", route("/models/ai/model-b").as_str())
        .match_query(Matcher::UrlEncoded("force".into(), "false".into()))
        .with_status(404)
        .with_body("model not found")
        .expect(1)
        .create_async()
        .await;
    let c = server
        .mock("DELETE", route("/models/ai/model-c").as_str())
        .match_query(Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let config = ClientConfig {
        base_url: server.url(),
        ..Default::default()
    };
    let client = ModelRunnerClient::from_config(&config).unwrap();

    let failure = client
        .remove(&["ai/model-a", "ai/model-b", "ai/model-c"], false)
        .await
        .unwrap_err();

    assert_eq!(failure.removed, "Model ai/model-a removed successfully\n");
    assert!(failure.error.is_not_found());
    assert_eq!(failure.error.to_string(), "no such model: ai/model-b");

    a.assert_async().await;
    b.assert_async().await;
    c.assert_async().await;
}

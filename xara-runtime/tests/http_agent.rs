use std::time::Duration;

use wiremock::matchers::{body_string, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use xara_core::config::{AgentConfig, WidgetConfig};
use xara_core::feedback::{QueryResolved, Satisfaction};
use xara_core::types::SessionId;
use xara_engine::controller::FALLBACK_REPLY;
use xara_engine::traits::AgentClient;
use xara_runtime::agent::HttpAgent;
use xara_runtime::runtime_controller::build_controller_from_config;

fn agent_config(server: &MockServer) -> AgentConfig {
    AgentConfig {
        base_url: Some(format!("{}/", server.uri())),
        connect_timeout_ms: 2_000,
        request_timeout_ms: 5_000,
    }
}

fn session() -> SessionId {
    "5f0c1a9e-2b7d-4c1e-9a43-0d8f6b2e7c11".parse().map(SessionId).unwrap()
}

#[tokio::test]
async fn chat_posts_form_and_decodes_reply() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string(
            "session_id=5f0c1a9e-2b7d-4c1e-9a43-0d8f6b2e7c11&text=is+there+parking%3F",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{"reply":"Yes, **free** parking.","intent":"parking_info","suggestions":["Directions"]}"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    let agent = HttpAgent::new(&agent_config(&server)).unwrap();
    let reply = agent.chat(&session(), "is there parking?").await.unwrap();

    assert_eq!(reply.reply, "Yes, **free** parking.");
    assert_eq!(reply.intent.as_deref(), Some("parking_info"));
    assert_eq!(reply.suggestions, Some(vec!["Directions".to_string()]));
}

#[tokio::test]
async fn chat_server_error_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let agent = HttpAgent::new(&agent_config(&server)).unwrap();
    let err = agent.chat(&session(), "hi").await.unwrap_err();
    assert!(format!("{err:#}").contains("status=500"));
}

#[tokio::test]
async fn chat_malformed_body_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let agent = HttpAgent::new(&agent_config(&server)).unwrap();
    assert!(agent.chat(&session(), "hi").await.is_err());
}

#[tokio::test]
async fn close_session_tolerates_non_json_ack() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/close-session"))
        .and(body_string("session_id=5f0c1a9e-2b7d-4c1e-9a43-0d8f6b2e7c11"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&server)
        .await;

    let agent = HttpAgent::new(&agent_config(&server)).unwrap();
    agent.close_session(&session()).await.unwrap();
}

#[tokio::test]
async fn feedback_sends_exact_values() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/feedback"))
        .and(body_string_contains("query_resolved=No"))
        .and(body_string_contains("user_satisfaction=2"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"status":"success"}"#))
        .expect(1)
        .mount(&server)
        .await;

    let agent = HttpAgent::new(&agent_config(&server)).unwrap();
    agent
        .submit_feedback(&session(), QueryResolved::No, Satisfaction::new(2).unwrap())
        .await
        .unwrap();
}

#[tokio::test]
async fn feedback_error_status_carries_agent_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/feedback"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_string(r#"{"status":"error","error":"Invalid session"}"#),
        )
        .mount(&server)
        .await;

    let agent = HttpAgent::new(&agent_config(&server)).unwrap();
    let err = agent
        .submit_feedback(&session(), QueryResolved::Yes, Satisfaction::MAX)
        .await
        .unwrap_err();
    let msg = format!("{err:#}");
    assert!(msg.contains("Invalid session"));
    assert!(msg.contains("status=400"));
}

#[test]
fn rejects_non_http_base_url() {
    let cfg = AgentConfig {
        base_url: Some("ftp://agent.example.com".into()),
        ..AgentConfig::default()
    };
    assert!(HttpAgent::new(&cfg).is_err());
}

#[tokio::test]
async fn controller_falls_back_when_agent_fails() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/close-session"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"status":"closed"}"#))
        .expect(1)
        .mount(&server)
        .await;

    let cfg = WidgetConfig {
        agent: agent_config(&server),
        ..WidgetConfig::default()
    };
    let ctrl = build_controller_from_config(cfg, None).unwrap();
    assert!(!ctrl.voice_available());

    ctrl.open().await;
    ctrl.submit_text("hello").await.unwrap();
    let snap = ctrl.snapshot().await;
    assert_eq!(snap.transcript.len(), 2);
    assert_eq!(snap.transcript[1].content, FALLBACK_REPLY);

    ctrl.close().await;
    assert!(!ctrl.snapshot().await.is_open);

    // The survey timer is real time here; give it a moment to land.
    tokio::time::sleep(Duration::from_millis(400)).await;
    assert!(ctrl.snapshot().await.survey.is_some());
    ctrl.shutdown().await;
}

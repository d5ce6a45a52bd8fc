// Integration tests for AJAX form submission
//
// Tests cover:
// - JSON envelopes with and without an explicit category
// - Non-JSON and empty bodies
// - Transport failures

use campus_assistant::client::form::{EMPTY_MESSAGE_FALLBACK, GENERIC_ERROR_MESSAGE, FormSubmitter};
use campus_assistant::models::flash::FlashCategory;
use std::time::Duration;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn submitter() -> FormSubmitter {
    FormSubmitter::new(Duration::from_secs(5)).unwrap()
}

const FIELDS: &[(&str, &str)] = &[("email", "parent@example.com")];

#[tokio::test]
async fn test_success_envelope() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/newsletter"))
        .and(header("X-Requested-With", "XMLHttpRequest"))
        .and(body_string_contains("email=parent%40example.com"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true,
            "message": "Thank you for subscribing!"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = submitter()
        .submit(&format!("{}/newsletter", server.uri()), FIELDS)
        .await;

    assert!(outcome.reset_form);
    assert_eq!(outcome.flash.message, "Thank you for subscribing!");
    assert_eq!(outcome.flash.category, FlashCategory::Success);
    assert!(outcome.flash.id.starts_with("flash-"));
}

#[tokio::test]
async fn test_failure_with_category() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/contact"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "success": false,
            "message": "Please fill in all fields",
            "category": "danger"
        })))
        .mount(&server)
        .await;

    let outcome = submitter()
        .submit(&format!("{}/contact", server.uri()), FIELDS)
        .await;

    assert!(!outcome.reset_form);
    assert_eq!(outcome.flash.message, "Please fill in all fields");
    assert_eq!(outcome.flash.category, FlashCategory::Danger);
}

#[tokio::test]
async fn test_unknown_category_falls_back_to_info() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": false,
            "message": "Noted",
            "category": "sparkly"
        })))
        .mount(&server)
        .await;

    let outcome = submitter().submit(&server.uri(), FIELDS).await;

    assert_eq!(outcome.flash.category, FlashCategory::Info);
}

#[tokio::test]
async fn test_missing_message_warns() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"success": true})),
        )
        .mount(&server)
        .await;

    let outcome = submitter().submit(&server.uri(), FIELDS).await;

    assert!(outcome.reset_form);
    assert_eq!(outcome.flash.message, EMPTY_MESSAGE_FALLBACK);
    assert_eq!(outcome.flash.category, FlashCategory::Warning);
}

#[tokio::test]
async fn test_html_body_becomes_danger_flash() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("<h1>Server Error</h1>"))
        .mount(&server)
        .await;

    let outcome = submitter().submit(&server.uri(), FIELDS).await;

    assert!(!outcome.reset_form);
    assert_eq!(outcome.flash.message, "<h1>Server Error</h1>");
    assert_eq!(outcome.flash.category, FlashCategory::Danger);
}

#[tokio::test]
async fn test_empty_body_is_unexpected_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let outcome = submitter().submit(&server.uri(), FIELDS).await;

    assert_eq!(outcome.flash.message, "Unexpected server response");
    assert_eq!(outcome.flash.category, FlashCategory::Danger);
}

#[tokio::test]
async fn test_connection_failure() {
    // bind then release a port so nothing is listening on it
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let uri = format!("http://127.0.0.1:{}/contact", port);

    let outcome = submitter().submit(&uri, FIELDS).await;

    assert!(!outcome.reset_form);
    assert_eq!(outcome.flash.message, GENERIC_ERROR_MESSAGE);
    assert_eq!(outcome.flash.category, FlashCategory::Danger);
    assert!(outcome.envelope.is_none());
}

mod common;

use common::{ harness, request, single, FailingLog, MockClient, Step };
use std::sync::Arc;

use wellbeing_relay::agent::{ PipelineSettings, RelayAgent };
use wellbeing_relay::citation::CitationTable;
use wellbeing_relay::config::prompt::{ PromptConfig, DEFAULT_DISCLAIMER, DEFAULT_FAILURE_MESSAGE };
use wellbeing_relay::decision_log::{ CRISIS_CHECK_MODEL, NO_MODEL };
use wellbeing_relay::models::chat::{ ChatMessage, ChatResponse };

const PRIMARY: &str = "command-light";
const SECONDARY: &str = "mistralai/mistral-7b-instruct:free";

#[tokio::test]
async fn long_message_is_rejected_without_provider_calls() {
    let h = harness(MockClient::replying(PRIMARY, "hi"), MockClient::replying(SECONDARY, "hi"));
    let long = "a".repeat(501);

    let response = h.agent.process_message(single(&long)).await;

    assert_eq!(response, ChatResponse::notice(PromptConfig::default().too_long_message));
    assert_eq!(h.primary.calls(), 0);
    assert_eq!(h.secondary.calls(), 0);
    assert!(h.log.entries().await.is_empty());
}

#[tokio::test]
async fn length_limit_counts_characters_not_bytes() {
    let h = harness(MockClient::replying(PRIMARY, "ok"), MockClient::replying(SECONDARY, "ok"));
    let at_limit = "é".repeat(500);

    let response = h.agent.process_message(single(&at_limit)).await;

    assert!(matches!(response, ChatResponse::Answer { .. }));
    assert_eq!(h.primary.calls(), 1);
}

#[tokio::test]
async fn only_the_latest_message_is_length_checked() {
    let h = harness(MockClient::replying(PRIMARY, "ok"), MockClient::replying(SECONDARY, "ok"));
    let req = request(vec![ChatMessage::user("x".repeat(900)), ChatMessage::assistant("noted"), ChatMessage::user("thanks")]);

    let response = h.agent.process_message(req).await;

    assert!(matches!(response, ChatResponse::Answer { .. }));
}

#[tokio::test]
async fn empty_conversation_is_answered_with_advisory() {
    let h = harness(MockClient::replying(PRIMARY, "hi"), MockClient::replying(SECONDARY, "hi"));

    let response = h.agent.process_message(request(vec![])).await;

    assert_eq!(response, ChatResponse::notice(PromptConfig::default().empty_message));
    assert_eq!(h.primary.calls() + h.secondary.calls(), 0);
}

#[tokio::test]
async fn crisis_language_short_circuits_and_is_logged() {
    let h = harness(MockClient::replying(PRIMARY, "hi"), MockClient::replying(SECONDARY, "hi"));

    let response = h.agent.process_message(single("I think I want to DIE")).await;

    let expected = PromptConfig::default().crisis_message;
    assert_eq!(response, ChatResponse::crisis(expected.clone()));
    let body = serde_json::to_value(&response).unwrap();
    assert_eq!(body["crisis"], true);

    assert_eq!(h.primary.calls(), 0);
    assert_eq!(h.secondary.calls(), 0);
    let entries = h.log.entries().await;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].model, CRISIS_CHECK_MODEL);
    assert_eq!(entries[0].output, expected);
}

#[tokio::test]
async fn citation_match_triggers_grounded_second_pass() {
    let h = harness(
        MockClient::new(PRIMARY, vec![Step::Numbered("answer".into())]),
        MockClient::replying(SECONDARY, "unused")
    );

    let response = h.agent.process_message(single("I have ANXIETY issues")).await;

    assert_eq!(h.primary.calls(), 2);
    assert_eq!(h.secondary.calls(), 0);

    let expected_source = CitationTable::builtin().lookup("anxiety").unwrap();
    match &response {
        ChatResponse::Answer { response, source } => {
            assert_eq!(source.as_ref(), Some(&expected_source));
            assert!(response.starts_with("answer #2"));
            assert!(response.ends_with(DEFAULT_DISCLAIMER));
        }
        other => panic!("expected an answer, got {:?}", other),
    }

    let requests = h.primary.requests();
    let general = PromptConfig::default().general_preamble;
    assert_eq!(requests[0].instruction.as_deref(), Some(general.as_str()));
    let grounded = requests[1].instruction.clone().unwrap();
    assert!(grounded.contains(&expected_source.title));
    assert_eq!(requests[0].message, requests[1].message);

    let entries = h.log.entries().await;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].model, PRIMARY);
    assert_eq!(entries[0].instruction, grounded);
}

#[tokio::test]
async fn no_citation_means_single_call_and_null_source() {
    let h = harness(MockClient::new(PRIMARY, vec![Step::Numbered("answer".into())]), MockClient::replying(SECONDARY, "unused"));

    let response = h.agent.process_message(single("I just want to talk about my day")).await;

    assert_eq!(h.primary.calls(), 1);
    let body = serde_json::to_value(&response).unwrap();
    assert!(body["source"].is_null());
    assert!(body.as_object().unwrap().contains_key("source"));
    assert_eq!(body["response"], format!("answer #1{}", DEFAULT_DISCLAIMER));
}

#[tokio::test]
async fn primary_transport_failure_falls_back_with_raw_conversation() {
    let h = harness(MockClient::failing(PRIMARY, Step::Transport), MockClient::replying(SECONDARY, "You are not alone."));
    let messages = vec![
        ChatMessage::user("hi"),
        ChatMessage::assistant("Hello, how are you feeling?"),
        ChatMessage::user("not great today")
    ];

    let response = h.agent.process_message(request(messages.clone())).await;

    assert_eq!(h.secondary.calls(), 1);
    let fallback = &h.secondary.requests()[0];
    assert_eq!(fallback.full_conversation(), messages);
    assert!(fallback.instruction.is_none());
    assert_eq!(fallback.params.max_tokens, 300);
    assert!(response.text().ends_with(DEFAULT_DISCLAIMER));
    assert!(response.text().starts_with("You are not alone."));

    let entries = h.log.entries().await;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].model, SECONDARY);
}

#[tokio::test]
async fn fallback_attaches_citation_when_found() {
    let h = harness(MockClient::failing(PRIMARY, Step::Malformed), MockClient::replying(SECONDARY, "Try to rest."));

    let response = h.agent.process_message(single("insomnia every night")).await;

    assert_eq!(h.primary.calls(), 1);
    assert_eq!(h.secondary.calls(), 1);
    match response {
        ChatResponse::Answer { source, .. } => assert_eq!(source.unwrap().title, "Insomnia"),
        other => panic!("expected an answer, got {:?}", other),
    }
}

#[tokio::test]
async fn grounded_pass_failure_also_falls_back() {
    let h = harness(
        MockClient::new(PRIMARY, vec![Step::Reply("general".into()), Step::Timeout]),
        MockClient::replying(SECONDARY, "fallback")
    );

    let response = h.agent.process_message(single("so much stress at work")).await;

    assert_eq!(h.primary.calls(), 2);
    assert_eq!(h.secondary.calls(), 1);
    assert!(response.text().starts_with("fallback"));
}

#[tokio::test]
async fn both_providers_failing_returns_generic_message() {
    let h = harness(MockClient::failing(PRIMARY, Step::Transport), MockClient::failing(SECONDARY, Step::Malformed));

    let response = h.agent.process_message(single("feeling anxious")).await;

    let body = serde_json::to_value(&response).unwrap();
    assert_eq!(body, serde_json::json!({ "response": DEFAULT_FAILURE_MESSAGE }));

    let entries = h.log.entries().await;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].model, NO_MODEL);
}

#[tokio::test]
async fn repeated_conversation_yields_identical_body() {
    let h = harness(MockClient::replying(PRIMARY, "steady reply"), MockClient::replying(SECONDARY, "unused"));
    let req = single("I feel lonely lately");

    let first = serde_json::to_value(h.agent.process_message(req.clone()).await).unwrap();
    let second = serde_json::to_value(h.agent.process_message(req).await).unwrap();

    assert_eq!(first, second);
    let entries = h.log.entries().await;
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].output, entries[1].output);
    assert_eq!(entries[0].instruction, entries[1].instruction);
}

#[tokio::test]
async fn log_failure_does_not_fail_the_request() {
    let agent = RelayAgent::from_parts(
        MockClient::replying(PRIMARY, "fine"),
        MockClient::replying(SECONDARY, "unused"),
        Arc::new(CitationTable::builtin()),
        Arc::new(PromptConfig::default()),
        Arc::new(FailingLog),
        PipelineSettings::default()
    );

    let response = agent.process_message(single("just checking in")).await;

    assert!(response.text().starts_with("fine"));
}

#[tokio::test]
async fn user_id_is_recorded_in_the_log() {
    let h = harness(MockClient::replying(PRIMARY, "ok"), MockClient::replying(SECONDARY, "ok"));
    let mut req = single("hello there");
    req.user_id = Some("user-42".into());

    h.agent.process_message(req).await;

    assert_eq!(h.log.entries().await[0].user_id.as_deref(), Some("user-42"));
}

#[tokio::test]
async fn concurrent_requests_do_not_share_state() {
    let h = harness(MockClient::new(PRIMARY, vec![Step::Echo]), MockClient::replying(SECONDARY, "unused"));

    let (a, b) = tokio::join!(
        h.agent.process_message(single("first person here")),
        h.agent.process_message(single("second person here"))
    );

    assert!(a.text().starts_with("echo: first person here"));
    assert!(b.text().starts_with("echo: second person here"));
    assert_eq!(h.log.entries().await.len(), 2);
}

use super::*;
use anyhow::anyhow;
use async_trait::async_trait;
use shared::{
    domain::ContactField,
    error::ErrorCode,
    protocol::{FIELDS_REQUIRED_MESSAGE, RECEIVED_MESSAGE},
};

struct BrokenSink;

#[async_trait]
impl RecordingSink for BrokenSink {
    async fn record(&self, _submission: &RecordedSubmission) -> anyhow::Result<()> {
        Err(anyhow!("disk full"))
    }
}

fn setup() -> (ApiContext, Arc<MemorySink>) {
    let sink = Arc::new(MemorySink::new());
    (ApiContext::new(sink.clone()), sink)
}

fn request(name: &str, email: &str, message: &str) -> ContactRequest {
    ContactRequest {
        name: name.to_string(),
        email: email.to_string(),
        message: message.to_string(),
    }
}

#[tokio::test]
async fn accepts_complete_submission_and_records_it_once() {
    let (ctx, sink) = setup();

    let response = submit_contact(&ctx, request("Ada", "ada@example.com", "Hello"))
        .await
        .expect("accepted");
    assert_eq!(
        response,
        ContactResponse::Received {
            success: true,
            message: RECEIVED_MESSAGE.to_string(),
        }
    );

    let records = sink.records().await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].name, "Ada");
    assert_eq!(records[0].email, "ada@example.com");
    assert_eq!(records[0].message, "Hello");
}

#[tokio::test]
async fn rejects_each_empty_field_without_recording() {
    let cases = [
        (request("", "x@example.com", "Hi"), vec![ContactField::Name]),
        (request("Ada", "", "Hi"), vec![ContactField::Email]),
        (request("Ada", "x@example.com", ""), vec![ContactField::Message]),
        (request("", "", ""), ContactField::ALL.to_vec()),
    ];

    for (input, expected_missing) in cases {
        let (ctx, sink) = setup();
        let err = submit_contact(&ctx, input)
            .await
            .expect_err("should be rejected");
        assert_eq!(err.code, ErrorCode::Validation);
        assert_eq!(err.message, FIELDS_REQUIRED_MESSAGE);
        assert_eq!(err.missing, expected_missing);
        assert!(sink.is_empty().await);
    }
}

#[tokio::test]
async fn whitespace_and_unusual_emails_are_accepted() {
    let (ctx, sink) = setup();
    submit_contact(&ctx, request(" ", "not-an-email", "\n"))
        .await
        .expect("permissive validation");
    assert_eq!(sink.len().await, 1);
}

#[tokio::test]
async fn duplicate_submissions_are_recorded_independently() {
    let (ctx, sink) = setup();
    let payload = request("Ada", "ada@example.com", "Hello");

    submit_contact(&ctx, payload.clone()).await.expect("first");
    submit_contact(&ctx, payload).await.expect("second");

    let records = sink.records().await;
    assert_eq!(records.len(), 2);
    assert_ne!(records[0].id, records[1].id);
}

#[tokio::test]
async fn sink_failure_does_not_change_the_response() {
    let ctx = ApiContext::new(Arc::new(BrokenSink));
    let response = submit_contact(&ctx, request("Ada", "ada@example.com", "Hello"))
        .await
        .expect("still acknowledged");
    assert!(response.is_received());
}

#[tokio::test]
async fn concurrent_submissions_all_reach_the_sink() {
    let (ctx, sink) = setup();

    let mut handles = Vec::new();
    for i in 0..32 {
        let ctx = ctx.clone();
        handles.push(tokio::spawn(async move {
            submit_contact(&ctx, request(&format!("visitor-{i}"), "v@example.com", "hi")).await
        }));
    }
    for handle in handles {
        handle.await.expect("join").expect("accepted");
    }

    assert_eq!(sink.len().await, 32);
}

#[test]
fn validate_submission_passes_complete_requests() {
    assert!(validate_submission(&request("a", "b", "c")).is_ok());
    assert!(validate_submission(&ContactRequest::default()).is_err());
}

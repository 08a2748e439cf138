use std::sync::Arc;

use chrono::Utc;
use shared::{
    domain::{RecordedSubmission, SubmissionId},
    error::ApiError,
    protocol::{ContactRequest, ContactResponse},
};
use tracing::{error, info};

mod sink;

pub use sink::{AppendLogSink, FanoutSink, MemorySink, RecordingSink, TracingSink};

#[derive(Clone)]
pub struct ApiContext {
    pub sink: Arc<dyn RecordingSink>,
}

impl ApiContext {
    pub fn new(sink: Arc<dyn RecordingSink>) -> Self {
        Self { sink }
    }
}

impl Default for ApiContext {
    fn default() -> Self {
        Self::new(Arc::new(TracingSink))
    }
}

pub fn validate_submission(request: &ContactRequest) -> Result<(), ApiError> {
    let missing = request.missing_fields();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ApiError::fields_required(missing))
    }
}

/// Validates one submission and records it. Recording is best-effort: a sink failure is logged
/// and the submission is still acknowledged.
pub async fn submit_contact(
    ctx: &ApiContext,
    request: ContactRequest,
) -> Result<ContactResponse, ApiError> {
    if let Err(err) = validate_submission(&request) {
        info!(missing = ?err.missing, "rejected contact submission");
        return Err(err);
    }

    let submission = stamp(request);
    if let Err(error) = ctx.sink.record(&submission).await {
        error!(
            submission_id = %submission.id,
            %error,
            "failed to record contact submission"
        );
    }

    Ok(ContactResponse::received())
}

fn stamp(request: ContactRequest) -> RecordedSubmission {
    RecordedSubmission {
        id: SubmissionId::new(),
        received_at: Utc::now(),
        name: request.name,
        email: request.email,
        message: request.message,
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;

use std::sync::Arc;

use shared::{
    domain::{ContactField, ContactFormState},
    error::UnknownField,
    protocol::ContactRequest,
};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::{
    error::TransportError,
    store::FormStore,
    transport::ContactTransport,
    types::{FormSnapshot, SubmissionStatus, SubmitOutcome},
    GENERIC_FAILURE_MESSAGE,
};

/// Drives one contact form: field edits and a single-flight submission state machine.
///
/// `Idle -> Submitting -> Succeeded | Failed`. An edit after a settled submission returns to
/// `Idle`; a submit while `Submitting` sends nothing. Failures keep the typed input, success
/// clears it.
pub struct SubmissionController {
    transport: Arc<dyn ContactTransport>,
    store: FormStore,
}

impl SubmissionController {
    pub fn new(transport: Arc<dyn ContactTransport>) -> Self {
        Self::with_store(transport, FormStore::new())
    }

    pub fn with_store(transport: Arc<dyn ContactTransport>, store: FormStore) -> Self {
        Self { transport, store }
    }

    pub fn store(&self) -> &FormStore {
        &self.store
    }

    pub fn snapshot(&self) -> FormSnapshot {
        self.store.get()
    }

    pub fn status(&self) -> SubmissionStatus {
        self.store.get().status
    }

    pub fn form(&self) -> ContactFormState {
        self.store.get().form
    }

    pub fn subscribe(&self) -> watch::Receiver<FormSnapshot> {
        self.store.subscribe()
    }

    pub fn update_field(&self, field: ContactField, value: impl Into<String>) {
        let value = value.into();
        self.store.update(|snapshot| {
            let mut changed = false;
            if snapshot.form.get(field) != value {
                snapshot.form.set(field, value);
                changed = true;
            }
            if snapshot.status.is_settled() {
                snapshot.status = SubmissionStatus::Idle;
                changed = true;
            }
            changed
        });
    }

    pub fn update_field_by_name(
        &self,
        name: &str,
        value: impl Into<String>,
    ) -> Result<(), UnknownField> {
        let field = name.parse::<ContactField>()?;
        self.update_field(field, value);
        Ok(())
    }

    /// Sends the current form once. Returns without sending if a submission is in flight.
    pub async fn submit(&self) -> SubmitOutcome {
        let mut request = None;
        self.store.update(|snapshot| {
            if snapshot.status.is_submitting() {
                return false;
            }
            request = Some(ContactRequest::from(&snapshot.form));
            snapshot.status = SubmissionStatus::Submitting;
            true
        });

        let Some(request) = request else {
            debug!("contact submission already in flight; ignoring submit");
            return SubmitOutcome::AlreadyInFlight;
        };

        // The exchange runs on its own task so that dropping this future never strands the
        // store in `Submitting`.
        let task = tokio::spawn(deliver(
            Arc::clone(&self.transport),
            self.store.clone(),
            request,
        ));
        match task.await {
            Ok(outcome) => outcome,
            Err(error) => {
                warn!(%error, "contact submission task stopped");
                let error = TransportError::Network(format!("submission task stopped: {error}"));
                settle_failed(&self.store);
                SubmitOutcome::Failed(error)
            }
        }
    }
}

async fn deliver(
    transport: Arc<dyn ContactTransport>,
    store: FormStore,
    request: ContactRequest,
) -> SubmitOutcome {
    match transport.submit(&request).await {
        Ok(ack) => {
            info!(ack = %ack.message, "contact submission delivered");
            store.update(|snapshot| {
                snapshot.status = SubmissionStatus::Succeeded;
                snapshot.form.clear();
                true
            });
            SubmitOutcome::Delivered(ack)
        }
        Err(error) => {
            // The cause stays in the log; the visitor only sees the fixed message.
            warn!(%error, "contact submission failed");
            settle_failed(&store);
            SubmitOutcome::Failed(error)
        }
    }
}

fn settle_failed(store: &FormStore) {
    store.update(|snapshot| {
        snapshot.status = SubmissionStatus::Failed {
            error_message: GENERIC_FAILURE_MESSAGE.to_string(),
        };
        true
    });
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;

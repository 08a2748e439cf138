use shared::domain::ContactFormState;

use crate::error::TransportError;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SubmissionStatus {
    #[default]
    Idle,
    Submitting,
    Succeeded,
    Failed {
        error_message: String,
    },
}

impl SubmissionStatus {
    pub fn is_submitting(&self) -> bool {
        matches!(self, SubmissionStatus::Submitting)
    }

    pub fn is_settled(&self) -> bool {
        matches!(
            self,
            SubmissionStatus::Succeeded | SubmissionStatus::Failed { .. }
        )
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            SubmissionStatus::Failed { error_message } => Some(error_message),
            _ => None,
        }
    }
}

/// Everything the presentation layer renders: the field values and where the submission stands.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormSnapshot {
    pub form: ContactFormState,
    pub status: SubmissionStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Acknowledgement {
    pub message: String,
}

#[derive(Debug)]
pub enum SubmitOutcome {
    Delivered(Acknowledgement),
    Failed(TransportError),
    /// A submission was already in flight; nothing was sent.
    AlreadyInFlight,
}

pub mod controller;
pub mod error;
pub mod store;
pub mod transport;
pub mod types;

pub use controller::SubmissionController;
pub use error::{ClientError, TransportError};
pub use store::FormStore;
pub use transport::{interpret_response, ContactTransport, HttpTransport, DEFAULT_TIMEOUT};
pub use types::{Acknowledgement, FormSnapshot, SubmissionStatus, SubmitOutcome};

/// Shown to the visitor for every failed submission, whatever the cause.
pub const GENERIC_FAILURE_MESSAGE: &str = "Failed to send message. Please try again later.";

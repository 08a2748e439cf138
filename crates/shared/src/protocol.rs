use serde::{Deserialize, Deserializer, Serialize};

use crate::{
    domain::{ContactField, ContactFormState},
    error::ApiError,
};

pub const RECEIVED_MESSAGE: &str = "Message received successfully!";
pub const FIELDS_REQUIRED_MESSAGE: &str = "All fields are required.";
pub const MALFORMED_BODY_MESSAGE: &str = "Malformed request body.";

pub fn contact_route() -> &'static str {
    "/api/contact"
}

pub fn healthz_route() -> &'static str {
    "/healthz"
}

/// Body of `POST /api/contact`. Absent and `null` fields decode as empty strings so the endpoint
/// treats them the same way as an empty value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactRequest {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub email: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub message: String,
}

impl ContactRequest {
    pub fn missing_fields(&self) -> Vec<ContactField> {
        ContactField::ALL
            .into_iter()
            .filter(|field| self.value(*field).is_empty())
            .collect()
    }

    pub fn value(&self, field: ContactField) -> &str {
        match field {
            ContactField::Name => &self.name,
            ContactField::Email => &self.email,
            ContactField::Message => &self.message,
        }
    }
}

impl From<&ContactFormState> for ContactRequest {
    fn from(form: &ContactFormState) -> Self {
        Self {
            name: form.name.clone(),
            email: form.email.clone(),
            message: form.message.clone(),
        }
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status")]
pub enum ContactResponse {
    #[serde(rename = "ok")]
    Received { success: bool, message: String },
    #[serde(rename = "error")]
    Rejected { error: String },
}

impl ContactResponse {
    pub fn received() -> Self {
        Self::Received {
            success: true,
            message: RECEIVED_MESSAGE.to_string(),
        }
    }

    pub fn rejected(error: impl Into<String>) -> Self {
        Self::Rejected {
            error: error.into(),
        }
    }

    pub fn is_received(&self) -> bool {
        matches!(self, Self::Received { success: true, .. })
    }

    /// Decodes a response body, accepting payloads with or without the `status` discriminant.
    pub fn decode(body: &[u8]) -> Result<Self, serde_json::Error> {
        let wire: WireResponse = serde_json::from_slice(body)?;
        Ok(match wire {
            WireResponse::Tagged(response) => response,
            WireResponse::Received { success: true, message } => Self::Received {
                success: true,
                message,
            },
            WireResponse::Received {
                success: false,
                message,
            } => Self::Rejected { error: message },
            WireResponse::Rejected { error } => Self::Rejected { error },
        })
    }
}

impl From<ApiError> for ContactResponse {
    fn from(value: ApiError) -> Self {
        Self::rejected(value.message)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WireResponse {
    Tagged(ContactResponse),
    Received { success: bool, message: String },
    Rejected { error: String },
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn request_treats_absent_and_null_fields_as_empty() {
        let request: ContactRequest =
            serde_json::from_value(json!({ "name": null, "message": "Hi" })).expect("decode");
        assert_eq!(request.name, "");
        assert_eq!(request.email, "");
        assert_eq!(request.message, "Hi");
        assert_eq!(
            request.missing_fields(),
            vec![ContactField::Name, ContactField::Email]
        );
    }

    #[test]
    fn missing_fields_counts_only_empty_values() {
        let request = ContactRequest::from(&ContactFormState::new("   ", "", "Hi"));
        assert_eq!(request.missing_fields(), vec![ContactField::Email]);
        assert!(ContactRequest::from(&ContactFormState::new(" ", " ", " "))
            .missing_fields()
            .is_empty());
    }

    #[test]
    fn request_rejects_non_string_fields() {
        let decoded = serde_json::from_value::<ContactRequest>(json!({
            "name": 42,
            "email": "x@example.com",
            "message": "Hi"
        }));
        assert!(decoded.is_err());
    }

    #[test]
    fn responses_carry_status_discriminant() {
        let ok = serde_json::to_value(ContactResponse::received()).expect("encode");
        assert_eq!(
            ok,
            json!({ "status": "ok", "success": true, "message": RECEIVED_MESSAGE })
        );

        let err = serde_json::to_value(ContactResponse::from(ApiError::fields_required(vec![
            ContactField::Name,
        ])))
        .expect("encode");
        assert_eq!(
            err,
            json!({ "status": "error", "error": FIELDS_REQUIRED_MESSAGE })
        );
    }

    #[test]
    fn decode_accepts_payloads_without_discriminant() {
        let legacy_ok =
            br#"{"success":true,"message":"Message received successfully!"}"#.as_slice();
        assert_eq!(
            ContactResponse::decode(legacy_ok).expect("decode"),
            ContactResponse::received()
        );

        let legacy_err = br#"{"error":"All fields are required."}"#.as_slice();
        assert_eq!(
            ContactResponse::decode(legacy_err).expect("decode"),
            ContactResponse::rejected(FIELDS_REQUIRED_MESSAGE)
        );

        let unsuccessful = br#"{"success":false,"message":"nope"}"#.as_slice();
        assert!(!ContactResponse::decode(unsuccessful)
            .expect("decode")
            .is_received());
    }

    #[test]
    fn decode_fails_on_unrelated_bodies() {
        assert!(ContactResponse::decode(b"<html>bad gateway</html>").is_err());
        assert!(ContactResponse::decode(br#"{"ok":1}"#).is_err());
    }
}

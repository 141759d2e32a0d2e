//! Purchase domain event.
//!
//! Clients send purchases as JSON objects `{"user_id": string, "amount": number}`.
//! A decoded [`Purchase`] is immutable; its timestamp is assigned by the
//! persistence layer, not carried on the event itself.

use serde::{Deserialize, Serialize, Serializer};

use crate::error::RelayError;

/// A single purchase made by a user.
///
/// Two purchases with identical fields are still distinct occurrences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Purchase {
    /// Identity of the purchasing user.
    pub user_id: String,
    /// Purchase amount.
    #[serde(serialize_with = "serialize_amount")]
    pub amount: f64,
}

impl Purchase {
    /// Creates a purchase.
    #[must_use]
    pub fn new(user_id: impl Into<String>, amount: f64) -> Self {
        Self {
            user_id: user_id.into(),
            amount,
        }
    }

    /// Decodes a purchase from a raw frame payload.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::MalformedEvent`] if the payload is not a JSON
    /// object with a string `user_id` and a numeric `amount`.
    pub fn decode(payload: &[u8]) -> Result<Self, RelayError> {
        let value: serde_json::Value = serde_json::from_slice(payload)
            .map_err(|e| RelayError::MalformedEvent(e.to_string()))?;
        // Derived struct impls also accept sequences; only objects are purchases.
        if !value.is_object() {
            return Err(RelayError::MalformedEvent(
                "purchase must be a JSON object".to_string(),
            ));
        }
        Self::deserialize(value).map_err(|e| RelayError::MalformedEvent(e.to_string()))
    }

    /// Serializes the purchase into the payload published to the event log.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Internal`] if serialization fails.
    pub fn to_json_bytes(&self) -> Result<Vec<u8>, RelayError> {
        serde_json::to_vec(self).map_err(|e| RelayError::Internal(e.to_string()))
    }
}

/// Whole amounts are written as integers so `5` stays `5` rather than `5.0`.
#[allow(clippy::trivially_copy_pass_by_ref, clippy::cast_possible_truncation)]
fn serialize_amount<S: Serializer>(amount: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    const MAX_EXACT: f64 = 9_007_199_254_740_992.0;
    if amount.fract() == 0.0 && amount.abs() <= MAX_EXACT {
        serializer.serialize_i64(*amount as i64)
    } else {
        serializer.serialize_f64(*amount)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn decodes_valid_purchase() {
        let Ok(p) = Purchase::decode(br#"{"user_id":"u1","amount":5}"#) else {
            panic!("valid purchase should decode");
        };
        assert_eq!(p, Purchase::new("u1", 5.0));
    }

    #[test]
    fn ignores_unknown_fields() {
        let decoded = Purchase::decode(br#"{"user_id":"u2","amount":1.25,"note":"x"}"#);
        let Ok(p) = decoded else {
            panic!("extra fields should be ignored");
        };
        assert!((p.amount - 1.25).abs() < f64::EPSILON);
    }

    #[test]
    fn rejects_non_json() {
        let result = Purchase::decode(b"not json");
        assert!(matches!(result, Err(RelayError::MalformedEvent(_))));
    }

    #[test]
    fn rejects_missing_fields_and_wrong_types() {
        assert!(Purchase::decode(br#"{"user_id":"u1"}"#).is_err());
        assert!(Purchase::decode(br#"{"amount":3}"#).is_err());
        assert!(Purchase::decode(br#"{"user_id":7,"amount":3}"#).is_err());
        assert!(Purchase::decode(br#"{"user_id":"u1","amount":"3"}"#).is_err());
        assert!(Purchase::decode(b"[1,2]").is_err());
    }

    #[test]
    fn rejects_array_payload() {
        let result = Purchase::decode(br#"["u1",5]"#);
        assert!(matches!(result, Err(RelayError::MalformedEvent(_))));
        assert!(Purchase::decode(br#""u1""#).is_err());
        assert!(Purchase::decode(b"null").is_err());
    }

    #[test]
    fn whole_amount_serializes_without_fraction() {
        let Ok(bytes) = Purchase::new("u1", 5.0).to_json_bytes() else {
            panic!("serialization failed");
        };
        assert_eq!(bytes, br#"{"user_id":"u1","amount":5}"#.to_vec());
    }

    #[test]
    fn fractional_amount_keeps_fraction() {
        let Ok(bytes) = Purchase::new("u1", 5.5).to_json_bytes() else {
            panic!("serialization failed");
        };
        assert_eq!(bytes, br#"{"user_id":"u1","amount":5.5}"#.to_vec());
    }
}

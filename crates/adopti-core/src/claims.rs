//! Access-token claims.
//!
//! Claims are read without verifying the signature: the backend is the
//! only party that trusts them, the client only uses them to decide what
//! to show and where to route.

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::InvalidInputError;

/// Account role carried in the `role` claim.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Role {
    /// Animal owner. Barred from the admin area.
    Proprietaire,
    Responsable,
    Promeneur,
    /// Any role this client does not know about.
    Other(String),
}

impl Role {
    pub fn as_str(&self) -> &str {
        match self {
            Role::Proprietaire => "Proprietaire",
            Role::Responsable => "Responsable",
            Role::Promeneur => "Promeneur",
            Role::Other(role) => role,
        }
    }
}

impl From<&str> for Role {
    fn from(s: &str) -> Self {
        match s {
            "Proprietaire" => Role::Proprietaire,
            "Responsable" => Role::Responsable,
            "Promeneur" => Role::Promeneur,
            other => Role::Other(other.to_string()),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Role {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Role::from(s.as_str()))
    }
}

/// Decoded access-token payload.
///
/// Known claims with an unexpected JSON type never fail the decode: a
/// non-string `role` is kept as [`Role::Other`], a fractional `exp` is
/// truncated, and anything else unusable reads as absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default, deserialize_with = "lenient_role")]
    pub role: Option<Role>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub nom: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub prenom: Option<String>,
    #[serde(default)]
    pub user_id: Option<Value>,
    /// Expiry, seconds since the Unix epoch.
    #[serde(default, deserialize_with = "lenient_seconds")]
    pub exp: Option<i64>,
    /// Every other claim, untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn lenient_role<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Role>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => None,
        Value::String(role) => Some(Role::from(role.as_str())),
        other => Some(Role::Other(other.to_string())),
    })
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        _ => None,
    })
}

fn lenient_seconds<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

impl Claims {
    /// Decode the payload segment of a compact JWT.
    ///
    /// Only the second dot-separated segment is read; the header and
    /// signature are not inspected.
    ///
    /// # Errors
    ///
    /// Fails when there is no payload segment, the payload is not
    /// base64url, or it is not a JSON object.
    pub fn decode(token: &str) -> Result<Self, InvalidInputError> {
        let Some(payload) = token.split('.').nth(1) else {
            return Err(InvalidInputError::Token {
                reason: "missing payload segment".to_string(),
            });
        };

        let bytes = URL_SAFE_NO_PAD
            .decode(payload.trim_end_matches('='))
            .map_err(|e| InvalidInputError::Token {
                reason: format!("payload is not base64url: {}", e),
            })?;

        serde_json::from_slice(&bytes).map_err(|e| InvalidInputError::Token {
            reason: format!("payload is not a JSON object: {}", e),
        })
    }

    /// Display name built from the name claims.
    pub fn display_name(&self) -> Option<String> {
        match (self.prenom.as_deref(), self.nom.as_deref()) {
            (Some(first), Some(last)) => Some(format!("{} {}", first, last).trim().to_string()),
            (Some(one), None) | (None, Some(one)) => Some(one.to_string()),
            (None, None) => None,
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::json;

    /// Build an unsigned token around a payload.
    pub(crate) fn token_with(payload: &Value) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let body = URL_SAFE_NO_PAD.encode(payload.to_string());
        format!("{}.{}.signature", header, body)
    }

    #[test]
    fn decodes_role_and_names() {
        let token = token_with(&json!({
            "token_type": "access",
            "exp": 1_700_000_000,
            "user_id": 7,
            "email": "marie@example.com",
            "nom": "Curie",
            "prenom": "Marie",
            "role": "Proprietaire"
        }));

        let claims = Claims::decode(&token).unwrap();
        assert_eq!(claims.role, Some(Role::Proprietaire));
        assert_eq!(claims.exp, Some(1_700_000_000));
        assert_eq!(claims.user_id, Some(json!(7)));
        assert_eq!(claims.display_name().as_deref(), Some("Marie Curie"));
        assert_eq!(claims.extra.get("token_type"), Some(&json!("access")));
    }

    #[test]
    fn unknown_roles_are_preserved() {
        let token = token_with(&json!({"role": "Admin"}));
        let claims = Claims::decode(&token).unwrap();
        assert_eq!(claims.role, Some(Role::Other("Admin".to_string())));
    }

    #[test]
    fn padded_payload_is_accepted() {
        let header = URL_SAFE_NO_PAD.encode(b"{}");
        let body = format!("{}==", URL_SAFE_NO_PAD.encode(br#"{"role":"x"}"#));
        let claims = Claims::decode(&format!("{}.{}.sig", header, body)).unwrap();
        assert_eq!(claims.role, Some(Role::from("x")));
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(Claims::decode("not-a-token").is_err());
        assert!(Claims::decode("a..c").is_err());
        assert!(Claims::decode("a.!!!.c").is_err());
        let not_object = format!("a.{}.c", URL_SAFE_NO_PAD.encode(b"[1,2]"));
        assert!(Claims::decode(&not_object).is_err());
    }

    #[test]
    fn payload_without_signature_is_accepted() {
        let body = URL_SAFE_NO_PAD.encode(br#"{"role":"Responsable"}"#);
        let claims = Claims::decode(&format!("header.{}", body)).unwrap();
        assert_eq!(claims.role, Some(Role::Responsable));
    }

    #[test]
    fn odd_claim_types_do_not_fail_the_decode() {
        let token = token_with(&json!({"role": 3, "exp": 1.7e9, "email": null, "nom": 12}));
        let claims = Claims::decode(&token).unwrap();
        assert_eq!(claims.role, Some(Role::Other("3".to_string())));
        assert_eq!(claims.exp, Some(1_700_000_000));
        assert_eq!(claims.email, None);
        assert_eq!(claims.nom, None);
    }
}

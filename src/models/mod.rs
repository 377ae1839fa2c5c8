//! Domain types shared across the account flows.
//!
//! The request payloads are transient: built at submit time, sent once,
//! and dropped. Only `Profile` is ever persisted, serialized alongside
//! the session token it arrived with.

use serde::{Deserialize, Serialize};

/// Login payload for the credential exchange.
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    #[serde(rename = "userEmail")]
    pub email: String,
    #[serde(rename = "userPw")]
    pub password: String,
}

/// Registration payload. Same lifecycle as `Credentials`.
#[derive(Debug, Clone, Serialize)]
pub struct RegistrationRequest {
    #[serde(rename = "userEmail")]
    pub email: String,
    #[serde(rename = "userNick")]
    pub nickname: String,
    #[serde(rename = "userPw")]
    pub password: String,
}

/// Member profile the service returns alongside a token.
///
/// Fields beyond the ones named here are kept in `extra` so the stored
/// copy round-trips whatever the service sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(rename = "memberId", default, skip_serializing_if = "Option::is_none")]
    pub member_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_round_trips_unknown_fields() {
        let json = r#"{"memberId": 42, "nickname": "routy", "grade": "gold"}"#;
        let profile: Profile = serde_json::from_str(json).expect("Failed to parse profile JSON");
        assert_eq!(profile.member_id, Some(42));
        assert_eq!(profile.nickname.as_deref(), Some("routy"));

        let back = serde_json::to_value(&profile).expect("Failed to serialize profile");
        assert_eq!(back["grade"], "gold");
    }

    #[test]
    fn test_credentials_wire_names() {
        let creds = Credentials {
            email: "a@b.c".to_string(),
            password: "password1".to_string(),
        };
        let value = serde_json::to_value(&creds).expect("Failed to serialize credentials");
        assert_eq!(value["userEmail"], "a@b.c");
        assert_eq!(value["userPw"], "password1");
    }
}

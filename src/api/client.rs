//! HTTP gateway for the Routy account endpoints.
//!
//! `AuthApi` is the only component that talks to the remote service. It
//! makes exactly one request per call - no retries; whether to resubmit
//! is the user's decision - and normalizes every response into either a
//! typed outcome or an [`AuthError`].

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{Credentials, Profile, RegistrationRequest};

use super::AuthError;

/// Service-defined success sentinel inside the response envelope.
pub const RESULT_CODE_SUCCESS: i64 = 200;

/// Login endpoint path, relative to the configured base URL.
const LOGIN_PATH: &str = "/login";

/// Signup endpoint path, relative to the configured base URL.
const SIGNUP_PATH: &str = "/signup";

/// HTTP request timeout in seconds.
/// 30s allows for slow API responses while failing fast enough for good UX.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Response envelope every account endpoint wraps its payload in.
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(rename = "resultCode")]
    result_code: i64,
    #[serde(rename = "resultMsg", default)]
    result_msg: Option<String>,
    #[serde(default)]
    data: Option<EnvelopeData>,
}

#[derive(Debug, Default, Deserialize)]
struct EnvelopeData {
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    member: Option<Profile>,
}

/// Successful credential exchange.
#[derive(Debug, Clone)]
pub struct LoginSuccess {
    pub token: String,
    pub profile: Option<Profile>,
}

/// Completed signup exchange.
///
/// A non-success `result_code` here is a service-level rejection, not a
/// transport failure - the flow decides what to do with it.
#[derive(Debug, Clone)]
pub struct SignupOutcome {
    pub result_code: i64,
    pub result_msg: Option<String>,
    pub profile: Option<Profile>,
}

impl SignupOutcome {
    /// Whether the service accepted the registration.
    pub fn is_success(&self) -> bool {
        self.result_code == RESULT_CODE_SUCCESS
    }
}

/// Seam between the account flows and the network.
#[allow(async_fn_in_trait)]
pub trait CredentialGateway {
    /// Exchange credentials for a session token.
    async fn login(&self, credentials: &Credentials) -> Result<LoginSuccess, AuthError>;

    /// Submit a registration and return the service's verdict.
    async fn sign_up(&self, request: &RegistrationRequest) -> Result<SignupOutcome, AuthError>;
}

/// Gateway implementation over the Routy REST API.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct AuthApi {
    client: Client,
    base_url: String,
}

impl AuthApi {
    /// Create a gateway against `base_url`.
    pub fn new(base_url: impl Into<String>) -> Result<Self, AuthError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    async fn post_envelope<B: Serialize>(&self, path: &str, body: &B) -> Result<Envelope, AuthError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self.client.post(&url).json(body).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::from_status(status, &body));
        }

        response
            .json::<Envelope>()
            .await
            .map_err(|e| AuthError::InvalidResponse(e.to_string()))
    }
}

impl CredentialGateway for AuthApi {
    async fn login(&self, credentials: &Credentials) -> Result<LoginSuccess, AuthError> {
        let envelope = self.post_envelope(LOGIN_PATH, credentials).await?;

        if envelope.result_code != RESULT_CODE_SUCCESS {
            return Err(AuthError::Service(envelope.result_msg.unwrap_or_else(|| {
                "Login was rejected by the service".to_string()
            })));
        }

        let data = envelope.data.unwrap_or_default();
        let token = data
            .token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AuthError::InvalidResponse("login response carried no token".to_string()))?;

        debug!("Login exchange succeeded");
        Ok(LoginSuccess {
            token,
            profile: data.member,
        })
    }

    async fn sign_up(&self, request: &RegistrationRequest) -> Result<SignupOutcome, AuthError> {
        let envelope = self.post_envelope(SIGNUP_PATH, request).await?;

        debug!(result_code = envelope.result_code, "Signup exchange completed");
        Ok(SignupOutcome {
            result_code: envelope.result_code,
            result_msg: envelope.result_msg,
            profile: envelope.data.and_then(|d| d.member),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn credentials() -> Credentials {
        Credentials {
            email: "a@b.c".to_string(),
            password: "password1".to_string(),
        }
    }

    #[tokio::test]
    async fn test_login_parses_token_and_profile() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/login"))
            .and(body_json(json!({"userEmail": "a@b.c", "userPw": "password1"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "resultCode": 200,
                "resultMsg": "ok",
                "data": {"token": "T", "member": {"memberId": 1, "nickname": "routy"}}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let api = AuthApi::new(server.uri()).expect("Failed to build gateway");
        let success = api.login(&credentials()).await.expect("Login should succeed");

        assert_eq!(success.token, "T");
        let profile = success.profile.expect("Profile should be present");
        assert_eq!(profile.member_id, Some(1));
        assert_eq!(profile.nickname.as_deref(), Some("routy"));
    }

    #[tokio::test]
    async fn test_login_without_profile_is_still_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "resultCode": 200,
                "resultMsg": "ok",
                "data": {"token": "T"}
            })))
            .mount(&server)
            .await;

        let api = AuthApi::new(server.uri()).expect("Failed to build gateway");
        let success = api.login(&credentials()).await.expect("Login should succeed");
        assert_eq!(success.token, "T");
        assert!(success.profile.is_none());
    }

    #[tokio::test]
    async fn test_login_missing_token_is_invalid_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "resultCode": 200,
                "resultMsg": "ok",
                "data": {}
            })))
            .mount(&server)
            .await;

        let api = AuthApi::new(server.uri()).expect("Failed to build gateway");
        let err = api.login(&credentials()).await.expect_err("Login should fail");
        assert!(matches!(err, AuthError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_login_service_rejection_carries_result_msg() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "resultCode": 401,
                "resultMsg": "wrong password"
            })))
            .mount(&server)
            .await;

        let api = AuthApi::new(server.uri()).expect("Failed to build gateway");
        let err = api.login(&credentials()).await.expect_err("Login should fail");
        assert_eq!(err.to_string(), "wrong password");
    }

    #[tokio::test]
    async fn test_login_http_failure_prefers_body_result_msg() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/login"))
            .respond_with(
                ResponseTemplate::new(500).set_body_json(json!({"resultMsg": "database down"})),
            )
            .mount(&server)
            .await;

        let api = AuthApi::new(server.uri()).expect("Failed to build gateway");
        let err = api.login(&credentials()).await.expect_err("Login should fail");
        assert_eq!(err.to_string(), "database down");
    }

    #[tokio::test]
    async fn test_sign_up_rejection_is_ok_outcome() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/signup"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "resultCode": 409,
                "resultMsg": "email already registered"
            })))
            .mount(&server)
            .await;

        let api = AuthApi::new(server.uri()).expect("Failed to build gateway");
        let request = RegistrationRequest {
            email: "a@b.c".to_string(),
            nickname: "routy".to_string(),
            password: "password1".to_string(),
        };
        let outcome = api.sign_up(&request).await.expect("Exchange should complete");

        assert!(!outcome.is_success());
        assert_eq!(outcome.result_code, 409);
        assert_eq!(outcome.result_msg.as_deref(), Some("email already registered"));
    }

    #[tokio::test]
    async fn test_sign_up_success_carries_profile() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/signup"))
            .and(body_json(json!({
                "userEmail": "a@b.c",
                "userNick": "routy",
                "userPw": "password1"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "resultCode": 200,
                "resultMsg": "created",
                "data": {"member": {"memberId": 7}}
            })))
            .mount(&server)
            .await;

        let api = AuthApi::new(server.uri()).expect("Failed to build gateway");
        let request = RegistrationRequest {
            email: "a@b.c".to_string(),
            nickname: "routy".to_string(),
            password: "password1".to_string(),
        };
        let outcome = api.sign_up(&request).await.expect("Exchange should complete");

        assert!(outcome.is_success());
        assert_eq!(outcome.profile.expect("Profile should be present").member_id, Some(7));
    }
}

//! Account flow state machines.
//!
//! One controller per flow: login, signup, logout. Each owns its form
//! fields, a phase, and the user-facing message, and reacts to discrete
//! events - a field edit, a submit request, the gateway outcome. The
//! controllers never route and never block; they hand a `NavIntent` back
//! to the shell and the shell carries out the move.
//!
//! Submission is split in two so nothing here suspends: `submit()` runs
//! the reentrancy guard and the ordered validation and yields the wire
//! payload, `resolve()` applies the gateway outcome. The async drivers at
//! the bottom stitch the two around the one awaited call.

use anyhow::Result;
use tracing::{error, info, warn};

use crate::api::{AuthError, CredentialGateway, LoginSuccess, SignupOutcome};
use crate::auth::validate::{
    is_valid_email, is_valid_nickname, is_valid_password, PASSWORD_MAX_LEN, PASSWORD_MIN_LEN,
};
use crate::auth::{SessionStore, StorageLifetime};
use crate::models::{Credentials, Profile, RegistrationRequest};
use crate::nav::{
    NavIntent, HOME_ROUTE, LOGIN_ROUTE, LOGOUT_REDIRECT_DELAY, SIGNUP_REDIRECT_DELAY,
};

// ============================================================================
// Shared flow machinery
// ============================================================================

/// Phase of a flow's lifecycle.
///
/// `Succeeded` and `Failed` are display states, not blocking ones: any
/// field edit returns the flow to `Idle`, and only `Submitting` refuses a
/// new submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowPhase {
    Idle,
    Validating,
    Submitting,
    Succeeded,
    Failed,
}

/// Callback the presentation may register to observe a successful flow.
///
/// Errors from the callback are captured and logged, never propagated -
/// the flow's own outcome already stands by the time it runs.
pub type SuccessCallback = Box<dyn FnMut(Option<&Profile>) -> Result<()>>;

fn run_success_callback(callback: &mut Option<SuccessCallback>, profile: Option<&Profile>) {
    if let Some(cb) = callback.as_mut() {
        if let Err(e) = cb(profile) {
            warn!(error = %e, "Success callback failed");
        }
    }
}

// ============================================================================
// Login flow
// ============================================================================

/// State machine for the credential login form.
pub struct LoginFlow {
    email: String,
    password: String,
    remember_me: bool,
    redirect_to: Option<String>,
    phase: FlowPhase,
    message: Option<String>,
    torn_down: bool,
    on_success: Option<SuccessCallback>,
}

impl LoginFlow {
    /// Fresh flow state. `redirect_to` is the externally supplied target
    /// honored over back-navigation after a successful login.
    pub fn new(redirect_to: Option<String>) -> Self {
        Self {
            email: String::new(),
            password: String::new(),
            // Staying signed in is the default, as on the web form.
            remember_me: true,
            redirect_to,
            phase: FlowPhase::Idle,
            message: None,
            torn_down: false,
            on_success: None,
        }
    }

    /// Register a callback invoked with the profile after a successful login.
    pub fn on_success(&mut self, callback: SuccessCallback) {
        self.on_success = Some(callback);
    }

    pub fn set_email(&mut self, value: &str) {
        self.email = value.to_string();
        self.touch();
    }

    pub fn set_password(&mut self, value: &str) {
        self.password = value.to_string();
        self.touch();
    }

    pub fn set_remember_me(&mut self, value: bool) {
        self.remember_me = value;
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn remember_me(&self) -> bool {
        self.remember_me
    }

    pub fn phase(&self) -> FlowPhase {
        self.phase
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn is_submitting(&self) -> bool {
        self.phase == FlowPhase::Submitting
    }

    /// Live field validity, for the presentation's per-field indicators.
    pub fn email_valid(&self) -> bool {
        is_valid_email(&self.email)
    }

    pub fn password_valid(&self) -> bool {
        is_valid_password(&self.password, PASSWORD_MIN_LEN, None)
    }

    /// Whether the submit control should be enabled.
    pub fn can_submit(&self) -> bool {
        !self.is_submitting() && self.email_valid() && self.password_valid()
    }

    /// Start a submission. Returns the outbound credentials when the form
    /// passes validation. A submission already in flight swallows the
    /// request; a failed check leaves the flow interactive with the first
    /// failing check's message.
    pub fn submit(&mut self) -> Option<Credentials> {
        if self.phase == FlowPhase::Submitting {
            return None;
        }
        self.phase = FlowPhase::Validating;

        // Check order is a UX contract: required fields first, then format.
        if self.email.trim().is_empty() {
            return self.reject("Please enter your email.");
        }
        if self.password.is_empty() {
            return self.reject("Please enter your password.");
        }
        if !self.email_valid() {
            return self.reject("Please enter a valid email address.");
        }
        if !self.password_valid() {
            return self.reject("Password must be at least 8 characters.");
        }

        self.phase = FlowPhase::Submitting;
        self.message = None;
        Some(Credentials {
            email: self.email.trim().to_string(),
            password: self.password.clone(),
        })
    }

    /// Apply the gateway outcome. A flow torn down while the exchange was
    /// in flight ignores the outcome entirely - no writes, no message, no
    /// navigation.
    pub fn resolve(
        &mut self,
        outcome: Result<LoginSuccess, AuthError>,
        store: &mut SessionStore,
    ) -> Option<NavIntent> {
        if self.torn_down {
            return None;
        }

        match outcome {
            Ok(success) => {
                let lifetime = if self.remember_me {
                    StorageLifetime::Durable
                } else {
                    StorageLifetime::Ephemeral
                };
                store.save(lifetime, &success.token, success.profile.as_ref());

                self.phase = FlowPhase::Succeeded;
                self.message = Some("Signed in successfully.".to_string());
                run_success_callback(&mut self.on_success, success.profile.as_ref());
                info!("Login successful");

                Some(match self.redirect_to.clone() {
                    Some(target) => NavIntent::Replace(target),
                    None => NavIntent::Back {
                        fallback: HOME_ROUTE.to_string(),
                    },
                })
            }
            Err(e) => {
                error!(error = %e, "Login failed");
                self.phase = FlowPhase::Failed;
                self.message = Some(e.to_string());
                None
            }
        }
    }

    /// Drop the flow: any outcome that arrives later must be ignored.
    pub fn teardown(&mut self) {
        self.torn_down = true;
    }

    fn touch(&mut self) {
        if self.phase != FlowPhase::Submitting {
            self.phase = FlowPhase::Idle;
        }
    }

    fn reject(&mut self, message: &str) -> Option<Credentials> {
        self.phase = FlowPhase::Idle;
        self.message = Some(message.to_string());
        None
    }
}

// ============================================================================
// Signup flow
// ============================================================================

/// State machine for the registration form.
pub struct SignupFlow {
    email: String,
    nickname: String,
    password: String,
    phase: FlowPhase,
    message: Option<String>,
    torn_down: bool,
    on_success: Option<SuccessCallback>,
}

impl SignupFlow {
    pub fn new() -> Self {
        Self {
            email: String::new(),
            nickname: String::new(),
            password: String::new(),
            phase: FlowPhase::Idle,
            message: None,
            torn_down: false,
            on_success: None,
        }
    }

    /// Register a callback invoked with the profile after a successful signup.
    pub fn on_success(&mut self, callback: SuccessCallback) {
        self.on_success = Some(callback);
    }

    pub fn set_email(&mut self, value: &str) {
        self.email = value.to_string();
        self.touch();
    }

    pub fn set_nickname(&mut self, value: &str) {
        self.nickname = value.to_string();
        self.touch();
    }

    pub fn set_password(&mut self, value: &str) {
        self.password = value.to_string();
        self.touch();
    }

    pub fn phase(&self) -> FlowPhase {
        self.phase
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn is_submitting(&self) -> bool {
        self.phase == FlowPhase::Submitting
    }

    pub fn email_valid(&self) -> bool {
        is_valid_email(&self.email)
    }

    pub fn nickname_valid(&self) -> bool {
        is_valid_nickname(&self.nickname)
    }

    pub fn password_valid(&self) -> bool {
        is_valid_password(&self.password, PASSWORD_MIN_LEN, Some(PASSWORD_MAX_LEN))
    }

    /// Whether the submit control should be enabled.
    pub fn can_submit(&self) -> bool {
        !self.is_submitting() && self.email_valid() && self.nickname_valid() && self.password_valid()
    }

    /// Start a submission. The payload is sent as entered; the validators
    /// trim for checking only.
    pub fn submit(&mut self) -> Option<RegistrationRequest> {
        if self.phase == FlowPhase::Submitting {
            return None;
        }
        self.phase = FlowPhase::Validating;

        // Check order is a UX contract: required field first, then formats.
        if self.email.trim().is_empty() {
            return self.reject("Please enter your email.");
        }
        if !self.email_valid() {
            return self.reject("Please enter a valid email address.");
        }
        if !self.nickname_valid() {
            return self.reject("Nickname must be 2-12 letters or digits.");
        }
        if !self.password_valid() {
            return self.reject("Password must be 8-16 characters.");
        }

        self.phase = FlowPhase::Submitting;
        self.message = None;
        Some(RegistrationRequest {
            email: self.email.clone(),
            nickname: self.nickname.clone(),
            password: self.password.clone(),
        })
    }

    /// Apply the gateway outcome. Only the service's success sentinel
    /// counts as success; any other result code is a rejection surfaced
    /// through the message, with no navigation.
    pub fn resolve(&mut self, outcome: Result<SignupOutcome, AuthError>) -> Option<NavIntent> {
        if self.torn_down {
            return None;
        }

        match outcome {
            Ok(outcome) if outcome.is_success() => {
                self.phase = FlowPhase::Succeeded;
                self.message = Some("Your account has been created.".to_string());
                run_success_callback(&mut self.on_success, outcome.profile.as_ref());
                info!("Signup successful");

                Some(NavIntent::Delayed {
                    path: LOGIN_ROUTE.to_string(),
                    delay: SIGNUP_REDIRECT_DELAY,
                    replace: false,
                })
            }
            Ok(outcome) => {
                warn!(result_code = outcome.result_code, "Signup rejected by service");
                self.phase = FlowPhase::Failed;
                self.message = Some(
                    outcome
                        .result_msg
                        .filter(|m| !m.is_empty())
                        .unwrap_or_else(|| {
                            "An error occurred while processing your registration.".to_string()
                        }),
                );
                None
            }
            Err(e) => {
                error!(error = %e, "Signup failed");
                self.phase = FlowPhase::Failed;
                self.message = Some(e.to_string());
                None
            }
        }
    }

    /// Drop the flow: any outcome that arrives later must be ignored.
    pub fn teardown(&mut self) {
        self.torn_down = true;
    }

    fn touch(&mut self) {
        if self.phase != FlowPhase::Submitting {
            self.phase = FlowPhase::Idle;
        }
    }

    fn reject(&mut self, message: &str) -> Option<RegistrationRequest> {
        self.phase = FlowPhase::Idle;
        self.message = Some(message.to_string());
        None
    }
}

impl Default for SignupFlow {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Logout flow
// ============================================================================

/// Logout has no form and no validation: entering the flow clears the
/// session and schedules the move home.
pub struct LogoutFlow {
    message: Option<String>,
    torn_down: bool,
}

impl LogoutFlow {
    pub fn new() -> Self {
        Self {
            message: None,
            torn_down: false,
        }
    }

    /// Clear both buckets and yield the delayed move home. The intent is
    /// produced whether or not clearing succeeded - a degraded local
    /// cleanup must not trap the user on the logout screen.
    pub fn enter(&mut self, store: &mut SessionStore) -> NavIntent {
        store.clear();
        self.message = Some("Signing out. Taking you home shortly.".to_string());
        info!("Session cleared");

        NavIntent::Delayed {
            path: HOME_ROUTE.to_string(),
            delay: LOGOUT_REDIRECT_DELAY,
            replace: true,
        }
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Drop the flow: the pending delayed navigation must not fire.
    pub fn teardown(&mut self) {
        self.torn_down = true;
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }
}

impl Default for LogoutFlow {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Async drivers
// ============================================================================

/// Drive a login submission end to end: validate, exchange, persist.
pub async fn run_login<G: CredentialGateway>(
    flow: &mut LoginFlow,
    gateway: &G,
    store: &mut SessionStore,
) -> Option<NavIntent> {
    let credentials = flow.submit()?;
    let outcome = gateway.login(&credentials).await;
    flow.resolve(outcome, store)
}

/// Drive a signup submission end to end.
pub async fn run_signup<G: CredentialGateway>(
    flow: &mut SignupFlow,
    gateway: &G,
) -> Option<NavIntent> {
    let request = flow.submit()?;
    let outcome = gateway.sign_up(&request).await;
    flow.resolve(outcome)
}

// ============================================================================
// Tests
// ============================================================================

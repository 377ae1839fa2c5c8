//! Navigation intents emitted by the account flows.
//!
//! The flows never route. They describe where the user should go next and
//! the shell carries out the move, which keeps every flow testable without
//! a router in sight.

use std::time::Duration;

/// Route the user lands on after logout, and the back-navigation fallback.
pub const HOME_ROUTE: &str = "/";
/// Route of the login form.
pub const LOGIN_ROUTE: &str = "/login";
/// Route of the signup form.
pub const SIGNUP_ROUTE: &str = "/signup";
/// Route of the password reset form.
pub const PASSWORD_RESET_ROUTE: &str = "/password/reset";

/// Delay before the post-signup move to the login form.
pub const SIGNUP_REDIRECT_DELAY: Duration = Duration::from_millis(600);
/// Delay before the post-logout move home.
pub const LOGOUT_REDIRECT_DELAY: Duration = Duration::from_millis(400);

/// A declarative routing instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavIntent {
    /// Go to `path`, pushing a new history entry.
    Push(String),
    /// Go to `path`, replacing the current history entry.
    Replace(String),
    /// Go back one history entry, falling back to `fallback` when there
    /// is no history to return to.
    Back { fallback: String },
    /// Go to `path` after `delay`. The executor must drop the pending
    /// move if the originating flow is torn down before the delay elapses.
    Delayed {
        path: String,
        delay: Duration,
        replace: bool,
    },
}

/// OAuth providers the login screen links out to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OAuthProvider {
    Kakao,
    Google,
    Naver,
}

impl OAuthProvider {
    pub fn slug(self) -> &'static str {
        match self {
            OAuthProvider::Kakao => "kakao",
            OAuthProvider::Google => "google",
            OAuthProvider::Naver => "naver",
        }
    }

    pub fn from_slug(s: &str) -> Option<Self> {
        match s {
            "kakao" => Some(OAuthProvider::Kakao),
            "google" => Some(OAuthProvider::Google),
            "naver" => Some(OAuthProvider::Naver),
            _ => None,
        }
    }
}

/// Build the hand-off intent for an OAuth provider button.
///
/// Only the redirect is produced here; the provider handshake itself
/// happens on the other side of that route.
pub fn oauth_redirect(provider: OAuthProvider, redirect_to: Option<&str>) -> NavIntent {
    let target = redirect_to.unwrap_or(HOME_ROUTE);
    NavIntent::Push(format!("/oauth/{}?redirect={}", provider.slug(), target))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_oauth_redirect_with_target() {
        let intent = oauth_redirect(OAuthProvider::Kakao, Some("/cart"));
        assert_eq!(intent, NavIntent::Push("/oauth/kakao?redirect=/cart".to_string()));
    }

    #[test]
    fn test_oauth_redirect_defaults_home() {
        let intent = oauth_redirect(OAuthProvider::Naver, None);
        assert_eq!(intent, NavIntent::Push("/oauth/naver?redirect=/".to_string()));
    }

    #[test]
    fn test_provider_slug_round_trip() {
        for provider in [OAuthProvider::Kakao, OAuthProvider::Google, OAuthProvider::Naver] {
            assert_eq!(OAuthProvider::from_slug(provider.slug()), Some(provider));
        }
        assert_eq!(OAuthProvider::from_slug("github"), None);
    }
}

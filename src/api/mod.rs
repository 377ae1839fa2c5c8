//! Remote service gateway for the Routy account endpoints.
//!
//! This module provides the `CredentialGateway` seam the flows call
//! through, its `AuthApi` HTTP implementation, and the `AuthError`
//! taxonomy both sides speak.

pub mod client;
pub mod error;

pub use client::{AuthApi, CredentialGateway, LoginSuccess, SignupOutcome, RESULT_CODE_SUCCESS};
pub use error::AuthError;

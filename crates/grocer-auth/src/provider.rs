//! The identity-provider seam and its HTTP implementation.

use crate::session::{AuthSession, TokenResponse};
use crate::token::OtpType;
use crate::user::AuthUser;
use crate::AuthError;
use async_trait::async_trait;
use chrono::Utc;
use grocer_data::{ClientRequestBuilder, FetchClient, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

/// Result of a sign-up call.
#[derive(Debug, Clone, PartialEq)]
pub enum SignUpOutcome {
    /// The account is usable right away.
    SignedIn(AuthSession),
    /// A confirmation email was sent; no session until it is followed.
    ConfirmationRequired(AuthUser),
}

/// Fields changed by `update_user`.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// Operations of a hosted identity provider.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<AuthSession, AuthError>;

    async fn sign_up(&self, email: &str, password: &str, metadata: Value) -> Result<SignUpOutcome, AuthError>;

    /// Revoke the session behind `access_token`.
    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError>;

    /// Send a recovery email whose link points at `redirect_to`.
    async fn reset_password_for_email(&self, email: &str, redirect_to: Option<&str>) -> Result<(), AuthError>;

    /// Exchange an emailed token for a session.
    async fn verify_otp(&self, token_hash: &str, otp_type: OtpType) -> Result<AuthSession, AuthError>;

    async fn update_user(&self, access_token: &str, update: &UserUpdate) -> Result<AuthUser, AuthError>;

    /// Send the email for `otp_type` again.
    async fn resend(&self, email: &str, otp_type: OtpType) -> Result<(), AuthError>;

    async fn refresh_session(&self, refresh_token: &str) -> Result<AuthSession, AuthError>;
}

/// A sign-up answer: either a full token response or just the new user.
#[derive(Deserialize)]
#[serde(untagged)]
enum SignUpResponse {
    Session(TokenResponse),
    User(AuthUser),
}

/// [`IdentityProvider`] speaking the GoTrue REST dialect under `/auth/v1`.
#[derive(Debug, Clone)]
pub struct HttpIdentityProvider {
    client: FetchClient,
}

impl HttpIdentityProvider {
    /// Wrap a client whose base URL is the provider root. `anon_key` is sent
    /// as the `apikey` header.
    pub fn new(client: FetchClient, anon_key: &str) -> Self {
        Self {
            client: client.with_default_header("apikey", anon_key),
        }
    }

    /// Provider over `reqwest`.
    pub fn http(base_url: &str, anon_key: &str, timeout: Duration) -> Result<Self, AuthError> {
        Ok(Self::new(FetchClient::http(base_url, timeout)?, anon_key))
    }

    async fn call(&self, request: ClientRequestBuilder) -> Result<Response, AuthError> {
        let response = request.send().await?;
        if response.is_success() {
            Ok(response)
        } else {
            Err(AuthError::from_provider(response.status, &response.body))
        }
    }

    async fn call_json<T: DeserializeOwned>(&self, request: ClientRequestBuilder) -> Result<T, AuthError> {
        self.call(request)
            .await?
            .json()
            .map_err(|e| AuthError::Serialization(e.to_string()))
    }

    async fn session(&self, request: ClientRequestBuilder) -> Result<AuthSession, AuthError> {
        let token: TokenResponse = self.call_json(request).await?;
        Ok(AuthSession::from_token_response(token, Utc::now()))
    }
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        debug!(email, "password sign-in");
        self.session(
            self.client
                .post("auth/v1/token")
                .query("grant_type", "password")
                .json(&json!({"email": email, "password": password})),
        )
        .await
    }

    async fn sign_up(&self, email: &str, password: &str, metadata: Value) -> Result<SignUpOutcome, AuthError> {
        let request = self
            .client
            .post("auth/v1/signup")
            .json(&json!({"email": email, "password": password, "data": metadata}));
        match self.call_json::<SignUpResponse>(request).await? {
            SignUpResponse::Session(token) => Ok(SignUpOutcome::SignedIn(
                AuthSession::from_token_response(token, Utc::now()),
            )),
            SignUpResponse::User(user) => Ok(SignUpOutcome::ConfirmationRequired(user)),
        }
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError> {
        self.call(
            self.client
                .post("auth/v1/logout")
                .header("Authorization", format!("Bearer {}", access_token)),
        )
        .await
        .map(|_| ())
    }

    async fn reset_password_for_email(&self, email: &str, redirect_to: Option<&str>) -> Result<(), AuthError> {
        let mut request = self.client.post("auth/v1/recover").json(&json!({"email": email}));
        if let Some(redirect) = redirect_to {
            request = request.query("redirect_to", redirect);
        }
        self.call(request).await.map(|_| ())
    }

    async fn verify_otp(&self, token_hash: &str, otp_type: OtpType) -> Result<AuthSession, AuthError> {
        self.session(
            self.client
                .post("auth/v1/verify")
                .json(&json!({"token_hash": token_hash, "type": otp_type.as_str()})),
        )
        .await
    }

    async fn update_user(&self, access_token: &str, update: &UserUpdate) -> Result<AuthUser, AuthError> {
        self.call_json(
            self.client
                .put("auth/v1/user")
                .header("Authorization", format!("Bearer {}", access_token))
                .json(update),
        )
        .await
    }

    async fn resend(&self, email: &str, otp_type: OtpType) -> Result<(), AuthError> {
        self.call(
            self.client
                .post("auth/v1/resend")
                .json(&json!({"email": email, "type": otp_type.as_str()})),
        )
        .await
        .map(|_| ())
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<AuthSession, AuthError> {
        self.session(
            self.client
                .post("auth/v1/token")
                .query("grant_type", "refresh_token")
                .json(&json!({"refresh_token": refresh_token})),
        )
        .await
    }
}

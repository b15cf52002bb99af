//! Session state shared by the storefront.
//!
//! [`AuthContext`] owns the current session, persists it, and broadcasts
//! every change. The user-facing operations report failure through the
//! [`Notifier`] and resolve to a plain `bool`.

use crate::password::{normalize_email, PasswordPolicy};
use crate::provider::{IdentityProvider, SignUpOutcome, UserUpdate};
use crate::session::AuthSession;
use crate::token::{EmailLink, OtpType};
use crate::user::AuthUser;
use crate::AuthError;
use chrono::Utc;
use grocer_cache::{Cache, Slot};
use grocer_observability::Notifier;
use parking_lot::{Mutex, RwLock};
use serde_json::json;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{info, warn};

/// Cache key of the persisted session.
pub const SESSION_KEY: &str = "auth:session";

const EVENT_CAPACITY: usize = 32;

/// A change of authentication state.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthEvent {
    /// Emitted once by [`AuthContext::restore`].
    InitialSession(Option<AuthUser>),
    SignedIn(AuthUser),
    SignedOut,
    /// A recovery link was verified; the user may now set a new password.
    PasswordRecovery(AuthUser),
    TokenRefreshed,
    UserUpdated(AuthUser),
}

impl AuthEvent {
    /// Whether the access token may have changed.
    pub fn is_session_change(&self) -> bool {
        !matches!(self, AuthEvent::UserUpdated(_))
    }
}

pub struct AuthContext {
    provider: Arc<dyn IdentityProvider>,
    notifier: Arc<dyn Notifier>,
    session: RwLock<Option<AuthSession>>,
    store: Option<Slot<AuthSession>>,
    events: Mutex<Option<broadcast::Sender<AuthEvent>>>,
    policy: PasswordPolicy,
    redirect_url: Option<String>,
}

impl std::fmt::Debug for AuthContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthContext")
            .field("signed_in", &self.is_authenticated())
            .field("redirect_url", &self.redirect_url)
            .finish_non_exhaustive()
    }
}

impl AuthContext {
    pub fn new(provider: Arc<dyn IdentityProvider>, notifier: Arc<dyn Notifier>) -> Self {
        let (sender, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            provider,
            notifier,
            session: RwLock::new(None),
            store: None,
            events: Mutex::new(Some(sender)),
            policy: PasswordPolicy::default(),
            redirect_url: None,
        }
    }

    /// Persist the session under [`SESSION_KEY`] in `cache`.
    pub fn with_store(mut self, cache: Cache) -> Self {
        self.store = Some(Slot::new(cache, SESSION_KEY));
        self
    }

    /// Page the password-recovery email links to.
    pub fn with_redirect_url(mut self, url: impl Into<String>) -> Self {
        self.redirect_url = Some(url.into());
        self
    }

    pub fn with_password_policy(mut self, policy: PasswordPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Listen for state changes. Receivers see events sent after this call.
    ///
    /// The channel closes on [`shutdown`](Self::shutdown).
    pub fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        match self.events.lock().as_ref() {
            Some(sender) => sender.subscribe(),
            None => {
                let (sender, receiver) = broadcast::channel(1);
                drop(sender);
                receiver
            }
        }
    }

    /// Close the event channel.
    pub fn shutdown(&self) {
        self.events.lock().take();
    }

    pub fn session(&self) -> Option<AuthSession> {
        self.session.read().clone()
    }

    pub fn user(&self) -> Option<AuthUser> {
        self.session.read().as_ref().map(|s| s.user.clone())
    }

    pub fn access_token(&self) -> Option<String> {
        self.session.read().as_ref().map(|s| s.access_token.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.read().is_some()
    }

    /// Load the persisted session, refreshing it when close to expiry.
    ///
    /// A session that cannot be refreshed is dropped.
    pub async fn restore(&self) -> Option<AuthUser> {
        let stored = self.store.as_ref().and_then(|slot| match slot.load() {
            Ok(session) => session,
            Err(e) => {
                warn!(error = %e, "discarding unreadable stored session");
                None
            }
        });

        let session = match stored {
            Some(session) if session.needs_refresh(Utc::now()) => {
                match self.provider.refresh_session(&session.refresh_token).await {
                    Ok(fresh) => Some(fresh),
                    Err(e) => {
                        warn!(error = %e, "stored session could not be refreshed");
                        None
                    }
                }
            }
            other => other,
        };

        let user = session.as_ref().map(|s| s.user.clone());
        self.replace_session(session);
        self.emit(AuthEvent::InitialSession(user.clone()));
        user
    }

    /// Refresh the access token now.
    pub async fn refresh(&self) -> Result<(), AuthError> {
        let refresh_token = self
            .session
            .read()
            .as_ref()
            .map(|s| s.refresh_token.clone())
            .ok_or(AuthError::NotSignedIn)?;
        let fresh = self.provider.refresh_session(&refresh_token).await?;
        self.replace_session(Some(fresh));
        self.emit(AuthEvent::TokenRefreshed);
        Ok(())
    }

    pub async fn login(&self, email: &str, password: &str) -> bool {
        let result = async {
            let email = normalize_email(email)?;
            self.provider.sign_in_with_password(&email, password).await
        }
        .await;

        match result {
            Ok(session) => {
                let user = session.user.clone();
                self.replace_session(Some(session));
                info!(user_id = %user.id, "signed in");
                self.notifier.success(&format!("Welcome back, {}", user.display_name()));
                self.emit(AuthEvent::SignedIn(user));
                true
            }
            Err(e) => self.report("sign-in", e),
        }
    }

    /// Create an account. `full_name` goes into the user metadata.
    pub async fn register(&self, email: &str, password: &str, full_name: Option<&str>) -> bool {
        let result = async {
            let email = normalize_email(email)?;
            self.policy.validate(password)?;
            let metadata = match full_name.map(str::trim).filter(|n| !n.is_empty()) {
                Some(name) => json!({ "full_name": name }),
                None => json!({}),
            };
            self.provider.sign_up(&email, password, metadata).await
        }
        .await;

        match result {
            Ok(SignUpOutcome::SignedIn(session)) => {
                let user = session.user.clone();
                self.replace_session(Some(session));
                info!(user_id = %user.id, "account created");
                self.notifier.success("Account created");
                self.emit(AuthEvent::SignedIn(user));
                true
            }
            Ok(SignUpOutcome::ConfirmationRequired(user)) => {
                info!(user_id = %user.id, "account created, awaiting confirmation");
                self.notifier
                    .info("Account created. Check your email to confirm your address");
                true
            }
            Err(e) => self.report("sign-up", e),
        }
    }

    /// Sign out. The local session is dropped even when the provider call
    /// fails.
    pub async fn logout(&self) -> bool {
        let token = self.access_token();
        self.replace_session(None);
        self.emit(AuthEvent::SignedOut);

        let Some(token) = token else {
            return true;
        };
        match self.provider.sign_out(&token).await {
            Ok(()) => {
                self.notifier.success("Signed out");
                true
            }
            Err(e) => self.report("sign-out", e),
        }
    }

    /// Email a password-recovery link.
    pub async fn reset_password(&self, email: &str) -> bool {
        let result = async {
            let email = normalize_email(email)?;
            self.provider
                .reset_password_for_email(&email, self.redirect_url.as_deref())
                .await
        }
        .await;

        match result {
            Ok(()) => {
                self.notifier
                    .success("If an account exists for this email, a reset link is on its way");
                true
            }
            Err(e) => self.report("password reset", e),
        }
    }

    /// Follow a recovery link, opening a session in which the password can be
    /// changed.
    pub async fn recover(&self, link: &EmailLink) -> bool {
        if link.otp_type != OtpType::Recovery {
            return self.report("recovery", AuthError::InvalidToken);
        }
        match self.provider.verify_otp(&link.token_hash, OtpType::Recovery).await {
            Ok(session) => {
                let user = session.user.clone();
                self.replace_session(Some(session));
                self.emit(AuthEvent::PasswordRecovery(user));
                self.notifier.info("Choose a new password");
                true
            }
            Err(e) => self.report("recovery", e),
        }
    }

    /// Set a new password for the signed-in user.
    pub async fn change_password(&self, password: &str, confirmation: &str) -> bool {
        let result = async {
            self.policy.validate_new(password, confirmation)?;
            let token = self.access_token().ok_or(AuthError::NotSignedIn)?;
            let update = UserUpdate {
                password: Some(password.to_string()),
                ..Default::default()
            };
            self.provider.update_user(&token, &update).await
        }
        .await;

        match result {
            Ok(user) => {
                if let Some(session) = self.session.write().as_mut() {
                    session.user = user.clone();
                }
                self.persist();
                self.notifier.success("Password updated");
                self.emit(AuthEvent::UserUpdated(user));
                true
            }
            Err(e) => self.report("password change", e),
        }
    }

    /// Send the sign-up confirmation email again.
    pub async fn resend_confirmation(&self, email: &str) -> bool {
        let result = async {
            let email = normalize_email(email)?;
            self.provider.resend(&email, OtpType::Signup).await
        }
        .await;

        match result {
            Ok(()) => {
                self.notifier.success("Confirmation email sent");
                true
            }
            Err(e) => self.report("resend confirmation", e),
        }
    }

    fn report(&self, action: &str, error: AuthError) -> bool {
        warn!(action, error = %error, "auth operation failed");
        self.notifier.error(&error.user_message());
        false
    }

    fn replace_session(&self, session: Option<AuthSession>) {
        *self.session.write() = session;
        self.persist();
    }

    fn persist(&self) {
        let Some(slot) = &self.store else {
            return;
        };
        let result = match self.session.read().as_ref() {
            Some(session) => slot.store(session).map(|_| ()),
            None => slot.clear(),
        };
        if let Err(e) = result {
            warn!(error = %e, "failed to persist session");
        }
    }

    fn emit(&self, event: AuthEvent) {
        if let Some(sender) = self.events.lock().as_ref() {
            // No receivers is fine.
            let _ = sender.send(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::HttpIdentityProvider;
    use grocer_data::mock::MockTransport;
    use grocer_data::{FetchClient, Method};
    use grocer_observability::{MemoryNotifier, NoticeLevel};
    use serde_json::Value;

    fn token_json(expires_in: i64) -> Value {
        json!({
            "access_token": "at-1",
            "expires_in": expires_in,
            "refresh_token": "rt-1",
            "user": {"id": "u1", "email": "awa@example.com", "user_metadata": {"full_name": "Awa"}}
        })
    }

    fn context(mock: &MockTransport, notifier: &MemoryNotifier) -> AuthContext {
        let provider = HttpIdentityProvider::new(
            FetchClient::new(Arc::new(mock.clone()), "https://id.test"),
            "anon",
        );
        AuthContext::new(Arc::new(provider), Arc::new(notifier.clone()))
    }

    #[tokio::test]
    async fn test_login_sets_session_and_broadcasts() {
        let mock = MockTransport::new();
        mock.respond(Method::Post, "/auth/v1/token", 200, token_json(3600));
        let notifier = MemoryNotifier::new();
        let auth = context(&mock, &notifier);
        let mut events = auth.subscribe();

        assert!(auth.login(" Awa@Example.com ", "Secret123").await);
        assert_eq!(auth.access_token().as_deref(), Some("at-1"));
        assert!(matches!(events.recv().await.unwrap(), AuthEvent::SignedIn(u) if u.id.as_str() == "u1"));
        assert_eq!(notifier.last().unwrap().level, NoticeLevel::Success);
        assert_eq!(
            mock.requests()[0].json_body().unwrap()["email"],
            "awa@example.com"
        );
    }

    #[tokio::test]
    async fn test_failed_login_notifies_and_returns_false() {
        let mock = MockTransport::new();
        mock.respond(
            Method::Post,
            "/auth/v1/token",
            400,
            json!({"error_code": "invalid_credentials", "msg": "Invalid login credentials"}),
        );
        let notifier = MemoryNotifier::new();
        let auth = context(&mock, &notifier);

        assert!(!auth.login("awa@example.com", "nope").await);
        assert!(!auth.is_authenticated());
        assert_eq!(notifier.errors(), vec!["Incorrect email or password".to_string()]);
    }

    #[tokio::test]
    async fn test_register_rejects_weak_password_locally() {
        let mock = MockTransport::new();
        let notifier = MemoryNotifier::new();
        let auth = context(&mock, &notifier);

        assert!(!auth.register("awa@example.com", "short", None).await);
        assert_eq!(mock.request_count(), 0);
        assert_eq!(notifier.errors().len(), 1);
    }

    #[tokio::test]
    async fn test_register_awaiting_confirmation_stays_signed_out() {
        let mock = MockTransport::new();
        mock.respond(Method::Post, "/auth/v1/signup", 200, json!({"id": "u9", "email": "n@example.com"}));
        let notifier = MemoryNotifier::new();
        let auth = context(&mock, &notifier);

        assert!(auth.register("n@example.com", "Secret123", Some("Ndeye")).await);
        assert!(!auth.is_authenticated());
        assert_eq!(notifier.last().unwrap().level, NoticeLevel::Info);
    }

    #[tokio::test]
    async fn test_logout_clears_session_even_when_provider_fails() {
        let mock = MockTransport::new();
        mock.respond(Method::Post, "/auth/v1/token", 200, token_json(3600))
            .respond(Method::Post, "/auth/v1/logout", 500, json!({"msg": "boom"}));
        let notifier = MemoryNotifier::new();
        let auth = context(&mock, &notifier);
        auth.login("awa@example.com", "Secret123").await;
        let mut events = auth.subscribe();

        assert!(!auth.logout().await);
        assert!(!auth.is_authenticated());
        assert_eq!(events.recv().await.unwrap(), AuthEvent::SignedOut);
    }

    #[tokio::test]
    async fn test_recovery_then_change_password() {
        let mock = MockTransport::new();
        mock.respond(Method::Post, "/auth/v1/verify", 200, token_json(3600))
            .respond(Method::Put, "/auth/v1/user", 200, json!({"id": "u1", "email": "awa@example.com"}));
        let notifier = MemoryNotifier::new();
        let auth = context(&mock, &notifier);
        let mut events = auth.subscribe();

        let link = EmailLink::parse("https://shop.test/reset-password?token_hash=h1&type=recovery").unwrap();
        assert!(auth.recover(&link).await);
        assert!(matches!(events.recv().await.unwrap(), AuthEvent::PasswordRecovery(_)));

        assert!(!auth.change_password("NewSecret1", "NewSecret2").await);
        assert!(auth.change_password("NewSecret1", "NewSecret1").await);
        assert!(matches!(events.recv().await.unwrap(), AuthEvent::UserUpdated(_)));
    }

    #[tokio::test]
    async fn test_change_password_requires_session() {
        let mock = MockTransport::new();
        let notifier = MemoryNotifier::new();
        let auth = context(&mock, &notifier);
        assert!(!auth.change_password("NewSecret1", "NewSecret1").await);
        assert_eq!(notifier.errors(), vec!["Please sign in first".to_string()]);
    }

    #[tokio::test]
    async fn test_session_persists_and_restores() {
        let cache = Cache::in_memory();
        let mock = MockTransport::new();
        mock.respond(Method::Post, "/auth/v1/token", 200, token_json(3600));
        let notifier = MemoryNotifier::new();
        let first = context(&mock, &notifier).with_store(cache.clone());
        first.login("awa@example.com", "Secret123").await;

        let second = context(&mock, &notifier).with_store(cache.clone());
        let mut events = second.subscribe();
        let user = second.restore().await;

        assert_eq!(user.map(|u| u.id.into_inner()), Some("u1".to_string()));
        assert!(matches!(events.recv().await.unwrap(), AuthEvent::InitialSession(Some(_))));
        assert_eq!(mock.request_count(), 1);
    }

    #[tokio::test]
    async fn test_restore_refreshes_expiring_session() {
        let cache = Cache::in_memory();
        let mock = MockTransport::new();
        mock.respond(Method::Post, "/auth/v1/token", 200, token_json(10))
            .respond(Method::Post, "/auth/v1/token", 200, token_json(3600));
        let notifier = MemoryNotifier::new();
        context(&mock, &notifier)
            .with_store(cache.clone())
            .login("awa@example.com", "Secret123")
            .await;

        let restored = context(&mock, &notifier).with_store(cache);
        assert!(restored.restore().await.is_some());
        let refresh = &mock.requests()[1];
        assert_eq!(refresh.query_param("grant_type").as_deref(), Some("refresh_token"));
        assert!(restored.session().unwrap().time_to_expiry(Utc::now()) > 60);
    }

    #[tokio::test]
    async fn test_shutdown_closes_channel() {
        let mock = MockTransport::new();
        let notifier = MemoryNotifier::new();
        let auth = context(&mock, &notifier);
        let mut events = auth.subscribe();
        auth.shutdown();
        assert!(matches!(
            events.recv().await,
            Err(broadcast::error::RecvError::Closed)
        ));
    }
}

//! Authentication for the grocer storefront.
//!
//! Accounts live with a hosted identity provider; this crate signs users in
//! and out through it, keeps the resulting session, and announces changes.

mod context;
mod error;
mod password;
mod provider;
mod session;
mod token;
mod user;

pub use context::{AuthContext, AuthEvent, SESSION_KEY};
pub use error::AuthError;
pub use password::{normalize_email, PasswordPolicy};
pub use provider::{HttpIdentityProvider, IdentityProvider, SignUpOutcome, UserUpdate};
pub use session::AuthSession;
pub use token::{EmailLink, OtpType};
pub use user::{AuthUser, Role};

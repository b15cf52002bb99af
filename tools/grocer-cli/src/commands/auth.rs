//! Account commands.

use anyhow::{bail, Result};
use chrono::Utc;
use dialoguer::Password;
use grocer_auth::EmailLink;
use grocer_sdk::Storefront;
use serde_json::json;

use super::{AuthArgs, AuthCommand};
use crate::context::Context;

/// Run the auth command.
///
/// Success and failure notices are printed by the auth context through the
/// terminal notifier; a failed action only adds the exit status here.
pub async fn run(args: AuthArgs, ctx: &Context, storefront: &Storefront) -> Result<()> {
    let auth = storefront.auth()?;

    match args.command {
        AuthCommand::Login { email, password } => {
            let password = match password {
                Some(p) => p,
                None => Password::new().with_prompt("Password").interact()?,
            };
            let spinner = ctx.output.spinner("Signing in...");
            let ok = auth.login(&email, &password).await;
            spinner.finish_and_clear();
            if !ok {
                bail!("sign-in failed");
            }
        }

        AuthCommand::Register { email, name } => {
            let password = new_password()?;
            let spinner = ctx.output.spinner("Creating account...");
            let ok = auth.register(&email, &password, name.as_deref()).await;
            spinner.finish_and_clear();
            if !ok {
                bail!("sign-up failed");
            }
        }

        AuthCommand::Logout => {
            if !auth.is_authenticated() {
                ctx.output.info("Not signed in");
                return Ok(());
            }
            if !auth.logout().await {
                bail!("sign-out failed on the server; the local session was removed");
            }
        }

        AuthCommand::ResetPassword { email } => {
            if !auth.reset_password(&email).await {
                bail!("password reset failed");
            }
        }

        AuthCommand::Recover { link } => {
            let link = EmailLink::parse(&link)?;
            if !auth.recover(&link).await {
                bail!("recovery link rejected");
            }
            let password = Password::new()
                .with_prompt("New password")
                .interact()?;
            let confirmation = Password::new()
                .with_prompt("Confirm password")
                .interact()?;
            if !auth.change_password(&password, &confirmation).await {
                bail!("password change failed");
            }
        }

        AuthCommand::ChangePassword => {
            if !auth.is_authenticated() {
                bail!("sign in first");
            }
            let password = Password::new().with_prompt("New password").interact()?;
            let confirmation = Password::new().with_prompt("Confirm password").interact()?;
            if !auth.change_password(&password, &confirmation).await {
                bail!("password change failed");
            }
        }

        AuthCommand::ResendConfirmation { email } => {
            if !auth.resend_confirmation(&email).await {
                bail!("could not resend the confirmation email");
            }
        }

        AuthCommand::Status => {
            let session = auth.session();
            if ctx.output.is_json() {
                ctx.output.json(&json!({
                    "authenticated": session.is_some(),
                    "user": session.as_ref().map(|s| &s.user),
                    "expires_at": session.as_ref().map(|s| s.expires_at),
                }));
                return Ok(());
            }

            match session {
                Some(session) => {
                    let user = &session.user;
                    ctx.output.header("Signed in");
                    ctx.output.kv("Name", user.display_name());
                    ctx.output.kv("Email", user.email.as_deref().unwrap_or("-"));
                    ctx.output.kv("Role", user.role().as_str());
                    ctx.output.kv(
                        "Confirmed",
                        if user.is_email_confirmed() { "yes" } else { "no" },
                    );
                    let minutes = session.time_to_expiry(Utc::now()) / 60;
                    ctx.output.kv("Expires in", &format!("{} min", minutes.max(0)));
                }
                None => ctx.output.info("Not signed in"),
            }
        }
    }

    Ok(())
}

fn new_password() -> Result<String> {
    Ok(Password::new()
        .with_prompt("Password")
        .with_confirmation("Confirm password", "Passwords do not match")
        .interact()?)
}

//! Configuration commands.

use std::fs;

use anyhow::{bail, Context as _, Result};
use grocer_sdk::StorefrontConfig;

use super::{ConfigArgs, ConfigCommand};
use crate::context::Context;

/// Run the config command.
pub async fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => show_config(ctx),
        ConfigCommand::Init { path, force } => init_config(&path, force, ctx),
        ConfigCommand::Validate => validate_config(ctx),
    }
}

/// The effective config with the anon key masked.
fn redacted(config: &StorefrontConfig) -> StorefrontConfig {
    let mut config = config.clone();
    if let Some(key) = config.auth.anon_key.as_mut() {
        let visible: String = key.chars().take(6).collect();
        *key = format!("{}***", visible);
    }
    config
}

fn show_config(ctx: &Context) -> Result<()> {
    let config = redacted(&ctx.config);

    if ctx.output.is_json() {
        ctx.output.json(&config);
        return Ok(());
    }

    ctx.output.header("Current Configuration");
    match &ctx.config_path {
        Some(path) => ctx.output.kv("file", &path.display().to_string()),
        None => ctx.output.kv("file", "(defaults)"),
    }

    ctx.output.info("");
    ctx.output.info("[api]");
    ctx.output.kv("base_url", &config.api.base_url);
    ctx.output.kv("timeout_secs", &config.api.timeout_secs.to_string());

    ctx.output.info("");
    ctx.output.info("[auth]");
    match &config.auth.url {
        Some(url) => {
            ctx.output.kv("url", url);
            ctx.output
                .kv("anon_key", config.auth.anon_key.as_deref().unwrap_or("-"));
            if let Some(redirect) = &config.auth.redirect_url {
                ctx.output.kv("redirect_url", redirect);
            }
        }
        None => ctx.output.kv("url", "(not configured)"),
    }

    ctx.output.info("");
    ctx.output.info("[store]");
    ctx.output.kv("currency", config.store.currency.code());
    if let Some(phone) = &config.store.chat_phone {
        ctx.output.kv("chat_phone", phone);
    }
    let shipping = &config.store.shipping;
    ctx.output.kv("shipping.standard_fee", &shipping.standard_fee.to_string());
    ctx.output.kv("shipping.reduced_fee", &shipping.reduced_fee.to_string());
    ctx.output.kv("shipping.reduced_from", &shipping.reduced_from.to_string());
    ctx.output.kv("shipping.free_from", &shipping.free_from.to_string());

    ctx.output.info("");
    ctx.output.info("[storage]");
    match config.data_dir() {
        Ok(dir) => ctx.output.kv("data_dir", &dir.display().to_string()),
        Err(e) => ctx.output.kv("data_dir", &format!("(unavailable: {})", e)),
    }

    ctx.output.info("");
    ctx.output.info("[logging]");
    ctx.output.kv("level", &config.logging.level);
    ctx.output.kv("format", &config.logging.format.to_string());

    ctx.output.info("");
    ctx.output.info("[analytics]");
    ctx.output.kv("enabled", &config.analytics.enabled.to_string());
    if let Some(id) = &config.analytics.measurement_id {
        ctx.output.kv("measurement_id", id);
    }

    Ok(())
}

fn init_config(path: &str, force: bool, ctx: &Context) -> Result<()> {
    let config_path = ctx.resolve_path(path);

    if config_path.exists() && !force {
        bail!(
            "Config file already exists: {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    let content = if config_path.extension().is_some_and(|ext| ext == "json") {
        serde_json::to_string_pretty(&StorefrontConfig::default())?
    } else {
        StorefrontConfig::template()
    };
    fs::write(&config_path, content)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;

    ctx.output.success(&format!("Created: {}", config_path.display()));
    Ok(())
}

fn validate_config(ctx: &Context) -> Result<()> {
    ctx.output.header("Validating configuration");

    let config = &ctx.config;
    config.validate()?;

    let mut warnings = Vec::new();
    if config.auth.url.is_none() {
        warnings.push("auth.url is not set; account commands are unavailable".to_string());
    }
    if config.store.chat_phone.is_none() {
        warnings.push("store.chat_phone is not set; orders get no chat link".to_string());
    }
    let shipping = &config.store.shipping;
    if shipping.reduced_from > shipping.free_from {
        warnings.push(format!(
            "shipping.reduced_from ({}) is above shipping.free_from ({})",
            shipping.reduced_from, shipping.free_from
        ));
    }
    if config.analytics.enabled && config.analytics.measurement_id.is_none() {
        warnings.push("analytics.enabled is set without a measurement_id".to_string());
    }

    for warning in &warnings {
        ctx.output.warn(&format!("Warning: {}", warning));
    }
    if warnings.is_empty() {
        ctx.output.success("Configuration is valid");
    } else {
        ctx.output.success("Configuration is valid (with warnings)");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redacted_masks_anon_key() {
        let mut config = StorefrontConfig::default();
        config.auth.url = Some("https://auth.test".to_string());
        config.auth.anon_key = Some("eyJhbGciOiJIUzI1NiJ9.secret".to_string());

        let shown = redacted(&config);
        assert_eq!(shown.auth.anon_key.as_deref(), Some("eyJhbG***"));
        assert_eq!(shown.auth.url, config.auth.url);
    }
}

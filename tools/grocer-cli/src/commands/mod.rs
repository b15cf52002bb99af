//! CLI command implementations.

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod orders;

use anyhow::{anyhow, Result};
use clap::{Args, Subcommand};
use grocer_commerce::cart::LineKey;
use grocer_commerce::catalog::Attributes;

/// Identifies one cart line.
#[derive(Args, Debug, Clone)]
pub struct LineArgs {
    /// Product id.
    pub product: String,

    /// Variant id.
    #[arg(long)]
    pub variant: Option<String>,

    /// Variant attribute as NAME=VALUE (repeatable).
    #[arg(long = "attr", value_parser = parse_attribute)]
    pub attributes: Vec<(String, String)>,
}

impl LineArgs {
    pub fn attributes(&self) -> Option<Attributes> {
        Attributes::from_pairs(self.attributes.clone()).non_empty()
    }

    pub fn key(&self) -> LineKey {
        LineKey::new(
            self.product.clone().into(),
            self.variant.clone().map(Into::into),
            self.attributes(),
        )
    }
}

fn parse_attribute(raw: &str) -> Result<(String, String)> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| anyhow!("expected NAME=VALUE, got {:?}", raw))?;
    let (name, value) = (name.trim(), value.trim());
    if name.is_empty() || value.is_empty() {
        return Err(anyhow!("expected NAME=VALUE, got {:?}", raw));
    }
    Ok((name.to_string(), value.to_string()))
}

/// Arguments for the cart command.
#[derive(Args)]
pub struct CartArgs {
    #[command(subcommand)]
    pub command: CartCommand,
}

#[derive(Subcommand)]
pub enum CartCommand {
    /// Add a product to the cart.
    Add {
        #[command(flatten)]
        line: LineArgs,

        /// Quantity to add.
        #[arg(short, long, default_value = "1")]
        quantity: i64,
    },
    /// Remove a line from the cart.
    Remove {
        #[command(flatten)]
        line: LineArgs,
    },
    /// Set the quantity of a line; 0 removes it.
    Set {
        #[command(flatten)]
        line: LineArgs,

        /// New quantity.
        quantity: i64,
    },
    /// Show the cart.
    List,
    /// Include a line in checkout.
    Select {
        #[command(flatten)]
        line: LineArgs,
    },
    /// Leave a line out of checkout.
    Deselect {
        #[command(flatten)]
        line: LineArgs,
    },
    /// Include every line in checkout.
    SelectAll,
    /// Leave every line out of checkout.
    DeselectAll,
    /// Empty the cart.
    Clear {
        /// Skip confirmation.
        #[arg(short, long)]
        yes: bool,
    },
    /// Show totals for the selected lines.
    Summary,
}

/// Arguments for the checkout command.
#[derive(Args)]
pub struct CheckoutArgs {
    /// Customer name.
    #[arg(long)]
    pub name: Option<String>,

    /// Customer phone number.
    #[arg(long)]
    pub phone: Option<String>,

    /// Delivery address.
    #[arg(long)]
    pub address: Option<String>,

    #[arg(long)]
    pub email: Option<String>,

    /// Delivery location id.
    #[arg(long)]
    pub location: Option<String>,

    /// Note for the shop.
    #[arg(long)]
    pub notes: Option<String>,

    /// Skip confirmation.
    #[arg(short, long)]
    pub yes: bool,
}

/// Arguments for the auth command.
#[derive(Args)]
pub struct AuthArgs {
    #[command(subcommand)]
    pub command: AuthCommand,
}

#[derive(Subcommand)]
pub enum AuthCommand {
    /// Sign in with email and password.
    Login {
        email: String,

        /// Password (prompted when omitted).
        #[arg(long)]
        password: Option<String>,
    },
    /// Create an account.
    Register {
        email: String,

        /// Full name stored on the account.
        #[arg(long)]
        name: Option<String>,
    },
    /// Sign out.
    Logout,
    /// Email a password-recovery link.
    ResetPassword { email: String },
    /// Set a new password from a recovery link.
    Recover {
        /// The link from the recovery email.
        link: String,
    },
    /// Set a new password for the signed-in user.
    ChangePassword,
    /// Send the sign-up confirmation email again.
    ResendConfirmation { email: String },
    /// Show the signed-in user.
    Status,
}

/// Arguments for the catalog command.
#[derive(Args)]
pub struct CatalogArgs {
    #[command(subcommand)]
    pub command: CatalogCommand,
}

#[derive(Subcommand)]
pub enum CatalogCommand {
    /// List products.
    Products {
        /// Search text.
        #[arg(short, long)]
        search: Option<String>,

        /// Category id.
        #[arg(short, long)]
        category: Option<String>,

        /// Sort order (featured, newest, price-asc, price-desc, name-asc, ...).
        #[arg(long)]
        sort: Option<String>,

        /// Only products with stock left.
        #[arg(long)]
        in_stock: bool,

        /// List the trash instead.
        #[arg(long)]
        trash: bool,

        #[arg(long, default_value = "1")]
        page: i64,

        #[arg(long, default_value = "24")]
        limit: i64,
    },
    /// List categories.
    Categories,
    /// Turn text into a slug, optionally checking that it is free.
    Slug {
        text: String,

        /// Check availability against products.
        #[arg(long, conflicts_with = "category")]
        product: bool,

        /// Check availability against categories.
        #[arg(long)]
        category: bool,

        /// Id of the row being edited, ignored by the check.
        #[arg(long)]
        exclude: Option<String>,
    },
}

/// Arguments for the orders command.
#[derive(Args)]
pub struct OrdersArgs {
    #[command(subcommand)]
    pub command: OrdersCommand,
}

#[derive(Subcommand)]
pub enum OrdersCommand {
    /// Show an order.
    Show { order: String },
    /// Change an order's status, payment status or notes.
    Status {
        order: String,

        /// pending, confirmed, processing, delivering, delivered or cancelled.
        #[arg(long)]
        status: Option<String>,

        /// unpaid, paid or refunded.
        #[arg(long)]
        payment: Option<String>,

        #[arg(long)]
        notes: Option<String>,
    },
    /// Add a product to an order.
    AddItem {
        order: String,

        product: String,

        #[arg(long)]
        variant: Option<String>,

        #[arg(short, long, default_value = "1")]
        quantity: i64,
    },
    /// Remove an item from an order.
    RemoveItem {
        order: String,

        item: String,

        /// Skip confirmation.
        #[arg(short, long)]
        yes: bool,
    },
}

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration.
    Show,
    /// Write a starter config file.
    Init {
        #[arg(default_value = "grocer.toml")]
        path: String,

        /// Overwrite an existing file.
        #[arg(short, long)]
        force: bool,
    },
    /// Validate the configuration.
    Validate,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_attribute() {
        assert_eq!(
            parse_attribute("Color = Red").unwrap(),
            ("Color".to_string(), "Red".to_string())
        );
        assert!(parse_attribute("Color").is_err());
        assert!(parse_attribute("=Red").is_err());
    }

    #[test]
    fn test_line_key_prefers_attributes() {
        let line = LineArgs {
            product: "shirt".to_string(),
            variant: Some("v1".to_string()),
            attributes: vec![("Size".to_string(), "M".to_string())],
        };
        assert_eq!(
            line.key(),
            LineKey::attributes("shirt", Attributes::from_pairs([("Size", "M")]))
        );
    }
}

//! Grocer CLI - command line client for the grocery storefront.
//!
//! Commands:
//! - `grocer cart` - Build and inspect the cart
//! - `grocer checkout` - Place an order for the selected cart lines
//! - `grocer auth` - Sign in, sign up and manage the account
//! - `grocer catalog` - Browse products and categories
//! - `grocer orders` - Inspect and edit placed orders
//! - `grocer config` - Manage configuration

mod commands;
mod context;
mod output;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use grocer_observability::init_logging;

use commands::{AuthArgs, CartArgs, CatalogArgs, CheckoutArgs, ConfigArgs, OrdersArgs};

/// Grocer CLI - shop the storefront from the terminal
#[derive(Parser)]
#[command(name = "grocer")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Use JSON output format
    #[arg(long, global = true)]
    json: bool,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build and inspect the cart
    Cart(CartArgs),

    /// Place an order for the selected cart lines
    Checkout(CheckoutArgs),

    /// Sign in, sign up and manage the account
    Auth(AuthArgs),

    /// Browse products and categories
    Catalog(CatalogArgs),

    /// Inspect and edit placed orders
    Orders(OrdersArgs),

    /// Manage configuration
    Config(ConfigArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let output = output::Output::new(cli.verbose > 0, cli.json);

    let config_path = cli.config.as_deref();
    let ctx = match context::Context::load(config_path, output.clone()) {
        Ok(ctx) => ctx,
        Err(e) => {
            output.error(&format!("{:#}", e));
            std::process::exit(1);
        }
    };

    let logging = ctx.config.logging.clone().with_verbosity(cli.verbose);
    if let Err(e) = init_logging(&logging) {
        ctx.output.warn(&format!("Logging disabled: {}", e));
    }

    let result = run(cli.command, &ctx).await;

    if let Err(e) = result {
        ctx.output.error(&format!("{:#}", e));
        std::process::exit(1);
    }

    Ok(())
}

async fn run(command: Commands, ctx: &context::Context) -> Result<()> {
    if let Commands::Config(args) = command {
        return commands::config::run(args, ctx).await;
    }

    let storefront = ctx.storefront().await?;
    let result = match command {
        Commands::Cart(args) => commands::cart::run(args, ctx, &storefront).await,
        Commands::Checkout(args) => commands::checkout::run(args, ctx, &storefront).await,
        Commands::Auth(args) => commands::auth::run(args, ctx, &storefront).await,
        Commands::Catalog(args) => commands::catalog::run(args, ctx, &storefront).await,
        Commands::Orders(args) => commands::orders::run(args, ctx, &storefront).await,
        Commands::Config(_) => Ok(()),
    };
    storefront.shutdown().await;
    result
}

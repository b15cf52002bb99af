//! Checkout command.

use anyhow::{anyhow, Result};
use dialoguer::{Confirm, Input};
use grocer_commerce::checkout::CustomerDetails;
use grocer_sdk::Storefront;
use serde_json::json;

use super::CheckoutArgs;
use crate::commands::cart::print_summary;
use crate::context::Context;

/// Run the checkout command.
pub async fn run(args: CheckoutArgs, ctx: &Context, storefront: &Storefront) -> Result<()> {
    let checkout = storefront.checkout();

    let spinner = ctx.output.spinner("Preparing checkout...");
    let opened = checkout.open().await;
    spinner.finish_and_clear();
    opened.map_err(|e| anyhow!(e.user_message()))?;
    print_summary(ctx, storefront).await?;

    let interactive = !ctx.output.is_json();
    let customer = customer_details(&args, interactive)?;

    if interactive
        && !args.yes
        && !Confirm::new()
            .with_prompt("Place this order?")
            .default(true)
            .interact()?
    {
        ctx.output.info("Cancelled; the cart was not changed");
        return Ok(());
    }

    let spinner = ctx.output.spinner("Placing order...");
    let submitted = checkout.submit(&customer).await;
    spinner.finish_and_clear();
    let receipt = submitted.map_err(|e| anyhow!(e.user_message()))?;

    let currency = storefront.cart().currency();
    if ctx.output.is_json() {
        ctx.output.json(&json!({
            "order": receipt.order,
            "chat_link": receipt.chat_link,
        }));
    } else {
        ctx.output.success(&format!("Order {} placed", receipt.order.order_number));
        ctx.output.kv("Total", &receipt.order.total(currency).display());
        if let Some(link) = &receipt.chat_link {
            ctx.output.kv("Send it to the shop", link);
        }
    }

    checkout.dismiss().await.map_err(|e| anyhow!(e.user_message()))?;
    ctx.output.debug("cart cleared after confirmation");
    Ok(())
}

fn customer_details(args: &CheckoutArgs, interactive: bool) -> Result<CustomerDetails> {
    let ask = |value: &Option<String>, prompt: &str| -> Result<String> {
        match value {
            Some(v) => Ok(v.clone()),
            None if interactive => Ok(Input::<String>::new().with_prompt(prompt).interact_text()?),
            None => Err(anyhow!("--{} is required", prompt.to_lowercase())),
        }
    };

    let mut customer = CustomerDetails::new(
        ask(&args.name, "Name")?,
        ask(&args.phone, "Phone")?,
        ask(&args.address, "Address")?,
    );
    if let Some(email) = &args.email {
        customer = customer.with_email(email.clone());
    }
    if let Some(location) = &args.location {
        customer = customer.with_location(location.clone());
    }
    if let Some(notes) = &args.notes {
        customer = customer.with_notes(notes.clone());
    }
    Ok(customer)
}

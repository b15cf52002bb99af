//! Cart commands.

use anyhow::{bail, Result};
use dialoguer::Confirm;
use grocer_commerce::cart::{AddOutcome, AddToCart, QuantityChange};
use grocer_sdk::Storefront;
use serde_json::json;

use super::{CartArgs, CartCommand, LineArgs};
use crate::context::Context;
use crate::output::selection_mark;

/// Run the cart command.
pub async fn run(args: CartArgs, ctx: &Context, storefront: &Storefront) -> Result<()> {
    let cart = storefront.cart();

    match args.command {
        CartCommand::Add { line, quantity } => {
            let mut request = AddToCart::product(line.product.clone(), quantity);
            if let Some(variant) = &line.variant {
                request = request.with_variant(variant.clone());
            }
            if let Some(attributes) = line.attributes() {
                request = request.with_attributes(attributes);
            }

            let spinner = ctx.output.spinner("Adding to cart...");
            let outcome = cart.add_item(request).await;
            spinner.finish_and_clear();

            match outcome.map_err(|e| anyhow::anyhow!(e.user_message()))? {
                AddOutcome::Added(key) => ctx.output.success(&format!("Added {}", key)),
                AddOutcome::Merged { key, quantity } => {
                    ctx.output.success(&format!("{} now x{}", key, quantity))
                }
            }
            print_summary(ctx, storefront).await
        }

        CartCommand::Remove { line } => {
            let key = line.key();
            match cart.remove_item(&key).await {
                Some(item) => ctx.output.success(&format!("Removed {} (x{})", key, item.quantity)),
                None => bail!("{} is not in the cart", key),
            }
            print_summary(ctx, storefront).await
        }

        CartCommand::Set { line, quantity } => {
            let key = line.key();
            let change = cart
                .update_quantity(&key, quantity)
                .await
                .map_err(|e| anyhow::anyhow!(e.user_message()))?;
            match change {
                QuantityChange::Updated { previous, quantity } => ctx
                    .output
                    .success(&format!("{}: {} -> {}", key, previous, quantity)),
                QuantityChange::Removed(_) => ctx.output.success(&format!("Removed {}", key)),
                QuantityChange::NotFound => bail!("{} is not in the cart", key),
            }
            print_summary(ctx, storefront).await
        }

        CartCommand::List => list(ctx, storefront).await,

        CartCommand::Select { line } => set_selected(ctx, storefront, &line, true).await,

        CartCommand::Deselect { line } => set_selected(ctx, storefront, &line, false).await,

        CartCommand::SelectAll => {
            cart.select_all().await;
            ctx.output.success("All items selected");
            print_summary(ctx, storefront).await
        }

        CartCommand::DeselectAll => {
            cart.deselect_all().await;
            ctx.output.success("Selection cleared");
            print_summary(ctx, storefront).await
        }

        CartCommand::Clear { yes } => {
            if cart.is_empty().await {
                ctx.output.info("The cart is already empty");
                return Ok(());
            }
            if !yes
                && !Confirm::new()
                    .with_prompt("Remove every item from the cart?")
                    .default(false)
                    .interact()?
            {
                ctx.output.info("Cancelled");
                return Ok(());
            }
            cart.clear_cart().await;
            ctx.output.success("Cart cleared");
            Ok(())
        }

        CartCommand::Summary => print_summary(ctx, storefront).await,
    }
}

async fn set_selected(ctx: &Context, storefront: &Storefront, line: &LineArgs, selected: bool) -> Result<()> {
    let cart = storefront.cart();
    let key = line.key();
    let state = cart.snapshot().await;
    if !state.contains(&key) {
        bail!("{} is not in the cart", key);
    }
    if state.is_selected(&key) != selected {
        cart.toggle_selection(&key).await;
    }
    ctx.output.success(&format!(
        "{} {}",
        key,
        if selected { "selected" } else { "deselected" }
    ));
    print_summary(ctx, storefront).await
}

async fn list(ctx: &Context, storefront: &Storefront) -> Result<()> {
    let cart = storefront.cart();
    let state = cart.snapshot().await;
    let currency = cart.currency();

    let spinner = ctx.output.spinner("Loading products...");
    let mut rows = Vec::with_capacity(state.len());
    for item in state.items() {
        let details = cart.get_item_details(item).await;
        rows.push((item.clone(), details, state.is_selected(&item.key())));
    }
    spinner.finish_and_clear();

    if ctx.output.is_json() {
        let lines: Vec<_> = rows
            .iter()
            .map(|(item, details, selected)| {
                json!({
                    "key": item.key().to_string(),
                    "item": item,
                    "selected": selected,
                    "name": details.as_ref().map(|d| d.product.name.clone()),
                    "variant": details.as_ref().and_then(|d| d.variant_label()),
                    "unit_price": details.as_ref().map(|d| d.unit_price(currency).amount),
                })
            })
            .collect();
        ctx.output.json(&lines);
        return Ok(());
    }

    if rows.is_empty() {
        ctx.output.info("The cart is empty");
        return Ok(());
    }

    ctx.output.header("Cart");
    let widths = [4, 28, 18, 5, 14];
    ctx.output.table_row(&["", "PRODUCT", "VARIANT", "QTY", "PRICE"], &widths);
    for (item, details, selected) in &rows {
        let mark = selection_mark(*selected);
        let (name, variant, price) = match details {
            Some(d) => (
                d.product.name.clone(),
                d.variant_label().unwrap_or_default(),
                d.unit_price(currency).display(),
            ),
            None => (format!("{} (unavailable)", item.product_id), String::new(), "-".to_string()),
        };
        ctx.output.table_row(
            &[&mark, &name, &variant, &item.quantity.to_string(), &price],
            &widths,
        );
    }
    print_summary(ctx, storefront).await
}

/// Print the totals of the selected lines.
pub async fn print_summary(ctx: &Context, storefront: &Storefront) -> Result<()> {
    let cart = storefront.cart();
    let summary = cart.summary().await.map_err(|e| anyhow::anyhow!(e.user_message()))?;

    if ctx.output.is_json() {
        ctx.output.json(&summary);
        return Ok(());
    }

    ctx.output.header("Summary");
    ctx.output.kv("Items", &summary.item_count.to_string());
    ctx.output.kv("Subtotal", &summary.subtotal.display());
    ctx.output.kv("Delivery", &summary.shipping.display());
    ctx.output.kv("Total", &summary.total.display());
    if summary.subtotal.is_positive() {
        if let Some(remaining) = cart.policy().remaining_for_free(summary.subtotal) {
            ctx.output
                .info(&format!("Add {} more for free delivery", remaining.display()));
        }
    }
    Ok(())
}

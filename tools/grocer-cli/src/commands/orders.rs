//! Order management commands.

use anyhow::{anyhow, bail, Context as _, Result};
use dialoguer::Confirm;
use grocer_commerce::checkout::{NewOrderItem, Order, OrderStatus, PaymentStatus, StatusUpdate};
use grocer_commerce::{Currency, Money, OrderId, OrderItemId};
use grocer_sdk::Storefront;

use super::{OrdersArgs, OrdersCommand};
use crate::context::Context;
use crate::output::status_badge;

/// Run the orders command.
pub async fn run(args: OrdersArgs, ctx: &Context, storefront: &Storefront) -> Result<()> {
    let orders = storefront.api().orders();
    let currency = storefront.cart().currency();

    match args.command {
        OrdersCommand::Show { order } => {
            let order = orders
                .get(&OrderId::from(order))
                .await
                .context("Failed to load order")?;
            print_order(ctx, &order, currency);
        }

        OrdersCommand::Status {
            order,
            status,
            payment,
            notes,
        } => {
            let update = StatusUpdate {
                status: status
                    .map(|s| OrderStatus::parse(&s).ok_or_else(|| anyhow!("unknown order status {:?}", s)))
                    .transpose()?,
                payment_status: payment
                    .map(|s| PaymentStatus::parse(&s).ok_or_else(|| anyhow!("unknown payment status {:?}", s)))
                    .transpose()?,
                notes,
            };
            if update.is_empty() {
                bail!("nothing to change; pass --status, --payment or --notes");
            }

            let spinner = ctx.output.spinner("Updating order...");
            let result = orders.update_status(&OrderId::from(order), &update).await;
            spinner.finish_and_clear();
            let order = result.context("Failed to update order")?;
            ctx.output.success(&format!(
                "Order {} is {}",
                order.order_number,
                order.status.display_name()
            ));
            print_order(ctx, &order, currency);
        }

        OrdersCommand::AddItem {
            order,
            product,
            variant,
            quantity,
        } => {
            let id = OrderId::from(order);
            let current = orders.get(&id).await.context("Failed to load order")?;
            current.ensure_editable()?;
            if quantity <= 0 {
                bail!("quantity must be at least 1");
            }

            let item = NewOrderItem {
                product_id: product.into(),
                variant_id: variant.map(Into::into),
                quantity,
            };
            let order = orders.add_item(&id, &item).await.context("Failed to add item")?;
            ctx.output.success(&format!(
                "Order {} now totals {}",
                order.order_number,
                order.total(currency).display()
            ));
            print_order(ctx, &order, currency);
        }

        OrdersCommand::RemoveItem { order, item, yes } => {
            let id = OrderId::from(order);
            let item_id = OrderItemId::from(item);
            let current = orders.get(&id).await.context("Failed to load order")?;
            current.ensure_item_removable(&item_id)?;

            let name = current
                .items
                .iter()
                .find(|i| i.id == item_id)
                .map(|i| i.product_name.clone())
                .unwrap_or_default();
            if !yes
                && !Confirm::new()
                    .with_prompt(format!("Remove {} from order {}?", name, current.order_number))
                    .default(false)
                    .interact()?
            {
                ctx.output.info("Cancelled");
                return Ok(());
            }

            let order = orders
                .remove_item(&id, &item_id)
                .await
                .context("Failed to remove item")?;
            ctx.output.success(&format!(
                "Removed {}; order {} now totals {}",
                name,
                order.order_number,
                order.total(currency).display()
            ));
        }
    }

    Ok(())
}

fn print_order(ctx: &Context, order: &Order, currency: Currency) {
    if ctx.output.is_json() {
        ctx.output.json(order);
        return;
    }

    ctx.output.header(&format!("Order {}", order.order_number));
    ctx.output.kv("Status", &status_badge(order.status.as_str()));
    ctx.output.kv("Payment", &status_badge(order.payment_status.as_str()));
    ctx.output.kv("Customer", &order.customer_name);
    ctx.output.kv("Phone", &order.customer_phone);
    ctx.output.kv("Address", &order.delivery_address);
    if let Some(notes) = &order.notes {
        ctx.output.kv("Notes", notes);
    }

    let widths = [14, 30, 5, 14];
    ctx.output.table_row(&["ITEM", "PRODUCT", "QTY", "AMOUNT"], &widths);
    for item in &order.items {
        let name = match &item.variant_label {
            Some(label) => format!("{} ({})", item.product_name, label),
            None => item.product_name.clone(),
        };
        ctx.output.table_row(
            &[
                item.id.as_str(),
                &name,
                &item.quantity.to_string(),
                &Money::new(item.line_total(), currency).display(),
            ],
            &widths,
        );
    }
    ctx.output.kv("Subtotal", &Money::new(order.subtotal, currency).display());
    ctx.output.kv("Delivery", &Money::new(order.shipping_fee, currency).display());
    ctx.output.kv("Total", &order.total(currency).display());
}

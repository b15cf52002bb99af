//! Catalog browsing commands.

use anyhow::{anyhow, bail, Context as _, Result};
use grocer_commerce::catalog::slugify;
use grocer_commerce::search::{Filter, ListQuery, SortOption};
use grocer_sdk::Storefront;
use serde_json::json;

use super::{CatalogArgs, CatalogCommand};
use crate::context::Context;

/// Run the catalog command.
pub async fn run(args: CatalogArgs, ctx: &Context, storefront: &Storefront) -> Result<()> {
    let api = storefront.api();
    let currency = storefront.cart().currency();

    match args.command {
        CatalogCommand::Products {
            search,
            category,
            sort,
            in_stock,
            trash,
            page,
            limit,
        } => {
            let mut query = ListQuery::new().with_pagination(page, limit);
            if let Some(search) = search {
                query = query.with_search(search);
            }
            if let Some(category) = category {
                query = query.with_filter(Filter::category(category));
            }
            if in_stock {
                query = query.with_filter(Filter::in_stock());
            }
            if let Some(sort) = sort {
                let sort = SortOption::parse(&sort).ok_or_else(|| anyhow!("unknown sort order {:?}", sort))?;
                query = query.with_sort(sort);
            }

            let spinner = ctx.output.spinner("Loading products...");
            let result = if trash {
                api.products().trash(&query).await
            } else {
                api.products().list(&query).await
            };
            spinner.finish_and_clear();
            let page = result.context("Failed to list products")?;

            if ctx.output.is_json() {
                ctx.output.json(&page);
                return Ok(());
            }
            if page.is_empty() {
                ctx.output.info("No products found");
                return Ok(());
            }

            ctx.output.header(if trash { "Trash" } else { "Products" });
            let widths = [14, 32, 14, 6];
            ctx.output.table_row(&["ID", "NAME", "PRICE", "STOCK"], &widths);
            for product in &page.items {
                ctx.output.table_row(
                    &[
                        product.id.as_str(),
                        &product.name,
                        &product.unit_price(None, currency).display(),
                        &product.stock.to_string(),
                    ],
                    &widths,
                );
                for variant in &product.variants {
                    ctx.output.list_item(&format!(
                        "{} ({}) {}",
                        variant.label(),
                        variant.id,
                        product.unit_price(Some(variant), currency).display()
                    ));
                }
            }
            let p = &page.pagination;
            ctx.output.info(&format!(
                "{}-{} of {} (page {}/{})",
                p.start_item(),
                p.end_item(),
                p.total,
                p.page,
                p.total_pages.max(1)
            ));
        }

        CatalogCommand::Categories => {
            let spinner = ctx.output.spinner("Loading categories...");
            let result = api.categories().list().await;
            spinner.finish_and_clear();
            let categories = result.context("Failed to list categories")?;

            if ctx.output.is_json() {
                ctx.output.json(&categories);
                return Ok(());
            }
            ctx.output.header("Categories");
            for category in &categories {
                ctx.output
                    .list_item(&format!("{} ({})", category.name, category.slug));
            }
        }

        CatalogCommand::Slug {
            text,
            product,
            category,
            exclude,
        } => {
            let slug = slugify(&text);
            if slug.is_empty() {
                bail!("{:?} has no characters usable in a slug", text);
            }

            let available = if product {
                let exclude = exclude.map(Into::into);
                Some(api.products().check_slug(&slug, exclude.as_ref()).await?)
            } else if category {
                let exclude = exclude.map(Into::into);
                Some(api.categories().check_slug(&slug, exclude.as_ref()).await?)
            } else {
                None
            };

            if ctx.output.is_json() {
                ctx.output.json(&json!({ "slug": slug, "available": available }));
                return Ok(());
            }
            ctx.output.kv("Slug", &slug);
            match available {
                Some(true) => ctx.output.success("Available"),
                Some(false) => ctx.output.warn("Already taken"),
                None => {}
            }
        }
    }

    Ok(())
}

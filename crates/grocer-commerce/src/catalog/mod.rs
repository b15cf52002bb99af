//! Product catalog module.
//!
//! Contains types for products, variants, attribute selections and categories.

mod attributes;
mod category;
mod product;
mod slug;

pub use attributes::Attributes;
pub use category::{Category, CategoryInput};
pub use product::{
    Product, ProductInput, ProductVariant, VariantKind, TRASH_RETENTION_DAYS,
};
pub use slug::slugify;

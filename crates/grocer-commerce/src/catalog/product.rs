//! Product and variant types.

use crate::catalog::Attributes;
use crate::ids::{CategoryId, ProductId, VariantId};
use crate::money::{deserialize_amount, Currency, Money};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Days a soft-deleted product stays in the trash before the backend purges it.
pub const TRASH_RETENTION_DAYS: i64 = 10;

/// A product in the catalog, as returned by the products endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    /// Unique product identifier.
    pub id: ProductId,
    /// Product name.
    pub name: String,
    /// URL-friendly slug (unique).
    #[serde(default)]
    pub slug: String,
    /// Full description.
    #[serde(default)]
    pub description: Option<String>,
    /// Base price in store currency units.
    #[serde(deserialize_with = "deserialize_amount")]
    pub price: i64,
    /// Units in stock for the base product.
    #[serde(default)]
    pub stock: i64,
    /// Owning category.
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    /// Image URLs, first one is the cover.
    #[serde(default)]
    pub images: Vec<String>,
    /// Whether the product is listed in the storefront.
    #[serde(default = "default_true")]
    pub is_active: bool,
    /// Manual sort position.
    #[serde(default)]
    pub display_order: i32,
    /// Set when the product sits in the trash.
    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,
    /// Purchasable variants; empty for plain products.
    #[serde(default)]
    pub variants: Vec<ProductVariant>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

fn default_true() -> bool {
    true
}

impl Product {
    /// Create a plain product with no variants.
    pub fn new(id: impl Into<ProductId>, name: impl Into<String>, price: i64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            slug: String::new(),
            description: None,
            price,
            stock: 0,
            category_id: None,
            images: Vec::new(),
            is_active: true,
            display_order: 0,
            deleted_at: None,
            variants: Vec::new(),
            created_at: None,
        }
    }

    /// Attach a variant.
    pub fn with_variant(mut self, variant: ProductVariant) -> Self {
        self.variants.push(variant);
        self
    }

    pub fn with_stock(mut self, stock: i64) -> Self {
        self.stock = stock;
        self
    }

    pub fn has_variants(&self) -> bool {
        !self.variants.is_empty()
    }

    /// Check if the product can be bought from the storefront.
    pub fn is_available(&self) -> bool {
        self.is_active && self.deleted_at.is_none()
    }

    /// Base price as money.
    pub fn base_price(&self, currency: Currency) -> Money {
        Money::new(self.price, currency)
    }

    /// Cover image URL.
    pub fn cover_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }

    /// Find the variant a cart line refers to.
    ///
    /// An attribute selection is matched against normalized variants by
    /// attribute equality; without one (or without a match) the lookup falls
    /// back to the variant id.
    pub fn find_variant(
        &self,
        attributes: Option<&Attributes>,
        variant_id: Option<&VariantId>,
    ) -> Option<&ProductVariant> {
        if let Some(attrs) = attributes {
            if let Some(v) = self
                .variants
                .iter()
                .find(|v| v.attributes() == Some(attrs))
            {
                return Some(v);
            }
        }
        variant_id.and_then(|id| self.variants.iter().find(|v| &v.id == id))
    }

    /// Unit price for an optional variant: variant price when present,
    /// otherwise the base price.
    pub fn unit_price(&self, variant: Option<&ProductVariant>, currency: Currency) -> Money {
        Money::new(variant.map(|v| v.price).unwrap_or(self.price), currency)
    }

    /// Stock for an optional variant.
    pub fn stock_for(&self, variant: Option<&ProductVariant>) -> i64 {
        variant.map(|v| v.stock).unwrap_or(self.stock)
    }

    pub fn is_in_trash(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// When the backend will purge this product, if it is in the trash.
    pub fn purge_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
            .map(|at| at + Duration::days(TRASH_RETENTION_DAYS))
    }

    /// Whole days left before purge, rounded up, never negative.
    pub fn days_until_purge(&self, now: DateTime<Utc>) -> Option<i64> {
        self.purge_at().map(|purge| {
            let secs = (purge - now).num_seconds().max(0);
            (secs + 86_399) / 86_400
        })
    }
}

/// How a variant is identified.
///
/// Older products carry a single free-text variant label; newer ones carry a
/// full attribute map. The shape is settled once when the JSON is decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VariantKind {
    /// Single-label variant (e.g. "1kg").
    Legacy { label: String },
    /// Multi-attribute variant (e.g. `Color: Red, Size: M`).
    Normalized { attributes: Attributes },
}

/// A purchasable variant of a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "VariantRecord", into = "VariantRecord")]
pub struct ProductVariant {
    pub id: VariantId,
    /// Price in store currency units.
    pub price: i64,
    pub stock: i64,
    pub kind: VariantKind,
}

impl ProductVariant {
    pub fn normalized(id: impl Into<VariantId>, attributes: Attributes, price: i64, stock: i64) -> Self {
        Self {
            id: id.into(),
            price,
            stock,
            kind: VariantKind::Normalized { attributes },
        }
    }

    pub fn legacy(id: impl Into<VariantId>, label: impl Into<String>, price: i64, stock: i64) -> Self {
        Self {
            id: id.into(),
            price,
            stock,
            kind: VariantKind::Legacy {
                label: label.into(),
            },
        }
    }

    /// Attribute map for normalized variants.
    pub fn attributes(&self) -> Option<&Attributes> {
        match &self.kind {
            VariantKind::Normalized { attributes } => Some(attributes),
            VariantKind::Legacy { .. } => None,
        }
    }

    /// Display label.
    pub fn label(&self) -> String {
        match &self.kind {
            VariantKind::Legacy { label } => label.clone(),
            VariantKind::Normalized { attributes } => attributes.label(),
        }
    }

    pub fn is_in_stock(&self) -> bool {
        self.stock > 0
    }
}

/// Wire shape of a variant row.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct VariantRecord {
    id: VariantId,
    #[serde(deserialize_with = "deserialize_amount")]
    price: i64,
    #[serde(default)]
    stock: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    attributes: Option<Attributes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    value: Option<String>,
}

impl From<VariantRecord> for ProductVariant {
    fn from(record: VariantRecord) -> Self {
        let kind = match record.attributes.and_then(Attributes::non_empty) {
            Some(attributes) => VariantKind::Normalized { attributes },
            None => {
                let label = match (record.name, record.value) {
                    (Some(name), Some(value)) if !value.is_empty() => {
                        format!("{}: {}", name, value)
                    }
                    (Some(name), _) => name,
                    (None, Some(value)) => value,
                    (None, None) => String::new(),
                };
                VariantKind::Legacy { label }
            }
        };
        ProductVariant {
            id: record.id,
            price: record.price,
            stock: record.stock,
            kind,
        }
    }
}

impl From<ProductVariant> for VariantRecord {
    fn from(variant: ProductVariant) -> Self {
        let (attributes, name) = match variant.kind {
            VariantKind::Normalized { attributes } => (Some(attributes), None),
            VariantKind::Legacy { label } => (None, Some(label)),
        };
        VariantRecord {
            id: variant.id,
            price: variant.price,
            stock: variant.stock,
            attributes,
            name,
            value: None,
        }
    }
}

/// Payload for creating or patching a product.
///
/// Unset fields are left out of the request body so a `PATCH` only touches
/// what changed.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProductInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<CategoryId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn shirt() -> Product {
        Product::new("p1", "T-shirt", 5000)
            .with_variant(ProductVariant::normalized(
                "v-red-m",
                Attributes::from_pairs([("Color", "Red"), ("Size", "M")]),
                5500,
                3,
            ))
            .with_variant(ProductVariant::legacy("v-xl", "XL", 6000, 0))
    }

    #[test]
    fn test_decode_normalized_and_legacy_variants() {
        let json = r#"{
            "id": "p1", "name": "Rice", "price": 12500.0, "stock": 4,
            "variants": [
                {"id": "v1", "price": 7000, "stock": 2, "attributes": {"Weight": "5kg"}},
                {"id": "v2", "price": 13000, "stock": 1, "name": "Weight", "value": "10kg"},
                {"id": "v3", "price": 13000, "attributes": {}}
            ]
        }"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.price, 12500);
        assert!(product.is_active);
        assert_eq!(
            product.variants[0].kind,
            VariantKind::Normalized {
                attributes: Attributes::from_pairs([("Weight", "5kg")])
            }
        );
        assert_eq!(product.variants[1].label(), "Weight: 10kg");
        assert!(matches!(product.variants[2].kind, VariantKind::Legacy { .. }));
    }

    #[test]
    fn test_find_variant_prefers_attributes() {
        let product = shirt();
        let attrs = Attributes::from_pairs([("Size", "M"), ("Color", "Red")]);
        let found = product.find_variant(Some(&attrs), Some(&VariantId::new("v-xl")));
        assert_eq!(found.map(|v| v.id.as_str()), Some("v-red-m"));
    }

    #[test]
    fn test_find_variant_falls_back_to_id() {
        let product = shirt();
        let found = product.find_variant(None, Some(&VariantId::new("v-xl")));
        assert_eq!(found.map(|v| v.label()), Some("XL".to_string()));
        assert!(product.find_variant(None, None).is_none());
    }

    #[test]
    fn test_unit_price_uses_variant_when_matched() {
        let product = shirt();
        let variant = product.find_variant(None, Some(&VariantId::new("v-xl")));
        assert_eq!(product.unit_price(variant, Currency::XOF).amount, 6000);
        assert_eq!(product.unit_price(None, Currency::XOF).amount, 5000);
    }

    #[test]
    fn test_days_until_purge() {
        let mut product = shirt();
        assert_eq!(product.days_until_purge(Utc::now()), None);

        let deleted = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        product.deleted_at = Some(deleted);
        assert_eq!(product.days_until_purge(deleted), Some(10));
        assert_eq!(product.days_until_purge(deleted + Duration::hours(30)), Some(9));
        assert_eq!(product.days_until_purge(deleted + Duration::days(12)), Some(0));
        assert!(!product.is_available());
    }

    #[test]
    fn test_product_input_skips_unset_fields() {
        let input = ProductInput {
            price: Some(900),
            ..Default::default()
        };
        assert_eq!(serde_json::to_string(&input).unwrap(), r#"{"price":900}"#);
    }
}

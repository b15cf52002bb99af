//! Cart lines and their identity keys.

use crate::catalog::Attributes;
use crate::ids::{ProductId, VariantId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One intended purchase line.
///
/// The cart stores references only; price and stock are looked up from the
/// product each time a total is computed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: ProductId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant_id: Option<VariantId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Attributes>,
    /// Always positive while the line is in a cart.
    pub quantity: i64,
    pub added_at: DateTime<Utc>,
}

impl CartItem {
    /// Identity of this line inside a cart.
    pub fn key(&self) -> LineKey {
        LineKey::new(
            self.product_id.clone(),
            self.variant_id.clone(),
            self.attributes.clone(),
        )
    }
}

/// What distinguishes lines of the same product.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "by", content = "value", rename_all = "snake_case")]
pub enum LineSelector {
    /// Plain product, no variant.
    Plain,
    /// Single variant referenced by id.
    Variant(VariantId),
    /// Attribute selection; compared as a set.
    Attributes(Attributes),
}

/// Identity key of a cart line.
///
/// An attribute selection takes precedence over a variant id; a line with an
/// attribute map never matches a lookup without one, and the reverse.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LineKey {
    pub product_id: ProductId,
    pub selector: LineSelector,
}

impl LineKey {
    pub fn new(
        product_id: ProductId,
        variant_id: Option<VariantId>,
        attributes: Option<Attributes>,
    ) -> Self {
        let selector = match (attributes.and_then(Attributes::non_empty), variant_id) {
            (Some(attrs), _) => LineSelector::Attributes(attrs),
            (None, Some(id)) => LineSelector::Variant(id),
            (None, None) => LineSelector::Plain,
        };
        Self {
            product_id,
            selector,
        }
    }

    /// Key for a plain product line.
    pub fn plain(product_id: impl Into<ProductId>) -> Self {
        Self::new(product_id.into(), None, None)
    }

    pub fn variant(product_id: impl Into<ProductId>, variant_id: impl Into<VariantId>) -> Self {
        Self::new(product_id.into(), Some(variant_id.into()), None)
    }

    pub fn attributes(product_id: impl Into<ProductId>, attributes: Attributes) -> Self {
        Self::new(product_id.into(), None, Some(attributes))
    }
}

impl fmt::Display for LineKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.selector {
            LineSelector::Plain => write!(f, "{}", self.product_id),
            LineSelector::Variant(v) => write!(f, "{}#{}", self.product_id, v),
            LineSelector::Attributes(a) => write!(f, "{}{{{}}}", self.product_id, a.canonical_key()),
        }
    }
}

/// Request to put a product into the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddToCart {
    pub product_id: ProductId,
    pub variant_id: Option<VariantId>,
    pub attributes: Option<Attributes>,
    pub quantity: i64,
}

impl AddToCart {
    pub fn product(product_id: impl Into<ProductId>, quantity: i64) -> Self {
        Self {
            product_id: product_id.into(),
            variant_id: None,
            attributes: None,
            quantity,
        }
    }

    pub fn with_variant(mut self, variant_id: impl Into<VariantId>) -> Self {
        self.variant_id = Some(variant_id.into());
        self
    }

    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = attributes.non_empty();
        self
    }

    pub fn key(&self) -> LineKey {
        LineKey::new(
            self.product_id.clone(),
            self.variant_id.clone(),
            self.attributes.clone(),
        )
    }
}

//! List filters understood by the collection endpoints.

use crate::checkout::OrderStatus;
use crate::ids::CategoryId;
use serde::{Deserialize, Serialize};

/// A filter on a list endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum Filter {
    /// Products of one category.
    Category(CategoryId),
    /// Listed or hidden rows.
    Active(bool),
    /// Price bounds, inclusive, in store currency units.
    PriceRange { min: Option<i64>, max: Option<i64> },
    /// Only rows with stock left.
    InStock,
    /// Orders in one status.
    Status(OrderStatus),
    /// Soft-deleted rows instead of live ones.
    Trashed,
}

impl Filter {
    pub fn category(id: impl Into<CategoryId>) -> Self {
        Filter::Category(id.into())
    }

    pub fn price_range(min: Option<i64>, max: Option<i64>) -> Self {
        Filter::PriceRange { min, max }
    }

    pub fn in_stock() -> Self {
        Filter::InStock
    }

    /// Query-string pairs for this filter.
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        match self {
            Filter::Category(id) => vec![("category_id", id.to_string())],
            Filter::Active(active) => vec![("is_active", active.to_string())],
            Filter::PriceRange { min, max } => {
                let mut pairs = Vec::new();
                if let Some(min) = min {
                    pairs.push(("min_price", min.to_string()));
                }
                if let Some(max) = max {
                    pairs.push(("max_price", max.to_string()));
                }
                pairs
            }
            Filter::InStock => vec![("in_stock", "true".to_string())],
            Filter::Status(status) => vec![("status", status.as_str().to_string())],
            Filter::Trashed => vec![("trashed", "true".to_string())],
        }
    }

    /// Human-readable description.
    pub fn description(&self) -> String {
        match self {
            Filter::Category(id) => format!("Category: {}", id),
            Filter::Active(true) => "Active".to_string(),
            Filter::Active(false) => "Inactive".to_string(),
            Filter::PriceRange { min, max } => match (min, max) {
                (Some(min), Some(max)) => format!("Price: {} - {}", min, max),
                (Some(min), None) => format!("Price: {}+", min),
                (None, Some(max)) => format!("Price: up to {}", max),
                (None, None) => "Any price".to_string(),
            },
            Filter::InStock => "In Stock".to_string(),
            Filter::Status(status) => format!("Status: {}", status.display_name()),
            Filter::Trashed => "In trash".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_range_pairs_skip_open_bounds() {
        let pairs = Filter::price_range(Some(1000), None).to_query_pairs();
        assert_eq!(pairs, vec![("min_price", "1000".to_string())]);
        assert!(Filter::price_range(None, None).to_query_pairs().is_empty());
    }

    #[test]
    fn test_filter_description() {
        assert_eq!(Filter::price_range(Some(500), Some(2000)).description(), "Price: 500 - 2000");
        assert_eq!(Filter::Status(OrderStatus::Delivering).description(), "Status: Out for delivery");
    }
}

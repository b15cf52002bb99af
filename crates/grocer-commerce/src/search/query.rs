//! List query builder.

use crate::search::Filter;
use serde::{Deserialize, Serialize};

/// Default page size for list endpoints.
pub const DEFAULT_PER_PAGE: i64 = 24;

/// Maximum page size the backend accepts.
pub const MAX_PER_PAGE: i64 = 100;

/// Sort options for list results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortOption {
    /// Manual display order.
    #[default]
    Position,
    Newest,
    Oldest,
    PriceAsc,
    PriceDesc,
    NameAsc,
    NameDesc,
}

impl SortOption {
    /// Column and direction sent as `sort` / `order`.
    pub fn to_params(&self) -> (&'static str, &'static str) {
        match self {
            SortOption::Position => ("display_order", "asc"),
            SortOption::Newest => ("created_at", "desc"),
            SortOption::Oldest => ("created_at", "asc"),
            SortOption::PriceAsc => ("price", "asc"),
            SortOption::PriceDesc => ("price", "desc"),
            SortOption::NameAsc => ("name", "asc"),
            SortOption::NameDesc => ("name", "desc"),
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            SortOption::Position => "Featured",
            SortOption::Newest => "Newest",
            SortOption::Oldest => "Oldest",
            SortOption::PriceAsc => "Price: Low to High",
            SortOption::PriceDesc => "Price: High to Low",
            SortOption::NameAsc => "Name: A-Z",
            SortOption::NameDesc => "Name: Z-A",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "position" | "featured" => Some(SortOption::Position),
            "newest" => Some(SortOption::Newest),
            "oldest" => Some(SortOption::Oldest),
            "price_asc" => Some(SortOption::PriceAsc),
            "price_desc" => Some(SortOption::PriceDesc),
            "name_asc" => Some(SortOption::NameAsc),
            "name_desc" => Some(SortOption::NameDesc),
            _ => None,
        }
    }
}

/// Search, filter, sort and paging options for a list call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ListQuery {
    pub search: Option<String>,
    pub filters: Vec<Filter>,
    pub sort: Option<SortOption>,
    /// Current page (1-indexed).
    pub page: i64,
    pub per_page: i64,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self::new()
    }
}

impl ListQuery {
    pub fn new() -> Self {
        Self {
            search: None,
            filters: Vec::new(),
            sort: None,
            page: 1,
            per_page: DEFAULT_PER_PAGE,
        }
    }

    /// Set the text search; blank input clears it.
    pub fn with_search(mut self, q: impl Into<String>) -> Self {
        let q = q.into();
        let q = q.trim();
        self.search = if q.is_empty() { None } else { Some(q.to_string()) };
        self
    }

    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn with_sort(mut self, sort: SortOption) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn with_pagination(mut self, page: i64, per_page: i64) -> Self {
        self.page = page.max(1);
        self.per_page = per_page.clamp(1, MAX_PER_PAGE);
        self
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.per_page
    }

    /// Query-string pairs in a stable order: filters, search, sort, paging.
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs: Vec<(&'static str, String)> = self
            .filters
            .iter()
            .flat_map(Filter::to_query_pairs)
            .collect();
        if let Some(search) = &self.search {
            pairs.push(("search", search.clone()));
        }
        if let Some(sort) = self.sort {
            let (field, order) = sort.to_params();
            pairs.push(("sort", field.to_string()));
            pairs.push(("order", order.to_string()));
        }
        pairs.push(("page", self.page.to_string()));
        pairs.push(("limit", self.per_page.to_string()));
        pairs
    }
}

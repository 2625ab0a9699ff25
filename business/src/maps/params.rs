//! Query parameters of the listing endpoint.

use std::collections::BTreeMap;

use super::model::Field;

pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Query keys owned by paging and sorting; filters may not reuse them.
const RESERVED_KEYS: [&str; 4] = ["results", "page", "sortField", "sortOrder"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascend,
    Descend,
}

impl SortOrder {
    pub fn wire_name(self) -> &'static str {
        match self {
            Self::Ascend => "ascend",
            Self::Descend => "descend",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sorter {
    pub field: Field,
    pub order: SortOrder,
}

/// Everything a single load sends to the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListParams {
    /// 1-based.
    pub page: u32,
    pub page_size: u32,
    pub sorter: Option<Sorter>,
    pub filters: BTreeMap<String, String>,
}

impl Default for ListParams {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl ListParams {
    pub fn new(page_size: u32) -> Self {
        Self {
            page: 1,
            page_size: page_size.max(1),
            sorter: None,
            filters: BTreeMap::new(),
        }
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.page = page.max(1);
        self
    }

    /// Changing the page size starts over at page 1.
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self.page = 1;
        self
    }

    /// Header click on `field`: none -> ascend -> descend -> none.
    ///
    /// Switching to another field starts at ascend. The page is kept.
    pub fn toggle_sort(mut self, field: Field) -> Self {
        self.sorter = match self.sorter {
            Some(Sorter {
                field: current,
                order: SortOrder::Ascend,
            }) if current == field => Some(Sorter {
                field,
                order: SortOrder::Descend,
            }),
            Some(Sorter {
                field: current,
                order: SortOrder::Descend,
            }) if current == field => None,
            _ => Some(Sorter {
                field,
                order: SortOrder::Ascend,
            }),
        };
        self
    }

    /// Set (`Some`) or clear (`None`) a filter; the page restarts at 1.
    pub fn with_filter(mut self, key: impl Into<String>, value: Option<String>) -> Self {
        let key = key.into();
        match value {
            Some(value) => {
                self.filters.insert(key, value);
            }
            None => {
                self.filters.remove(&key);
            }
        }
        self.page = 1;
        self
    }

    pub fn sort_order_of(&self, field: Field) -> Option<SortOrder> {
        self.sorter
            .filter(|sorter| sorter.field == field)
            .map(|sorter| sorter.order)
    }

    /// Query pairs in wire form.
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut query = vec![
            ("results".to_owned(), self.page_size.to_string()),
            ("page".to_owned(), self.page.to_string()),
        ];
        if let Some(sorter) = self.sorter {
            query.push(("sortField".to_owned(), sorter.field.wire_name().to_owned()));
            query.push(("sortOrder".to_owned(), sorter.order.wire_name().to_owned()));
        }
        for (key, value) in &self.filters {
            if RESERVED_KEYS.contains(&key.as_str()) {
                log::warn!("filter {key} collides with a paging parameter, skipped");
                continue;
            }
            query.push((key.clone(), value.clone()));
        }
        query
    }
}

//! Search, field filters, ordering and pagination for catalog list endpoints

use crate::config::CatalogConfig;
use crate::model::{Asset, AssetInstance, Id, Manufacturer, Page, Project, Snapshot, TopN};
use serde::Deserialize;
use std::cmp::Ordering;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum QueryError {
    #[error("page must be a positive integer")]
    InvalidPage,
    #[error("page_size must be between 1 and {max}")]
    InvalidPageSize { max: usize },
    #[error("cannot order by '{0}'")]
    UnknownOrdering(String),
    #[error("top_n must be one of {allowed:?}, got {value}")]
    InvalidTopN { value: usize, allowed: Vec<usize> },
}

/// Query string accepted by list endpoints; each endpoint reads the filters it supports
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    pub page: Option<usize>,
    pub page_size: Option<usize>,
    pub search: Option<String>,
    pub ordering: Option<String>,
    pub manufacturer: Option<Id>,
    pub type_id: Option<String>,
    pub project: Option<Id>,
    pub location: Option<String>,
    pub merch_category: Option<String>,
}

/// Something a list endpoint can search and order
pub trait Listable {
    const ORDERING_FIELDS: &'static [&'static str];

    fn id(&self) -> Id;

    /// `needle` is already lowercased
    fn matches_search(&self, needle: &str) -> bool;

    /// Compare on one of `ORDERING_FIELDS`
    fn compare_field(&self, other: &Self, field: &str) -> Ordering;
}

#[derive(Debug, Clone, PartialEq)]
struct OrderBy {
    field: String,
    descending: bool,
}

impl OrderBy {
    fn parse<T: Listable>(raw: &str) -> Result<Self, QueryError> {
        let raw = raw.trim();
        let (field, descending) = match raw.strip_prefix('-') {
            Some(field) => (field, true),
            None => (raw, false),
        };

        if T::ORDERING_FIELDS.contains(&field) {
            Ok(OrderBy {
                field: field.to_string(),
                descending,
            })
        } else {
            Err(QueryError::UnknownOrdering(raw.to_string()))
        }
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

pub struct CatalogQuery;

impl CatalogQuery {
    /// Filter, order and slice `items` into one page.
    ///
    /// Items are ordered by id unless `ordering` names another field.
    pub fn paginate<T, F>(
        items: Vec<T>,
        query: &ListQuery,
        limits: &CatalogConfig,
        predicate: F,
    ) -> Result<Page<T>, QueryError>
    where
        T: Listable,
        F: Fn(&T) -> bool,
    {
        let page = query.page.unwrap_or(1);
        if page == 0 {
            return Err(QueryError::InvalidPage);
        }

        let page_size = query.page_size.unwrap_or(limits.default_page_size);
        if page_size == 0 || page_size > limits.max_page_size {
            return Err(QueryError::InvalidPageSize {
                max: limits.max_page_size,
            });
        }

        let order_by = query
            .ordering
            .as_deref()
            .filter(|raw| !raw.trim().is_empty())
            .map(OrderBy::parse::<T>)
            .transpose()?;

        let needle = query
            .search
            .as_deref()
            .map(str::trim)
            .filter(|needle| !needle.is_empty())
            .map(str::to_lowercase);

        let mut matches: Vec<T> = items
            .into_iter()
            .filter(|item| needle.as_deref().map_or(true, |n| item.matches_search(n)))
            .filter(|item| predicate(item))
            .collect();

        matches.sort_by(|a, b| match &order_by {
            Some(order) => {
                let ordering = a
                    .compare_field(b, &order.field)
                    .then_with(|| a.id().cmp(&b.id()));
                if order.descending {
                    ordering.reverse()
                } else {
                    ordering
                }
            }
            None => a.id().cmp(&b.id()),
        });

        let count = matches.len();
        let results = matches
            .into_iter()
            .skip((page - 1).saturating_mul(page_size))
            .take(page_size)
            .collect();

        Ok(Page::new(count, page, page_size, results))
    }

    /// Validate a requested top-N cutoff against the configured choices
    pub fn top_n(requested: Option<usize>, limits: &CatalogConfig) -> Result<TopN, QueryError> {
        let value = requested.unwrap_or(limits.default_top_n);
        let invalid = || QueryError::InvalidTopN {
            value,
            allowed: limits.top_n_choices.clone(),
        };

        if !limits.top_n_choices.contains(&value) {
            return Err(invalid());
        }
        TopN::new(value).ok_or_else(invalid)
    }
}

impl Listable for Asset {
    const ORDERING_FIELDS: &'static [&'static str] = &["id", "name", "type_id", "model"];

    fn id(&self) -> Id {
        self.id
    }

    fn matches_search(&self, needle: &str) -> bool {
        self.search_fields()
            .iter()
            .any(|field| contains_ignore_case(field, needle))
    }

    fn compare_field(&self, other: &Self, field: &str) -> Ordering {
        match field {
            "name" => self.name.cmp(&other.name),
            "type_id" => self.type_id.cmp(&other.type_id),
            "model" => self.model.cmp(&other.model),
            _ => self.id.cmp(&other.id),
        }
    }
}

impl Listable for Manufacturer {
    const ORDERING_FIELDS: &'static [&'static str] = &["id", "name"];

    fn id(&self) -> Id {
        self.id
    }

    fn matches_search(&self, needle: &str) -> bool {
        contains_ignore_case(&self.name, needle)
    }

    fn compare_field(&self, other: &Self, field: &str) -> Ordering {
        match field {
            "name" => self.name.cmp(&other.name),
            _ => self.id.cmp(&other.id),
        }
    }
}

impl Listable for Project {
    const ORDERING_FIELDS: &'static [&'static str] = &["id", "name"];

    fn id(&self) -> Id {
        self.id
    }

    fn matches_search(&self, needle: &str) -> bool {
        contains_ignore_case(&self.name, needle)
            || self
                .client
                .as_deref()
                .is_some_and(|client| contains_ignore_case(client, needle))
    }

    fn compare_field(&self, other: &Self, field: &str) -> Ordering {
        match field {
            "name" => self.name.cmp(&other.name),
            _ => self.id.cmp(&other.id),
        }
    }
}

impl Listable for Snapshot {
    const ORDERING_FIELDS: &'static [&'static str] = &["id", "name", "taken_at"];

    fn id(&self) -> Id {
        self.id
    }

    fn matches_search(&self, needle: &str) -> bool {
        contains_ignore_case(&self.name, needle)
    }

    fn compare_field(&self, other: &Self, field: &str) -> Ordering {
        match field {
            "name" => self.name.cmp(&other.name),
            "taken_at" => self.taken_at.cmp(&other.taken_at),
            _ => self.id.cmp(&other.id),
        }
    }
}

impl Listable for AssetInstance {
    const ORDERING_FIELDS: &'static [&'static str] = &["id", "location"];

    fn id(&self) -> Id {
        self.id
    }

    fn matches_search(&self, needle: &str) -> bool {
        contains_ignore_case(&self.location, needle)
            || self.asset().is_some_and(|asset| {
                contains_ignore_case(&asset.name, needle)
                    || contains_ignore_case(&asset.type_id, needle)
            })
    }

    fn compare_field(&self, other: &Self, field: &str) -> Ordering {
        match field {
            "location" => self.location.cmp(&other.location),
            _ => self.id.cmp(&other.id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn manufacturers() -> Vec<Manufacturer> {
        ["Madix", "Lozier", "Trion", "Marlite", "Madison Fixtures"]
            .iter()
            .enumerate()
            .map(|(i, name)| Manufacturer {
                id: i as Id + 1,
                name: name.to_string(),
                website: None,
                notes: None,
            })
            .collect()
    }

    fn limits() -> CatalogConfig {
        CatalogConfig {
            default_page_size: 2,
            max_page_size: 3,
            ..CatalogConfig::default()
        }
    }

    fn names(page: &Page<Manufacturer>) -> Vec<&str> {
        page.results.iter().map(|m| m.name.as_str()).collect()
    }

    #[test]
    fn test_default_paging_orders_by_id() {
        let page =
            CatalogQuery::paginate(manufacturers(), &ListQuery::default(), &limits(), |_| true)
                .unwrap();

        assert_eq!(page.count, 5);
        assert_eq!(page.total_pages, 3);
        assert_eq!(names(&page), vec!["Madix", "Lozier"]);
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let query = ListQuery {
            search: Some("  MAD ".to_string()),
            ..ListQuery::default()
        };
        let page = CatalogQuery::paginate(manufacturers(), &query, &limits(), |_| true).unwrap();

        assert_eq!(page.count, 2);
        assert_eq!(names(&page), vec!["Madix", "Madison Fixtures"]);
    }

    #[test]
    fn test_descending_ordering_and_last_page() {
        let query = ListQuery {
            ordering: Some("-name".to_string()),
            page: Some(3),
            ..ListQuery::default()
        };
        let page = CatalogQuery::paginate(manufacturers(), &query, &limits(), |_| true).unwrap();

        // Trion, Marlite | Madix, Madison Fixtures | Lozier
        assert_eq!(names(&page), vec!["Lozier"]);

        let past_end = ListQuery {
            page: Some(9),
            ..ListQuery::default()
        };
        let page =
            CatalogQuery::paginate(manufacturers(), &past_end, &limits(), |_| true).unwrap();
        assert!(page.results.is_empty());
        assert_eq!(page.count, 5);
    }

    #[test]
    fn test_predicate_filters() {
        let page = CatalogQuery::paginate(
            manufacturers(),
            &ListQuery::default(),
            &limits(),
            |m: &Manufacturer| m.id % 2 == 0,
        )
        .unwrap();
        assert_eq!(names(&page), vec!["Lozier", "Marlite"]);
    }

    #[test]
    fn test_invalid_queries() {
        let run = |query: ListQuery| {
            CatalogQuery::paginate(manufacturers(), &query, &limits(), |_| true).unwrap_err()
        };

        assert_eq!(
            run(ListQuery {
                page: Some(0),
                ..ListQuery::default()
            }),
            QueryError::InvalidPage
        );
        assert_eq!(
            run(ListQuery {
                page_size: Some(4),
                ..ListQuery::default()
            }),
            QueryError::InvalidPageSize { max: 3 }
        );
        assert_eq!(
            run(ListQuery {
                ordering: Some("-website".to_string()),
                ..ListQuery::default()
            }),
            QueryError::UnknownOrdering("-website".to_string())
        );
    }

    #[test]
    fn test_asset_search_covers_manufacturer_and_type() {
        let assets: Vec<Asset> = serde_json::from_value(json!([
            {"id": 1, "name": "Wall Bay", "type_id": "WB-48", "manufacturer_name": "Madix"},
            {"id": 2, "name": "Endcap", "type_id": "EC-24", "manufacturer": {"id": 2, "name": "Lozier"}},
            {"id": 3, "name": "Hook", "type_id": "HK-6", "model": "wb-compatible"}
        ]))
        .unwrap();

        let query = ListQuery {
            search: Some("wb".to_string()),
            ..ListQuery::default()
        };
        let page = CatalogQuery::paginate(assets.clone(), &query, &limits(), |_| true).unwrap();
        let ids: Vec<Id> = page.results.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![1, 3]);

        let query = ListQuery {
            search: Some("lozier".to_string()),
            ..ListQuery::default()
        };
        let page = CatalogQuery::paginate(assets, &query, &limits(), |_| true).unwrap();
        assert_eq!(page.results[0].id, 2);
    }

    #[test]
    fn test_top_n_choices() {
        let limits = CatalogConfig::default();
        assert_eq!(CatalogQuery::top_n(None, &limits).unwrap().get(), 10);
        assert_eq!(CatalogQuery::top_n(Some(25), &limits).unwrap().get(), 25);
        assert_eq!(
            CatalogQuery::top_n(Some(7), &limits).unwrap_err(),
            QueryError::InvalidTopN {
                value: 7,
                allowed: vec![5, 10, 25]
            }
        );
    }
}

//! services/api/src/web/listing.rs
//!
//! Shared pieces of the list endpoints: the `?page=&per_page=` query, the
//! paged response body, and input-layer validation helpers.

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use site_core::pagination::{PageMeta, Paginator};
use utoipa::IntoParams;

use crate::error::HttpError;

pub const DEFAULT_PER_PAGE: usize = 10;

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    /// 1-based page number; out-of-range values are clamped.
    pub page: Option<usize>,
    pub per_page: Option<usize>,
    /// Only used by the blog listing.
    pub category: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub current_page: usize,
    pub items_per_page: usize,
    pub total_items: usize,
    pub total_pages: usize,
}

impl<T> Page<T> {
    fn from_parts(items: Vec<T>, meta: PageMeta) -> Self {
        Self {
            items,
            current_page: meta.current_page,
            items_per_page: meta.items_per_page,
            total_items: meta.total_items,
            total_pages: meta.total_pages,
        }
    }
}

/// Cuts the requested page out of an already-ordered collection.
pub fn paginate<T>(items: Vec<T>, query: &PageQuery) -> Result<Page<T>, HttpError> {
    let mut pages = Paginator::new(items, query.per_page.unwrap_or(DEFAULT_PER_PAGE))
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;
    pages.go_to_page(query.page.unwrap_or(1));
    let (items, meta) = pages.into_page();
    Ok(Page::from_parts(items, meta))
}

/// Rejects blank required fields before they reach the store.
pub fn require(fields: &[(&str, &str)]) -> Result<(), HttpError> {
    match fields.iter().find(|(_, value)| value.trim().is_empty()) {
        Some((name, _)) => Err((StatusCode::BAD_REQUEST, format!("{} is required", name))),
        None => Ok(()),
    }
}

pub fn require_rating(rating: i32) -> Result<(), HttpError> {
    if !(1..=5).contains(&rating) {
        return Err((
            StatusCode::BAD_REQUEST,
            "rating must be between 1 and 5".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_first_page_of_ten() {
        let page = paginate((1..=25).collect(), &PageQuery::default()).unwrap();
        assert_eq!(page.items.len(), 10);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.current_page, 1);
    }

    #[test]
    fn zero_per_page_is_a_bad_request() {
        let query = PageQuery {
            per_page: Some(0),
            ..Default::default()
        };
        let err = paginate(vec![1], &query).unwrap_err();
        assert_eq!(err.0, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn names_the_first_blank_field() {
        let err = require(&[("name", "Ana"), ("email", "  "), ("message", "")]).unwrap_err();
        assert_eq!(err.1, "email is required");
        assert!(require(&[("name", "Ana")]).is_ok());
        assert!(require_rating(0).is_err());
        assert!(require_rating(5).is_ok());
    }
}

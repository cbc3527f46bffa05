//! Pagination and date-range query parameters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use serde_with::{DisplayFromStr, serde_as};

use crate::domain::repositories::DateRange;
use crate::error::AppError;

const DEFAULT_PAGE_SIZE: u32 = 25;
const MAX_PAGE_SIZE: u32 = 100;

/// Pagination query parameters.
///
/// Uses `serde_with` to parse page numbers from query strings as integers.
#[serde_as]
#[derive(Debug, Default, Deserialize)]
pub struct PaginationParams {
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub page: Option<u32>,

    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub page_size: Option<u32>,
}

/// A validated page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page: u32,
    pub page_size: u32,
}

impl Page {
    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.page_size)
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.page_size)
    }

    /// Metadata block for a response covering `total_items` rows.
    pub fn meta(&self, total_items: i64) -> PaginationMeta {
        let page_size = i64::from(self.page_size);
        let total_pages = (total_items.max(0) + page_size - 1) / page_size;

        PaginationMeta {
            page: self.page,
            page_size: self.page_size,
            total_items,
            total_pages: u32::try_from(total_pages).unwrap_or(u32::MAX),
        }
    }
}

impl PaginationParams {
    /// Applies defaults and bounds.
    ///
    /// # Defaults
    ///
    /// - `page`: 1
    /// - `page_size`: 25
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the page is 0 or the page size is
    /// outside `1..=100`.
    pub fn validate(&self) -> Result<Page, AppError> {
        let page = self.page.unwrap_or(1);
        let page_size = self.page_size.unwrap_or(DEFAULT_PAGE_SIZE);

        if page == 0 {
            return Err(AppError::bad_request(
                "Page must be greater than 0",
                json!({ "page": page }),
            ));
        }

        if !(1..=MAX_PAGE_SIZE).contains(&page_size) {
            return Err(AppError::bad_request(
                format!("Page size must be between 1 and {MAX_PAGE_SIZE}"),
                json!({ "page_size": page_size }),
            ));
        }

        Ok(Page { page, page_size })
    }
}

/// Pagination metadata for responses.
#[derive(Debug, Serialize)]
pub struct PaginationMeta {
    pub page: u32,
    pub page_size: u32,
    pub total_items: i64,
    pub total_pages: u32,
}

/// Date range filtering parameters (RFC 3339, `to` exclusive).
#[derive(Debug, Default, Deserialize)]
pub struct DateFilterParams {
    #[serde(default, with = "optional_rfc3339")]
    pub from: Option<DateTime<Utc>>,

    #[serde(default, with = "optional_rfc3339")]
    pub to: Option<DateTime<Utc>>,
}

impl DateFilterParams {
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if `from` is after `to`.
    pub fn to_range(&self) -> Result<DateRange, AppError> {
        if let (Some(from), Some(to)) = (self.from, self.to)
            && from > to
        {
            return Err(AppError::bad_request(
                "'from' must not be after 'to'",
                json!({ "from": from, "to": to }),
            ));
        }

        Ok(DateRange::new(self.from, self.to))
    }
}

/// Custom Serde deserializer for RFC3339 datetime strings.
mod optional_rfc3339 {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let opt: Option<String> = Option::deserialize(deserializer)?;
        match opt {
            None => Ok(None),
            Some(s) => DateTime::parse_from_rfc3339(&s)
                .map(|dt| Some(dt.with_timezone(&Utc)))
                .map_err(serde::de::Error::custom),
        }
    }
}

/// Combined query parameters for click listings.
#[derive(Debug, Deserialize)]
pub struct ClickQueryParams {
    #[serde(flatten)]
    pub pagination: PaginationParams,

    #[serde(flatten)]
    pub date_filter: DateFilterParams,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(page: Option<u32>, page_size: Option<u32>) -> PaginationParams {
        PaginationParams { page, page_size }
    }

    #[test]
    fn test_defaults() {
        let page = params(None, None).validate().unwrap();
        assert_eq!(page.offset(), 0);
        assert_eq!(page.limit(), 25);
    }

    #[test]
    fn test_page_2_with_default_size() {
        let page = params(Some(2), None).validate().unwrap();
        assert_eq!(page.offset(), 25);
        assert_eq!(page.limit(), 25);
    }

    #[test]
    fn test_custom_page_and_size() {
        let page = params(Some(3), Some(50)).validate().unwrap();
        assert_eq!(page.offset(), 100);
        assert_eq!(page.limit(), 50);
    }

    #[test]
    fn test_page_zero_is_error() {
        assert!(params(Some(0), None).validate().is_err());
    }

    #[test]
    fn test_page_size_bounds() {
        assert!(params(None, Some(0)).validate().is_err());
        assert!(params(None, Some(1)).validate().is_ok());
        assert!(params(None, Some(100)).validate().is_ok());
        assert!(params(None, Some(101)).validate().is_err());
    }

    #[test]
    fn test_meta_rounds_total_pages_up() {
        let page = params(Some(1), Some(10)).validate().unwrap();
        assert_eq!(page.meta(0).total_pages, 0);
        assert_eq!(page.meta(10).total_pages, 1);
        assert_eq!(page.meta(11).total_pages, 2);
    }

    #[test]
    fn test_optional_rfc3339_deserializer() {
        let json = r#"{"from": "2026-01-01T00:00:00Z", "to": null}"#;
        let p: DateFilterParams = serde_json::from_str(json).unwrap();
        assert!(p.from.is_some());
        assert!(p.to.is_none());
    }

    #[test]
    fn test_optional_rfc3339_invalid_format_is_error() {
        let json = r#"{"from": "not-a-date"}"#;
        assert!(serde_json::from_str::<DateFilterParams>(json).is_err());
    }

    #[test]
    fn test_inverted_range_is_rejected() {
        let json = r#"{"from": "2026-02-01T00:00:00Z", "to": "2026-01-01T00:00:00Z"}"#;
        let p: DateFilterParams = serde_json::from_str(json).unwrap();
        assert!(matches!(p.to_range(), Err(AppError::Validation { .. })));
    }

    #[test]
    fn test_open_range() {
        let range = DateFilterParams::default().to_range().unwrap();
        assert_eq!(range, DateRange::default());
    }
}

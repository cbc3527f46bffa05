//! Repository trait for click records and analytics.

use crate::domain::entities::{Click, NewClick};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

/// Optional half-open time window `[from, to)` applied to `clicked_at`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl DateRange {
    pub fn new(from: Option<DateTime<Utc>>, to: Option<DateTime<Utc>>) -> Self {
        Self { from, to }
    }

    /// Returns true if `at` falls inside the window.
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.from.is_none_or(|from| at >= from) && self.to.is_none_or(|to| at < to)
    }
}

/// Filter criteria for listing click records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClickFilter {
    pub range: DateRange,
    pub offset: i64,
    pub limit: i64,
}

impl ClickFilter {
    /// Creates a new filter with pagination parameters.
    pub fn new(offset: i64, limit: i64) -> Self {
        Self {
            range: DateRange::default(),
            offset,
            limit,
        }
    }

    /// Adds date range filtering to the query.
    pub fn with_range(mut self, range: DateRange) -> Self {
        self.range = range;
        self
    }
}

/// Number of clicks on one calendar day (UTC).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyCount {
    pub day: NaiveDate,
    pub clicks: i64,
}

/// Number of clicks sharing one value of a grouping column.
///
/// `key` is `None` for clicks that carried no value (no referer, unknown IP).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupCount {
    pub key: Option<String>,
    pub clicks: i64,
}

/// Account-wide totals for one owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OwnerTotals {
    pub total_links: i64,
    pub total_clicks: i64,
}

/// Repository interface for click recording and aggregation.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgClickRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClickRepository: Send + Sync {
    /// Appends a click record.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the referenced link does not exist.
    /// Returns [`AppError::Internal`] on database errors.
    async fn create_click(&self, new_click: NewClick) -> Result<Click, AppError>;

    /// Lists a link's clicks, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn list_clicks(&self, link_id: i64, filter: ClickFilter) -> Result<Vec<Click>, AppError>;

    /// Counts a link's clicks within the window.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn count_clicks(&self, link_id: i64, range: DateRange) -> Result<i64, AppError>;

    /// Per-day click counts for one link, oldest day first. Days without
    /// clicks are omitted.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn daily_counts_for_link(
        &self,
        link_id: i64,
        range: DateRange,
    ) -> Result<Vec<DailyCount>, AppError>;

    /// Per-day click counts across all links of an owner, oldest day first.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn daily_counts_for_owner(
        &self,
        owner_id: i64,
        range: DateRange,
    ) -> Result<Vec<DailyCount>, AppError>;

    /// Click counts grouped by device class, largest group first.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn device_counts(&self, link_id: i64, range: DateRange)
    -> Result<Vec<GroupCount>, AppError>;

    /// Click counts grouped by referer, largest group first.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn referer_counts(
        &self,
        link_id: i64,
        range: DateRange,
    ) -> Result<Vec<GroupCount>, AppError>;

    /// Click counts grouped by source IP, largest group first.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn ip_counts(&self, link_id: i64, range: DateRange) -> Result<Vec<GroupCount>, AppError>;

    /// Link and click totals for an owner.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn totals_for_owner(&self, owner_id: i64) -> Result<OwnerTotals, AppError>;
}

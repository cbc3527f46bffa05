//! Click listing and analytics service.

use std::sync::Arc;

use crate::application::services::link_service::find_owned_link;
use crate::domain::entities::Click;
use crate::domain::repositories::{
    ClickFilter, ClickRepository, DailyCount, DateRange, GroupCount, LinkRepository, OwnerTotals,
};
use crate::error::AppError;

/// Grouping column for breakdown queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Breakdown {
    Device,
    Referer,
    Ip,
}

impl Breakdown {
    pub fn as_str(&self) -> &'static str {
        match self {
            Breakdown::Device => "device",
            Breakdown::Referer => "referer",
            Breakdown::Ip => "ip",
        }
    }
}

/// Service for reading click records and aggregates.
///
/// Every per-link query first checks that the caller owns the link.
pub struct StatsService<C: ClickRepository + ?Sized, L: LinkRepository + ?Sized> {
    clicks: Arc<C>,
    links: Arc<L>,
}

impl<C, L> StatsService<C, L>
where
    C: ClickRepository + ?Sized,
    L: LinkRepository + ?Sized,
{
    /// Creates a new statistics service.
    pub fn new(clicks: Arc<C>, links: Arc<L>) -> Self {
        Self { clicks, links }
    }

    /// Returns a page of a link's clicks (newest first) and the number of
    /// clicks in the filtered window.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the link does not exist or is not
    /// owned by `owner_id`.
    /// Returns [`AppError::Internal`] on database errors.
    pub async fn list_clicks(
        &self,
        link_id: i64,
        owner_id: i64,
        filter: ClickFilter,
    ) -> Result<(Vec<Click>, i64), AppError> {
        find_owned_link(self.links.as_ref(), link_id, owner_id).await?;

        tokio::try_join!(
            self.clicks.list_clicks(link_id, filter),
            self.clicks.count_clicks(link_id, filter.range),
        )
    }

    /// Per-day click counts for one link.
    ///
    /// # Errors
    ///
    /// Same as [`Self::list_clicks`].
    pub async fn daily_for_link(
        &self,
        link_id: i64,
        owner_id: i64,
        range: DateRange,
    ) -> Result<Vec<DailyCount>, AppError> {
        find_owned_link(self.links.as_ref(), link_id, owner_id).await?;
        self.clicks.daily_counts_for_link(link_id, range).await
    }

    /// Per-day click counts across all of the owner's links.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    pub async fn daily_for_owner(
        &self,
        owner_id: i64,
        range: DateRange,
    ) -> Result<Vec<DailyCount>, AppError> {
        self.clicks.daily_counts_for_owner(owner_id, range).await
    }

    /// Click counts of one link grouped by device, referer or IP.
    ///
    /// # Errors
    ///
    /// Same as [`Self::list_clicks`].
    pub async fn breakdown(
        &self,
        link_id: i64,
        owner_id: i64,
        by: Breakdown,
        range: DateRange,
    ) -> Result<Vec<GroupCount>, AppError> {
        find_owned_link(self.links.as_ref(), link_id, owner_id).await?;

        match by {
            Breakdown::Device => self.clicks.device_counts(link_id, range).await,
            Breakdown::Referer => self.clicks.referer_counts(link_id, range).await,
            Breakdown::Ip => self.clicks.ip_counts(link_id, range).await,
        }
    }

    /// Link and click totals for the owner.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    pub async fn totals(&self, owner_id: i64) -> Result<OwnerTotals, AppError> {
        self.clicks.totals_for_owner(owner_id).await
    }
}

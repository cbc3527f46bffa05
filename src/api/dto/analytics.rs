//! DTOs for analytics endpoints.

use serde::Serialize;

use crate::domain::repositories::{DailyCount, GroupCount};

/// Per-day click counts, oldest day first.
#[derive(Debug, Serialize)]
pub struct DailyResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link_id: Option<i64>,
    pub total: i64,
    pub items: Vec<DailyCount>,
}

impl DailyResponse {
    pub fn new(link_id: Option<i64>, items: Vec<DailyCount>) -> Self {
        Self {
            link_id,
            total: items.iter().map(|d| d.clicks).sum(),
            items,
        }
    }
}

/// Click counts of one link grouped by a dimension, largest group first.
#[derive(Debug, Serialize)]
pub struct BreakdownResponse {
    pub link_id: i64,
    pub by: &'static str,
    pub items: Vec<GroupCount>,
}
